//! Command implementations, one module per command family.

mod attr;
mod edit;
mod init;
mod keys;
mod peer;
mod show;

pub use attr::{AttrEdit, execute as edit_attribute};
pub use init::execute as init;
pub use keys::{genkey, genpsk, keypair, pubkey};
pub use peer::{PeerEdit, execute as edit_peer};
pub use show::{list_peers, show};
