//! Process-level helpers shared by every command.

pub mod logging;

pub use logging::initialize_logging;
