#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

#[allow(dead_code)]
pub const OFFICE: &str = "xTIBA5rboUvnH4htodjb6e697QjLERt1NAB4mZqp8Dg=";
#[allow(dead_code)]
pub const LAPTOP: &str = "gN65BkIKy1eCE9pP1wdc8ROUtkHLF2PfAqYdyYBz6EA=";
#[allow(dead_code)]
pub const NEW_KEY: &str = "HIgo9xNzJMWLKASShiTqIybxZ0U3wGLiUeJ1PKf8ykw=";

/// Interface, one enabled peer and one disabled peer.
#[allow(dead_code)]
pub const WG0: &str = "\
# wg0: site-to-site tunnel
[Interface]
PrivateKey = yAnz5TF+lXXJte14tji3zlMNq+hd2rYUIgJBgB3fBmk=
ListenPort = 51820

# office router
[Peer]
PublicKey = xTIBA5rboUvnH4htodjb6e697QjLERt1NAB4mZqp8Dg=
AllowedIPs = 10.0.0.2/32

# retired laptop
#![Peer]
#!PublicKey = gN65BkIKy1eCE9pP1wdc8ROUtkHLF2PfAqYdyYBz6EA=
#!AllowedIPs = 10.0.0.4/32
";

/// Create a configured `wgconf` command suitable for integration tests.
///
/// Settings come from a file that does not exist, so every run starts from defaults
/// regardless of the developer's own settings.
#[allow(dead_code)]
pub fn wgconf_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("wgconf"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.env("WGCONF_CONFIG", "/nonexistent/wgconf/config.toml");
    cmd.env_remove("WGCONF_CONFIG_DIR");
    cmd.env_remove("WGCONF_WG");
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Write `wg0.conf` into `dir` and return its path.
#[allow(dead_code)]
pub fn write_wg0(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("wg0.conf");
    std::fs::write(&path, content).unwrap();
    path
}
