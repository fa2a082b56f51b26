//! Built-in defaults shared by the daemon binary and tests.

use std::env::consts;

/// Environment variable seeding the substituter endpoint list.
pub const SUBSTITUTE_URLS_VAR: &str = "KILN_SUBSTITUTE_URLS";

/// Default system type advertised to clients, e.g. `x86_64-linux`.
#[must_use]
pub fn default_system() -> String {
    format!("{}-{}", consts::ARCH, consts::OS)
}
