use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Diagnostic verbosity of the daemon.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Deserialize,
    Serialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    EnumString,
    Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Verbosity {
    /// Errors only.
    Error,
    /// Errors and warnings.
    Warn,
    /// Routine operational output (default).
    #[default]
    Normal,
    /// Detailed debugging output.
    Debug,
}

impl Verbosity {
    /// Filter expression understood by `tracing_subscriber`'s `EnvFilter`.
    #[must_use]
    pub const fn as_filter(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Normal => "info",
            Self::Debug => "debug",
        }
    }
}

/// Errors encountered while parsing a [`Verbosity`] from text.
pub type VerbosityParseError = strum::ParseError;
