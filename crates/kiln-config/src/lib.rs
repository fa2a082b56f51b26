//! Process-wide configuration for the kiln build daemon.
//!
//! [`Settings`] is resolved exactly once, on the initial thread, before the
//! build service starts: platform-capability defaults first, then
//! environment-derived defaults, then the command-line options in order. The
//! build service receives the resolved value and treats it as read-only for
//! the remainder of the process lifetime.

mod capability;
mod cli;
mod defaults;
mod environment;
mod verbosity;

pub use capability::isolation_supported;
pub use cli::Options;
pub use defaults::{SUBSTITUTE_URLS_VAR, default_system};
pub use verbosity::{Verbosity, VerbosityParseError};

use std::collections::BTreeSet;
use std::ffi::OsString;

use clap::Parser;
use thiserror::Error;

/// Daemon-wide build settings.
///
/// Fields are plain data; validation beyond type shape happens in the
/// bootstrap layer, not here. Scalar fields follow last-occurrence-wins when
/// options repeat; [`Settings::chroot_dirs`] accumulates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Run builds inside an isolated chroot environment.
    pub use_chroot: bool,
    /// Extra directories exposed inside an isolated build.
    pub chroot_dirs: BTreeSet<String>,
    /// Compress build logs that are retained after completion.
    pub compress_log: bool,
    /// Group whose members perform builds; empty means builds run as the
    /// daemon user.
    pub build_users_group: String,
    /// Deduplicate identical store files automatically.
    pub auto_optimise_store: bool,
    /// Record failed builds so they are not retried transparently.
    pub cache_failures: bool,
    /// Report a Linux 2.6 kernel version to builds.
    pub impersonate_linux_26: bool,
    /// Retain build logs after completion.
    pub keep_log: bool,
    /// CPU cores granted to each build; zero means as many as available.
    pub build_cores: u32,
    /// Ceiling on concurrent build jobs; `None` until configured.
    pub max_build_jobs: Option<u32>,
    /// System type advertised to clients, e.g. `x86_64-linux`.
    pub this_system: String,
    /// Diagnostic verbosity.
    pub verbosity: Verbosity,
    /// Fetch substitutes for missing store paths instead of building them.
    pub use_substitutes: bool,
    /// Substituter endpoints consulted when substitution is enabled.
    pub substitute_urls: Vec<String>,
}

impl Settings {
    /// Settings carrying platform-capability defaults and nothing else.
    #[must_use]
    pub fn with_platform_defaults() -> Self {
        Self {
            use_chroot: capability::isolation_supported(),
            chroot_dirs: BTreeSet::new(),
            compress_log: true,
            build_users_group: String::new(),
            auto_optimise_store: true,
            cache_failures: false,
            impersonate_linux_26: false,
            keep_log: true,
            build_cores: 0,
            max_build_jobs: None,
            this_system: defaults::default_system(),
            verbosity: Verbosity::Normal,
            use_substitutes: true,
            substitute_urls: Vec::new(),
        }
    }

    /// Applies environment-derived defaults from the process environment.
    pub fn apply_environment(&mut self) {
        environment::apply(self, |name| std::env::var(name).ok());
    }

    /// As [`Settings::apply_environment`], reading variables through
    /// `lookup` instead of the process environment.
    pub fn apply_environment_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        environment::apply(self, lookup);
    }

    /// Resolves settings from a full argument vector (including the program
    /// name): platform defaults, then environment defaults, then the
    /// command-line options in order.
    ///
    /// A rejected argument vector leaves no partially-mutated settings
    /// behind; the error carries the parser diagnostic.
    pub fn resolve_from_iter<I, T>(args: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let options = Options::try_parse_from(args).map_err(SettingsError::from_arguments)?;
        let mut settings = Self::with_platform_defaults();
        settings.apply_environment();
        options.apply_to(&mut settings);
        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::with_platform_defaults()
    }
}

/// Errors raised while resolving [`Settings`].
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The argument vector did not match the option grammar.
    #[error("{message}")]
    Arguments {
        /// First line of the parser diagnostic.
        message: String,
        /// Underlying parser error.
        #[source]
        source: Box<clap::Error>,
    },
}

impl SettingsError {
    fn from_arguments(source: clap::Error) -> Self {
        let rendered = source.to_string();
        let line = rendered.lines().next().unwrap_or_default();
        let message = line.strip_prefix("error: ").unwrap_or(line).to_owned();
        Self::Arguments {
            message,
            source: Box::new(source),
        }
    }

    /// Returns the parser error when the invocation merely asked for
    /// `--help` or `--version` rather than failing to parse.
    #[must_use]
    pub fn usage_request(&self) -> Option<&clap::Error> {
        use clap::error::ErrorKind;

        let Self::Arguments { source, .. } = self;
        matches!(
            source.kind(),
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
        )
        .then(|| source.as_ref())
    }
}
