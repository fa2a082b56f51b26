//! Daemon bootstrap orchestration.

use std::ffi::OsString;
use std::sync::Arc;

use thiserror::Error;

use kiln_config::{Settings, SettingsError};

use crate::health::{LifecycleReporter, StructuredLifecycleReporter};
use crate::service::{BuildService, ServiceError, UnlinkedBuildService};
use crate::telemetry::{self, TelemetryError};

/// Trait abstracting settings resolution for testability.
pub trait SettingsLoader: Send + Sync {
    /// Resolves the daemon settings from a full argument vector.
    fn load(&self, args: Vec<OsString>) -> Result<Settings, SettingsError>;
}

/// Loader that delegates to [`Settings::resolve_from_iter`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSettingsLoader;

impl SettingsLoader for SystemSettingsLoader {
    fn load(&self, args: Vec<OsString>) -> Result<Settings, SettingsError> {
        Settings::resolve_from_iter(args)
    }
}

/// Trait abstracting the effective-privilege check for testability.
pub trait PrivilegeProbe: Send + Sync {
    /// Whether the process runs with elevated privileges.
    fn is_privileged(&self) -> bool;
}

/// Probe backed by the operating system's effective user id.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPrivilegeProbe;

impl PrivilegeProbe for SystemPrivilegeProbe {
    #[cfg(unix)]
    fn is_privileged(&self) -> bool {
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(not(unix))]
    fn is_privileged(&self) -> bool {
        false
    }
}

/// Errors surfaced during bootstrap or out of the build service.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Settings failed to resolve from the environment or arguments.
    #[error("failed to resolve settings: {source}")]
    Settings {
        /// Underlying resolution error.
        #[source]
        source: SettingsError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The build service terminated with an error.
    #[error("build service failed: {source}")]
    Service {
        /// Error propagated out of the service entry point.
        #[source]
        source: ServiceError,
    },
}

impl BootstrapError {
    /// Returns the underlying parser error when the invocation merely asked
    /// for `--help` or `--version`.
    #[must_use]
    pub fn usage_request(&self) -> Option<&clap::Error> {
        match self {
            Self::Settings { source } => source.usage_request(),
            Self::Telemetry { .. } | Self::Service { .. } => None,
        }
    }
}

/// Runs the full bootstrap sequence with the supplied collaborators.
///
/// Settings resolution, telemetry installation, and privilege validation
/// happen in order on the calling thread; on success the call hands control
/// to `service` and only returns when the service does. A normal service
/// return is tolerated and reported, not treated as an error.
pub fn bootstrap_with<S>(
    args: Vec<OsString>,
    loader: &dyn SettingsLoader,
    probe: &dyn PrivilegeProbe,
    reporter: Arc<dyn LifecycleReporter>,
    service: &S,
) -> Result<(), BootstrapError>
where
    S: BuildService + ?Sized,
{
    reporter.bootstrap_starting();

    let settings = match loader.load(args) {
        Ok(settings) => settings,
        Err(source) => {
            let error = BootstrapError::Settings { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    // The handle stays alive until the service hands control back.
    let _telemetry = match telemetry::initialise(&settings) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    if probe.is_privileged() && settings.build_users_group.is_empty() {
        reporter.missing_build_users_group();
    }

    reporter.settings_resolved(&settings);

    // The service receives no arguments of its own; configuration travels
    // through the resolved settings.
    match service.run(Vec::new(), &settings) {
        Ok(()) => {
            reporter.service_returned();
            Ok(())
        }
        Err(source) => {
            let error = BootstrapError::Service { source };
            reporter.bootstrap_failed(&error);
            Err(error)
        }
    }
}

/// Entry point used by the binary: system collaborators, process arguments.
pub fn run<I, T>(args: I) -> Result<(), BootstrapError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    bootstrap_with(
        args,
        &SystemSettingsLoader,
        &SystemPrivilegeProbe,
        Arc::new(StructuredLifecycleReporter::new()),
        &UnlinkedBuildService,
    )
}
