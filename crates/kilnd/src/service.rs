//! Seam to the external build-execution engine.

use thiserror::Error;

use kiln_config::Settings;

const SERVICE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::service::unlinked");

/// Error returned when the build service terminates abnormally.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ServiceError {
    message: String,
}

impl ServiceError {
    /// Builds an error from a display message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Long-running engine that evaluates and executes builds for clients.
///
/// The entry point receives the resolved [`Settings`] and an initial
/// argument list, empty under normal operation; configuration travels
/// through the settings, not the arguments. The service is expected to run
/// until the process is externally terminated. Returning at all is unusual
/// and treated as a normal shutdown rather than an error.
pub trait BuildService: Send + Sync {
    /// Runs the service until external termination.
    fn run(&self, args: Vec<String>, settings: &Settings) -> Result<(), ServiceError>;
}

/// Placeholder service used while the build engine is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnlinkedBuildService;

impl BuildService for UnlinkedBuildService {
    fn run(&self, _args: Vec<String>, settings: &Settings) -> Result<(), ServiceError> {
        tracing::warn!(
            target: SERVICE_TARGET,
            system = %settings.this_system,
            "build service start requested but no engine is linked in"
        );
        Ok(())
    }
}
