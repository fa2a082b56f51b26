//! Structured lifecycle reporting for daemon bootstrap events.

use std::sync::Arc;

use kiln_config::Settings;

use crate::bootstrap::BootstrapError;

/// Observer trait used to surface bootstrap lifecycle events to telemetry
/// sinks.
pub trait LifecycleReporter: Send + Sync {
    /// Invoked before settings resolution begins.
    fn bootstrap_starting(&self);

    /// Invoked once settings are fully resolved and validated.
    fn settings_resolved(&self, settings: &Settings);

    /// Invoked when the process is privileged but no build-users group is
    /// configured. Fires at most once per bootstrap.
    fn missing_build_users_group(&self);

    /// Invoked when a bootstrap stage or the build service fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked when the build service returns normally, which it is not
    /// expected to do.
    fn service_returned(&self);
}

impl<T> LifecycleReporter for Arc<T>
where
    T: LifecycleReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn settings_resolved(&self, settings: &Settings) {
        (**self).settings_resolved(settings);
    }

    fn missing_build_users_group(&self) {
        (**self).missing_build_users_group();
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn service_returned(&self) {
        (**self).service_returned();
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredLifecycleReporter;

impl StructuredLifecycleReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl LifecycleReporter for StructuredLifecycleReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: "kilnd::health",
            event = "bootstrap_starting",
            "starting daemon bootstrap"
        );
    }

    fn settings_resolved(&self, settings: &Settings) {
        tracing::info!(
            target: "kilnd::health",
            event = "settings_resolved",
            system = %settings.this_system,
            use_chroot = settings.use_chroot,
            build_cores = settings.build_cores,
            max_build_jobs = ?settings.max_build_jobs,
            verbosity = %settings.verbosity,
            "daemon settings resolved"
        );
    }

    fn missing_build_users_group(&self) {
        tracing::warn!(
            target: "kilnd::health",
            event = "missing_build_users_group",
            "running with elevated privileges but no build users group; \
             builds will run as the daemon user (consider --build-users-group)"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: "kilnd::health",
            event = "bootstrap_failed",
            error = %error,
            "daemon bootstrap failed"
        );
    }

    fn service_returned(&self) {
        tracing::info!(
            target: "kilnd::health",
            event = "service_returned",
            "build service returned; shutting down"
        );
    }
}
