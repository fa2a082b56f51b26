//! Bootstrap logic for the kiln build daemon.
//!
//! The daemon performs builds and store accesses on behalf of clients. This
//! crate owns the startup sequence and nothing else: resolving
//! [`kiln_config::Settings`] from platform capability, the process
//! environment, and the command line; initialising structured telemetry;
//! warning about hazardous privilege configurations; and handing control to
//! the build service. The engine itself — store access, sandboxed build
//! execution, the client protocol — lives behind the [`BuildService`] trait
//! and is configured solely through the resolved settings.
//!
//! Bootstrap is strictly single-threaded and at-most-once. Every failure,
//! whether raised while resolving settings or propagating out of the
//! service, collapses into a single [`BootstrapError`] that the binary
//! reports as one diagnostic line and a non-zero exit code.

mod bootstrap;
mod health;
mod service;
mod telemetry;

pub use bootstrap::{
    BootstrapError, PrivilegeProbe, SettingsLoader, SystemPrivilegeProbe, SystemSettingsLoader,
    bootstrap_with, run,
};
pub use health::{LifecycleReporter, StructuredLifecycleReporter};
pub use service::{BuildService, ServiceError, UnlinkedBuildService};
pub use telemetry::{TelemetryError, TelemetryHandle};
