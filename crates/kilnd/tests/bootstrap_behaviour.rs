//! Behaviour tests for the bootstrap sequence, driven through the
//! collaborator seams with recording test doubles.

use std::ffi::OsString;
use std::sync::{Arc, Mutex};

use rstest::rstest;

use kiln_config::{Settings, Verbosity};
use kilnd::{
    BootstrapError, BuildService, LifecycleReporter, PrivilegeProbe, ServiceError,
    SystemSettingsLoader, bootstrap_with,
};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Starting,
    Resolved(Box<Settings>),
    MissingGroup,
    Failed(String),
    ServiceReturned,
}

#[derive(Default)]
struct RecordingReporter {
    events: Mutex<Vec<Event>>,
}

impl RecordingReporter {
    fn events(&self) -> Vec<Event> {
        self.events.lock().expect("reporter mutex poisoned").clone()
    }

    fn count(&self, wanted: &Event) -> usize {
        self.events()
            .iter()
            .filter(|event| *event == wanted)
            .count()
    }

    fn push(&self, event: Event) {
        self.events.lock().expect("reporter mutex poisoned").push(event);
    }
}

impl LifecycleReporter for RecordingReporter {
    fn bootstrap_starting(&self) {
        self.push(Event::Starting);
    }

    fn settings_resolved(&self, settings: &Settings) {
        self.push(Event::Resolved(Box::new(settings.clone())));
    }

    fn missing_build_users_group(&self) {
        self.push(Event::MissingGroup);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.push(Event::Failed(error.to_string()));
    }

    fn service_returned(&self) {
        self.push(Event::ServiceReturned);
    }
}

struct FixedProbe {
    privileged: bool,
}

impl PrivilegeProbe for FixedProbe {
    fn is_privileged(&self) -> bool {
        self.privileged
    }
}

#[derive(Default)]
struct RecordingService {
    calls: Mutex<Vec<(Vec<String>, Settings)>>,
}

impl RecordingService {
    fn calls(&self) -> Vec<(Vec<String>, Settings)> {
        self.calls.lock().expect("service mutex poisoned").clone()
    }
}

impl BuildService for RecordingService {
    fn run(&self, args: Vec<String>, settings: &Settings) -> Result<(), ServiceError> {
        self.calls
            .lock()
            .expect("service mutex poisoned")
            .push((args, settings.clone()));
        Ok(())
    }
}

struct FailingService;

impl BuildService for FailingService {
    fn run(&self, _args: Vec<String>, _settings: &Settings) -> Result<(), ServiceError> {
        Err(ServiceError::new("store is sealed"))
    }
}

fn argv(args: &[&str]) -> Vec<OsString> {
    std::iter::once("kilnd")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect()
}

fn bootstrap(
    args: &[&str],
    privileged: bool,
    service: &dyn BuildService,
) -> (Result<(), BootstrapError>, Arc<RecordingReporter>) {
    let reporter = Arc::new(RecordingReporter::default());
    let probe = FixedProbe { privileged };
    let outcome = bootstrap_with(
        argv(args),
        &SystemSettingsLoader,
        &probe,
        reporter.clone(),
        service,
    );
    (outcome, reporter)
}

#[test]
fn privileged_without_group_warns_exactly_once() {
    let service = RecordingService::default();
    let (outcome, reporter) = bootstrap(&[], true, &service);
    assert!(outcome.is_ok());
    assert_eq!(reporter.count(&Event::MissingGroup), 1);
}

#[rstest]
#[case::group_configured(&["--build-users-group", "kilnbld"], true)]
#[case::unprivileged(&[], false)]
#[case::unprivileged_with_group(&["--build-users-group", "kilnbld"], false)]
fn warning_is_suppressed_otherwise(#[case] args: &[&str], #[case] privileged: bool) {
    let service = RecordingService::default();
    let (outcome, reporter) = bootstrap(args, privileged, &service);
    assert!(outcome.is_ok());
    assert_eq!(reporter.count(&Event::MissingGroup), 0);
}

#[test]
fn service_receives_empty_args_and_the_resolved_settings() {
    let service = RecordingService::default();
    let (outcome, _reporter) = bootstrap(&["--debug", "-M", "4"], false, &service);
    assert!(outcome.is_ok());

    let calls = service.calls();
    assert_eq!(calls.len(), 1);
    let (args, settings) = &calls[0];
    assert!(args.is_empty());
    assert_eq!(settings.verbosity, Verbosity::Debug);
    assert_eq!(settings.max_build_jobs, Some(4));
}

#[test]
fn normal_service_return_is_tolerated() {
    let service = RecordingService::default();
    let (outcome, reporter) = bootstrap(&[], false, &service);
    assert!(outcome.is_ok());
    assert_eq!(reporter.count(&Event::ServiceReturned), 1);
}

#[test]
fn service_failure_surfaces_as_a_runtime_stage_error() {
    let (outcome, reporter) = bootstrap(&[], false, &FailingService);
    let error = outcome.expect_err("service failure must propagate");
    assert!(matches!(error, BootstrapError::Service { .. }));
    assert_eq!(error.to_string(), "build service failed: store is sealed");

    let failures: Vec<Event> = reporter
        .events()
        .into_iter()
        .filter(|event| matches!(event, Event::Failed(_)))
        .collect();
    assert_eq!(failures.len(), 1, "exactly one failure report expected");
    assert_eq!(reporter.count(&Event::ServiceReturned), 0);
}

#[test]
fn parse_failure_reaches_neither_resolution_nor_the_service() {
    let service = RecordingService::default();
    let (outcome, reporter) = bootstrap(&["--frobnicate"], false, &service);
    let error = outcome.expect_err("unknown flag must abort bootstrap");
    assert!(matches!(error, BootstrapError::Settings { .. }));
    assert!(error.usage_request().is_none());

    assert!(service.calls().is_empty());
    assert!(
        !reporter
            .events()
            .iter()
            .any(|event| matches!(event, Event::Resolved(_))),
        "no settings may be observable after a failed parse"
    );
}

#[test]
fn help_requests_are_distinguished_from_failures() {
    let service = RecordingService::default();
    let (outcome, _reporter) = bootstrap(&["--help"], false, &service);
    let error = outcome.expect_err("help surfaces through the error path");
    assert!(error.usage_request().is_some());
    assert!(service.calls().is_empty());
}
