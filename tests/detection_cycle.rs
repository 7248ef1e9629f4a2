//! End-to-end request cycles: scripted serial line in, resolution out,
//! report and alerts delivered in order.

use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;

use celebi_watch::config::SerialSettings;
use celebi_watch::counter::CounterStore;
use celebi_watch::detect::{
    DetectionController, DetectionOutcome, PatternMatcher, RetryPolicy,
};
use celebi_watch::device::{DeviceGateway, DeviceLocator, ScriptedLink};
use celebi_watch::ingest::stub::StubSource;
use celebi_watch::notify::{AlertSound, NotificationDispatcher, SmsNotifier, Verdict};
use celebi_watch::{RegionSpec, WatchError};

struct FixedLocator(Option<PathBuf>);

impl DeviceLocator for FixedLocator {
    fn locate(&self) -> Option<PathBuf> {
        self.0.clone()
    }
}

fn gateway(link: &ScriptedLink, attached: bool) -> DeviceGateway {
    let located = attached.then(|| PathBuf::from("/dev/ttyACM0"));
    let link = link.clone();
    DeviceGateway::with_factory(
        Box::new(FixedLocator(located)),
        SerialSettings::default(),
        Box::new(move |_, _| Ok(Box::new(link.clone()))),
    )
}

fn controller(dir: &TempDir) -> DetectionController {
    DetectionController::new(
        CounterStore::new(dir.path().join("sr.counter")),
        PatternMatcher::from_gray(StubSource::glyph(), 0.75),
        RegionSpec::default(),
        RetryPolicy {
            max_attempts: 5,
            settle: Duration::ZERO,
        },
    )
}

fn dispatcher() -> NotificationDispatcher {
    // No credentials: SMS is a logged no-op in these tests.
    NotificationDispatcher::new(SmsNotifier::with_credentials("sms.invalid", None))
}

fn cycle(
    link: &ScriptedLink,
    dir: &TempDir,
    scene: &str,
    request_line: &str,
) -> (DetectionOutcome, Verdict, Vec<String>) {
    link.push_inbound(request_line);
    let mut gateway = gateway(link, true);
    let mut controller = controller(dir);
    let mut source = StubSource::new(scene, 640, 480).unwrap();

    let request = gateway.poll_request().unwrap().expect("request parsed");
    let resolution = controller.resolve(&request, &mut source);
    let verdict = dispatcher().dispatch(&resolution, &mut gateway);
    (resolution.outcome, verdict, link.sent())
}

#[test]
fn normal_find_reports_and_continues() {
    let dir = TempDir::new().unwrap();
    let link = ScriptedLink::new();
    let (outcome, verdict, sent) = cycle(&link, &dir, "normal", "DETECT\n");

    assert_eq!(outcome, DetectionOutcome::FoundNormal);
    assert_eq!(verdict, Verdict::Continue);
    assert_eq!(sent, vec!["NORMAL 1".to_string()]);
}

#[test]
fn shiny_find_halts_with_the_bell() {
    let dir = TempDir::new().unwrap();
    let link = ScriptedLink::new();
    let (outcome, verdict, sent) = cycle(&link, &dir, "shiny", "DETECT\n");

    assert_eq!(outcome, DetectionOutcome::FoundShiny);
    assert_eq!(verdict, Verdict::Halt(AlertSound::Bell));
    assert_eq!(sent, vec!["SHINY 1".to_string()]);
}

#[test]
fn invalid_tint_reports_other_and_continues() {
    let dir = TempDir::new().unwrap();
    let link = ScriptedLink::new();
    let (outcome, verdict, sent) = cycle(&link, &dir, "invalid", "DETECT\n");

    assert_eq!(outcome, DetectionOutcome::FoundInvalid);
    assert_eq!(verdict, Verdict::Continue);
    assert_eq!(sent, vec!["OTHER 1".to_string()]);
}

#[test]
fn empty_scene_reports_none_and_halts() {
    let dir = TempDir::new().unwrap();
    let link = ScriptedLink::new();
    let (outcome, verdict, sent) = cycle(&link, &dir, "empty", "DETECT\n");

    assert_eq!(outcome, DetectionOutcome::NotFound);
    assert_eq!(verdict, Verdict::Halt(AlertSound::Error));
    assert_eq!(sent, vec!["NONE 1".to_string()]);
}

#[test]
fn device_hint_reconciles_into_the_report() {
    let dir = TempDir::new().unwrap();
    let link = ScriptedLink::new();
    let (_, _, sent) = cycle(&link, &dir, "normal", "DETECT99\n");

    assert_eq!(sent, vec!["NORMAL 99".to_string()]);
    // And the reconciled value survives a restart.
    assert_eq!(CounterStore::new(dir.path().join("sr.counter")).read(), 99);
}

#[test]
fn counter_accumulates_across_requests() {
    let dir = TempDir::new().unwrap();
    let link = ScriptedLink::new();
    let mut gateway = gateway(&link, true);
    let mut controller = controller(&dir);
    let mut source = StubSource::new("normal", 640, 480).unwrap();
    let dispatcher = dispatcher();

    for expected in 1..=3u64 {
        link.push_inbound("DETECT\n");
        let request = gateway.poll_request().unwrap().expect("request parsed");
        let resolution = controller.resolve(&request, &mut source);
        assert_eq!(resolution.counter, expected);
        dispatcher.dispatch(&resolution, &mut gateway);
    }

    assert_eq!(
        link.sent(),
        vec![
            "NORMAL 1".to_string(),
            "NORMAL 2".to_string(),
            "NORMAL 3".to_string()
        ]
    );
}

#[test]
fn detached_device_fails_the_report_with_an_error_halt() {
    let dir = TempDir::new().unwrap();
    let link = ScriptedLink::new();
    let mut controller = controller(&dir);
    let mut source = StubSource::new("normal", 640, 480).unwrap();

    let resolution = controller.resolve(&Default::default(), &mut source);
    let mut detached = gateway(&link, false);
    let verdict = dispatcher().dispatch(&resolution, &mut detached);

    assert_eq!(verdict, Verdict::Halt(AlertSound::Error));
    assert!(link.sent().is_empty());
}

#[test]
fn poll_failure_verdict_is_an_error_halt() {
    let error = WatchError::DeviceUnavailable {
        dir: PathBuf::from("/dev"),
    };
    assert_eq!(
        dispatcher().dispatch_failure(&error),
        Verdict::Halt(AlertSound::Error)
    );
}
