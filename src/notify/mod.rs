//! Notification fan-out.
//!
//! Ordering is fixed: the device report goes out first, then remote alerts,
//! then the dispatcher decides whether the daemon keeps cycling or parks in
//! a terminal audio alert. A remote transport failure is logged and never
//! affects the device response or the verdict; a device response failure is
//! itself an alertable event.

pub mod audio;
pub mod sms;

use crate::detect::{DetectionOutcome, Resolution};
use crate::device::DeviceGateway;
use crate::error::WatchError;

pub use audio::{default_sink, AlertSink, LogSink};
pub use sms::SmsNotifier;

/// Which alert sound a terminal state plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertSound {
    Bell,
    Error,
}

/// What the daemon does after a resolution is delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Keep polling for the next request.
    Continue,
    /// Park in the blocking audio alert until the operator intervenes.
    Halt(AlertSound),
}

/// Remote alert text for a resolution, or `None` when the outcome is
/// routine and alerts nobody.
pub fn remote_alert_message(resolution: &Resolution) -> Option<String> {
    match resolution.outcome {
        DetectionOutcome::FoundShiny => Some("Shiny Celebi Found !!!".to_string()),
        DetectionOutcome::FoundInvalid => Some(format!(
            "Celebi Found, but the color is invalid: {}",
            resolution.mean.inspect_url()
        )),
        DetectionOutcome::NotFound => Some(format!(
            "No Celebi detected (current color: {})",
            resolution.mean.inspect_url()
        )),
        DetectionOutcome::FoundNormal => None,
    }
}

/// Remote alert text for a pipeline failure. The missing-device case keeps
/// the wording the operator's phone filters already key on.
pub fn failure_message(error: &WatchError) -> String {
    match error {
        WatchError::DeviceUnavailable { .. } => "Error: No Arduino Found".to_string(),
        other => format!("Error: {other}"),
    }
}

/// Post-delivery verdict for an outcome. Shiny and not-found both stop the
/// hunt, with different sounds; normal and invalid finds keep cycling.
pub fn verdict_for(outcome: DetectionOutcome) -> Verdict {
    match outcome {
        DetectionOutcome::FoundShiny => Verdict::Halt(AlertSound::Bell),
        DetectionOutcome::NotFound => Verdict::Halt(AlertSound::Error),
        DetectionOutcome::FoundNormal | DetectionOutcome::FoundInvalid => Verdict::Continue,
    }
}

pub struct NotificationDispatcher {
    sms: SmsNotifier,
}

impl NotificationDispatcher {
    pub fn new(sms: SmsNotifier) -> Self {
        Self { sms }
    }

    /// Deliver a resolution: device report first, remote alert second.
    pub fn dispatch(&self, resolution: &Resolution, gateway: &mut DeviceGateway) -> Verdict {
        if let Err(e) = gateway.send_report(resolution.outcome, resolution.counter) {
            log::error!("cannot deliver report: {e}");
            self.sms.send(&failure_message(&e));
            return Verdict::Halt(AlertSound::Error);
        }
        if let Some(message) = remote_alert_message(resolution) {
            self.sms.send(&message);
        }
        verdict_for(resolution.outcome)
    }

    /// Deliver an alert for a failure that happened before any resolution
    /// existed (request polling, device enumeration).
    pub fn dispatch_failure(&self, error: &WatchError) -> Verdict {
        let message = failure_message(error);
        log::error!("{message}");
        self.sms.send(&message);
        Verdict::Halt(AlertSound::Error)
    }
}
