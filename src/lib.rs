//! celebi-watch: serial-triggered visual detection controller.
//!
//! A microcontroller asks over serial whether the target is on screen; the
//! daemon samples a fixed region of the camera frame, classifies its tint,
//! matches it against a reference pattern with a bounded retry budget,
//! reports the result back over serial with a durable attempt counter, and
//! fans out SMS and audio alerts for the states that need a human.
//!
//! Module map:
//! - [`ingest`] turns a camera endpoint into frames.
//! - [`frame`] extracts the fixed detection region and its mean color.
//! - [`detect`] classifies tint, scores the pattern, and runs the retry
//!   loop to a [`detect::Resolution`].
//! - [`counter`] persists the attempt count across restarts.
//! - [`device`] speaks the line protocol with the microcontroller.
//! - [`notify`] orders the fan-out (device report, SMS, terminal audio).

pub mod config;
pub mod counter;
pub mod detect;
pub mod device;
pub mod error;
pub mod frame;
pub mod ingest;
pub mod notify;

pub use config::WatchConfig;
pub use counter::CounterStore;
pub use detect::{DetectionController, DetectionOutcome, PatternMatcher, Resolution, RetryPolicy, TintCategory};
pub use device::{DetectionRequest, DeviceGateway};
pub use error::WatchError;
pub use frame::{Frame, MeanColor, RegionSpec};
pub use notify::{AlertSound, NotificationDispatcher, SmsNotifier, Verdict};
