//! Microcontroller boundary: request parsing, report framing, and the
//! serial gateway.
//!
//! Wire protocol is line oriented. Inbound: a line starting with `DETECT`,
//! optionally carrying a decimal counter hint anywhere in the line. Outbound:
//! `<TAG> <counter>\n` where TAG is one of NORMAL, SHINY, OTHER, NONE.
//!
//! The gateway re-enumerates and opens the endpoint on every call rather
//! than holding a connection, so the device can be unplugged and replugged
//! between cycles without restarting the daemon.

#[cfg(feature = "serial-hw")]
pub mod serial;

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::config::SerialSettings;
use crate::detect::DetectionOutcome;
use crate::error::WatchError;

/// Inbound request line prefix.
pub const REQUEST_TAG: &str = "DETECT";

/// One parsed detection request from the device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DetectionRequest {
    /// Device-side attempt count, when the line carried one.
    pub counter_hint: Option<u64>,
}

/// Parse an inbound line. Returns `None` for lines that are not requests.
///
/// The hint is the concatenation of every digit in the line, matching what
/// the device firmware emits (`DETECT1234`); a request with no digits is
/// still a valid request.
pub fn parse_request(line: &str) -> Option<DetectionRequest> {
    // The tag must open the line; only trailing line endings are stripped.
    let line = line.trim_end();
    if !line.starts_with(REQUEST_TAG) {
        return None;
    }
    let digits: String = line.chars().filter(|c| c.is_ascii_digit()).collect();
    Some(DetectionRequest {
        counter_hint: digits.parse::<u64>().ok(),
    })
}

/// Format the outbound report line (without trailing newline).
pub fn format_report(outcome: DetectionOutcome, counter: u64) -> String {
    let tag = match outcome {
        DetectionOutcome::FoundNormal => "NORMAL",
        DetectionOutcome::FoundShiny => "SHINY",
        DetectionOutcome::FoundInvalid => "OTHER",
        DetectionOutcome::NotFound => "NONE",
    };
    format!("{tag} {counter}")
}

// --- endpoint discovery ---

pub trait DeviceLocator {
    /// Current endpoint path, or `None` when no device is attached.
    fn locate(&self) -> Option<PathBuf>;
}

/// Scans a device directory for entries with a fixed name prefix and picks
/// the lexicographically first (ttyACM0 before ttyACM1).
pub struct TtyLocator {
    dev_dir: PathBuf,
    prefix: String,
}

impl TtyLocator {
    pub fn new(dev_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dev_dir: dev_dir.into(),
            prefix: prefix.into(),
        }
    }
}

impl DeviceLocator for TtyLocator {
    fn locate(&self) -> Option<PathBuf> {
        let entries = match fs::read_dir(&self.dev_dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("cannot scan {}: {}", self.dev_dir.display(), e);
                return None;
            }
        };
        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.starts_with(&self.prefix))
            })
            .map(|entry| entry.path())
            .collect();
        candidates.sort();
        candidates.into_iter().next()
    }
}

// --- link transport ---

pub trait DeviceLink {
    /// Read one line if available within the link's read timeout.
    fn poll_line(&mut self) -> Result<Option<String>, WatchError>;

    /// Write one line (newline appended).
    fn send(&mut self, line: &str) -> Result<(), WatchError>;
}

/// In-memory link for tests and the stub bench: scripted inbound lines,
/// recorded outbound lines. Clones share the same queues.
#[derive(Clone, Default)]
pub struct ScriptedLink {
    inbound: Arc<Mutex<VecDeque<String>>>,
    outbound: Arc<Mutex<Vec<String>>>,
}

impl ScriptedLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_inbound(&self, line: &str) {
        self.inbound.lock().unwrap().push_back(line.to_string());
    }

    pub fn sent(&self) -> Vec<String> {
        self.outbound.lock().unwrap().clone()
    }
}

impl DeviceLink for ScriptedLink {
    fn poll_line(&mut self) -> Result<Option<String>, WatchError> {
        Ok(self.inbound.lock().unwrap().pop_front())
    }

    fn send(&mut self, line: &str) -> Result<(), WatchError> {
        self.outbound.lock().unwrap().push(line.to_string());
        Ok(())
    }
}

// --- gateway ---

type LinkFactory = Box<dyn Fn(&Path, &SerialSettings) -> Result<Box<dyn DeviceLink>, WatchError>>;

/// Request/response surface over whatever endpoint is currently attached.
pub struct DeviceGateway {
    locator: Box<dyn DeviceLocator>,
    settings: SerialSettings,
    factory: LinkFactory,
}

impl DeviceGateway {
    pub fn new(locator: Box<dyn DeviceLocator>, settings: SerialSettings) -> Self {
        Self::with_factory(locator, settings, Box::new(default_link_factory))
    }

    /// Gateway with a custom link constructor, used by tests and the bench.
    pub fn with_factory(
        locator: Box<dyn DeviceLocator>,
        settings: SerialSettings,
        factory: LinkFactory,
    ) -> Self {
        Self {
            locator,
            settings,
            factory,
        }
    }

    /// Poll for one request. An absent device is not an error here: the
    /// daemon idles until one shows up.
    pub fn poll_request(&mut self) -> Result<Option<DetectionRequest>, WatchError> {
        let Some(endpoint) = self.locator.locate() else {
            return Ok(None);
        };
        let mut link = (self.factory)(&endpoint, &self.settings)?;
        let Some(line) = link.poll_line()? else {
            return Ok(None);
        };
        match parse_request(&line) {
            Some(request) => {
                log::info!("request from {}: {:?}", endpoint.display(), line.trim());
                Ok(Some(request))
            }
            None => {
                log::warn!("ignoring non-request line {:?}", line.trim());
                Ok(None)
            }
        }
    }

    /// Send the resolution report. An absent device here is fatal: the
    /// requester is waiting on this line.
    pub fn send_report(&mut self, outcome: DetectionOutcome, counter: u64) -> Result<(), WatchError> {
        let Some(endpoint) = self.locator.locate() else {
            return Err(WatchError::DeviceUnavailable {
                dir: self.settings.dev_dir.clone(),
            });
        };
        let report = format_report(outcome, counter);
        let mut link = (self.factory)(&endpoint, &self.settings)?;
        link.send(&report)?;
        log::info!("reported {:?} to {}", report, endpoint.display());
        Ok(())
    }
}

/// Gateway for the configured serial endpoint: `stub://<lines>` yields a
/// scripted link preloaded with the given comma-separated request lines
/// (mirroring the camera's `stub://` scenes); anything else scans `dev_dir`
/// for hardware.
pub fn open_gateway(settings: &SerialSettings) -> DeviceGateway {
    if let Some(script) = settings.endpoint.strip_prefix("stub://") {
        let link = ScriptedLink::new();
        for line in script.split(',').filter(|line| !line.is_empty()) {
            link.push_inbound(line);
        }
        return DeviceGateway::with_factory(
            Box::new(StubLocator),
            settings.clone(),
            Box::new(move |_, _| Ok(Box::new(link.clone()))),
        );
    }
    let locator = TtyLocator::new(&settings.dev_dir, &settings.prefix);
    DeviceGateway::new(Box::new(locator), settings.clone())
}

/// Locator for the scripted link; there is no filesystem endpoint to find.
struct StubLocator;

impl DeviceLocator for StubLocator {
    fn locate(&self) -> Option<PathBuf> {
        Some(PathBuf::from("stub"))
    }
}

#[cfg(feature = "serial-hw")]
fn default_link_factory(
    endpoint: &Path,
    settings: &SerialSettings,
) -> Result<Box<dyn DeviceLink>, WatchError> {
    Ok(Box::new(serial::SerialLink::open(endpoint, settings)?))
}

#[cfg(not(feature = "serial-hw"))]
fn default_link_factory(
    endpoint: &Path,
    _settings: &SerialSettings,
) -> Result<Box<dyn DeviceLink>, WatchError> {
    Err(WatchError::SerialIo {
        endpoint: endpoint.display().to_string(),
        source: std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "built without the serial-hw feature",
        ),
    })
}
