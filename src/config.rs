//! Daemon configuration.
//!
//! Layered like the rest of the deployment tooling expects: compiled-in
//! defaults, then an optional JSON file named by `CELEBI_CONFIG`, then
//! individual `CELEBI_*` environment overrides, then `validate()`. Any layer
//! may be absent; the defaults alone produce a working stub bench.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::frame::RegionSpec;

pub const DEFAULT_CAMERA_ENDPOINT: &str = "stub://bench";
pub const DEFAULT_FRAME_WIDTH: u32 = 640;
pub const DEFAULT_FRAME_HEIGHT: u32 = 480;
pub const DEFAULT_PATTERN_PATH: &str = "celebi.png";
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.75;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_SETTLE_MS: u64 = 200;
pub const DEFAULT_COUNTER_PATH: &str = "sr.counter";
pub const DEFAULT_SERIAL_DIR: &str = "/dev";
pub const DEFAULT_SERIAL_PREFIX: &str = "ttyACM";
pub const DEFAULT_SERIAL_BAUD: u32 = 9600;
pub const DEFAULT_SMS_HOST: &str = "smsapi.free-mobile.fr";

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// `stub://<scene>` or a physical-camera endpoint.
    pub endpoint: String,
    /// Device index for physical capture backends.
    pub index: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CAMERA_ENDPOINT.to_string(),
            index: 0,
            width: DEFAULT_FRAME_WIDTH,
            height: DEFAULT_FRAME_HEIGHT,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    pub pattern_path: PathBuf,
    /// Minimum correlation score accepted as a match (inclusive).
    pub match_threshold: f64,
    /// Capture attempts per request before giving up.
    pub max_attempts: u32,
    /// Pause before each capture so the scene can settle.
    pub settle_ms: u64,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            pattern_path: PathBuf::from(DEFAULT_PATTERN_PATH),
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            settle_ms: DEFAULT_SETTLE_MS,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    /// Empty selects hardware discovery under `dev_dir`; `stub://<lines>`
    /// selects a scripted link preloaded with the given request lines.
    pub endpoint: String,
    pub dev_dir: PathBuf,
    pub prefix: String,
    pub baud: u32,
    pub read_timeout_ms: u64,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            dev_dir: PathBuf::from(DEFAULT_SERIAL_DIR),
            prefix: DEFAULT_SERIAL_PREFIX.to_string(),
            baud: DEFAULT_SERIAL_BAUD,
            read_timeout_ms: 400,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub bell: PathBuf,
    pub error: PathBuf,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            bell: PathBuf::from("bell.wav"),
            error: PathBuf::from("error.wav"),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub camera: CameraSettings,
    pub region: RegionSpec,
    pub detection: DetectionSettings,
    pub counter_path: PathBuf,
    pub serial: SerialSettings,
    pub sms_host: String,
    pub audio: AudioSettings,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            camera: CameraSettings::default(),
            region: RegionSpec::default(),
            detection: DetectionSettings::default(),
            counter_path: PathBuf::from(DEFAULT_COUNTER_PATH),
            serial: SerialSettings::default(),
            sms_host: DEFAULT_SMS_HOST.to_string(),
            audio: AudioSettings::default(),
        }
    }
}

impl WatchConfig {
    /// Defaults, then `CELEBI_CONFIG` JSON if set, then env overrides.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("CELEBI_CONFIG") {
            Ok(path) if !path.is_empty() => Self::from_file(&PathBuf::from(path))?,
            _ => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parse config file {}", path.display()))
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("CELEBI_CAMERA_ENDPOINT") {
            self.camera.endpoint = v;
        }
        if let Ok(v) = std::env::var("CELEBI_CAMERA_INDEX") {
            if let Ok(index) = v.parse() {
                self.camera.index = index;
            }
        }
        if let Ok(v) = std::env::var("CELEBI_PATTERN") {
            self.detection.pattern_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("CELEBI_MATCH_THRESHOLD") {
            if let Ok(threshold) = v.parse() {
                self.detection.match_threshold = threshold;
            }
        }
        if let Ok(v) = std::env::var("CELEBI_MAX_ATTEMPTS") {
            if let Ok(attempts) = v.parse() {
                self.detection.max_attempts = attempts;
            }
        }
        if let Ok(v) = std::env::var("CELEBI_COUNTER_PATH") {
            self.counter_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("CELEBI_SERIAL_ENDPOINT") {
            self.serial.endpoint = v;
        }
        if let Ok(v) = std::env::var("CELEBI_SERIAL_DIR") {
            self.serial.dev_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("CELEBI_SMS_HOST") {
            self.sms_host = v;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.detection.match_threshold > 0.0 && self.detection.match_threshold <= 1.0) {
            bail!(
                "match_threshold {} out of range (0, 1]",
                self.detection.match_threshold
            );
        }
        if self.detection.max_attempts == 0 {
            bail!("max_attempts must be at least 1");
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            bail!("camera dimensions must be nonzero");
        }
        if self.region.width() == 0 || self.region.height() == 0 {
            bail!("detection region must have nonzero area");
        }
        if self.serial.prefix.is_empty() {
            bail!("serial prefix must not be empty");
        }
        if self.sms_host.is_empty() {
            bail!("sms_host must not be empty");
        }
        Ok(())
    }
}
