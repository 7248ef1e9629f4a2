//! Error taxonomy for the detection pipeline.
//!
//! Component seams return `WatchError`; daemon plumbing wraps these with
//! `anyhow` context. Counter corruption is deliberately absent here: the
//! counter store recovers it locally (treated as "no progress") and it is
//! never propagated.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    /// The captured frame cannot contain the configured detection region.
    #[error("frame {frame_w}x{frame_h} is smaller than the {region_w}x{region_h} detection region")]
    FrameTooSmall {
        frame_w: u32,
        frame_h: u32,
        region_w: u32,
        region_h: u32,
    },

    /// The reference pattern does not fit inside the sampled region.
    #[error(
        "reference pattern {pattern_w}x{pattern_h} is larger than the sampled region {region_w}x{region_h}"
    )]
    PatternSizeMismatch {
        pattern_w: u32,
        pattern_h: u32,
        region_w: u32,
        region_h: u32,
    },

    /// Device enumeration found no matching serial endpoint.
    #[error("no device endpoint found under {}", dir.display())]
    DeviceUnavailable { dir: PathBuf },

    /// Serial read/write failure on an opened endpoint.
    #[error("serial i/o on {endpoint}: {source}")]
    SerialIo {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    /// Remote notification transport failure. Logged and swallowed by the
    /// dispatcher; must never block the device response.
    #[error("notification transport: {0}")]
    NotificationTransport(String),
}

impl WatchError {
    /// Conditions that halt normal operation pending human intervention.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            WatchError::DeviceUnavailable { .. } | WatchError::SerialIo { .. }
        )
    }
}
