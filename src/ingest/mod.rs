//! Frame acquisition.
//!
//! Sources are selected by the endpoint scheme in the camera config:
//! `stub://<scene>` yields synthetic frames and is always compiled in;
//! anything else is a physical camera behind the `camera-nokhwa` feature.

pub mod stub;

#[cfg(feature = "camera-nokhwa")]
pub mod camera;

use anyhow::Result;

use crate::config::CameraSettings;
use crate::frame::Frame;

pub trait FrameSource {
    /// One-time setup (open the device, start streaming). Default no-op.
    fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    /// Capture the next frame. Blocking, one frame per call.
    fn next_frame(&mut self) -> Result<Frame>;
}

/// Construct the source named by the camera endpoint.
pub fn open_source(settings: &CameraSettings) -> Result<Box<dyn FrameSource>> {
    if let Some(scene) = settings.endpoint.strip_prefix("stub://") {
        return Ok(Box::new(stub::StubSource::new(
            scene,
            settings.width,
            settings.height,
        )?));
    }

    #[cfg(feature = "camera-nokhwa")]
    return Ok(Box::new(camera::NokhwaSource::new(settings.index)));

    #[cfg(not(feature = "camera-nokhwa"))]
    anyhow::bail!(
        "endpoint {:?} needs a camera backend (build with the camera-nokhwa feature)",
        settings.endpoint
    )
}
