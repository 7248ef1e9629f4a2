//! Physical camera capture via nokhwa, compiled behind `camera-nokhwa`.

use anyhow::{Context, Result};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;

use crate::frame::Frame;

use super::FrameSource;

pub struct NokhwaSource {
    index: u32,
    camera: Option<Camera>,
}

impl NokhwaSource {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            camera: None,
        }
    }
}

impl FrameSource for NokhwaSource {
    fn connect(&mut self) -> Result<()> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);
        let mut camera = Camera::new(CameraIndex::Index(self.index), requested)
            .with_context(|| format!("open camera {}", self.index))?;
        camera
            .open_stream()
            .with_context(|| format!("start camera {} stream", self.index))?;
        log::info!("camera {} streaming {}", self.index, camera.camera_format());
        self.camera = Some(camera);
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame> {
        let camera = self
            .camera
            .as_mut()
            .context("camera not connected")?;
        let raw = camera.frame().context("capture frame")?;
        let rgb = raw
            .decode_image::<RgbFormat>()
            .context("decode camera frame")?;
        let (width, height) = rgb.dimensions();

        // nokhwa decodes RGB; the pipeline works in BGR.
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for px in rgb.pixels() {
            data.push(px.0[2]);
            data.push(px.0[1]);
            data.push(px.0[0]);
        }
        Frame::from_bgr8(data, width, height)
    }
}
