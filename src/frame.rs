//! Frames and the fixed detection region.
//!
//! A `Frame` is an owned BGR8 buffer as produced by the camera boundary.
//! The region sampler extracts the configured sub-rectangle around the frame
//! center and computes its per-channel mean; both are recreated every cycle
//! and carry no state across cycles.

use anyhow::{anyhow, Result};
use image::GrayImage;
use serde::Deserialize;

use crate::error::WatchError;

/// One captured frame, BGR channel order, 8 bits per channel.
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    pub fn from_bgr8(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(anyhow!(
                "frame buffer is {} bytes, expected {} for {}x{} BGR8",
                data.len(),
                expected,
                width,
                height
            ));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Extract the detection region centered in this frame.
    ///
    /// The rectangle sits at the integer frame center with the configured
    /// half-extents on each side; fails with `FrameTooSmall` when the frame
    /// cannot contain it.
    pub fn region(&self, spec: &RegionSpec) -> Result<Region, WatchError> {
        let cx = self.width / 2;
        let cy = self.height / 2;
        if cx < spec.left
            || cy < spec.up
            || cx + spec.right > self.width
            || cy + spec.down > self.height
        {
            return Err(WatchError::FrameTooSmall {
                frame_w: self.width,
                frame_h: self.height,
                region_w: spec.width(),
                region_h: spec.height(),
            });
        }

        let x0 = (cx - spec.left) as usize;
        let y0 = (cy - spec.up) as usize;
        let rw = spec.width() as usize;
        let rh = spec.height() as usize;
        let stride = self.width as usize * 3;

        let mut data = Vec::with_capacity(rw * rh * 3);
        for row in 0..rh {
            let start = (y0 + row) * stride + x0 * 3;
            data.extend_from_slice(&self.data[start..start + rw * 3]);
        }

        Ok(Region {
            data,
            width: spec.width(),
            height: spec.height(),
        })
    }
}

/// Half-extents of the detection rectangle around the frame center.
///
/// The extents may be asymmetric; the defaults reproduce the tuned
/// 100x85 window of the reference deployment.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct RegionSpec {
    pub left: u32,
    pub right: u32,
    pub up: u32,
    pub down: u32,
}

impl Default for RegionSpec {
    fn default() -> Self {
        Self {
            left: 50,
            right: 50,
            up: 40,
            down: 45,
        }
    }
}

impl RegionSpec {
    pub fn width(&self) -> u32 {
        self.left + self.right
    }

    pub fn height(&self) -> u32 {
        self.up + self.down
    }
}

/// The extracted detection region (owned BGR8 copy).
#[derive(Debug)]
pub struct Region {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Region {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Per-channel mean over the whole region.
    pub fn mean_color(&self) -> MeanColor {
        let mut sums = [0.0f64; 3];
        for px in self.data.chunks_exact(3) {
            sums[0] += px[0] as f64;
            sums[1] += px[1] as f64;
            sums[2] += px[2] as f64;
        }
        let n = (self.width as f64) * (self.height as f64);
        MeanColor {
            b: (sums[0] / n) as f32,
            g: (sums[1] / n) as f32,
            r: (sums[2] / n) as f32,
        }
    }

    /// Rec.601 luma conversion for the pattern matcher.
    pub fn to_gray(&self) -> GrayImage {
        let mut gray = GrayImage::new(self.width, self.height);
        for (i, px) in self.data.chunks_exact(3).enumerate() {
            let (b, g, r) = (px[0] as f32, px[1] as f32, px[2] as f32);
            let luma = (0.114 * b + 0.587 * g + 0.299 * r).round().min(255.0) as u8;
            let x = (i as u32) % self.width;
            let y = (i as u32) / self.width;
            gray.put_pixel(x, y, image::Luma([luma]));
        }
        gray
    }
}

/// Mean channel intensities of a sampled region (0-255 per channel).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeanColor {
    pub b: f32,
    pub g: f32,
    pub r: f32,
}

impl MeanColor {
    /// Human-inspectable color link, used in log lines and alert messages.
    pub fn inspect_url(&self) -> String {
        format!(
            "https://convertingcolors.com/rgb-color-{}_{}_{}.html",
            self.r.round() as u32,
            self.g.round() as u32,
            self.b.round() as u32
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(width: u32, height: u32, bgr: [u8; 3]) -> Frame {
        let data: Vec<u8> = std::iter::repeat(bgr)
            .take((width * height) as usize)
            .flatten()
            .collect();
        Frame::from_bgr8(data, width, height).unwrap()
    }

    #[test]
    fn region_mean_of_solid_frame() {
        let frame = solid_frame(640, 480, [50, 200, 40]);
        let region = frame.region(&RegionSpec::default()).unwrap();
        assert_eq!(region.width(), 100);
        assert_eq!(region.height(), 85);

        let mean = region.mean_color();
        assert_eq!(mean.b, 50.0);
        assert_eq!(mean.g, 200.0);
        assert_eq!(mean.r, 40.0);
    }

    #[test]
    fn region_fails_on_small_frame() {
        let frame = solid_frame(80, 80, [0, 0, 0]);
        let err = frame.region(&RegionSpec::default()).unwrap_err();
        assert!(matches!(err, WatchError::FrameTooSmall { .. }));
    }

    #[test]
    fn asymmetric_region_is_positioned_from_center() {
        // 10x10 frame, center (5,5); extents 2/1/1/2 give a 3x3 region
        // spanning x 3..6, y 4..7.
        let mut data = vec![0u8; 10 * 10 * 3];
        // Mark pixel (3,4), the region's top-left corner.
        let idx = (4 * 10 + 3) * 3;
        data[idx] = 7;
        let frame = Frame::from_bgr8(data, 10, 10).unwrap();

        let spec = RegionSpec {
            left: 2,
            right: 1,
            up: 1,
            down: 2,
        };
        let region = frame.region(&spec).unwrap();
        assert_eq!(region.width(), 3);
        assert_eq!(region.height(), 3);
        assert_eq!(region.data[0], 7);
    }

    #[test]
    fn gray_conversion_uses_luma_weights() {
        let frame = solid_frame(64, 64, [0, 255, 0]);
        let spec = RegionSpec {
            left: 2,
            right: 2,
            up: 2,
            down: 2,
        };
        let gray = frame.region(&spec).unwrap().to_gray();
        // Pure green: 0.587 * 255 ~= 150.
        assert_eq!(gray.get_pixel(0, 0).0[0], 150);
    }

    #[test]
    fn buffer_size_is_validated() {
        assert!(Frame::from_bgr8(vec![0u8; 10], 10, 10).is_err());
    }

    #[test]
    fn inspect_url_is_rgb_ordered() {
        let mean = MeanColor {
            b: 50.0,
            g: 200.0,
            r: 40.0,
        };
        assert_eq!(
            mean.inspect_url(),
            "https://convertingcolors.com/rgb-color-40_200_50.html"
        );
    }
}
