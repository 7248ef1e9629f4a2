//! Synthetic frame source for benches and tests.
//!
//! Scenes model the states the detector distinguishes: a target with the
//! expected tint, a target with the alternate tint, a target with a washed
//! out tint, and no target at all. The stamped glyph is exposed so callers
//! can build a matching reference pattern.

use anyhow::{bail, Result};
use image::GrayImage;

use crate::frame::Frame;

use super::FrameSource;

const GLYPH_SIZE: u32 = 16;

const GREENISH: [u8; 3] = [50, 200, 40];
const PINKISH: [u8; 3] = [120, 60, 210];
const WASHED: [u8; 3] = [128, 130, 128];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scene {
    Normal,
    Shiny,
    Invalid,
    Empty,
}

pub struct StubSource {
    scene: Scene,
    width: u32,
    height: u32,
}

impl StubSource {
    pub fn new(scene: &str, width: u32, height: u32) -> Result<Self> {
        let scene = match scene {
            "normal" | "bench" => Scene::Normal,
            "shiny" => Scene::Shiny,
            "invalid" => Scene::Invalid,
            "empty" => Scene::Empty,
            other => bail!(
                "unknown stub scene {:?} (expected normal, shiny, invalid or empty)",
                other
            ),
        };
        Ok(Self {
            scene,
            width,
            height,
        })
    }

    /// The glyph stamped at the frame center of non-empty scenes. Load this
    /// as the reference pattern to exercise the match path end to end.
    pub fn glyph() -> GrayImage {
        GrayImage::from_fn(GLYPH_SIZE, GLYPH_SIZE, |x, y| {
            if (x + y) % 2 == 0 {
                image::Luma([255])
            } else {
                image::Luma([0])
            }
        })
    }

    fn render(&self) -> Result<Frame> {
        let background = match self.scene {
            Scene::Normal | Scene::Empty => GREENISH,
            Scene::Shiny => PINKISH,
            Scene::Invalid => WASHED,
        };
        let mut data: Vec<u8> = background
            .iter()
            .copied()
            .cycle()
            .take((self.width * self.height * 3) as usize)
            .collect();

        if self.scene != Scene::Empty {
            let glyph = Self::glyph();
            let x0 = self.width / 2 - GLYPH_SIZE / 2;
            let y0 = self.height / 2 - GLYPH_SIZE / 2;
            for y in 0..GLYPH_SIZE {
                for x in 0..GLYPH_SIZE {
                    let v = glyph.get_pixel(x, y).0[0];
                    let idx = (((y0 + y) * self.width + x0 + x) * 3) as usize;
                    data[idx] = v;
                    data[idx + 1] = v;
                    data[idx + 2] = v;
                }
            }
        }

        Frame::from_bgr8(data, self.width, self.height)
    }
}

impl FrameSource for StubSource {
    fn next_frame(&mut self) -> Result<Frame> {
        self.render()
    }
}
