//! Normalized cross-correlation pattern matching.
//!
//! The matcher slides the grayscale reference over the sampled region and
//! keeps the maximum correlation coefficient across all alignment offsets
//! (TM_CCOEFF_NORMED semantics: both windows are mean-subtracted and
//! variance-normalized). The acceptance threshold is inclusive and comes
//! from configuration, not a hardcoded literal.

use std::path::Path;

use anyhow::{Context, Result};
use image::GrayImage;

use crate::error::WatchError;

pub struct PatternMatcher {
    reference: GrayImage,
    threshold: f64,
}

impl PatternMatcher {
    /// Load the grayscale reference pattern from an image file.
    pub fn from_file(path: &Path, threshold: f64) -> Result<Self> {
        let reference = image::open(path)
            .with_context(|| format!("load reference pattern {}", path.display()))?
            .to_luma8();
        Ok(Self::from_gray(reference, threshold))
    }

    pub fn from_gray(reference: GrayImage, threshold: f64) -> Self {
        Self {
            reference,
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn reference_size(&self) -> (u32, u32) {
        self.reference.dimensions()
    }

    /// True when the best correlation score meets the threshold.
    /// Returns the score alongside so callers can log it.
    pub fn matches(&self, region: &GrayImage) -> Result<(bool, f64), WatchError> {
        let score = self.best_score(region)?;
        Ok((score >= self.threshold, score))
    }

    /// Maximum normalized correlation over all alignment offsets.
    ///
    /// The reference is mean-centered once up front; correlating the
    /// centered template against each window cancels the window mean out of
    /// the cross term, so only the window variance is accumulated per
    /// offset. Degenerate windows (zero variance in either the reference or
    /// the candidate window) score 0.0 rather than dividing by zero.
    pub fn best_score(&self, region: &GrayImage) -> Result<f64, WatchError> {
        let (rw, rh) = region.dimensions();
        let (tw, th) = self.reference.dimensions();
        if tw > rw || th > rh {
            return Err(WatchError::PatternSizeMismatch {
                pattern_w: tw,
                pattern_h: th,
                region_w: rw,
                region_h: rh,
            });
        }

        let template: Vec<f64> = self.reference.pixels().map(|p| p.0[0] as f64).collect();
        let t_mean = template.iter().sum::<f64>() / template.len() as f64;
        let centered: Vec<f64> = template.iter().map(|v| v - t_mean).collect();
        let t_norm = centered.iter().map(|v| v * v).sum::<f64>().sqrt();

        let n = (tw as f64) * (th as f64);
        let mut best = f64::NEG_INFINITY;

        for y0 in 0..=(rh - th) {
            for x0 in 0..=(rw - tw) {
                let mut w_sum = 0.0;
                let mut w_sumsq = 0.0;
                let mut cross = 0.0;
                for j in 0..th {
                    for i in 0..tw {
                        let w = region.get_pixel(x0 + i, y0 + j).0[0] as f64;
                        cross += centered[(j * tw + i) as usize] * w;
                        w_sum += w;
                        w_sumsq += w * w;
                    }
                }
                let w_var = (w_sumsq - w_sum * w_sum / n).max(0.0);
                let denom = t_norm * w_var.sqrt();
                let score = if denom <= f64::EPSILON {
                    0.0
                } else {
                    cross / denom
                };
                if score > best {
                    best = score;
                }
            }
        }

        Ok(best)
    }
}
