//! Durable attempt counter.
//!
//! A pure read/write surface over a single decimal-text file; reconciliation
//! and increment policy live in the detection controller, which is the
//! file's only writer. Corruption is recovered as "no progress" (counter 0),
//! never surfaced as an error.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub struct CounterStore {
    path: PathBuf,
}

impl CounterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored count. Missing file or unparsable content yields 0.
    pub fn read(&self) -> u64 {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("counter file {} not found, starting at 0", self.path.display());
                return 0;
            }
            Err(e) => {
                log::warn!(
                    "cannot read counter file {}: {} (treating as 0)",
                    self.path.display(),
                    e
                );
                return 0;
            }
        };
        match raw.trim().parse::<u64>() {
            Ok(value) => value,
            Err(_) => {
                log::warn!(
                    "counter file {} is corrupt ({:?}), treating as 0",
                    self.path.display(),
                    raw.trim()
                );
                0
            }
        }
    }

    /// Overwrite the stored count.
    ///
    /// Writes a sibling temp file and renames it into place so a partial
    /// write can never corrupt the next `read()`.
    pub fn write(&self, value: u64) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, value.to_string())
            .with_context(|| format!("write counter temp file {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replace counter file {}", self.path.display()))?;
        Ok(())
    }
}
