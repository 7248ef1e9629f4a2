//! Audio alert sinks.
//!
//! A sink plays one file through once, blocking until it finishes. The
//! terminal-alert loop in the daemon repeats the call until the operator
//! signals quit. The default build carries a logging sink; real playback is
//! behind `audio-rodio`.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;

pub trait AlertSink {
    /// Play the file once, to completion.
    fn play(&mut self, path: &Path) -> Result<()>;
}

/// Fallback sink: logs the alert and pauses for roughly one playback's
/// worth of time so the terminal loop does not spin.
pub struct LogSink;

impl AlertSink for LogSink {
    fn play(&mut self, path: &Path) -> Result<()> {
        log::warn!("ALERT (no audio backend): {}", path.display());
        std::thread::sleep(Duration::from_secs(1));
        Ok(())
    }
}

#[cfg(feature = "audio-rodio")]
pub struct RodioSink;

#[cfg(feature = "audio-rodio")]
impl AlertSink for RodioSink {
    fn play(&mut self, path: &Path) -> Result<()> {
        use anyhow::Context;
        use std::fs::File;
        use std::io::BufReader;

        let (_stream, handle) =
            rodio::OutputStream::try_default().context("open audio output")?;
        let sink = rodio::Sink::try_new(&handle).context("create audio sink")?;
        let file = File::open(path)
            .with_context(|| format!("open alert sound {}", path.display()))?;
        let source = rodio::Decoder::new(BufReader::new(file))
            .with_context(|| format!("decode alert sound {}", path.display()))?;
        sink.append(source);
        sink.sleep_until_end();
        Ok(())
    }
}

#[cfg(feature = "audio-rodio")]
pub fn default_sink() -> Box<dyn AlertSink> {
    Box::new(RodioSink)
}

#[cfg(not(feature = "audio-rodio"))]
pub fn default_sink() -> Box<dyn AlertSink> {
    Box::new(LogSink)
}
