//! Hardware serial link over `serialport`, compiled behind `serial-hw`.

use std::io::{self, Read, Write};
use std::path::Path;
use std::time::Duration;

use serialport::SerialPort;

use crate::config::SerialSettings;
use crate::error::WatchError;

use super::DeviceLink;

pub struct SerialLink {
    port: Box<dyn SerialPort>,
    endpoint: String,
    pending: Vec<u8>,
}

impl SerialLink {
    pub fn open(endpoint: &Path, settings: &SerialSettings) -> Result<Self, WatchError> {
        let name = endpoint.display().to_string();
        let port = serialport::new(&name, settings.baud)
            .timeout(Duration::from_millis(settings.read_timeout_ms))
            .open()
            .map_err(|e| WatchError::SerialIo {
                endpoint: name.clone(),
                source: io::Error::new(io::ErrorKind::Other, e),
            })?;
        Ok(Self {
            port,
            endpoint: name,
            pending: Vec::new(),
        })
    }

    fn io_err(&self, source: io::Error) -> WatchError {
        WatchError::SerialIo {
            endpoint: self.endpoint.clone(),
            source,
        }
    }
}

fn write_line(port: &mut dyn SerialPort, line: &str) -> io::Result<()> {
    port.write_all(line.as_bytes())?;
    port.write_all(b"\n")?;
    port.flush()
}

impl DeviceLink for SerialLink {
    fn poll_line(&mut self) -> Result<Option<String>, WatchError> {
        let mut buf = [0u8; 64];
        loop {
            if let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = self.pending.drain(..=pos).collect();
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }
            match self.port.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(n) => self.pending.extend_from_slice(&buf[..n]),
                // Read timeout means no request this cycle.
                Err(e) if e.kind() == io::ErrorKind::TimedOut => return Ok(None),
                Err(e) => return Err(self.io_err(e)),
            }
        }
    }

    fn send(&mut self, line: &str) -> Result<(), WatchError> {
        let result = write_line(&mut *self.port, line);
        result.map_err(|e| self.io_err(e))
    }
}
