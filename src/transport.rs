use crate::error::Result;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// One-way actuator channel: a fixed-width little-endian f32 step per
/// write, no acknowledgement, no handshake.
pub trait ActuatorLink {
    fn send_step(&mut self, step: f32) -> Result<()>;
}

/// Writes steps straight to a serial device node. The port is opened
/// once at construction; a failed write is reported as
/// `TransportFailure` and the caller decides whether to care.
#[derive(Debug)]
pub struct SerialLink {
    port: File,
}

impl SerialLink {
    pub fn open(path: &str) -> Result<SerialLink> {
        let port = OpenOptions::new().write(true).open(Path::new(path))?;
        info!("actuator link open on {path}");
        Ok(SerialLink { port })
    }
}

impl ActuatorLink for SerialLink {
    fn send_step(&mut self, step: f32) -> Result<()> {
        self.port.write_all(&step.to_le_bytes())?;
        self.port.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GazeError;

    #[test]
    fn open_on_missing_device_is_a_transport_failure() {
        let err = SerialLink::open("/definitely/not/a/device").unwrap_err();
        assert!(matches!(err, GazeError::TransportFailure(_)));
    }

    #[test]
    fn step_encoding_is_four_le_bytes() {
        assert_eq!(5.0f32.to_le_bytes(), [0, 0, 160, 64]);
        assert_eq!((-5.0f32).to_le_bytes(), [0, 0, 160, 192]);
    }
}
