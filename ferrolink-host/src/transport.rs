//! Byte-stream transport abstraction and the serial port implementation.
//!
//! The link layer only needs two things from a transport: write a buffer,
//! and poll for at most one byte with a distinct "nothing yet" outcome.
//! Keeping that behind a trait lets the tests drive the link with scripted
//! byte streams.

use std::io;
use std::time::Duration;

use crate::error::LinkError;

/// How long a single byte poll may block before reporting "no data yet".
/// Short enough that the caller's deadline stays accurate to ~10 ms.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A byte-stream transport to the co-processor.
pub trait Transport {
    /// Write the whole buffer.
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Poll for one byte. `Ok(None)` means no data was available within the
    /// transport's internal poll interval; it is not an error and carries
    /// no meaning for the caller's deadline.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

/// Serial port transport (8-N-1, no flow control — the co-processor's UART
/// configuration).
pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialTransport {
    /// Open the serial device at `path` with the given baud rate.
    pub fn open(path: &str, baud: u32) -> Result<Self, LinkError> {
        let port = serialport::new(path, baud)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(POLL_INTERVAL)
            .open()
            .map_err(|source| LinkError::Connect {
                port: path.to_owned(),
                source,
            })?;

        tracing::debug!(path, baud, "serial port open");
        Ok(Self { port })
    }
}

impl Transport for SerialTransport {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.port.write_all(data)?;
        self.port.flush()
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.port.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
