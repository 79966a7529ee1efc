//! Request/response driver over a byte-stream transport.
//!
//! `send` encodes a frame fully in memory and writes it in one call;
//! `receive` reassembles one frame byte-by-byte under an overall deadline.
//! Each receive owns a fresh parser, so nothing leaks between calls.

use std::time::{Duration, Instant};

use ferrolink_protocol::{Frame, FrameParser, HostCommand};

use crate::error::{LinkError, Result};
use crate::transport::{SerialTransport, Transport};

/// A decoded response frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Command id the response answers (the firmware echoes the request id,
    /// or [`ferrolink_protocol::command::RESP_UNKNOWN`]).
    pub command_id: u8,
    /// Response payload; semantics depend on the command.
    pub payload: Vec<u8>,
}

/// Exclusive owner of one transport, speaking strict request/response.
pub struct Link<T: Transport> {
    transport: T,
}

impl Link<SerialTransport> {
    /// Open a serial link to the co-processor.
    pub fn open(path: &str, baud: u32) -> Result<Self> {
        Ok(Self::new(SerialTransport::open(path, baud)?))
    }
}

impl<T: Transport> Link<T> {
    /// Wrap an already-open transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Encode and send one command frame.
    ///
    /// The frame is built completely before the first byte is written, so a
    /// failure here never leaves a partial frame on the wire from our side.
    pub fn send(&mut self, command_id: u8, payload: &[u8]) -> Result<()> {
        let frame = Frame::new(command_id, payload)?;
        let encoded = frame.encode_to_vec()?;

        self.transport
            .write_all(&encoded)
            .map_err(LinkError::Write)?;

        tracing::debug!(command_id, len = encoded.len(), "frame sent");
        Ok(())
    }

    /// Encode and send a typed command.
    pub fn send_command(&mut self, command: &HostCommand) -> Result<()> {
        let frame = command.to_frame()?;
        let encoded = frame.encode_to_vec()?;

        self.transport
            .write_all(&encoded)
            .map_err(LinkError::Write)?;

        tracing::debug!(command_id = frame.command_id, len = encoded.len(), "frame sent");
        Ok(())
    }

    /// Receive one complete valid frame within `deadline`.
    ///
    /// The deadline is for the whole call, not per byte: a slow trickle is
    /// fine as long as the frame completes in time. Polls that yield no
    /// data only cause a deadline re-check. On timeout the partial frame is
    /// discarded; on a checksum mismatch the corrupted frame is discarded
    /// and the error surfaced — resynchronization is the caller's next
    /// `receive`, which hunts for the next start marker.
    pub fn receive(&mut self, deadline: Duration) -> Result<Response> {
        let started = Instant::now();
        let mut parser = FrameParser::new();

        loop {
            if started.elapsed() > deadline {
                tracing::debug!(
                    discarded = parser.discarded(),
                    "receive deadline elapsed"
                );
                return Err(LinkError::Timeout);
            }

            let byte = match self.transport.read_byte().map_err(LinkError::Read)? {
                Some(byte) => byte,
                None => continue,
            };

            match parser.feed(byte) {
                Ok(None) => {}
                Ok(Some(frame)) => {
                    tracing::debug!(
                        command_id = frame.command_id,
                        payload_len = frame.payload.len(),
                        discarded = parser.discarded(),
                        "frame received"
                    );
                    return Ok(Response {
                        command_id: frame.command_id,
                        payload: frame.payload.to_vec(),
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "frame rejected");
                    return Err(e.into());
                }
            }
        }
    }

    /// Send a typed command and wait for its response.
    ///
    /// No retries: a timeout or a corrupted response is returned as-is and
    /// the caller decides whether to ask again.
    pub fn request(&mut self, command: &HostCommand, deadline: Duration) -> Result<Response> {
        self.send_command(command)?;
        self.receive(deadline)
    }
}
