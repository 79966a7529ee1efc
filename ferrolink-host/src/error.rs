//! Error types for the host link.
//!
//! One variant per distinct outcome so callers can tell a dead serial port
//! from a corrupted frame from a peer that simply did not answer in time.

use ferrolink_protocol::FrameError;
use thiserror::Error;

/// Main error type for all link operations.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The serial device could not be opened. Fatal to the session.
    #[error("failed to open serial port {port}: {source}")]
    Connect {
        port: String,
        #[source]
        source: serialport::Error,
    },

    /// A transport write failed; nothing was partially framed (frames are
    /// encoded fully in memory before the first byte is written).
    #[error("serial write failed: {0}")]
    Write(#[source] std::io::Error),

    /// A transport read failed with a real error (not "no data yet").
    #[error("serial read failed: {0}")]
    Read(#[source] std::io::Error),

    /// No complete valid frame arrived within the deadline. Recoverable;
    /// the partially accumulated frame has been discarded.
    #[error("no complete frame within the deadline")]
    Timeout,

    /// Framing error: checksum mismatch, invalid length field or an
    /// oversized payload passed to send. Recoverable for receives.
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Result type alias using LinkError.
pub type Result<T> = std::result::Result<T, LinkError>;

impl LinkError {
    /// True for outcomes a caller may retry with a fresh `receive`.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LinkError::Timeout | LinkError::Frame(FrameError::ChecksumMismatch)
        )
    }
}
