//! Host-side serial link to the STM32 co-processor
//!
//! This crate owns the device node and the timing; the wire format itself
//! lives in `ferrolink-protocol`. The model is deliberately simple:
//!
//! - one [`Link`] exclusively owns its transport for the life of the
//!   connection — no locking, no concurrent calls;
//! - strict request/response discipline, one outstanding request at a time
//!   (the frame's reserved sequence byte exists for the day that changes);
//! - [`Link::receive`] polls the transport one byte at a time under an
//!   overall wall-clock deadline. A poll that yields no data is not an
//!   error and does not advance the parser; only the deadline ends the
//!   wait. Partial frames are discarded on timeout, never carried over.
//!
//! Retry policy belongs to the caller: `Timeout` and checksum failures are
//! recoverable by issuing a fresh `receive`, a connect failure is fatal to
//! the session.

#![deny(unsafe_code)]

pub mod error;
pub mod link;
pub mod transport;

pub use error::{LinkError, Result};
pub use link::{Link, Response};
pub use transport::{SerialTransport, Transport};
