//! UART command protocol between the host and the STM32 co-processor
//!
//! This crate defines the framed binary protocol the host uses to request
//! NFC, iButton and IR operations from the co-processor and to receive its
//! responses. It is pure: no I/O, no clocks — just frame construction, a
//! byte-at-a-time parser and the CRC that guards both.
//!
//! # Frame format
//!
//! All multi-byte integers are little-endian:
//! ```text
//! ┌───────┬────────┬─────┬─────┬─────────┬───────┐
//! │ START │ LENGTH │ SEQ │ CMD │ PAYLOAD │ CRC16 │
//! │ 1B    │ 1B     │ 1B  │ 1B  │ 0–251B  │ 2B    │
//! └───────┴────────┴─────┴─────┴─────────┴───────┘
//! ```
//!
//! LENGTH is `payload_len + 4`, counting SEQ, CMD, the payload and the two
//! CRC bytes, so a whole frame is `LENGTH + 2` bytes on the wire. The CRC-16/CCITT-FALSE is computed over START
//! through the end of PAYLOAD and sent LSB first.
//!
//! The SEQ byte is reserved for future request/response correlation; the
//! current firmware ignores it and the host always sends 0.

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod crc;
pub mod frame;

pub use command::HostCommand;
pub use crc::crc16;
pub use frame::{Frame, FrameError, FrameParser, FRAME_START, MAX_PAYLOAD_SIZE};
