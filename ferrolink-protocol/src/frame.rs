//! Frame encoding, decoding and the streaming parser.
//!
//! A frame on the wire is `START LENGTH SEQ CMD PAYLOAD.. CRC_LO CRC_HI`,
//! where `LENGTH = payload_len + 4` and the CRC-16/CCITT-FALSE covers
//! START through the last payload byte. See the crate docs for the layout
//! diagram.

use heapless::Vec;

use crate::crc::crc16;

/// Frame synchronization byte
pub const FRAME_START: u8 = 0xAA;

/// Bytes counted by the LENGTH field besides the payload (SEQ + CMD + CRC)
pub const LENGTH_OVERHEAD: u8 = 4;

/// Maximum payload size so LENGTH still fits in one byte
pub const MAX_PAYLOAD_SIZE: usize = u8::MAX as usize - LENGTH_OVERHEAD as usize;

/// Maximum complete frame size (START + LENGTH + max LENGTH bytes)
pub const MAX_FRAME_SIZE: usize = u8::MAX as usize + 2;

/// Smallest complete frame: empty payload (START, LENGTH, SEQ, CMD, CRC x2)
pub const MIN_FRAME_SIZE: usize = 6;

/// Errors that can occur during frame encoding or parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds [`MAX_PAYLOAD_SIZE`]
    PayloadTooLarge,
    /// LENGTH field below 4 or inconsistent with the buffer
    InvalidLength,
    /// Received CRC does not match the recomputed one
    ChecksumMismatch,
    /// Destination buffer too small for encoding
    BufferTooSmall,
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameError::PayloadTooLarge => write!(f, "payload exceeds {} bytes", MAX_PAYLOAD_SIZE),
            FrameError::InvalidLength => write!(f, "invalid frame length field"),
            FrameError::ChecksumMismatch => write!(f, "frame checksum mismatch"),
            FrameError::BufferTooSmall => write!(f, "buffer too small for frame"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FrameError {}

/// A parsed or constructed frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command identifier
    pub command_id: u8,
    /// Reserved correlation byte; the firmware ignores it, the host sends 0
    pub sequence: u8,
    /// Command-specific payload, opaque to the framing layer
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a new frame with the given command id and payload
    pub fn new(command_id: u8, payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(FrameError::PayloadTooLarge);
        }

        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            command_id,
            sequence: 0,
            payload: payload_vec,
        })
    }

    /// Create a frame with no payload
    pub fn empty(command_id: u8) -> Self {
        Self {
            command_id,
            sequence: 0,
            payload: Vec::new(),
        }
    }

    /// Value of the LENGTH field for this frame
    pub fn length_field(&self) -> u8 {
        self.payload.len() as u8 + LENGTH_OVERHEAD
    }

    /// Total size of this frame on the wire
    pub fn wire_size(&self) -> usize {
        self.payload.len() + MIN_FRAME_SIZE
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.wire_size();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        buffer[0] = FRAME_START;
        buffer[1] = self.length_field();
        buffer[2] = self.sequence;
        buffer[3] = self.command_id;
        buffer[4..4 + self.payload.len()].copy_from_slice(&self.payload);

        // CRC over everything before the checksum itself
        let crc = crc16(&buffer[..frame_len - 2]);
        buffer[frame_len - 2..frame_len].copy_from_slice(&crc.to_le_bytes());

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }

    /// Decode a complete frame from `buffer`.
    ///
    /// `buffer` must hold exactly one frame, start marker through checksum.
    /// The parser guarantees that by construction; the length relation is
    /// still re-validated here.
    pub fn decode(buffer: &[u8]) -> Result<Self, FrameError> {
        if buffer.len() < MIN_FRAME_SIZE {
            return Err(FrameError::InvalidLength);
        }

        let length = buffer[1];
        if length < LENGTH_OVERHEAD || buffer.len() != length as usize + 2 {
            return Err(FrameError::InvalidLength);
        }

        let crc_offset = buffer.len() - 2;
        let received = u16::from_le_bytes([buffer[crc_offset], buffer[crc_offset + 1]]);
        let calculated = crc16(&buffer[..crc_offset]);
        if received != calculated {
            return Err(FrameError::ChecksumMismatch);
        }

        let mut payload = Vec::new();
        payload
            .extend_from_slice(&buffer[4..crc_offset])
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            command_id: buffer[3],
            sequence: buffer[2],
            payload,
        })
    }
}

/// State machine for reassembling frames from a byte stream
///
/// Feed it one byte at a time; bytes before the start marker are discarded,
/// which is the protocol's only resynchronization mechanism. A parse error
/// resets the machine to hunting for the next start marker.
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    buffer: Vec<u8, MAX_FRAME_SIZE>,
    target_len: usize,
    discarded: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Hunting for the start marker
    AwaitingStart,
    /// Got the marker, next byte is LENGTH
    AwaitingLength,
    /// Accumulating until `target_len` bytes are buffered
    AccumulatingBody,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a new frame parser
    pub fn new() -> Self {
        Self {
            state: ParseState::AwaitingStart,
            buffer: Vec::new(),
            target_len: 0,
            discarded: 0,
        }
    }

    /// Reset the parser state (the discard counter survives)
    pub fn reset(&mut self) {
        self.state = ParseState::AwaitingStart;
        self.buffer.clear();
        self.target_len = 0;
    }

    /// Number of bytes discarded while hunting for a start marker
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` on a framing error.
    /// After an error the parser is reset and can be fed further bytes.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.state {
            ParseState::AwaitingStart => {
                if byte == FRAME_START {
                    self.buffer.clear();
                    // Capacity is MAX_FRAME_SIZE, cannot fail on a cleared buffer
                    let _ = self.buffer.push(byte);
                    self.state = ParseState::AwaitingLength;
                } else {
                    self.discarded += 1;
                }
                Ok(None)
            }
            ParseState::AwaitingLength => {
                if byte < LENGTH_OVERHEAD {
                    // A LENGTH below 4 cannot describe a frame; the
                    // co-processor's parser rejects it the same way
                    self.reset();
                    return Err(FrameError::InvalidLength);
                }
                let _ = self.buffer.push(byte);
                self.target_len = byte as usize + 2;
                self.state = ParseState::AccumulatingBody;
                Ok(None)
            }
            ParseState::AccumulatingBody => {
                let _ = self.buffer.push(byte);
                if self.buffer.len() < self.target_len {
                    return Ok(None);
                }

                let result = Frame::decode(&self.buffer);
                self.reset();
                result.map(Some)
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete frame found, if any; bytes after it are
    /// not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// GET_STATUS request, the protocol's known-answer vector
    const GET_STATUS_FRAME: [u8; 6] = [0xAA, 0x04, 0x00, 0x01, 0xFC, 0xCA];

    /// IR send, address 0x00FF, command 0x1234
    const IR_SEND_FRAME: [u8; 10] = [0xAA, 0x08, 0x00, 0x10, 0xFF, 0x00, 0x34, 0x12, 0xDD, 0x01];

    #[test]
    fn test_encode_empty_payload() {
        let frame = Frame::empty(0x01);
        let mut buffer = [0u8; 16];
        let len = frame.encode(&mut buffer).unwrap();

        assert_eq!(len, 6);
        assert_eq!(&buffer[..len], &GET_STATUS_FRAME);
    }

    #[test]
    fn test_encode_ir_send_vector() {
        let frame = Frame::new(0x10, &[0xFF, 0x00, 0x34, 0x12]).unwrap();
        let encoded = frame.encode_to_vec().unwrap();

        assert_eq!(frame.length_field(), 8);
        assert_eq!(&encoded[..], &IR_SEND_FRAME);
    }

    #[test]
    fn test_decode_known_vectors() {
        let frame = Frame::decode(&GET_STATUS_FRAME).unwrap();
        assert_eq!(frame.command_id, 0x01);
        assert_eq!(frame.sequence, 0);
        assert!(frame.payload.is_empty());

        let frame = Frame::decode(&IR_SEND_FRAME).unwrap();
        assert_eq!(frame.command_id, 0x10);
        assert_eq!(&frame.payload[..], &[0xFF, 0x00, 0x34, 0x12]);
    }

    #[test]
    fn test_roundtrip() {
        let original = Frame::new(0x30, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let encoded = original.encode_to_vec().unwrap();

        let mut parser = FrameParser::new();
        let parsed = parser.feed_bytes(&encoded).unwrap().unwrap();

        assert_eq!(parsed, original);
    }

    #[test]
    fn test_payload_too_large() {
        let oversized = [0u8; MAX_PAYLOAD_SIZE + 1];
        assert_eq!(Frame::new(0x01, &oversized), Err(FrameError::PayloadTooLarge));

        let max = [0u8; MAX_PAYLOAD_SIZE];
        let frame = Frame::new(0x01, &max).unwrap();
        assert_eq!(frame.length_field(), 0xFF);
        assert_eq!(frame.wire_size(), MAX_FRAME_SIZE);
    }

    #[test]
    fn test_decode_rejects_wrong_buffer_size() {
        // Truncated and padded copies must both fail the length relation
        assert_eq!(
            Frame::decode(&GET_STATUS_FRAME[..5]),
            Err(FrameError::InvalidLength)
        );

        let mut padded = [0u8; 7];
        padded[..6].copy_from_slice(&GET_STATUS_FRAME);
        assert_eq!(Frame::decode(&padded), Err(FrameError::InvalidLength));
    }

    #[test]
    fn test_decode_single_bit_flips_rejected() {
        for bit in 0..IR_SEND_FRAME.len() * 8 {
            let mut corrupted = IR_SEND_FRAME;
            corrupted[bit / 8] ^= 1 << (bit % 8);
            assert!(
                Frame::decode(&corrupted).is_err(),
                "bit {bit} flip was accepted"
            );
        }
    }

    #[test]
    fn test_parser_checksum_mismatch() {
        let mut corrupted = GET_STATUS_FRAME;
        corrupted[5] ^= 0xFF;

        let mut parser = FrameParser::new();
        assert_eq!(
            parser.feed_bytes(&corrupted),
            Err(FrameError::ChecksumMismatch)
        );

        // Parser recovers: the same frame parses cleanly afterwards
        let frame = parser.feed_bytes(&GET_STATUS_FRAME).unwrap().unwrap();
        assert_eq!(frame.command_id, 0x01);
    }

    #[test]
    fn test_parser_rejects_short_length() {
        let mut parser = FrameParser::new();
        assert_eq!(parser.feed(FRAME_START), Ok(None));
        assert_eq!(parser.feed(0x03), Err(FrameError::InvalidLength));

        // Back to hunting for a start marker
        let frame = parser.feed_bytes(&GET_STATUS_FRAME).unwrap().unwrap();
        assert_eq!(frame.command_id, 0x01);
    }

    #[test]
    fn test_parser_resync_after_noise() {
        let mut data = std::vec::Vec::new();
        data.extend_from_slice(&[0x00, 0xFF, 0x12, 0x34]);
        data.extend_from_slice(&IR_SEND_FRAME);

        let mut parser = FrameParser::new();
        let parsed = parser.feed_bytes(&data).unwrap().unwrap();

        assert_eq!(parsed.command_id, 0x10);
        assert_eq!(parser.discarded(), 4);
    }

    #[test]
    fn test_parser_discard_is_unbounded() {
        // The hunt for a start marker has no limit of its own; only the
        // caller's deadline bounds it. 64 KiB of noise must not trip it.
        let mut parser = FrameParser::new();
        for _ in 0..65536 {
            // 0x55 never matches the marker
            assert_eq!(parser.feed(0x55), Ok(None));
        }
        assert_eq!(parser.discarded(), 65536);

        let frame = parser.feed_bytes(&GET_STATUS_FRAME).unwrap().unwrap();
        assert_eq!(frame.command_id, 0x01);
    }

    #[test]
    fn test_payload_may_contain_start_marker() {
        // 0xAA inside an accumulating body is payload, not a new frame
        let original = Frame::new(0x21, &[0xAA, 0xAA, 0xAA]).unwrap();
        let encoded = original.encode_to_vec().unwrap();

        let mut parser = FrameParser::new();
        let parsed = parser.feed_bytes(&encoded).unwrap().unwrap();
        assert_eq!(parsed, original);
    }

    proptest! {
        #[test]
        fn prop_roundtrip(command_id: u8, payload in proptest::collection::vec(any::<u8>(), 0..=MAX_PAYLOAD_SIZE)) {
            let original = Frame::new(command_id, &payload).unwrap();
            let encoded = original.encode_to_vec().unwrap();
            prop_assert_eq!(encoded.len(), payload.len() + MIN_FRAME_SIZE);

            let decoded = Frame::decode(&encoded).unwrap();
            prop_assert_eq!(decoded.command_id, command_id);
            prop_assert_eq!(&decoded.payload[..], &payload[..]);
        }

        #[test]
        fn prop_parser_finds_frame_after_noise(
            noise in proptest::collection::vec(any::<u8>().prop_filter("not the marker", |b| *b != FRAME_START), 0..64),
            command_id: u8,
            payload in proptest::collection::vec(any::<u8>(), 0..32),
        ) {
            let frame = Frame::new(command_id, &payload).unwrap();
            let encoded = frame.encode_to_vec().unwrap();

            let mut stream = noise.clone();
            stream.extend_from_slice(&encoded);

            let mut parser = FrameParser::new();
            let parsed = parser.feed_bytes(&stream).unwrap().unwrap();
            prop_assert_eq!(parsed, frame);
            prop_assert_eq!(parser.discarded(), noise.len());
        }
    }
}
