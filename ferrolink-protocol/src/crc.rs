//! CRC-16/CCITT-FALSE, the frame checksum
//!
//! Parameters: polynomial 0x1021, initial value 0xFFFF, no input or output
//! reflection, no final XOR. This matches the co-processor's bitwise
//! implementation; both sides must compute over the identical byte range
//! (start marker through end of payload).

const POLY: u16 = 0x1021;
const INIT: u16 = 0xFFFF;

/// Compute the CRC-16/CCITT-FALSE of `data`.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = INIT;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ POLY
            } else {
                crc << 1
            };
        }
    }
    crc
}
