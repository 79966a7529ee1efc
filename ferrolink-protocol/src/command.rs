//! Command identifiers and typed host commands
//!
//! Ids and payload layouts match the co-processor's registered handlers.
//! Responses reuse the request's command id; an unrecognized id is answered
//! with [`RESP_UNKNOWN`] carrying the offending id as its payload.

use crate::frame::{Frame, FrameError};

// System commands
pub const CMD_GET_STATUS: u8 = 0x01;

// IR commands
pub const CMD_IR_SEND: u8 = 0x10;

// NFC commands
pub const CMD_NFC_GET_STATUS: u8 = 0x20;
pub const CMD_NFC_SCAN: u8 = 0x21;

// iButton commands
pub const CMD_IBUTTON_READ_ID: u8 = 0x30;

/// Response id the firmware uses for unknown or malformed commands
pub const RESP_UNKNOWN: u8 = 0xFF;

/// Commands the host can issue to the co-processor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostCommand {
    /// Query overall system status; the reply payload is a UTF-8 string
    GetStatus,
    /// Transmit an NEC IR signal
    IrSend {
        /// NEC address field
        address: u16,
        /// NEC command field
        command: u16,
    },
    /// Query the NFC subsystem status
    NfcGetStatus,
    /// Trigger an NFC tag scan
    NfcScan,
    /// Read the iButton ROM id; the reply payload is the 8-byte id
    IButtonReadId,
}

impl HostCommand {
    /// Wire command id for this command
    pub fn command_id(&self) -> u8 {
        match self {
            HostCommand::GetStatus => CMD_GET_STATUS,
            HostCommand::IrSend { .. } => CMD_IR_SEND,
            HostCommand::NfcGetStatus => CMD_NFC_GET_STATUS,
            HostCommand::NfcScan => CMD_NFC_SCAN,
            HostCommand::IButtonReadId => CMD_IBUTTON_READ_ID,
        }
    }

    /// Encode this command into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            HostCommand::IrSend { address, command } => {
                // Payload: address u16 LE, command u16 LE — the layout the
                // firmware's IR handler parses
                let mut payload = [0u8; 4];
                payload[..2].copy_from_slice(&address.to_le_bytes());
                payload[2..].copy_from_slice(&command.to_le_bytes());
                Frame::new(CMD_IR_SEND, &payload)
            }
            _ => Ok(Frame::empty(self.command_id())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_status_frame() {
        let frame = HostCommand::GetStatus.to_frame().unwrap();
        assert_eq!(frame.command_id, CMD_GET_STATUS);
        assert_eq!(frame.sequence, 0);
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn test_ir_send_payload_layout() {
        let frame = HostCommand::IrSend {
            address: 0x00FF,
            command: 0x1234,
        }
        .to_frame()
        .unwrap();

        assert_eq!(frame.command_id, CMD_IR_SEND);
        assert_eq!(&frame.payload[..], &[0xFF, 0x00, 0x34, 0x12]);
    }

    #[test]
    fn test_ir_send_matches_reference_vector() {
        let frame = HostCommand::IrSend {
            address: 0x00FF,
            command: 0x1234,
        }
        .to_frame()
        .unwrap();
        let encoded = frame.encode_to_vec().unwrap();

        assert_eq!(
            &encoded[..],
            &[0xAA, 0x08, 0x00, 0x10, 0xFF, 0x00, 0x34, 0x12, 0xDD, 0x01]
        );
    }

    #[test]
    fn test_empty_payload_commands() {
        for (cmd, id) in [
            (HostCommand::NfcGetStatus, CMD_NFC_GET_STATUS),
            (HostCommand::NfcScan, CMD_NFC_SCAN),
            (HostCommand::IButtonReadId, CMD_IBUTTON_READ_ID),
        ] {
            let frame = cmd.to_frame().unwrap();
            assert_eq!(frame.command_id, id);
            assert!(frame.payload.is_empty());
        }
    }
}
