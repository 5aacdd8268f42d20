//! Bootloader frame encoding and decoding.
//!
//! Every exchange with the bootloader is one command frame from the host
//! followed by a single ack byte from the device.
//!
//! ## Frame Format
//!
//! ```text
//! +-------+-----+---------+---------------+-----+-----+
//! | Start | Cmd |  Size   |    Payload    | FCS | End |
//! +-------+-----+---------+---------------+-----+-----+
//! |   1   |  1  | 2 (LE)  |   0..=512     |  1  |  1  |
//! +-------+-----+---------+---------------+-----+-----+
//! ```
//!
//! The FCS is a CRC-8 over command, size and payload. Marker bytes, command
//! codes and the generator polynomial vary between firmware builds, so all
//! of them live in [`FrameConfig`] instead of the codec logic.

use crate::error::{Error, Result};
use crate::protocol::crc::{Crc8, DEFAULT_POLYNOMIAL};
use byteorder::{LittleEndian, WriteBytesExt};

/// Maximum payload length per frame, fixed by the device flash buffer.
pub const MAX_PAYLOAD: usize = 512;

/// Bytes of framing around the payload: start, cmd, size(2), fcs, end.
pub const FRAME_OVERHEAD: usize = 6;

/// Bootloader command set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Wake the device and confirm it is in bootloader mode.
    Handshake,
    /// Erase the image region; payload is the image length as u32 LE.
    EraseFlash,
    /// Program one page; payload is the page contents.
    WritePage,
    /// Program the final page of the image.
    WritePageLast,
}

/// Wire-level configuration: marker bytes, command codes and FCS polynomial.
///
/// The firmware builds observed in the field disagree on these values, so
/// they are deployment configuration rather than protocol constants. The
/// defaults match the reference bootloader.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Start-of-frame marker.
    pub start_byte: u8,
    /// End-of-frame marker.
    pub end_byte: u8,
    /// CRC-8 generator polynomial for the FCS.
    pub polynomial: u8,
    /// Command code for [`Command::Handshake`].
    pub handshake_code: u8,
    /// Command code for [`Command::EraseFlash`].
    pub erase_flash_code: u8,
    /// Command code for [`Command::WritePage`].
    pub write_page_code: u8,
    /// Command code for [`Command::WritePageLast`].
    pub write_page_last_code: u8,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            start_byte: 0xAA,
            end_byte: 0x55,
            polynomial: DEFAULT_POLYNOMIAL,
            handshake_code: 0x03,
            erase_flash_code: 0x02,
            write_page_code: 0x00,
            write_page_last_code: 0x01,
        }
    }
}

impl FrameConfig {
    /// Map a command to its configured wire code.
    pub fn code(&self, command: Command) -> u8 {
        match command {
            Command::Handshake => self.handshake_code,
            Command::EraseFlash => self.erase_flash_code,
            Command::WritePage => self.write_page_code,
            Command::WritePageLast => self.write_page_last_code,
        }
    }

    /// Map a wire code back to a command, if it is one of the configured codes.
    pub fn command(&self, code: u8) -> Option<Command> {
        if code == self.handshake_code {
            Some(Command::Handshake)
        } else if code == self.erase_flash_code {
            Some(Command::EraseFlash)
        } else if code == self.write_page_code {
            Some(Command::WritePage)
        } else if code == self.write_page_last_code {
            Some(Command::WritePageLast)
        } else {
            None
        }
    }
}

/// A decoded command frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The frame's command.
    pub command: Command,
    /// The frame's payload bytes.
    pub payload: Vec<u8>,
}

/// Frame encoder/decoder for one wire configuration.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    config: FrameConfig,
    crc: Crc8,
}

impl FrameCodec {
    /// Create a codec for the given wire configuration.
    pub fn new(config: FrameConfig) -> Self {
        let crc = Crc8::new(config.polynomial);
        Self { config, crc }
    }

    /// The wire configuration this codec was built from.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Encode a command and payload into a complete wire frame.
    ///
    /// Fails with [`Error::PayloadTooLarge`] for payloads over
    /// [`MAX_PAYLOAD`] bytes, before anything touches the transport.
    #[allow(clippy::unwrap_used)] // Writing to Vec<u8> cannot fail
    pub fn encode(&self, command: Command, payload: &[u8]) -> Result<Vec<u8>> {
        if payload.len() > MAX_PAYLOAD {
            return Err(Error::PayloadTooLarge {
                len: payload.len(),
                max: MAX_PAYLOAD,
            });
        }

        let mut buf = Vec::with_capacity(FRAME_OVERHEAD + payload.len());

        buf.push(self.config.start_byte);
        buf.push(self.config.code(command));
        // Safe cast: payload.len() <= MAX_PAYLOAD
        #[allow(clippy::cast_possible_truncation)]
        buf.write_u16::<LittleEndian>(payload.len() as u16)
            .unwrap();
        buf.extend_from_slice(payload);

        // FCS covers command, size and payload but not the markers
        let fcs = self.crc.compute(&buf[1..]);
        buf.push(fcs);
        buf.push(self.config.end_byte);

        Ok(buf)
    }

    /// Decode one complete wire frame.
    ///
    /// Structural problems (markers, truncation, size-field mismatch,
    /// unknown command code) report [`Error::Malformed`]; a frame that is
    /// structurally sound but fails the integrity check reports
    /// [`Error::ChecksumMismatch`] so the caller can decide whether to abort
    /// or request a retransmission.
    pub fn decode(&self, buf: &[u8]) -> Result<Frame> {
        if buf.len() < FRAME_OVERHEAD {
            return Err(Error::Malformed(format!(
                "{} bytes is shorter than the minimum frame of {FRAME_OVERHEAD}",
                buf.len()
            )));
        }

        if buf[0] != self.config.start_byte {
            return Err(Error::Malformed(format!(
                "bad start marker {:#04x}, expected {:#04x}",
                buf[0], self.config.start_byte
            )));
        }

        let size = usize::from(u16::from_le_bytes([buf[2], buf[3]]));
        if buf.len() != FRAME_OVERHEAD + size {
            return Err(Error::Malformed(format!(
                "size field says {size} payload bytes but the frame is {} bytes long",
                buf.len()
            )));
        }

        let end = buf[FRAME_OVERHEAD + size - 1];
        if end != self.config.end_byte {
            return Err(Error::Malformed(format!(
                "bad end marker {end:#04x}, expected {:#04x}",
                self.config.end_byte
            )));
        }

        let fcs = buf[4 + size];
        let computed = self.crc.compute(&buf[1..4 + size]);
        if computed != fcs {
            return Err(Error::ChecksumMismatch {
                expected: fcs,
                actual: computed,
            });
        }

        let command = self
            .config
            .command(buf[1])
            .ok_or_else(|| Error::Malformed(format!("unknown command code {:#04x}", buf[1])))?;

        Ok(Frame {
            command,
            payload: buf[4..4 + size].to_vec(),
        })
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(FrameConfig::default())
    }
}
