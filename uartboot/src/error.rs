//! Error types for uartboot.

use std::io;
use thiserror::Error;

/// Result type for uartboot operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for uartboot operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (serial port, file operations).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serial port error.
    #[cfg(feature = "native")]
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// No (or insufficient) response within the configured window.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// A received frame failed structural validation.
    #[error("Malformed frame: {0}")]
    Malformed(String),

    /// Frame check sequence mismatch on a received frame.
    #[error("FCS mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch {
        /// FCS byte carried by the frame.
        expected: u8,
        /// FCS computed over the received bytes.
        actual: u8,
    },

    /// The device rejected the last frame with a non-zero ack byte.
    #[error("Device reported error code {0:#04x}")]
    Device(u8),

    /// Payload exceeds the bootloader page size.
    #[error("Payload of {len} bytes exceeds the {max}-byte page limit")]
    PayloadTooLarge {
        /// Offending payload length.
        len: usize,
        /// Maximum payload length per frame.
        max: usize,
    },
}
