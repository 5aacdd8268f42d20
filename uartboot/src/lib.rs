//! # uartboot
//!
//! Host side of a UART firmware-update protocol: pushes a binary image to a
//! microcontroller running a page-write bootloader, coordinating erase and
//! page writes with ack-based flow control and a CRC-8 frame check.
//!
//! The crate provides:
//!
//! - CRC-8 frame check sequence (bitwise and table-driven)
//! - Frame encoding/decoding with configurable markers, command codes and
//!   generator polynomial
//! - Page-sized image chunking
//! - The handshake / erase / paged-transfer session state machine
//!
//! ## Supported Platforms
//!
//! - **Native** (default): Linux, macOS, Windows via the `serialport` crate
//! - Any other duplex byte channel via the [`Transport`] trait
//!
//! ## Features
//!
//! - `native` (default): Native serial port support
//!
//! ## Example
//!
//! ```rust,no_run
//! use uartboot::{Session, SessionConfig, SerialSettings, SerialTransport};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let image = std::fs::read("firmware.bin")?;
//!
//!     let settings = SerialSettings::new("/dev/ttyUSB0", 115200);
//!     let transport = SerialTransport::open(&settings)?;
//!
//!     let mut session = Session::new(transport, SessionConfig::default());
//!     session.run(&image, |sent, total| {
//!         println!("{sent}/{total} bytes");
//!     })?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod image;
pub mod protocol;
pub mod session;
pub mod transport;

// Re-exports for convenience
// Native-specific re-exports
#[cfg(feature = "native")]
pub use transport::SerialTransport;
pub use {
    error::{Error, Result},
    image::{Chunk, Chunks, PAGE_SIZE, chunks},
    protocol::crc::{ALT_POLYNOMIAL, Crc8, DEFAULT_POLYNOMIAL, crc8},
    protocol::frame::{Command, Frame, FrameCodec, FrameConfig, MAX_PAYLOAD},
    session::{ACK_OK, DEFAULT_ACK_TIMEOUT, Session, SessionConfig, SessionState},
    transport::{FlowControl, SerialSettings, Transport},
};
