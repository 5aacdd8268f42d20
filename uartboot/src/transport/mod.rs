//! Transport abstraction for the bootloader link.
//!
//! The session layer drives an abstract duplex byte channel so that the
//! protocol logic stays independent of how the link was opened and
//! configured. Native builds get a [`serialport`]-backed implementation;
//! tests substitute an in-memory mock.

#[cfg(feature = "native")]
pub mod serial;

use std::time::Duration;

use crate::error::Result;

/// A blocking duplex byte channel with a bounded read.
pub trait Transport {
    /// Deliver `data` in order and in full, or fail.
    ///
    /// Partial silent writes are not legal under this contract; an
    /// implementation must either write everything or return an error.
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Read up to `buf.len()` bytes, returning however many arrived before
    /// `timeout` elapsed. Returns `Ok(0)` when nothing arrived in time;
    /// never blocks past the timeout.
    fn recv_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;
}

/// Flow control mode for the serial link.
///
/// The bootloader variants in the field are wired differently (some boards
/// need RTS/CTS asserted to enumerate), so this is part of the link
/// settings rather than a hardcoded choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowControl {
    /// No flow control.
    #[default]
    None,
    /// Hardware flow control (RTS/CTS).
    Hardware,
    /// Software flow control (XON/XOFF).
    Software,
}

/// Serial link settings.
#[derive(Debug, Clone)]
pub struct SerialSettings {
    /// Port name/path (e.g., "/dev/ttyUSB0", "COM3").
    pub port_name: String,
    /// Baud rate.
    pub baud_rate: u32,
    /// Default read/write timeout.
    pub timeout: Duration,
    /// Flow control mode.
    pub flow_control: FlowControl,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port_name: String::new(),
            baud_rate: 115200,
            timeout: Duration::from_millis(1000),
            flow_control: FlowControl::None,
        }
    }
}

impl SerialSettings {
    /// Create settings for a port name and baud rate.
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate,
            ..Default::default()
        }
    }

    /// Set the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the flow control mode.
    #[must_use]
    pub fn with_flow_control(mut self, flow_control: FlowControl) -> Self {
        self.flow_control = flow_control;
        self
    }
}

#[cfg(feature = "native")]
pub use serial::SerialTransport;
