//! Bootloader transfer session.
//!
//! One [`Session`] drives one complete image transfer:
//!
//! ```text
//! Idle -> Handshaking -> Erasing -> Transferring -> Complete
//!            |               |            |
//!            +-------> Failed(reason) <---+
//! ```
//!
//! The protocol is strictly half-duplex: one frame goes out, one ack byte
//! comes back, and nothing else is in flight. Flash erase and page writes
//! are synchronous and order-dependent on the device, so the erase must be
//! acked before the first page write is sent. Any timeout, device error or
//! transport failure aborts the session immediately; a fresh run re-erases
//! and re-transfers from offset zero.

use crate::error::{Error, Result};
use crate::image::{PAGE_SIZE, chunks};
use crate::protocol::frame::{Command, FrameCodec, FrameConfig};
use crate::transport::Transport;
use byteorder::{LittleEndian, WriteBytesExt};
use log::{debug, info, trace};
use std::time::Duration;

/// Ack byte the device sends on success; anything else is an error code.
pub const ACK_OK: u8 = 0x00;

/// Default window to wait for each ack byte.
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(1);

/// Lifecycle of one transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No transfer started yet.
    Idle,
    /// Waking the device and waiting for its first ack.
    Handshaking,
    /// Waiting for the flash erase to be acknowledged.
    Erasing,
    /// Streaming page writes.
    Transferring,
    /// The last page was acknowledged.
    Complete,
    /// The transfer aborted; holds the failure reason.
    Failed(String),
}

/// Session tuning knobs.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long to wait for each ack byte.
    pub ack_timeout: Duration,
    /// Bytes per page-write frame.
    pub page_size: usize,
    /// Wire-level framing configuration.
    pub frame: FrameConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ack_timeout: DEFAULT_ACK_TIMEOUT,
            page_size: PAGE_SIZE,
            frame: FrameConfig::default(),
        }
    }
}

/// Drives handshake, erase and paged transfer over a [`Transport`].
///
/// The session owns only protocol state; the image is borrowed for the
/// duration of [`Session::run`] and the transport is injected, so a fake
/// transport exercises the whole state machine in tests.
pub struct Session<T: Transport> {
    transport: T,
    codec: FrameCodec,
    config: SessionConfig,
    state: SessionState,
    bytes_sent: usize,
    total_len: usize,
}

impl<T: Transport> Session<T> {
    /// Create a session over an opened transport.
    pub fn new(transport: T, config: SessionConfig) -> Self {
        let codec = FrameCodec::new(config.frame.clone());
        Self {
            transport,
            codec,
            config,
            state: SessionState::Idle,
            bytes_sent: 0,
            total_len: 0,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Image bytes acknowledged by the device so far.
    pub fn bytes_sent(&self) -> usize {
        self.bytes_sent
    }

    /// Consume the session and return the underlying transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Transfer `image` to the device.
    ///
    /// `progress` is invoked after each acknowledged page with
    /// `(bytes_sent, total_bytes)`. On any failure the session stops
    /// issuing frames, enters [`SessionState::Failed`] and returns the
    /// error; `bytes_sent()` then reports how far the transfer got.
    pub fn run<F>(&mut self, image: &[u8], mut progress: F) -> Result<()>
    where
        F: FnMut(usize, usize),
    {
        self.bytes_sent = 0;
        self.total_len = image.len();

        match self.drive(image, &mut progress) {
            Ok(()) => {
                self.state = SessionState::Complete;
                info!("Transfer complete: {} bytes", self.total_len);
                Ok(())
            },
            Err(e) => {
                self.state = SessionState::Failed(e.to_string());
                Err(e)
            },
        }
    }

    fn drive<F>(&mut self, image: &[u8], progress: &mut F) -> Result<()>
    where
        F: FnMut(usize, usize),
    {
        self.state = SessionState::Handshaking;
        debug!("Handshaking with the bootloader");
        self.exchange(Command::Handshake, &[])?;

        self.state = SessionState::Erasing;
        info!("Erasing {} bytes of flash", image.len());
        self.exchange(Command::EraseFlash, &erase_payload(image.len()))?;

        self.state = SessionState::Transferring;
        for chunk in chunks(image, self.config.page_size) {
            let command = if chunk.is_last {
                Command::WritePageLast
            } else {
                Command::WritePage
            };

            trace!(
                "Writing page at offset {} ({} bytes)",
                chunk.offset,
                chunk.data.len()
            );
            self.exchange(command, chunk.data)?;

            self.bytes_sent += chunk.data.len();
            progress(self.bytes_sent, self.total_len);
        }

        Ok(())
    }

    /// Send one frame and block on its ack. Exactly one frame is ever
    /// outstanding.
    fn exchange(&mut self, command: Command, payload: &[u8]) -> Result<()> {
        let frame = self.codec.encode(command, payload)?;
        self.transport.send(&frame)?;
        self.await_ack()
    }

    fn await_ack(&mut self) -> Result<()> {
        let mut ack = [0u8; 1];
        let n = self
            .transport
            .recv_timeout(&mut ack, self.config.ack_timeout)?;

        if n == 0 {
            return Err(Error::Timeout(format!(
                "no ack within {} ms",
                self.config.ack_timeout.as_millis()
            )));
        }

        if ack[0] != ACK_OK {
            return Err(Error::Device(ack[0]));
        }

        Ok(())
    }
}

/// Erase payload: the image length as a 4-byte little-endian integer.
#[allow(clippy::unwrap_used)] // Writing to Vec<u8> cannot fail
fn erase_payload(len: usize) -> Vec<u8> {
    let mut buf = Vec::with_capacity(4);
    // Safe cast: firmware images are always < 4 GiB
    #[allow(clippy::cast_possible_truncation)]
    buf.write_u32::<LittleEndian>(len as u32).unwrap();
    buf
}
