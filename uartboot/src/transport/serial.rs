//! Native serial transport using the `serialport` crate.

use crate::error::{Error, Result};
use crate::transport::{FlowControl, SerialSettings, Transport};
use log::trace;
use serialport::ClearBuffer;
use std::io::Read;
use std::time::{Duration, Instant};

impl From<FlowControl> for serialport::FlowControl {
    fn from(value: FlowControl) -> Self {
        match value {
            FlowControl::None => serialport::FlowControl::None,
            FlowControl::Hardware => serialport::FlowControl::Hardware,
            FlowControl::Software => serialport::FlowControl::Software,
        }
    }
}

/// Serial port transport for native platforms.
pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
    name: String,
    timeout: Duration,
}

impl SerialTransport {
    /// Open a serial port with the given settings.
    pub fn open(settings: &SerialSettings) -> Result<Self> {
        let port = serialport::new(&settings.port_name, settings.baud_rate)
            .timeout(settings.timeout)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(settings.flow_control.into())
            .open()?;

        Ok(Self {
            port,
            name: settings.port_name.clone(),
            timeout: settings.timeout,
        })
    }

    /// Wrap an already-opened serial port.
    ///
    /// `timeout` becomes the port's resting timeout, the one writes run
    /// under and the one [`Transport::recv_timeout`] restores after each
    /// bounded read.
    pub fn from_port(
        mut port: Box<dyn serialport::SerialPort>,
        name: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        port.set_timeout(timeout)?;
        Ok(Self {
            port,
            name: name.into(),
            timeout,
        })
    }

    /// The port name this transport was opened on.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Discard any stale bytes in the driver buffers.
    ///
    /// Useful before a handshake when the device may have printed boot
    /// messages on the shared line.
    pub fn clear_buffers(&mut self) -> Result<()> {
        self.port.clear(ClearBuffer::All)?;
        Ok(())
    }

    /// Set DTR (Data Terminal Ready) pin state.
    pub fn set_dtr(&mut self, level: bool) -> Result<()> {
        trace!("Setting DTR to {level}");
        self.port.write_data_terminal_ready(level)?;
        Ok(())
    }

    /// Set RTS (Request To Send) pin state.
    pub fn set_rts(&mut self, level: bool) -> Result<()> {
        trace!("Setting RTS to {level}");
        self.port.write_request_to_send(level)?;
        Ok(())
    }
}

impl Transport for SerialTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        std::io::Write::write_all(&mut self.port, data)?;
        std::io::Write::flush(&mut self.port)?;
        Ok(())
    }

    fn recv_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        let deadline = Instant::now() + timeout;
        let mut filled = 0;
        let mut result = Ok(());

        while filled < buf.len() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            self.port.set_timeout(remaining)?;

            match self.port.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => break,
                Err(e) => {
                    result = Err(Error::Io(e));
                    break;
                },
            }
        }

        // Put the resting timeout back so later writes do not run under
        // whatever sliver of the deadline was left when the loop ended
        self.port.set_timeout(self.timeout)?;

        result?;
        trace!("recv_timeout: {filled}/{} bytes", buf.len());
        Ok(filled)
    }
}
