//! CI-V radio client
//!
//! Presents a small, fully serialized request/response surface over the
//! serial control link. The bus is half-duplex: every command the controller
//! writes is echoed back, so responses are parsed with a
//! last-complete-frame discipline. At most one command is in flight at any
//! time; the internal lock is held across each full exchange.
//!
//! Timeouts are routine (the radio is busy retuning during scans) and
//! surface as `Ok(None)`, never as errors.

use std::time::Duration;

use civ_protocol::{
    build_frame, decode_frequency, encode_frequency, parse_last_frame, CivResponse, OperatingMode,
    CMD_LEVEL, CMD_READ_FREQUENCY, CMD_READ_MODE, CMD_READ_STATUS, CMD_SET_FREQUENCY,
    CMD_SET_MODE, DEFAULT_RADIO_ADDR, SUB_SQUELCH_LEVEL, SUB_SQUELCH_STATUS, SUB_S_METER,
};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout, Instant};
use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tracing::{debug, info, warn};

use crate::error::RadioError;

/// Size of the staging buffer for response reads
const READ_BUF_LEN: usize = 256;

/// Default mode filter byte (FIL1)
const DEFAULT_FILTER: u8 = 0x01;

/// Serial link configuration
#[derive(Debug, Clone)]
pub struct RadioConfig {
    /// Serial port path, e.g. `/dev/ttyACM0` or `COM5`
    pub port_name: String,
    /// Baud rate; the IC-705 USB port defaults to 19,200
    pub baud_rate: u32,
    /// CI-V address of the radio
    pub radio_addr: u8,
    /// Overall read window per exchange
    pub read_timeout: Duration,
    /// Minimum radio turnaround after a write
    pub turnaround_delay: Duration,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            port_name: String::new(),
            baud_rate: 19_200,
            radio_addr: DEFAULT_RADIO_ADDR,
            read_timeout: Duration::from_secs(1),
            turnaround_delay: Duration::from_millis(50),
        }
    }
}

/// Serialized CI-V command/response client.
///
/// Generic over the I/O type so tests drive it with `tokio::io::duplex`;
/// production uses a [`SerialStream`].
pub struct RadioClient<T = SerialStream> {
    io: Mutex<T>,
    config: RadioConfig,
}

impl RadioClient<SerialStream> {
    /// Open the serial port (8-N-1, no handshake) and probe the radio with a
    /// frequency read.
    pub async fn connect(config: RadioConfig) -> Result<Self, RadioError> {
        let stream = tokio_serial::new(&config.port_name, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.read_timeout)
            .open_native_async()?;

        info!(port = %config.port_name, baud = config.baud_rate, "serial port open");

        let client = Self::with_io(stream, config);
        match client.read_frequency().await? {
            Some(hz) => info!(hz, "radio answered connect probe"),
            None => warn!("radio did not answer connect probe; continuing"),
        }
        Ok(client)
    }
}

impl<T> RadioClient<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an already-open I/O stream
    pub fn with_io(io: T, config: RadioConfig) -> Self {
        Self {
            io: Mutex::new(io),
            config,
        }
    }

    /// Tuned frequency in Hz, or `None` on timeout
    pub async fn read_frequency(&self) -> Result<Option<u64>, RadioError> {
        Ok(self
            .exchange(CMD_READ_FREQUENCY, None, &[])
            .await?
            .filter(|r| r.cmd == CMD_READ_FREQUENCY && r.data.len() >= 5)
            .map(|r| decode_frequency(&r.data)))
    }

    /// Tune to `hz`. Returns the frequency on acknowledgement.
    pub async fn set_frequency(&self, hz: u64) -> Result<Option<u64>, RadioError> {
        let resp = self
            .exchange(CMD_SET_FREQUENCY, None, &encode_frequency(hz))
            .await?;
        Ok(resp.filter(CivResponse::is_ack).map(|_| hz))
    }

    /// Select an operating mode with the default filter
    pub async fn set_mode(&self, mode: OperatingMode) -> Result<bool, RadioError> {
        let resp = self
            .exchange(CMD_SET_MODE, None, &[mode.mode_byte(), DEFAULT_FILTER])
            .await?;
        Ok(resp.is_some_and(|r| r.is_ack()))
    }

    /// Current operating mode, or `None` on timeout or an unknown mode byte
    pub async fn read_mode(&self) -> Result<Option<OperatingMode>, RadioError> {
        let resp = self.exchange(CMD_READ_MODE, None, &[]).await?;
        Ok(resp
            .filter(|r| r.cmd == CMD_READ_MODE)
            .and_then(|r| r.data.first().copied())
            .and_then(OperatingMode::from_mode_byte))
    }

    /// Configured squelch level (0 to 255 scale), or `None` on timeout
    pub async fn read_squelch_level(&self) -> Result<Option<u16>, RadioError> {
        let resp = self
            .exchange(CMD_LEVEL, Some(SUB_SQUELCH_LEVEL), &[])
            .await?;
        Ok(resp.and_then(|r| {
            let high = *r.data.get(1)?;
            let low = *r.data.get(2)?;
            Some(bcd_byte(high) as u16 * 100 + bcd_byte(low) as u16)
        }))
    }

    /// S-meter reading (0 to 255 scale), or `None` on timeout
    pub async fn read_s_meter(&self) -> Result<Option<u16>, RadioError> {
        let resp = self
            .exchange(CMD_READ_STATUS, Some(SUB_S_METER), &[])
            .await?;
        Ok(resp.and_then(|r| {
            // data = [subcmd, high BCD, low BCD], big-endian composition
            let high = *r.data.get(1)?;
            let low = *r.data.get(2)?;
            Some(bcd_byte(high) as u16 * 100 + bcd_byte(low) as u16)
        }))
    }

    /// Squelch state: `Some(true)` when open, `None` on timeout.
    ///
    /// A payload that is missing or malformed reads as closed — the
    /// coordinator treats unknown squelch state as closed and moves on.
    pub async fn is_squelch_open(&self) -> Result<Option<bool>, RadioError> {
        let resp = self
            .exchange(CMD_READ_STATUS, Some(SUB_SQUELCH_STATUS), &[])
            .await?;
        Ok(resp.map(|r| r.data.get(1) == Some(&0x01)))
    }

    /// Write one command frame and read the radio's reply.
    ///
    /// Holds the port lock across the full exchange so frames never
    /// interleave on the half-duplex bus. After the turnaround delay, bytes
    /// accumulate in a staging buffer until a frame from the radio's address
    /// parses out (the echo of our own command is skipped) or the read
    /// window closes.
    async fn exchange(
        &self,
        cmd: u8,
        subcmd: Option<u8>,
        data: &[u8],
    ) -> Result<Option<CivResponse>, RadioError> {
        let frame = build_frame(self.config.radio_addr, cmd, subcmd, data);
        let mut io = self.io.lock().await;

        io.write_all(&frame).await?;
        io.flush().await?;
        sleep(self.config.turnaround_delay).await;

        let mut staging = [0u8; READ_BUF_LEN];
        let mut collected: Vec<u8> = Vec::with_capacity(READ_BUF_LEN);
        let deadline = Instant::now() + self.config.read_timeout;

        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            match timeout(deadline - now, io.read(&mut staging)).await {
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => {
                    collected.extend_from_slice(&staging[..n]);
                    if let Some(resp) = self.radio_reply(&collected) {
                        return Ok(Some(resp));
                    }
                }
                Ok(Err(e)) => return Err(RadioError::Io(e)),
                Err(_) => break,
            }
        }

        let resp = self.radio_reply(&collected);
        if resp.is_none() {
            debug!("no response to CI-V command 0x{cmd:02X}");
        }
        Ok(resp)
    }

    /// The last complete frame originating from the radio, if any
    fn radio_reply(&self, collected: &[u8]) -> Option<CivResponse> {
        parse_last_frame(collected).filter(|r| r.from == self.config.radio_addr)
    }
}

/// Two-digit BCD byte to its decimal value
fn bcd_byte(b: u8) -> u8 {
    (b >> 4) * 10 + (b & 0x0F)
}
