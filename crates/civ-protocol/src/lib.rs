//! Icom CI-V Protocol Codec
//!
//! The CI-V (Communication Interface V) protocol is used by Icom transceivers.
//! It uses framed variable-length binary messages with address-based routing.
//!
//! # Frame Format
//! ```text
//! FE FE [to] [from] [cmd] [subcmd] [data...] FD
//! ```
//!
//! - `FE FE`: Preamble (two bytes)
//! - `to`: Destination address (radio address or 0xE0 for controller)
//! - `from`: Source address (controller address, typically 0xE0)
//! - `cmd`: Command code
//! - `subcmd`: Sub-command code (optional, depends on command)
//! - `data`: Variable length data (BCD encoded for frequencies)
//! - `FD`: Terminator
//!
//! # Frequency Encoding
//! Frequencies are encoded in BCD (Binary Coded Decimal), least-significant
//! nibble first. Example: 14.250.000 Hz = `00 00 25 14 00`.
//!
//! All parsing is tolerant: incomplete or garbled input yields `None`, never
//! a panic. The half-duplex CI-V bus echoes every command the controller
//! writes, so response buffers routinely contain the echoed frame followed by
//! the radio's reply; [`parse_last_frame`] resolves that by preferring the
//! last complete frame.

pub mod bcd;
pub mod error;
pub mod frame;
pub mod mode;

pub use bcd::{decode_frequency, encode_frequency};
pub use error::ParseError;
pub use frame::{build_frame, parse_frame, parse_last_frame, CivCodec, CivResponse};
pub use mode::OperatingMode;

/// CI-V frame preamble byte
pub const PREAMBLE: u8 = 0xFE;
/// CI-V frame terminator byte
pub const TERMINATOR: u8 = 0xFD;
/// Default controller address
pub const CONTROLLER_ADDR: u8 = 0xE0;
/// Default CI-V address of the IC-705
pub const DEFAULT_RADIO_ADDR: u8 = 0xA4;
/// Positive acknowledgement command code
pub const CMD_OK: u8 = 0xFB;
/// Negative acknowledgement command code
pub const CMD_NG: u8 = 0xFA;

/// Read operating frequency
pub const CMD_READ_FREQUENCY: u8 = 0x03;
/// Read operating mode
pub const CMD_READ_MODE: u8 = 0x04;
/// Set operating frequency
pub const CMD_SET_FREQUENCY: u8 = 0x05;
/// Set operating mode
pub const CMD_SET_MODE: u8 = 0x06;
/// Level settings (0x14), sub 0x03 = squelch level
pub const CMD_LEVEL: u8 = 0x14;
/// Read meters and status (0x15): sub 0x01 = squelch state, 0x02 = S-meter
pub const CMD_READ_STATUS: u8 = 0x15;
/// Squelch status subcommand
pub const SUB_SQUELCH_STATUS: u8 = 0x01;
/// S-meter subcommand
pub const SUB_S_METER: u8 = 0x02;
/// Squelch level subcommand (under CMD_LEVEL)
pub const SUB_SQUELCH_LEVEL: u8 = 0x03;

/// Minimum length of a valid frame: FE FE to from cmd FD
pub const MIN_FRAME_LEN: usize = 6;
