//! CI-V frame building and parsing

use crate::error::ParseError;
use crate::{CMD_NG, CMD_OK, CONTROLLER_ADDR, MIN_FRAME_LEN, PREAMBLE, TERMINATOR};

/// Maximum frame length (reasonable limit)
const MAX_FRAME_LEN: usize = 64;

/// A parsed CI-V frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CivResponse {
    /// Destination address
    pub to: u8,
    /// Source address
    pub from: u8,
    /// Command code
    pub cmd: u8,
    /// Everything between the command byte and the terminator, including any
    /// subcommand byte
    pub data: Vec<u8>,
}

impl CivResponse {
    /// True when this frame is a positive acknowledgement (0xFB)
    pub fn is_ack(&self) -> bool {
        self.cmd == CMD_OK
    }

    /// True when this frame is a negative acknowledgement (0xFA)
    pub fn is_nak(&self) -> bool {
        self.cmd == CMD_NG
    }
}

/// Build a controller-to-radio CI-V frame.
///
/// Produces `FE FE radio_addr E0 cmd [subcmd] data… FD`. A subcommand of
/// `Some(0x00)` is treated as absent: no public IC-705 command uses 0x00 as a
/// non-null subcommand byte, so the omission is unambiguous.
pub fn build_frame(radio_addr: u8, cmd: u8, subcmd: Option<u8>, data: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(MIN_FRAME_LEN + 1 + data.len());
    frame.push(PREAMBLE);
    frame.push(PREAMBLE);
    frame.push(radio_addr);
    frame.push(CONTROLLER_ADDR);
    frame.push(cmd);
    match subcmd {
        Some(0x00) | None => {}
        Some(sc) => frame.push(sc),
    }
    frame.extend_from_slice(data);
    frame.push(TERMINATOR);
    frame
}

/// Parse the first complete CI-V frame in `buf`.
///
/// Scans for the first `FE FE` prefix, skips any further preamble bytes the
/// half-duplex bus may have inserted, then takes everything up to the first
/// `FD`. Returns `None` when either sentinel is missing or the frame is
/// shorter than the 6-byte minimum; callers interpret that as "incomplete".
pub fn parse_frame(buf: &[u8]) -> Option<CivResponse> {
    parse_from(buf).map(|(resp, _)| resp)
}

/// Parse the last complete CI-V frame in `buf`.
///
/// The bus echoes every command the controller writes, so a response buffer
/// often holds the echoed frame followed by the radio's reply. The reply is
/// always the later frame.
pub fn parse_last_frame(buf: &[u8]) -> Option<CivResponse> {
    let mut rest = buf;
    let mut last = None;
    while let Some((resp, consumed)) = parse_from(rest) {
        last = Some(resp);
        rest = &rest[consumed..];
    }
    last
}

/// Parse one frame starting anywhere in `buf`; returns the frame and the
/// number of bytes consumed up to and including its terminator.
fn parse_from(buf: &[u8]) -> Option<(CivResponse, usize)> {
    let preamble = buf
        .windows(2)
        .position(|w| w[0] == PREAMBLE && w[1] == PREAMBLE)?;

    // Collision recovery on the bus pads with extra FE bytes; the destination
    // address is the first non-preamble byte.
    let mut body = preamble + 2;
    while body < buf.len() && buf[body] == PREAMBLE {
        body += 1;
    }

    // Need to, from, cmd before the terminator.
    if body + 3 > buf.len() {
        return None;
    }
    let term = buf[body + 3..].iter().position(|&b| b == TERMINATOR)? + body + 3;

    Some((
        CivResponse {
            to: buf[body],
            from: buf[body + 1],
            cmd: buf[body + 2],
            data: buf[body + 3..term].to_vec(),
        },
        term + 1,
    ))
}

/// Validate a buffer that is expected to hold exactly one frame.
fn parse_exact(frame: &[u8]) -> Result<CivResponse, ParseError> {
    if frame.len() < MIN_FRAME_LEN {
        return Err(ParseError::Incomplete {
            needed: MIN_FRAME_LEN - frame.len(),
        });
    }
    if frame[0] != PREAMBLE || frame[1] != PREAMBLE {
        return Err(ParseError::InvalidFrame("missing preamble".into()));
    }
    if frame[frame.len() - 1] != TERMINATOR {
        return Err(ParseError::InvalidFrame("missing terminator".into()));
    }
    parse_frame(frame).ok_or_else(|| ParseError::InvalidFrame("unparseable frame".into()))
}

/// Streaming CI-V frame extractor.
///
/// Accumulates raw serial bytes and yields complete frames as they arrive.
/// Partial frames stay buffered; garbage before a preamble is discarded.
#[derive(Debug, Default)]
pub struct CivCodec {
    buffer: Vec<u8>,
}

impl CivCodec {
    /// Create a new codec with an empty buffer
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(MAX_FRAME_LEN),
        }
    }

    /// Push raw bytes into the codec's buffer
    pub fn push_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);

        // Prevent unbounded growth when the stream never frames up
        if self.buffer.len() > MAX_FRAME_LEN * 4 {
            let start = self.buffer.len() - MAX_FRAME_LEN;
            self.buffer.drain(..start);
        }
    }

    /// Try to extract the next complete frame from the buffer
    pub fn next_frame(&mut self) -> Option<CivResponse> {
        let preamble = self
            .buffer
            .windows(2)
            .position(|w| w[0] == PREAMBLE && w[1] == PREAMBLE)?;
        if preamble > 0 {
            self.buffer.drain(..preamble);
        }

        let term = self.buffer.iter().position(|&b| b == TERMINATOR)?;
        let frame: Vec<u8> = self.buffer.drain(..=term).collect();

        match parse_exact(&frame) {
            Ok(resp) => Some(resp),
            Err(e) => {
                tracing::warn!("discarding unparseable CI-V frame: {e}");
                None
            }
        }
    }

    /// Clear the internal buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode_frequency, CMD_READ_FREQUENCY, DEFAULT_RADIO_ADDR};
    use proptest::prelude::*;

    #[test]
    fn build_read_frequency() {
        let frame = build_frame(DEFAULT_RADIO_ADDR, CMD_READ_FREQUENCY, None, &[]);
        assert_eq!(frame, vec![0xFE, 0xFE, 0xA4, 0xE0, 0x03, 0xFD]);
    }

    #[test]
    fn build_treats_zero_subcmd_as_absent() {
        let with_zero = build_frame(0xA4, 0x03, Some(0x00), &[]);
        let without = build_frame(0xA4, 0x03, None, &[]);
        assert_eq!(with_zero, without);
    }

    #[test]
    fn build_with_subcmd_and_data() {
        let frame = build_frame(0xA4, 0x15, Some(0x01), &[]);
        assert_eq!(frame, vec![0xFE, 0xFE, 0xA4, 0xE0, 0x15, 0x01, 0xFD]);
    }

    #[test]
    fn parse_frequency_response() {
        let buf = [
            0xFE, 0xFE, 0xE0, 0xA4, 0x03, 0x00, 0x00, 0x50, 0x44, 0x01, 0xFD,
        ];
        let resp = parse_frame(&buf).unwrap();
        assert_eq!(resp.to, 0xE0);
        assert_eq!(resp.from, 0xA4);
        assert_eq!(resp.cmd, 0x03);
        assert_eq!(decode_frequency(&resp.data), 144_500_000);
    }

    #[test]
    fn parse_squelch_status() {
        let open = parse_frame(&[0xFE, 0xFE, 0xE0, 0xA4, 0x15, 0x01, 0x01, 0xFD]).unwrap();
        assert_eq!(open.cmd, 0x15);
        assert_eq!(open.data, vec![0x01, 0x01]);

        let closed = parse_frame(&[0xFE, 0xFE, 0xE0, 0xA4, 0x15, 0x01, 0x00, 0xFD]).unwrap();
        assert_eq!(closed.data, vec![0x01, 0x00]);
    }

    #[test]
    fn parse_missing_terminator_is_none() {
        assert_eq!(parse_frame(&[0xFE, 0xFE, 0xE0, 0xA4, 0x03]), None);
    }

    #[test]
    fn parse_missing_preamble_is_none() {
        assert_eq!(parse_frame(&[0xE0, 0xA4, 0x03, 0xFD]), None);
    }

    #[test]
    fn parse_skips_extra_preamble_bytes() {
        let resp = parse_frame(&[0xFE, 0xFE, 0xFE, 0xE0, 0xA4, 0xFB, 0xFD]).unwrap();
        assert_eq!(resp.to, 0xE0);
        assert!(resp.is_ack());
    }

    #[test]
    fn parse_last_frame_skips_echo() {
        // Echoed command followed by the radio's reply, as seen on the
        // half-duplex bus.
        let mut buf = build_frame(0xA4, 0x03, None, &[]);
        buf.extend_from_slice(&[
            0xFE, 0xFE, 0xE0, 0xA4, 0x03, 0x00, 0x00, 0x25, 0x14, 0x00, 0xFD,
        ]);
        let resp = parse_last_frame(&buf).unwrap();
        assert_eq!(resp.from, 0xA4);
        assert_eq!(decode_frequency(&resp.data), 14_250_000);
    }

    #[test]
    fn parse_last_frame_with_only_reply() {
        let buf = [0xFE, 0xFE, 0xE0, 0xA4, 0xFB, 0xFD];
        let resp = parse_last_frame(&buf).unwrap();
        assert!(resp.is_ack());
    }

    #[test]
    fn streaming_parse_across_pushes() {
        let mut codec = CivCodec::new();
        codec.push_bytes(&[0xFE, 0xFE, 0xE0, 0xA4]);
        assert!(codec.next_frame().is_none());

        codec.push_bytes(&[0xFB, 0xFD]);
        let resp = codec.next_frame().unwrap();
        assert!(resp.is_ack());
    }

    #[test]
    fn streaming_discards_leading_garbage() {
        let mut codec = CivCodec::new();
        codec.push_bytes(&[0x42, 0x00, 0xFE, 0xFE, 0xE0, 0xA4, 0xFA, 0xFD]);
        let resp = codec.next_frame().unwrap();
        assert!(resp.is_nak());
    }

    proptest! {
        #[test]
        fn parse_of_built_frame_roundtrips(
            radio_addr in 0x01u8..=0xDF,
            cmd in 0x01u8..=0x1F,
            subcmd in proptest::option::of(0x01u8..=0x05),
            data in proptest::collection::vec(0x00u8..=0xFC, 0..8),
        ) {
            let frame = build_frame(radio_addr, cmd, subcmd, &data);
            let resp = parse_frame(&frame).unwrap();
            prop_assert_eq!(resp.to, radio_addr);
            prop_assert_eq!(resp.from, CONTROLLER_ADDR);
            prop_assert_eq!(resp.cmd, cmd);
            let mut expected = Vec::new();
            if let Some(sc) = subcmd {
                expected.push(sc);
            }
            expected.extend_from_slice(&data);
            prop_assert_eq!(resp.data, expected);
        }

        #[test]
        fn parse_never_panics(buf in proptest::collection::vec(any::<u8>(), 0..64)) {
            let _ = parse_frame(&buf);
            let _ = parse_last_frame(&buf);
        }
    }
}
