/// MAC frame decoder.
///
/// Validates one raw frame (size, CRC, declared length), parses the header,
/// dispatches the payload on the frame type and renders a one-line summary:
///
/// ```text
/// [NN] SS->DD (QQ) AR DP :      REG_REQ : UUID=1122334455667788 HEARTBEAT=32 secs
/// ```
///
/// Stateless; safe to call from any thread.
use core::fmt::{self, Write};

use heapless::String;
use thiserror::Error;

use crate::checksum::{crc16_xmodem, split_trailer, CRC_LEN};
use crate::mac::{FrameType, MacHeader, HEADER_LEN};
use crate::payload::Payload;

/// Smallest frame that can be decoded: header plus CRC trailer
pub const MIN_FRAME_LEN: usize = HEADER_LEN + CRC_LEN;

/// Capacity of a rendered summary line. Fits the worst case: a maximum
/// length SYSLOG frame made entirely of escaped control characters.
pub const SUMMARY_CAPACITY: usize = 1536;

/// A rendered summary line
pub type Summary = String<SUMMARY_CAPACITY>;

/// Reasons a frame is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Packet too short ({len} bytes)")]
    FrameTooShort { len: usize },
    #[error("CRC error (received {received:04X}, computed {computed:04X})")]
    CrcError { received: u16, computed: u16 },
    #[error("Payload too short (length byte declares {declared} bytes, got {len})")]
    PayloadTooShort { declared: usize, len: usize },
}

impl DecodeError {
    /// Short machine-readable reason
    pub fn reason(&self) -> &'static str {
        match self {
            DecodeError::FrameTooShort { .. } => "frame_too_short",
            DecodeError::CrcError { .. } => "crc",
            DecodeError::PayloadTooShort { .. } => "payload_too_short",
        }
    }
}

/// A validated, decoded frame borrowing from the raw bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacFrame<'a> {
    pub header: MacHeader,
    pub frame_type: FrameType,
    pub payload: Payload<'a>,
}

/// Validate and decode one raw frame.
pub fn decode(frame: &[u8]) -> Result<MacFrame<'_>, DecodeError> {
    if frame.len() < MIN_FRAME_LEN {
        return Err(DecodeError::FrameTooShort { len: frame.len() });
    }

    let (body, received) =
        split_trailer(frame).ok_or(DecodeError::FrameTooShort { len: frame.len() })?;
    let computed = crc16_xmodem(body);
    if computed != received {
        return Err(DecodeError::CrcError { received, computed });
    }

    let header = MacHeader::parse(body).ok_or(DecodeError::FrameTooShort { len: frame.len() })?;
    if frame.len() < header.declared_frame_len() {
        return Err(DecodeError::PayloadTooShort {
            declared: header.declared_frame_len(),
            len: frame.len(),
        });
    }

    let frame_type = header.frame_type();
    let payload = Payload::parse(frame_type, &body[HEADER_LEN..]);

    Ok(MacFrame {
        header,
        frame_type,
        payload,
    })
}

impl fmt::Display for MacFrame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = &self.header;
        write!(
            f,
            "[{:02X}] {:02X}->{:02X} ({:02X}) {} {} : {:>12} : {}",
            h.net,
            h.src,
            h.dest,
            h.seq,
            if h.ack_request() { "AR" } else { "  " },
            if h.data_pending() { "DP" } else { "  " },
            self.frame_type.name(),
            self.payload
        )
    }
}

/// Decode and render a frame, surfacing any validation error.
pub fn format_frame(frame: &[u8]) -> Result<Summary, DecodeError> {
    let decoded = decode(frame)?;
    let mut line = Summary::new();
    let _ = write!(line, "{}", decoded);
    Ok(line)
}

/// Decode and render a frame. Never fails: a rejected frame renders as its
/// error message.
pub fn summarize(frame: &[u8]) -> Summary {
    format_frame(frame).unwrap_or_else(|err| {
        log::debug!("Rejected {}-byte frame: {}", frame.len(), err);
        let mut line = Summary::new();
        let _ = write!(line, "{}", err);
        line
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{PayloadError, RegRequest};
    use crate::testutil::{build_frame, build_valid_frame};

    const REG_REQ_HEADER: MacHeader = MacHeader {
        length: 0x0D,
        flags: 0x04,
        net: 0x00,
        dest: 0x03,
        src: 0x02,
        seq: 0x01,
    };

    const REG_REQ_PAYLOAD: [u8; 10] = [0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11, 0x05, 0x00];

    fn header(flags: u16) -> MacHeader {
        MacHeader {
            length: 0,
            flags,
            net: 0x5A,
            dest: 0xFF,
            src: 0x01,
            seq: 0x7E,
        }
    }

    // ── Scenarios ───────────────────────────────────────────────────

    #[test]
    fn reg_request_scenario() {
        let frame = build_frame(&REG_REQ_HEADER, &REG_REQ_PAYLOAD);
        assert_eq!(frame.len(), 19);

        let decoded = decode(&frame).unwrap();
        assert_eq!(decoded.frame_type, FrameType::RegRequest);
        assert_eq!(
            decoded.payload,
            Payload::RegRequest(RegRequest {
                uuid: 0x1122334455667788,
                flags: 0x0005,
            })
        );

        let line = format_frame(&frame).unwrap();
        assert_eq!(
            line.as_str(),
            "[00] 02->03 (01)       :      REG_REQ : UUID=1122334455667788 HEARTBEAT=32 secs"
        );
        assert!(!line.contains("(SLEEPY)"));
    }

    #[test]
    fn reg_request_with_bad_crc() {
        let mut frame = build_frame(&REG_REQ_HEADER, &REG_REQ_PAYLOAD);
        let n = frame.len();
        frame[n - 2] = 0xAA;
        frame[n - 1] = 0xBB;

        let err = decode(&frame).unwrap_err();
        assert!(matches!(err, DecodeError::CrcError { received: 0xAABB, .. }));
        assert_eq!(err.reason(), "crc");
        assert!(summarize(&frame).starts_with("CRC error (received AABB, computed "));
    }

    // ── Validation ──────────────────────────────────────────────────

    #[test]
    fn rejects_short_frames() {
        for len in 0..MIN_FRAME_LEN {
            let frame = std::vec![0u8; len];
            assert_eq!(decode(&frame), Err(DecodeError::FrameTooShort { len }));
        }
        assert_eq!(summarize(&[0x01, 0x02]).as_str(), "Packet too short (2 bytes)");
    }

    #[test]
    fn header_only_frame_is_accepted() {
        let frame = build_valid_frame(&header(0x03), &[]);
        assert_eq!(frame.len(), MIN_FRAME_LEN);
        let decoded = decode(&frame).unwrap();
        assert_eq!(decoded.payload, Payload::Empty);
    }

    #[test]
    fn rejects_length_byte_beyond_frame() {
        let h = MacHeader {
            length: 0x20,
            ..header(0x10)
        };
        let frame = build_frame(&h, &[1, 2, 3]);
        assert_eq!(
            decode(&frame),
            Err(DecodeError::PayloadTooShort {
                declared: 0x23,
                len: 12
            })
        );
        assert!(summarize(&frame).starts_with("Payload too short"));
    }

    #[test]
    fn crc_checked_before_length() {
        let h = MacHeader {
            length: 0xF0,
            ..header(0x10)
        };
        let mut frame = build_frame(&h, &[1, 2, 3]);
        frame[7] ^= 0x01;
        assert!(matches!(decode(&frame), Err(DecodeError::CrcError { .. })));
    }

    // ── Rendering ───────────────────────────────────────────────────

    #[test]
    fn renders_ar_and_dp_tags() {
        let frame = build_valid_frame(&header(0x03 | 0x40 | 0x80), &[]);
        assert_eq!(
            summarize(&frame).as_str(),
            "[5A] 01->FF (7E) AR DP :          ACK : "
        );

        let frame = build_valid_frame(&header(0x03 | 0x80), &[]);
        assert_eq!(
            summarize(&frame).as_str(),
            "[5A] 01->FF (7E)    DP :          ACK : "
        );
    }

    #[test]
    fn every_type_renders() {
        let payload = [0xC0, 0xFF, 0xEE];
        for t in FrameType::ALL {
            let frame = build_valid_frame(&header(t.code() as u16), &payload);
            let line = format_frame(&frame).unwrap();
            let expected_name = std::format!(" : {:>12} : ", t.name());
            assert!(line.contains(expected_name.as_str()), "{}", line);
            if t.is_reserved() {
                assert!(line.ends_with(" : c0ffee"), "{}", line);
            }
        }
    }

    #[test]
    fn undecodable_payload_renders_hex() {
        let frame = build_valid_frame(&header(0x06), &[0x01, 0x02, 0x03]);
        let decoded = decode(&frame).unwrap();
        assert!(matches!(
            decoded.payload,
            Payload::Undecodable {
                error: PayloadError::TooShort { needed: 10, len: 3, .. },
                ..
            }
        ));
        assert!(summarize(&frame).ends_with("REG_ACK : 010203"));
    }

    #[test]
    fn largest_syslog_fits_summary() {
        let payload = [0x1Fu8; 249];
        let frame = build_valid_frame(&header(0x1E), &payload);
        assert_eq!(frame.len(), 258);
        let line = format_frame(&frame).unwrap();
        assert!(line.ends_with("\\u{1f}"));
        assert_eq!(line.matches("\\u{1f}").count(), 248);
    }
}
