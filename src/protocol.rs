/// NDJSON records emitted by the monitor in JSON output mode.
///
/// One record per line. Uses `heapless` buffers and `serde-json-core` so the
/// library stays `no_std`/no-alloc.
use core::fmt::Write;

use heapless::{String, Vec};
use serde::Serialize;

use crate::decode::{DecodeError, MacFrame, SUMMARY_CAPACITY};
use crate::monitor::MonitorStats;

/// Rendered payload or error text carried in a record
pub type Detail = String<SUMMARY_CAPACITY>;

/// Records written to the output stream
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum MonitorMessage<'a> {
    /// A frame that passed validation
    #[serde(rename = "frame")]
    Frame {
        net: u8,
        src: u8,
        dest: u8,
        seq: u8,
        /// Frame type name, e.g. "REG_REQ" or "RESERVED0A"
        kind: &'static str,
        ar: bool,
        dp: bool,
        version: u8,
        /// Payload rendering, same text as the summary line's last column
        detail: &'a str,
        /// Raw frame length in bytes, CRC included
        len: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        ts: Option<&'a str>,
    },
    /// A frame rejected by the decoder
    #[serde(rename = "error")]
    Error {
        /// "frame_too_short", "crc" or "payload_too_short"
        reason: &'static str,
        detail: &'a str,
        len: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        ts: Option<&'a str>,
    },
    /// End-of-stream counters
    #[serde(rename = "status")]
    Status {
        stats: &'a MonitorStats,
        version: &'static str,
    },
}

impl<'a> MonitorMessage<'a> {
    /// Build the record for one decoder outcome. `detail` must come from
    /// [`render_detail`] for the same outcome.
    pub fn from_outcome(
        outcome: &Result<MacFrame<'_>, DecodeError>,
        len: usize,
        detail: &'a Detail,
        ts: Option<&'a str>,
    ) -> Self {
        match outcome {
            Ok(frame) => MonitorMessage::Frame {
                net: frame.header.net,
                src: frame.header.src,
                dest: frame.header.dest,
                seq: frame.header.seq,
                kind: frame.frame_type.name(),
                ar: frame.header.ack_request(),
                dp: frame.header.data_pending(),
                version: frame.header.version(),
                detail: detail.as_str(),
                len,
                ts,
            },
            Err(err) => MonitorMessage::Error {
                reason: err.reason(),
                detail: detail.as_str(),
                len,
                ts,
            },
        }
    }
}

/// Payload text for a decoded frame, message text for a rejected one.
pub fn render_detail(outcome: &Result<MacFrame<'_>, DecodeError>) -> Detail {
    let mut detail = Detail::new();
    let _ = match outcome {
        Ok(frame) => write!(detail, "{}", frame.payload),
        Err(err) => write!(detail, "{}", err),
    };
    detail
}

/// Library version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum size of a serialized JSON record. Fits a full-capacity detail
/// where every character needs JSON escaping.
pub const MAX_MSG_LEN: usize = 2 * SUMMARY_CAPACITY + 256;

/// Buffer type for serialized JSON records
pub type MsgBuffer = Vec<u8, MAX_MSG_LEN>;

/// Serialize a record to JSON and append the NDJSON newline.
/// Returns the number of bytes written, or None if `buf` is too small.
pub fn serialize_message(msg: &MonitorMessage, buf: &mut [u8]) -> Option<usize> {
    match serde_json_core::to_slice(msg, buf) {
        Ok(len) if len < buf.len() => {
            buf[len] = b'\n';
            Some(len + 1)
        }
        Ok(_) => None,
        Err(_) => None,
    }
}

/// Serialize one decoder outcome straight into a [`MsgBuffer`].
pub fn encode_outcome(
    outcome: &Result<MacFrame<'_>, DecodeError>,
    len: usize,
    ts: Option<&str>,
) -> Option<MsgBuffer> {
    let detail = render_detail(outcome);
    let msg = MonitorMessage::from_outcome(outcome, len, &detail, ts);
    encode(&msg)
}

/// Serialize any record into a [`MsgBuffer`].
pub fn encode(msg: &MonitorMessage) -> Option<MsgBuffer> {
    let mut buf = MsgBuffer::new();
    buf.resize_default(MAX_MSG_LEN).ok()?;
    let len = serialize_message(msg, &mut buf)?;
    buf.truncate(len);
    Some(buf)
}
