//! Output sink: one summary line (text) or one NDJSON record (json) per frame.

use std::io::{self, Write};

use clap::ValueEnum;
use tinymon::protocol::{self, MonitorMessage, VERSION};
use tinymon::{DecodeError, MacFrame, MonitorStats};

/// Timestamp layout for text lines and the `ts` field
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Human-readable summary lines
    Text,
    /// Newline-delimited JSON records
    Json,
}

pub struct Output<W: Write> {
    out: W,
    format: Format,
    timestamps: bool,
}

impl<W: Write> Output<W> {
    pub fn new(out: W, format: Format, timestamps: bool) -> Self {
        Self {
            out,
            format,
            timestamps,
        }
    }

    /// Write one completed frame.
    pub fn frame(
        &mut self,
        raw: &[u8],
        outcome: &Result<MacFrame<'_>, DecodeError>,
    ) -> io::Result<()> {
        let ts = self.timestamps.then(timestamp);
        match self.format {
            Format::Text => {
                if let Some(ts) = &ts {
                    write!(self.out, "{}: ", ts)?;
                }
                match outcome {
                    Ok(frame) => writeln!(self.out, "{}", frame),
                    Err(err) => writeln!(self.out, "{}", err),
                }
            }
            Format::Json => match protocol::encode_outcome(outcome, raw.len(), ts.as_deref()) {
                Some(record) => self.out.write_all(&record),
                None => {
                    log::warn!(
                        "Dropped record for {}-byte frame: does not fit message buffer",
                        raw.len()
                    );
                    Ok(())
                }
            },
        }
    }

    /// Write end-of-stream counters. Text mode only logs them.
    pub fn status(&mut self, stats: &MonitorStats) -> io::Result<()> {
        log::info!(
            "{} symbols, {} sync pulses, {} frames: {} decoded, {} CRC errors, {} short, \
             {} short payload, {} abandoned, {} filtered",
            stats.symbols,
            stats.sync_pulses,
            stats.frames,
            stats.decoded,
            stats.crc_errors,
            stats.short_frames,
            stats.short_payloads,
            stats.abandoned,
            stats.filtered,
        );
        if self.format == Format::Json {
            let msg = MonitorMessage::Status {
                stats,
                version: VERSION,
            };
            if let Some(record) = protocol::encode(&msg) {
                self.out.write_all(&record)?;
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

/// Local wall-clock time with microseconds
fn timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinymon::checksum::crc16_xmodem;
    use tinymon::decode;

    fn reg_request() -> Vec<u8> {
        let mut frame = vec![
            0x0D, 0x04, 0x00, 0x00, 0x03, 0x02, 0x01, // header
            0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11, 0x05, 0x00,
        ];
        let crc = crc16_xmodem(&frame);
        frame.extend_from_slice(&crc.to_be_bytes());
        frame
    }

    fn render(format: Format, timestamps: bool, raw: &[u8]) -> String {
        let mut output = Output::new(Vec::new(), format, timestamps);
        output.frame(raw, &decode(raw)).unwrap();
        String::from_utf8(output.into_inner()).unwrap()
    }

    #[test]
    fn text_line() {
        assert_eq!(
            render(Format::Text, false, &reg_request()),
            "[00] 02->03 (01)       :      REG_REQ : UUID=1122334455667788 HEARTBEAT=32 secs\n"
        );
        assert_eq!(render(Format::Text, false, &[0x01]), "Packet too short (1 bytes)\n");
    }

    #[test]
    fn text_line_with_timestamp() {
        let line = render(Format::Text, true, &reg_request());
        // "YYYY-MM-DD HH:MM:SS.ffffff: "
        let (ts, rest) = line.split_at(28);
        assert!(ts.ends_with(": "));
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], " ");
        assert_eq!(&ts[19..20], ".");
        assert!(rest.starts_with("[00] 02->03 (01)"));
    }

    #[test]
    fn json_record() {
        let line = render(Format::Json, false, &reg_request());
        let head = r#"{"type":"frame","net":0,"src":2,"dest":3,"seq":1,"kind":"REG_REQ""#;
        assert!(line.starts_with(head));
        assert!(line.ends_with("\"len\":19}\n"));
    }

    #[test]
    fn json_record_with_timestamp() {
        let line = render(Format::Json, true, &reg_request());
        assert!(line.contains(r#","ts":""#));
    }

    #[test]
    fn status_only_written_in_json_mode() {
        let stats = MonitorStats {
            frames: 4,
            ..MonitorStats::default()
        };

        let mut text = Output::new(Vec::new(), Format::Text, false);
        text.status(&stats).unwrap();
        assert!(text.into_inner().is_empty());

        let mut json = Output::new(Vec::new(), Format::Json, false);
        json.status(&stats).unwrap();
        let record = String::from_utf8(json.into_inner()).unwrap();
        assert!(record.starts_with(r#"{"type":"status","stats":{"#));
        assert!(record.contains(r#""frames":4"#));
    }
}
