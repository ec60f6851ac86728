//! tinymon: host-side TinyHAN MAC monitor
//!
//! Thread-based: a reader thread pulls demodulator symbols (one byte per bit)
//! from a file, stdin or a UDP socket and sends them in chunks over a bounded
//! `std::sync::mpsc` channel. The main thread owns the monitor and writes
//! one line per frame, so frames come out strictly in stream order.

mod output;
mod source;

use std::io::{self, BufWriter};
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use clap::Parser;
use tinymon::protocol::VERSION;
use tinymon::{FilterConfig, FrameType, Monitor};

use output::{Format, Output};
use source::Source;

#[derive(Parser, Debug)]
#[command(
    name = "tinymon",
    version,
    about = "Decode TinyHAN MAC frames from a demodulated bit stream"
)]
struct Args {
    /// Symbol file, or `-` for stdin
    #[arg(default_value = "-")]
    input: String,

    /// Receive symbols as UDP datagrams on this address instead
    #[arg(long, value_name = "ADDR")]
    udp: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Only show frames for this network id (decimal or 0x-prefixed hex)
    #[arg(long, value_parser = parse_u8)]
    net: Option<u8>,

    /// Only show these frame types, e.g. BEACON, REG_REQ, RESERVED0A (repeatable)
    #[arg(long = "type", value_name = "TYPE", value_parser = parse_frame_type)]
    types: Vec<FrameType>,

    /// Do not show frames rejected by the decoder
    #[arg(long)]
    hide_errors: bool,

    /// Do not prefix lines with the local time
    #[arg(long)]
    no_timestamp: bool,

    /// Symbols per read from a file or stdin
    #[arg(long, default_value_t = 4096)]
    chunk_size: usize,

    /// Chunks buffered between the reader thread and the decoder
    #[arg(long, default_value_t = 16)]
    queue_depth: usize,
}

fn parse_u8(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid network id '{}': {}", s, e))
}

fn parse_frame_type(s: &str) -> Result<FrameType, String> {
    FrameType::from_name(s).ok_or_else(|| format!("unknown frame type '{}'", s))
}

impl Args {
    fn filter(&self) -> FilterConfig {
        FilterConfig {
            net: self.net,
            show_errors: !self.hide_errors,
            ..FilterConfig::new()
        }
        .only_types(&self.types)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    anyhow::ensure!(args.chunk_size > 0, "--chunk-size must be at least 1");
    anyhow::ensure!(args.queue_depth > 0, "--queue-depth must be at least 1");

    log::info!("tinymon v{} starting", VERSION);

    let source = Source::open(&args.input, args.udp.as_deref())?;
    let chunk_size = source.chunk_size(args.chunk_size);

    // ── Reader thread ────────────────────────────────────────────────

    let (tx, rx) = mpsc::sync_channel::<Vec<u8>>(args.queue_depth);
    let reader = thread::Builder::new()
        .name("reader".into())
        .spawn(move || source::pump(source, chunk_size, tx))
        .context("cannot spawn reader thread")?;

    // ── Monitor loop ─────────────────────────────────────────────────

    let mut monitor = Monitor::new(args.filter());
    log::debug!("Filter: {:?}", monitor.filter());
    let stdout = BufWriter::new(io::stdout().lock());
    let mut output = Output::new(stdout, args.format, !args.no_timestamp);

    let mut write_err = None;
    let mut output_closed = false;
    while let Ok(chunk) = rx.recv() {
        monitor.feed_bytes(&chunk, &mut |raw, outcome| {
            if write_err.is_none() {
                if let Err(e) = output.frame(raw, outcome) {
                    write_err = Some(e);
                }
            }
        });
        if let Some(e) = write_err.take().map_or_else(|| output.flush().err(), Some) {
            if e.kind() == io::ErrorKind::BrokenPipe {
                log::info!("Output closed");
                output_closed = true;
                break;
            }
            return Err(e).context("cannot write output");
        }
    }

    let stats = monitor.finish();

    if output_closed {
        // The reader may be blocked on stdin or a socket; do not wait for it.
        log::info!("{} frames decoded before output closed", stats.decoded);
        return Ok(());
    }

    // Counters are written even for a failed capture; the exit status tells.
    let input = reader_result(reader.join());
    output.status(&stats)?;
    output.flush()?;

    let total = input?;
    log::debug!("Reader forwarded {} symbols", total);
    Ok(())
}

/// Turn the joined reader thread into the run's input verdict.
fn reader_result(joined: thread::Result<io::Result<u64>>) -> anyhow::Result<u64> {
    match joined {
        Ok(Ok(total)) => Ok(total),
        Ok(Err(e)) => {
            log::error!("Input error: {}", e);
            Err(e).context("cannot read input")
        }
        Err(_) => anyhow::bail!("reader thread panicked"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_end_of_stream_is_success() {
        assert_eq!(reader_result(Ok(Ok(4096))).unwrap(), 4096);
    }

    #[test]
    fn input_error_fails_the_run() {
        let joined: thread::Result<io::Result<u64>> = Ok(Err(io::Error::from_raw_os_error(21)));
        let err = reader_result(joined).unwrap_err();
        assert_eq!(err.to_string(), "cannot read input");
        assert!(err.downcast_ref::<io::Error>().is_some());
    }

    #[test]
    fn reader_panic_fails_the_run() {
        let joined = thread::spawn(|| -> io::Result<u64> { panic!("reader") }).join();
        assert!(reader_result(joined).is_err());
    }

    #[test]
    fn filter_from_args() {
        let args = Args::parse_from([
            "tinymon",
            "--net",
            "0x21",
            "--type",
            "beacon",
            "--hide-errors",
        ]);
        let filter = args.filter();
        assert_eq!(filter.net, Some(0x21));
        assert!(filter.allows_type(FrameType::Beacon));
        assert!(!filter.allows_type(FrameType::Ack));
        assert!(!filter.show_errors);
    }
}
