//! tinymon library: portable TinyHAN MAC-layer monitor.
//!
//! Turns the output of a GFSK demodulator (one byte per recovered bit, with a
//! sync flag raised on every preamble match) into decoded TinyHAN MAC frames.
//! Everything here is `no_std`, allocation-free and testable on any host with
//! `cargo test`. The `tinymon-std` binary is a thin consumer that provides the
//! symbol source, threads and output sink.
//!
//! - `sync`: bit-stream frame synchronizer
//! - `checksum`, `mac`, `payload`, `decode`: frame validation and rendering
//! - `filter`, `monitor`: per-frame filtering, counters and the feed loop
//! - `protocol`: NDJSON output records

#![cfg_attr(not(test), no_std)]

pub mod checksum;
pub mod decode;
pub mod filter;
pub mod mac;
pub mod monitor;
pub mod payload;
pub mod protocol;
pub mod sync;

#[cfg(test)]
mod testutil;

pub use decode::{decode, format_frame, summarize, DecodeError, MacFrame};
pub use filter::FilterConfig;
pub use mac::{FrameType, MacHeader};
pub use monitor::{Monitor, MonitorStats};
pub use sync::{FrameSync, RawFrame, Symbol};
