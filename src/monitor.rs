/// Monitor pipeline: synchronizer, decoder, filter and counters.
///
/// The sink is called synchronously for every completed frame, so frame N
/// is decoded and handed off before any symbol of frame N+1 is accepted.
/// The raw frame is only borrowed by the sink for the duration of the call.
use serde::Serialize;

use crate::decode::{decode, DecodeError, MacFrame};
use crate::filter::FilterConfig;
use crate::sync::{FrameSync, Symbol};

/// Running counters for one monitoring session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonitorStats {
    pub symbols: u64,
    pub sync_pulses: u64,
    pub frames: u64,
    pub decoded: u64,
    pub crc_errors: u64,
    pub short_frames: u64,
    pub short_payloads: u64,
    pub abandoned: u64,
    pub filtered: u64,
}

impl MonitorStats {
    pub const fn new() -> Self {
        Self {
            symbols: 0,
            sync_pulses: 0,
            frames: 0,
            decoded: 0,
            crc_errors: 0,
            short_frames: 0,
            short_payloads: 0,
            abandoned: 0,
            filtered: 0,
        }
    }

    /// Count one decoder outcome.
    pub fn record(&mut self, outcome: &Result<MacFrame<'_>, DecodeError>) {
        self.frames += 1;
        match outcome {
            Ok(_) => self.decoded += 1,
            Err(DecodeError::CrcError { .. }) => self.crc_errors += 1,
            Err(DecodeError::FrameTooShort { .. }) => self.short_frames += 1,
            Err(DecodeError::PayloadTooShort { .. }) => self.short_payloads += 1,
        }
    }
}

/// Single-consumer monitor loop state.
#[derive(Debug, Clone, Default)]
pub struct Monitor {
    sync: FrameSync,
    filter: FilterConfig,
    stats: MonitorStats,
}

impl Monitor {
    pub const fn new(filter: FilterConfig) -> Self {
        Self {
            sync: FrameSync::new(),
            filter,
            stats: MonitorStats::new(),
        }
    }

    /// Feed one raw demodulator byte. `sink` receives the raw frame and the
    /// decoder outcome for every completed frame that passes the filter.
    pub fn feed<F>(&mut self, raw: u8, sink: &mut F)
    where
        F: FnMut(&[u8], &Result<MacFrame<'_>, DecodeError>),
    {
        self.stats.symbols += 1;
        let Some(frame) = self.sync.feed(Symbol::from(raw)) else {
            return;
        };

        let outcome = decode(&frame);
        self.stats.record(&outcome);
        if let Err(err) = &outcome {
            log::debug!("Rejected {}-byte frame: {}", frame.len(), err);
        }

        if self.filter.accepts(&outcome) {
            sink(frame.as_slice(), &outcome);
        } else {
            self.stats.filtered += 1;
        }
    }

    /// Feed a chunk of raw demodulator bytes in order.
    pub fn feed_bytes<F>(&mut self, chunk: &[u8], sink: &mut F)
    where
        F: FnMut(&[u8], &Result<MacFrame<'_>, DecodeError>),
    {
        for &raw in chunk {
            self.feed(raw, sink);
        }
    }

    /// End of stream. Any partial frame is dropped, never reported.
    pub fn finish(&mut self) -> MonitorStats {
        if self.sync.reset() {
            log::debug!("Stream ended inside a frame; partial frame dropped");
        }
        self.stats()
    }

    /// Snapshot of the counters, including synchronizer totals.
    pub fn stats(&self) -> MonitorStats {
        MonitorStats {
            sync_pulses: self.sync.sync_pulses(),
            abandoned: self.sync.abandoned(),
            ..self.stats
        }
    }

    pub fn filter(&self) -> &FilterConfig {
        &self.filter
    }
}
