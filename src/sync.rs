/// Bit-stream frame synchronizer.
///
/// The demodulator delivers one byte per recovered bit: bit 0 is the data
/// bit, bit 1 is raised once per detected preamble/sync-word match. This
/// module turns that stream into length-delimited raw frames.
///
/// Two states: unsynced (bits are shifted but not collected) and synced
/// (bits are packed MSB-first into bytes). A sync pulse always restarts
/// collection, abandoning whatever partial frame was in progress. The first
/// collected byte is the length byte `L`; the frame is complete once `L + 3`
/// bytes have been collected.
use heapless::Vec;

use crate::mac::LENGTH_OVERHEAD;

/// Largest frame the length byte can describe (255 + length byte + CRC)
pub const MAX_FRAME_LEN: usize = u8::MAX as usize + LENGTH_OVERHEAD;

/// A complete, not yet validated frame
pub type RawFrame = Vec<u8, MAX_FRAME_LEN>;

const DATA_BIT: u8 = 1 << 0;
const SYNC_BIT: u8 = 1 << 1;

/// One demodulator output unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub data: bool,
    pub sync: bool,
}

impl From<u8> for Symbol {
    /// Only bits 0 (data) and 1 (sync) are meaningful.
    fn from(raw: u8) -> Self {
        Self {
            data: raw & DATA_BIT != 0,
            sync: raw & SYNC_BIT != 0,
        }
    }
}

/// Frame synchronizer state machine.
#[derive(Debug, Clone)]
pub struct FrameSync {
    shift: u8,
    synced: bool,
    bit_count: u8,
    byte_count: usize,
    declared_len: usize,
    buf: RawFrame,
    sync_pulses: u64,
    frames: u64,
    abandoned: u64,
}

impl Default for FrameSync {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSync {
    pub const fn new() -> Self {
        Self {
            shift: 0,
            synced: false,
            bit_count: 0,
            byte_count: 0,
            declared_len: 0,
            buf: Vec::new(),
            sync_pulses: 0,
            frames: 0,
            abandoned: 0,
        }
    }

    /// Feed one symbol. Returns a raw frame when this symbol completes one.
    pub fn feed(&mut self, symbol: Symbol) -> Option<RawFrame> {
        self.shift = (self.shift << 1) | symbol.data as u8;

        if symbol.sync {
            self.sync_pulses += 1;
            if self.synced && (self.byte_count > 0 || self.bit_count > 0) {
                self.abandoned += 1;
                log::debug!(
                    "Sync pulse abandoned partial frame ({} of {} bytes)",
                    self.byte_count,
                    self.declared_len
                );
            }
            self.bit_count = 0;
            self.byte_count = 0;
            self.declared_len = 0;
            self.buf.clear();
            self.synced = true;
        }

        if !self.synced {
            return None;
        }

        self.bit_count += 1;
        if self.bit_count < 8 {
            return None;
        }
        self.bit_count = 0;

        // Capacity is MAX_FRAME_LEN and declared_len never exceeds it
        if self.buf.push(self.shift).is_err() {
            self.synced = false;
            return None;
        }
        self.byte_count += 1;

        if self.byte_count == 1 {
            self.declared_len = self.shift as usize + LENGTH_OVERHEAD;
        }

        if self.declared_len > 0 && self.byte_count == self.declared_len {
            self.synced = false;
            self.byte_count = 0;
            self.frames += 1;
            log::trace!("Frame complete ({} bytes)", self.declared_len);
            return Some(core::mem::take(&mut self.buf));
        }

        None
    }

    /// Feed one raw demodulator byte.
    pub fn feed_byte(&mut self, raw: u8) -> Option<RawFrame> {
        self.feed(Symbol::from(raw))
    }

    /// End of stream: drop any partial frame and wait for the next sync pulse.
    ///
    /// Returns true if a partial frame was discarded.
    pub fn reset(&mut self) -> bool {
        let partial = self.synced && (self.byte_count > 0 || self.bit_count > 0);
        if partial {
            self.abandoned += 1;
        }
        self.synced = false;
        self.bit_count = 0;
        self.byte_count = 0;
        self.declared_len = 0;
        self.buf.clear();
        partial
    }

    /// Whether a sync pulse has been seen and the frame is still being collected
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Total sync pulses seen
    pub fn sync_pulses(&self) -> u64 {
        self.sync_pulses
    }

    /// Complete frames emitted
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Partial frames discarded by a sync pulse or reset
    pub fn abandoned(&self) -> u64 {
        self.abandoned
    }
}
