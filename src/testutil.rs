//! Frame and symbol builders shared by the unit tests.

use std::vec::Vec;

use crate::checksum::crc16_xmodem;
use crate::mac::{MacHeader, HEADER_LEN, LENGTH_OVERHEAD};

/// Header + payload + CRC, with the header written exactly as given.
pub fn build_frame(header: &MacHeader, payload: &[u8]) -> Vec<u8> {
    let mut frame = header.to_bytes().to_vec();
    frame.extend_from_slice(payload);
    let crc = crc16_xmodem(&frame);
    frame.extend_from_slice(&crc.to_be_bytes());
    frame
}

/// Like [`build_frame`] but with a length byte matching the frame size.
pub fn build_valid_frame(header: &MacHeader, payload: &[u8]) -> Vec<u8> {
    let header = MacHeader {
        length: (HEADER_LEN + payload.len() + 2 - LENGTH_OVERHEAD) as u8,
        ..*header
    };
    build_frame(&header, payload)
}

/// Data-only symbols, MSB first, no sync pulse.
pub fn bits_msb_first(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .flat_map(|&b| (0..8).rev().map(move |i| (b >> i) & 1))
        .collect()
}

/// Symbols for a whole frame with the sync pulse on its first bit.
pub fn to_symbols(frame: &[u8]) -> Vec<u8> {
    let mut symbols = bits_msb_first(frame);
    if let Some(first) = symbols.first_mut() {
        *first |= 0x02;
    }
    symbols
}
