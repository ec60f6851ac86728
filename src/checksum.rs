/// Frame integrity check.
///
/// Every TinyHAN frame ends with a big-endian CRC-16/XMODEM (poly 0x1021,
/// init 0x0000, no reflection) computed over all preceding bytes.
use crc::{Crc, CRC_16_XMODEM};

/// Length of the CRC trailer in bytes
pub const CRC_LEN: usize = 2;

const XMODEM: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Compute CRC-16/XMODEM over `data`.
pub fn crc16_xmodem(data: &[u8]) -> u16 {
    XMODEM.checksum(data)
}

/// Split a frame into its body and the big-endian CRC trailer value.
///
/// Returns `None` if the frame is too short to carry a trailer.
pub fn split_trailer(frame: &[u8]) -> Option<(&[u8], u16)> {
    if frame.len() < CRC_LEN {
        return None;
    }
    let (body, trailer) = frame.split_at(frame.len() - CRC_LEN);
    Some((body, u16::from_be_bytes([trailer[0], trailer[1]])))
}
