/// Type-specific payload decoders.
///
/// Payload structures are packed and little-endian, matching the layout the
/// nodes put on air. A payload longer than its structure is accepted (the
/// tail is ignored); a shorter one cannot be decoded and falls back to a hex
/// dump via [`Payload::Undecodable`].
use core::fmt;

use thiserror::Error;

use crate::mac::FrameType;

/// A payload too short for its fixed layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("{kind} payload needs {needed} bytes, got {len}")]
    TooShort {
        kind: &'static str,
        needed: usize,
        len: usize,
    },
}

fn require(kind: &'static str, bytes: &[u8], needed: usize) -> Result<(), PayloadError> {
    if bytes.len() < needed {
        return Err(PayloadError::TooShort {
            kind,
            needed,
            len: bytes.len(),
        });
    }
    Ok(())
}

fn le_u64(bytes: &[u8]) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(raw)
}

fn le_u16(bytes: &[u8]) -> u16 {
    u16::from_le_bytes([bytes[0], bytes[1]])
}

// ── Beacon ──────────────────────────────────────────────────────────

pub const BEACON_FLAGS_SYNC: u8 = 1 << 0;
pub const BEACON_FLAGS_PERMIT_ATTACH: u8 = 1 << 1;

/// Coordinator beacon: uuid, timestamp, flags, interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Beacon {
    pub uuid: u64,
    pub timestamp: u16,
    pub flags: u8,
    pub interval: u8,
}

impl Beacon {
    pub const LEN: usize = 12;

    pub fn parse(bytes: &[u8]) -> Result<Self, PayloadError> {
        require("BEACON", bytes, Self::LEN)?;
        Ok(Self {
            uuid: le_u64(bytes),
            timestamp: le_u16(&bytes[8..]),
            flags: bytes[10],
            interval: bytes[11],
        })
    }

    pub fn sync(&self) -> bool {
        self.flags & BEACON_FLAGS_SYNC != 0
    }

    pub fn permit_attach(&self) -> bool {
        self.flags & BEACON_FLAGS_PERMIT_ATTACH != 0
    }
}

impl fmt::Display for Beacon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UUID={:016X} t={}", self.uuid, self.timestamp)?;
        if self.sync() {
            f.write_str(" (SYNC)")?;
        }
        if self.permit_attach() {
            f.write_str(" (ATTACH)")?;
        }
        Ok(())
    }
}

// ── Registration request ────────────────────────────────────────────

pub const REG_FLAGS_HEARTBEAT_MASK: u16 = 0x0F;
pub const REG_FLAGS_SLEEPY: u16 = 1 << 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegRequest {
    pub uuid: u64,
    pub flags: u16,
}

impl RegRequest {
    pub const LEN: usize = 10;

    pub fn parse(bytes: &[u8]) -> Result<Self, PayloadError> {
        require("REG_REQ", bytes, Self::LEN)?;
        Ok(Self {
            uuid: le_u64(bytes),
            flags: le_u16(&bytes[8..]),
        })
    }

    /// Heartbeat interval in seconds (2^exponent)
    pub fn heartbeat_secs(&self) -> u32 {
        1 << (self.flags & REG_FLAGS_HEARTBEAT_MASK)
    }

    pub fn sleepy(&self) -> bool {
        self.flags & REG_FLAGS_SLEEPY != 0
    }
}

impl fmt::Display for RegRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UUID={:016X} HEARTBEAT={} secs",
            self.uuid,
            self.heartbeat_secs()
        )?;
        if self.sleepy() {
            f.write_str(" (SLEEPY)")?;
        }
        Ok(())
    }
}

// ── Deregistration request ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeregReason {
    User,
    PowerDown,
    Unknown(u8),
}

impl From<u8> for DeregReason {
    fn from(raw: u8) -> Self {
        match raw {
            0 => DeregReason::User,
            1 => DeregReason::PowerDown,
            other => DeregReason::Unknown(other),
        }
    }
}

impl DeregReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeregReason::User => "USER REQUEST",
            DeregReason::PowerDown => "POWER DOWN",
            DeregReason::Unknown(_) => "UNKNOWN REASON",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeregRequest {
    pub uuid: u64,
    pub reason: DeregReason,
}

impl DeregRequest {
    pub const LEN: usize = 9;

    pub fn parse(bytes: &[u8]) -> Result<Self, PayloadError> {
        require("DEREG_REQ", bytes, Self::LEN)?;
        Ok(Self {
            uuid: le_u64(bytes),
            reason: DeregReason::from(bytes[8]),
        })
    }
}

impl fmt::Display for DeregRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UUID={:016X} ({})", self.uuid, self.reason.as_str())
    }
}

// ── Registration response ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegStatus {
    Ok,
    Denied,
    Full,
    Shutdown,
    Admin,
    AddressInvalid,
    Unknown(u8),
}

impl From<u8> for RegStatus {
    fn from(raw: u8) -> Self {
        match raw {
            0 => RegStatus::Ok,
            1 => RegStatus::Denied,
            2 => RegStatus::Full,
            3 => RegStatus::Shutdown,
            4 => RegStatus::Admin,
            5 => RegStatus::AddressInvalid,
            other => RegStatus::Unknown(other),
        }
    }
}

impl RegStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegStatus::Ok => "OK",
            RegStatus::Denied => "ACCESS DENIED",
            RegStatus::Full => "NETWORK BUSY",
            RegStatus::Shutdown => "SHUTTING DOWN",
            RegStatus::Admin => "ADMIN REQUEST",
            RegStatus::AddressInvalid => "ADDRESS INVALID",
            RegStatus::Unknown(_) => "UNKNOWN STATUS",
        }
    }
}

/// Coordinator's answer to a registration request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegAck {
    pub uuid: u64,
    /// Assigned short address
    pub addr: u8,
    pub status: RegStatus,
}

impl RegAck {
    pub const LEN: usize = 10;

    pub fn parse(bytes: &[u8]) -> Result<Self, PayloadError> {
        require("REG_ACK", bytes, Self::LEN)?;
        Ok(Self {
            uuid: le_u64(bytes),
            addr: bytes[8],
            status: RegStatus::from(bytes[9]),
        })
    }
}

impl fmt::Display for RegAck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UUID={:016X} ADDR={:02X} ({})",
            self.uuid,
            self.addr,
            self.status.as_str()
        )
    }
}

// ── Dispatch ────────────────────────────────────────────────────────

/// Decoded payload of one frame, tagged by frame type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload<'a> {
    Beacon(Beacon),
    RegRequest(RegRequest),
    DeregRequest(DeregRequest),
    RegAck(RegAck),
    /// BEACON_REQ, POLL and ACK carry nothing worth decoding
    Empty,
    /// Reserved, application and extended types
    Opaque(&'a [u8]),
    /// Log text (the leading byte is skipped)
    Syslog(&'a [u8]),
    /// Payload too short for its type's layout
    Undecodable {
        bytes: &'a [u8],
        error: PayloadError,
    },
}

impl<'a> Payload<'a> {
    /// Decode `bytes` according to `frame_type`. Never fails: a payload that
    /// does not fit its layout becomes [`Payload::Undecodable`].
    pub fn parse(frame_type: FrameType, bytes: &'a [u8]) -> Self {
        let parsed = match frame_type {
            FrameType::Beacon => Beacon::parse(bytes).map(Payload::Beacon),
            FrameType::RegRequest => RegRequest::parse(bytes).map(Payload::RegRequest),
            FrameType::DeregRequest => DeregRequest::parse(bytes).map(Payload::DeregRequest),
            FrameType::RegAck => RegAck::parse(bytes).map(Payload::RegAck),
            FrameType::BeaconRequest | FrameType::Poll | FrameType::Ack => Ok(Payload::Empty),
            FrameType::Syslog => Ok(Payload::Syslog(bytes.get(1..).unwrap_or(&[]))),
            FrameType::RawData
            | FrameType::TinyHan
            | FrameType::MqttSn
            | FrameType::SixLowpan
            | FrameType::Extended
            | FrameType::Reserved07
            | FrameType::Reserved08
            | FrameType::Reserved09
            | FrameType::Reserved0A
            | FrameType::Reserved0B
            | FrameType::Reserved0C
            | FrameType::Reserved0D
            | FrameType::Reserved0E
            | FrameType::Reserved0F
            | FrameType::Reserved14
            | FrameType::Reserved15
            | FrameType::Reserved16
            | FrameType::Reserved17
            | FrameType::Reserved18
            | FrameType::Reserved19
            | FrameType::Reserved1A
            | FrameType::Reserved1B
            | FrameType::Reserved1C
            | FrameType::Reserved1D => Ok(Payload::Opaque(bytes)),
        };

        parsed.unwrap_or_else(|error| {
            log::debug!("{}: {}, rendering as hex", frame_type.name(), error);
            Payload::Undecodable { bytes, error }
        })
    }
}

impl fmt::Display for Payload<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Beacon(p) => fmt::Display::fmt(p, f),
            Payload::RegRequest(p) => fmt::Display::fmt(p, f),
            Payload::DeregRequest(p) => fmt::Display::fmt(p, f),
            Payload::RegAck(p) => fmt::Display::fmt(p, f),
            Payload::Empty => Ok(()),
            Payload::Opaque(bytes) | Payload::Undecodable { bytes, .. } => write_hex(f, bytes),
            Payload::Syslog(text) => write_text(f, text),
        }
    }
}

/// Lowercase hex, two digits per byte, no separators.
pub fn write_hex(out: &mut impl fmt::Write, bytes: &[u8]) -> fmt::Result {
    for b in bytes {
        write!(out, "{:02x}", b)?;
    }
    Ok(())
}

/// Render log bytes as text on a single line. Invalid UTF-8 is shown as
/// `\xNN`, control characters with their escape sequence.
pub fn write_text(out: &mut impl fmt::Write, bytes: &[u8]) -> fmt::Result {
    for chunk in bytes.utf8_chunks() {
        for c in chunk.valid().chars() {
            if c.is_control() {
                write!(out, "{}", c.escape_default())?;
            } else {
                out.write_char(c)?;
            }
        }
        for b in chunk.invalid() {
            write!(out, "\\x{:02x}", b)?;
        }
    }
    Ok(())
}
