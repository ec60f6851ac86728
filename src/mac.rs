/// TinyHAN MAC header and frame type table.
///
/// Header layout (7 bytes, packed):
///
/// ```text
/// ┌────────┬──────────────┬─────┬──────┬─────┬─────┐
/// │ LENGTH │ FLAGS (LE)   │ NET │ DEST │ SRC │ SEQ │
/// │ 1B     │ 2B           │ 1B  │ 1B   │ 1B  │ 1B  │
/// └────────┴──────────────┴─────┴──────┴─────┴─────┘
/// ```
///
/// Only the low byte of FLAGS carries the documented bits (type, AR, DP).
/// The top three bits of the high byte hold the protocol version.

/// Size of the MAC header including the length byte
pub const HEADER_LEN: usize = 7;

/// Frame type field of the header flags
pub const FLAGS_TYPE_MASK: u16 = 0x1F;
/// Acknowledgement requested
pub const FLAGS_AR: u16 = 1 << 6;
/// Data pending at the sender
pub const FLAGS_DP: u16 = 1 << 7;
pub const FLAGS_VERSION_SHIFT: u16 = 13;
pub const FLAGS_VERSION_MASK: u16 = 7 << FLAGS_VERSION_SHIFT;

/// Bytes the length byte does not count: itself and the CRC trailer.
pub const LENGTH_OVERHEAD: usize = 3;

/// Parsed MAC header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacHeader {
    /// Declared length (frame size minus [`LENGTH_OVERHEAD`])
    pub length: u8,
    pub flags: u16,
    pub net: u8,
    pub dest: u8,
    pub src: u8,
    pub seq: u8,
}

impl MacHeader {
    /// Parse the first [`HEADER_LEN`] bytes of a frame.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let h: &[u8; HEADER_LEN] = bytes.get(..HEADER_LEN)?.try_into().ok()?;
        Some(Self {
            length: h[0],
            flags: u16::from_le_bytes([h[1], h[2]]),
            net: h[3],
            dest: h[4],
            src: h[5],
            seq: h[6],
        })
    }

    /// Wire representation of this header.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let [lo, hi] = self.flags.to_le_bytes();
        [self.length, lo, hi, self.net, self.dest, self.src, self.seq]
    }

    pub fn frame_type(&self) -> FrameType {
        FrameType::from_flags(self.flags)
    }

    /// AR flag
    pub fn ack_request(&self) -> bool {
        self.flags & FLAGS_AR != 0
    }

    /// DP flag
    pub fn data_pending(&self) -> bool {
        self.flags & FLAGS_DP != 0
    }

    pub fn version(&self) -> u8 {
        ((self.flags & FLAGS_VERSION_MASK) >> FLAGS_VERSION_SHIFT) as u8
    }

    /// Total frame size implied by the length byte.
    pub fn declared_frame_len(&self) -> usize {
        self.length as usize + LENGTH_OVERHEAD
    }
}

/// MAC frame type, selected by the low five bits of the header flags.
///
/// Every 5-bit value maps to exactly one variant, so conversion from the
/// flags field never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameType {
    Beacon = 0x00,
    BeaconRequest = 0x01,
    Poll = 0x02,
    Ack = 0x03,
    RegRequest = 0x04,
    DeregRequest = 0x05,
    RegAck = 0x06,
    Reserved07 = 0x07,
    Reserved08 = 0x08,
    Reserved09 = 0x09,
    Reserved0A = 0x0A,
    Reserved0B = 0x0B,
    Reserved0C = 0x0C,
    Reserved0D = 0x0D,
    Reserved0E = 0x0E,
    Reserved0F = 0x0F,
    RawData = 0x10,
    TinyHan = 0x11,
    MqttSn = 0x12,
    SixLowpan = 0x13,
    Reserved14 = 0x14,
    Reserved15 = 0x15,
    Reserved16 = 0x16,
    Reserved17 = 0x17,
    Reserved18 = 0x18,
    Reserved19 = 0x19,
    Reserved1A = 0x1A,
    Reserved1B = 0x1B,
    Reserved1C = 0x1C,
    Reserved1D = 0x1D,
    Syslog = 0x1E,
    Extended = 0x1F,
}

impl FrameType {
    /// All frame types, indexed by their type code.
    pub const ALL: [FrameType; 32] = [
        FrameType::Beacon,
        FrameType::BeaconRequest,
        FrameType::Poll,
        FrameType::Ack,
        FrameType::RegRequest,
        FrameType::DeregRequest,
        FrameType::RegAck,
        FrameType::Reserved07,
        FrameType::Reserved08,
        FrameType::Reserved09,
        FrameType::Reserved0A,
        FrameType::Reserved0B,
        FrameType::Reserved0C,
        FrameType::Reserved0D,
        FrameType::Reserved0E,
        FrameType::Reserved0F,
        FrameType::RawData,
        FrameType::TinyHan,
        FrameType::MqttSn,
        FrameType::SixLowpan,
        FrameType::Reserved14,
        FrameType::Reserved15,
        FrameType::Reserved16,
        FrameType::Reserved17,
        FrameType::Reserved18,
        FrameType::Reserved19,
        FrameType::Reserved1A,
        FrameType::Reserved1B,
        FrameType::Reserved1C,
        FrameType::Reserved1D,
        FrameType::Syslog,
        FrameType::Extended,
    ];

    /// Extract the frame type from a header flags field.
    pub fn from_flags(flags: u16) -> Self {
        Self::ALL[(flags & FLAGS_TYPE_MASK) as usize]
    }

    /// The 5-bit type code
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Display name as shown in the monitor's type column
    pub fn name(self) -> &'static str {
        match self {
            FrameType::Beacon => "BEACON",
            FrameType::BeaconRequest => "BEACON_REQ",
            FrameType::Poll => "POLL",
            FrameType::Ack => "ACK",
            FrameType::RegRequest => "REG_REQ",
            FrameType::DeregRequest => "DEREG_REQ",
            FrameType::RegAck => "REG_ACK",
            FrameType::Reserved07 => "RESERVED07",
            FrameType::Reserved08 => "RESERVED08",
            FrameType::Reserved09 => "RESERVED09",
            FrameType::Reserved0A => "RESERVED0A",
            FrameType::Reserved0B => "RESERVED0B",
            FrameType::Reserved0C => "RESERVED0C",
            FrameType::Reserved0D => "RESERVED0D",
            FrameType::Reserved0E => "RESERVED0E",
            FrameType::Reserved0F => "RESERVED0F",
            FrameType::RawData => "RAW_DATA",
            FrameType::TinyHan => "TINYHAN",
            FrameType::MqttSn => "MQTT-SN",
            FrameType::SixLowpan => "6LOWPAN",
            FrameType::Reserved14 => "RESERVED14",
            FrameType::Reserved15 => "RESERVED15",
            FrameType::Reserved16 => "RESERVED16",
            FrameType::Reserved17 => "RESERVED17",
            FrameType::Reserved18 => "RESERVED18",
            FrameType::Reserved19 => "RESERVED19",
            FrameType::Reserved1A => "RESERVED1A",
            FrameType::Reserved1B => "RESERVED1B",
            FrameType::Reserved1C => "RESERVED1C",
            FrameType::Reserved1D => "RESERVED1D",
            FrameType::Syslog => "SYSLOG",
            FrameType::Extended => "EXTENDED",
        }
    }

    /// Look up a frame type by its display name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    pub fn is_reserved(self) -> bool {
        self.name().starts_with("RESERVED")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── FrameType ───────────────────────────────────────────────────

    #[test]
    fn all_table_is_indexed_by_code() {
        for (code, t) in FrameType::ALL.iter().enumerate() {
            assert_eq!(t.code() as usize, code);
        }
    }

    #[test]
    fn from_flags_masks_upper_bits() {
        assert_eq!(FrameType::from_flags(0x04), FrameType::RegRequest);
        assert_eq!(FrameType::from_flags(0xFFC4), FrameType::RegRequest);
        assert_eq!(FrameType::from_flags(0x1F), FrameType::Extended);
        assert_eq!(FrameType::from_flags(0x20), FrameType::Beacon);
    }

    #[test]
    fn reserved_names_carry_hex_index() {
        assert_eq!(FrameType::Reserved0A.name(), "RESERVED0A");
        assert_eq!(FrameType::Reserved1D.name(), "RESERVED1D");
        let reserved = FrameType::ALL.iter().filter(|t| t.is_reserved()).count();
        assert_eq!(reserved, 19);
    }

    #[test]
    fn names_round_trip() {
        for t in FrameType::ALL {
            assert_eq!(FrameType::from_name(t.name()), Some(t));
        }
        assert_eq!(FrameType::from_name("mqtt-sn"), Some(FrameType::MqttSn));
        assert_eq!(FrameType::from_name("PING"), None);
    }

    // ── MacHeader ───────────────────────────────────────────────────

    #[test]
    fn parse_header_fields() {
        let h = MacHeader::parse(&[0x0D, 0xC4, 0x20, 0x00, 0x03, 0x02, 0x01, 0xEE]).unwrap();
        assert_eq!(h.length, 0x0D);
        assert_eq!(h.flags, 0x20C4);
        assert_eq!(h.net, 0x00);
        assert_eq!(h.dest, 0x03);
        assert_eq!(h.src, 0x02);
        assert_eq!(h.seq, 0x01);
        assert_eq!(h.frame_type(), FrameType::RegRequest);
        assert!(h.ack_request());
        assert!(h.data_pending());
        assert_eq!(h.version(), 1);
        assert_eq!(h.declared_frame_len(), 16);
    }

    #[test]
    fn parse_header_too_short() {
        assert!(MacHeader::parse(&[0x0D, 0x04, 0x00, 0x00, 0x03, 0x02]).is_none());
    }

    #[test]
    fn header_bytes_round_trip() {
        let bytes = [0x10, 0x46, 0x00, 0x01, 0xFF, 0x05, 0x7F];
        let h = MacHeader::parse(&bytes).unwrap();
        assert_eq!(h.to_bytes(), bytes);
        assert!(h.ack_request());
        assert!(!h.data_pending());
    }
}
