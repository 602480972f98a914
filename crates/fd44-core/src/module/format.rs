//! On-disk constants of the FD44 module
//!
//! Every literal byte sequence the codec matches or emits lives here, keyed
//! by module version. Logic elsewhere never spells out header bytes itself.

use core::fmt;

/// FFS file GUID that opens every module instance
pub const MODULE_SIGNATURE: [u8; 16] = [
    0x0B, 0x82, 0x44, 0xFD, 0xAB, 0xF1, 0xC0, 0x41, 0xAE, 0x4E, 0x0C, 0x55, 0x55, 0x6E, 0xB9, 0xBD,
];

/// Confirmation tag inside the module header
pub const MODULE_TAG: [u8; 4] = *b"BSA_";

/// Size of the fixed module header preceding the body
pub const MODULE_HEADER_LEN: usize = 36;

/// Fill byte of unused module space
pub const FILL: u8 = 0xFF;

/// Length of a hardware address
pub const MAC_LEN: usize = 6;

/// Length of the ASCII-hex address text, without terminator
pub const MAC_ASCII_LEN: usize = 12;

/// Length of the sensor key
pub const SENSOR_KEY_LEN: usize = 8;

/// Length of a system UUID
pub const UUID_LEN: usize = 16;

/// Length of the serial number body, without terminator
pub const SERIAL_LEN: usize = 16;

/// Filler following the key in the short sensor-key record
pub const SHORT_KEY_PART2: [u8; 30] = [
    0x04, 0x04, 0x32, 0x55, 0xF8, 0x00, 0xA2, 0x02, 0xA1, 0x00, 0x40, 0x63, 0x43, 0x10, 0xFE, 0x81,
    0x03, 0xDF, 0x40, 0xB2, 0x00, 0x20, 0x00, 0x73, 0x3C, 0x10, 0x08, 0x00, 0x00, 0x00,
];

/// Filler following the key in the long sensor-key record
pub const LONG_KEY_PART2: [u8; 30] = [
    0x04, 0x04, 0x32, 0x55, 0xF8, 0x00, 0xA2, 0x02, 0xA1, 0x00, 0x40, 0x63, 0x43, 0x10, 0x84, 0x83,
    0x03, 0xDF, 0x40, 0x80, 0x00, 0x20, 0x00, 0x73, 0x3C, 0x10, 0x08, 0x00, 0x60, 0x0F,
];

/// Length of the magic block in the long sensor-key record
pub const LONG_KEY_MAGIC_LEN: usize = 13;

/// Zero block between the magic block and the mirrored key
pub const LONG_KEY_PART3: [u8; 13] = [0; 13];

/// Trailer of the long sensor-key record
pub const LONG_KEY_PART4: [u8; 6] = [0x04, 0x00, 0x00, 0x23, 0x33, 0x00];

/// XOR mask applied to the mirrored key copy
pub const LONG_KEY_MASK: [u8; SENSOR_KEY_LEN] = [0x00, 0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0x00];

/// Module version, read from the variant tag byte of the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum ModuleVariant {
    /// 6-series chipsets (P67, H67, Z68)
    SixSeries,
    /// C602 server chipset (X79)
    C602,
    /// 7-series chipsets (Z77, H77, B75)
    SevenSeries,
}

impl ModuleVariant {
    /// All known versions
    pub const ALL: [ModuleVariant; 3] = [Self::SixSeries, Self::C602, Self::SevenSeries];

    /// Resolve a header tag byte, `None` for tags outside the closed set
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.tag() == tag)
    }

    /// Tag byte identifying this version in the module header
    pub const fn tag(self) -> u8 {
        match self {
            Self::SixSeries => 0xD3,
            Self::C602 => 0xD1,
            Self::SevenSeries => 0xCD,
        }
    }

    /// Sub-record headers used by this version
    pub fn headers(self) -> &'static RecordHeaders {
        match self {
            Self::SixSeries => &SIX_SERIES_HEADERS,
            Self::C602 => &C602_HEADERS,
            Self::SevenSeries => &SEVEN_SERIES_HEADERS,
        }
    }
}

impl fmt::Display for ModuleVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SixSeries => write!(f, "6-series"),
            Self::C602 => write!(f, "C602"),
            Self::SevenSeries => write!(f, "7-series"),
        }
    }
}

/// Sub-record headers for one module version
///
/// A `None` entry means the version has no such record.
#[derive(Debug)]
pub struct RecordHeaders {
    /// Short sensor-key record
    pub short_key: Option<&'static [u8]>,
    /// Long sensor-key record
    pub long_key: Option<&'static [u8]>,
    /// System UUID record
    pub uuid: &'static [u8],
    /// Motherboard serial number record
    pub serial: &'static [u8],
}

static SIX_SERIES_HEADERS: RecordHeaders = RecordHeaders {
    short_key: Some(&[0x8B, 0x04, 0x26, 0x00]),
    long_key: Some(&[0x8B, 0x04, 0x4E, 0x00]),
    uuid: &[0x01, 0x08, 0x10, 0x00],
    serial: &[0x02, 0x07, 0x10, 0x00],
};

static C602_HEADERS: RecordHeaders = RecordHeaders {
    short_key: None,
    long_key: Some(&[0x8B, 0x00, 0x00, 0x04, 0x4E, 0x00, 0x00]),
    uuid: &[0x01, 0x00, 0x00, 0x08, 0x10, 0x00, 0x00],
    serial: &[0x02, 0x00, 0x00, 0x07, 0x10, 0x00, 0x00],
};

static SEVEN_SERIES_HEADERS: RecordHeaders = RecordHeaders {
    short_key: None,
    long_key: Some(&[0x8B, 0x04, 0x00, 0x00, 0x00, 0x4E, 0x00, 0x00, 0x02]),
    uuid: &[0x01, 0x08, 0x00, 0x80, 0x09, 0x10, 0x00, 0x01, 0x00],
    serial: &[0x02, 0x07, 0x00, 0x80, 0x09, 0x10, 0x00, 0x02, 0x00],
};

/// Header of an ASCII-hex address record
///
/// 7-series boards carry a per-board record id in the header, so the header
/// is part of the board profile rather than the module version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum AsciiMacHeader {
    /// Realtek LAN on 6-series boards
    SixSeries,
    /// Realtek LAN on Z77 boards
    Z77,
    /// Realtek LAN on B75 boards
    B75,
    /// Realtek LAN on H77 boards
    H77,
    /// Realtek LAN on H77 micro-ATX boards
    H77M,
    /// Atheros LAN on H77 boards
    AtherosH77,
}

impl AsciiMacHeader {
    /// All known headers, in detection order
    pub const ALL: [AsciiMacHeader; 6] = [
        Self::SixSeries,
        Self::Z77,
        Self::B75,
        Self::H77,
        Self::H77M,
        Self::AtherosH77,
    ];

    /// Literal header bytes
    pub const fn bytes(self) -> &'static [u8] {
        match self {
            Self::SixSeries => &[0x0B, 0x01, 0x0D, 0x00],
            Self::Z77 => &[0x0B, 0x01, 0x00, 0x80, 0x09, 0x0D, 0x00, 0x2D, 0x00],
            Self::B75 => &[0x0B, 0x01, 0x00, 0x80, 0x09, 0x0D, 0x00, 0x25, 0x00],
            Self::H77 => &[0x0B, 0x01, 0x00, 0x80, 0x09, 0x0D, 0x00, 0x26, 0x00],
            Self::H77M => &[0x0B, 0x01, 0x00, 0x80, 0x09, 0x0D, 0x00, 0x28, 0x00],
            Self::AtherosH77 => &[0x0B, 0x01, 0x00, 0x80, 0x09, 0x0D, 0x00, 0x2A, 0x00],
        }
    }

    /// Headers a module of the given version may carry
    pub fn candidates(variant: ModuleVariant) -> &'static [AsciiMacHeader] {
        match variant {
            ModuleVariant::SixSeries => &[Self::SixSeries],
            ModuleVariant::C602 => &[],
            ModuleVariant::SevenSeries => &[Self::Z77, Self::B75, Self::H77, Self::H77M, Self::AtherosH77],
        }
    }
}

/// Magic block of the long sensor-key record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum LongKeyMagic {
    /// Common block
    #[default]
    V1,
    /// P8P67-M PRO
    V2,
    /// P8P67 WS REVOLUTION
    V3,
}

impl LongKeyMagic {
    /// All known magic blocks
    pub const ALL: [LongKeyMagic; 3] = [Self::V1, Self::V2, Self::V3];

    /// Literal magic bytes
    pub const fn bytes(self) -> &'static [u8; LONG_KEY_MAGIC_LEN] {
        match self {
            Self::V1 => &[
                0x43, 0x10, 0x15, 0x04, 0x20, 0x00, 0x3C, 0x10, 0x00, 0x00, 0x00, 0x43, 0x10,
            ],
            Self::V2 => &[
                0x06, 0x11, 0x15, 0x04, 0x20, 0x00, 0x3C, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00,
            ],
            Self::V3 => &[
                0x43, 0x10, 0x84, 0x83, 0x20, 0x00, 0x3C, 0x10, 0x00, 0x00, 0x00, 0x43, 0x10,
            ],
        }
    }

    /// Match a magic block against the known magics
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.bytes().as_slice() == bytes)
    }
}
