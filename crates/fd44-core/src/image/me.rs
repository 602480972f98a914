//! Management engine region detection
//!
//! Presence of the ME region marks a full flash image as opposed to a
//! BIOS-only update file.

use core::fmt;

use crate::scan::{find_first, find_from, slice_at};

/// ME region marker
pub const ME_SIGNATURE: [u8; 16] = [
    0x20, 0x20, 0x80, 0x0F, 0x40, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Firmware manifest tag preceding the version
pub const ME_MANIFEST_TAG: [u8; 4] = *b"$MN2";

const ME_VERSION_OFFSET: usize = 4;
const ME_VERSION_LEN: usize = 8;

/// Partition name present only in server platform services firmware
const SPS_PARTITION: &[u8; 4] = b"OPR1";
/// Partition name present only in 5 MB firmware
const FULL_SKU_PARTITION: &[u8; 4] = b"NFTP";

/// ME firmware version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeVersion {
    /// Major version
    pub major: u16,
    /// Minor version
    pub minor: u16,
    /// Bugfix level
    pub bugfix: u16,
    /// Build number
    pub build: u16,
}

impl MeVersion {
    /// Parse four little-endian 16-bit components
    pub fn from_bytes(raw: &[u8; ME_VERSION_LEN]) -> Self {
        let word = |i: usize| u16::from_le_bytes([raw[i * 2], raw[i * 2 + 1]]);
        Self {
            major: word(0),
            minor: word(1),
            bugfix: word(2),
            build: word(3),
        }
    }
}

impl fmt::Display for MeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.bugfix, self.build
        )
    }
}

/// ME firmware flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeVariant {
    /// 1.5 MB consumer firmware
    Consumer,
    /// 5 MB corporate firmware
    Corporate,
    /// Server platform services
    ServerPlatform,
}

impl fmt::Display for MeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Consumer => write!(f, "1.5 MB"),
            Self::Corporate => write!(f, "5 MB"),
            Self::ServerPlatform => write!(f, "SPS"),
        }
    }
}

/// Management engine region information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagementEngineInfo {
    /// Offset of the region marker
    pub offset: usize,
    /// Firmware version, when the manifest was found
    pub version: Option<MeVersion>,
    /// Firmware flavour
    pub variant: MeVariant,
}

/// Detect the ME region, `None` for BIOS-only images
pub fn parse_me(image: &[u8]) -> Option<ManagementEngineInfo> {
    let offset = find_first(image, &ME_SIGNATURE)?;
    log::debug!("ME region marker at 0x{:08X}", offset);

    let version = find_from(image, &ME_MANIFEST_TAG, offset)
        .and_then(|pos| slice_at(image, pos + ME_VERSION_OFFSET, ME_VERSION_LEN))
        .and_then(|raw| raw.try_into().ok())
        .map(MeVersion::from_bytes);
    if version.is_none() {
        log::warn!("ME region present but firmware manifest not found");
    }

    let variant = if find_from(image, SPS_PARTITION, offset).is_some() {
        MeVariant::ServerPlatform
    } else if find_from(image, FULL_SKU_PARTITION, offset).is_some() {
        MeVariant::Corporate
    } else {
        MeVariant::Consumer
    };

    Some(ManagementEngineInfo {
        offset,
        version,
        variant,
    })
}
