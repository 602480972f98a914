//! Network controller (GbE) region
//!
//! The region holds the primary hardware address of boards with Intel LAN.
//! Images may carry the region twice; a placeholder address in front of the
//! first copy means the second copy holds the configured address.

use core::fmt;

use crate::error::{Error, Result};
use crate::module::MAC_LEN;
use crate::record::MacAddress;
use crate::scan::{find_first, find_last, slice_at};

/// Region marker
pub const GBE_SIGNATURE: [u8; 10] = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xC3, 0x10];

/// Placeholder address found in front of unconfigured region copies
pub const GBE_MAC_STUB: [u8; MAC_LEN] = [0x88, 0x88, 0x88, 0x88, 0x87, 0x88];

/// Distance from the address start back to the version
const GBE_VERSION_LEN: usize = 2;

/// Offset of the address relative to a marker
fn mac_offset(marker: usize) -> Option<usize> {
    marker.checked_sub(MAC_LEN)
}

/// Offset of the version relative to a marker
fn version_offset(marker: usize) -> Option<usize> {
    marker.checked_sub(MAC_LEN + GBE_VERSION_LEN)
}

/// Region version, nibble packed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GbeVersion {
    /// Major version
    pub major: u8,
    /// Minor version
    pub minor: u8,
}

impl GbeVersion {
    /// Decode the two version bytes
    pub fn from_bytes(raw: [u8; GBE_VERSION_LEN]) -> Self {
        Self {
            major: raw[1],
            minor: raw[0] >> 4,
        }
    }
}

impl fmt::Display for GbeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Network region information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkRegionInfo {
    /// Offset of the authoritative region marker
    pub offset: usize,
    /// Region version, when it lies inside the image
    pub version: Option<GbeVersion>,
    /// Configured hardware address
    pub mac: MacAddress,
}

/// Marker offsets `(first, last)`, equal when the region occurs once
pub fn find_markers(image: &[u8]) -> Option<(usize, usize)> {
    let first = find_first(image, &GBE_SIGNATURE)?;
    let last = find_last(image, &GBE_SIGNATURE)?;
    Some((first, last))
}

fn read_mac(image: &[u8], marker: usize) -> Option<MacAddress> {
    let raw = slice_at(image, mac_offset(marker)?, MAC_LEN)?;
    let mut mac = [0u8; MAC_LEN];
    mac.copy_from_slice(raw);
    Some(MacAddress(mac))
}

/// Locate the authoritative network region, `None` when absent
pub fn parse_gbe(image: &[u8]) -> Result<Option<NetworkRegionInfo>> {
    let Some((first, last)) = find_markers(image) else {
        return Ok(None);
    };

    let mut marker = first;
    if first != last && read_mac(image, first).map(|m| m.0) == Some(GBE_MAC_STUB) {
        log::warn!(
            "Placeholder address before region at 0x{:08X}, using copy at 0x{:08X}",
            first,
            last
        );
        marker = last;
    }
    log::debug!("Network region marker at 0x{:08X}", marker);

    let mac = read_mac(image, marker).ok_or(Error::Truncated {
        section: "network region address",
        offset: marker,
    })?;
    let version = version_offset(marker)
        .and_then(|offset| slice_at(image, offset, GBE_VERSION_LEN))
        .map(|raw| GbeVersion::from_bytes([raw[0], raw[1]]));

    Ok(Some(NetworkRegionInfo {
        offset: marker,
        version,
        mac,
    }))
}

/// Return a copy of `image` with the address before both the first and the
/// last region marker replaced by `mac`
pub fn patch_gbe(image: &[u8], mac: MacAddress) -> Result<Vec<u8>> {
    let (first, last) = find_markers(image).ok_or(Error::RegionNotFound {
        which: "network controller region",
    })?;

    let mut patched = image.to_vec();
    for marker in [first, last] {
        let offset = mac_offset(marker).ok_or(Error::Truncated {
            section: "network region address",
            offset: marker,
        })?;
        patched[offset..offset + MAC_LEN].copy_from_slice(&mac.0);
    }
    log::debug!(
        "Wrote hardware address before regions at 0x{:08X} and 0x{:08X}",
        first,
        last
    );
    Ok(patched)
}
