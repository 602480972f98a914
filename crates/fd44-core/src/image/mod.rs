//! Image-level identity parsers
//!
//! These read the records around the module: the board identity, the
//! management engine region and the network controller region.

mod bootefi;
mod gbe;
mod me;

pub use bootefi::{
    find_bootefi, parse_bootefi, read_board_name, BoardIdentity, BOARD_NAME_LEN,
    BOOTEFI_SIGNATURE,
};
pub(crate) use bootefi::ascii_field;
pub use gbe::{
    find_markers, parse_gbe, patch_gbe, GbeVersion, NetworkRegionInfo, GBE_MAC_STUB,
    GBE_SIGNATURE,
};
pub use me::{parse_me, ManagementEngineInfo, MeVariant, MeVersion, ME_MANIFEST_TAG, ME_SIGNATURE};

/// Header of a USB BIOS Flashback capsule
pub const FLASHBACK_HEADER: [u8; 16] = [
    0x8B, 0xA6, 0x3C, 0x4A, 0x23, 0x77, 0xFB, 0x48, 0x80, 0x3D, 0x57, 0x8C, 0xC1, 0xFE, 0xC4, 0x4D,
];

/// Check whether the image is a Flashback capsule rather than a raw flash image
pub fn is_flashback_capsule(image: &[u8]) -> bool {
    image.starts_with(&FLASHBACK_HEADER)
}
