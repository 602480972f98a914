//! Error types for fd44-core
//!
//! Every decode or encode failure is terminal for the call that produced it.
//! Each variant names the structural check that failed so unsupported
//! firmware variants can be diagnosed from the message alone.

use thiserror::Error;

use crate::module::ModuleVariant;

/// Codec error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A required marker is absent from the image
    #[error("{which} not found")]
    SignatureNotFound {
        /// Marker that was searched for
        which: &'static str,
    },

    /// Module version tag is outside the known set
    #[error("module version tag 0x{tag:02X} is unknown")]
    UnknownVariant {
        /// Tag byte found in the module header
        tag: u8,
    },

    /// A filler or validation block differs from its expected literal bytes
    #[error("{section} does not match the expected bytes")]
    ConstantMismatch {
        /// Sub-block that failed to match
        section: &'static str,
    },

    /// The mirrored sensor key is not the reversed, masked primary key
    #[error("second key bytes in long sensor-key record are not the reversed first key bytes")]
    RedundancyMismatch,

    /// Serialized payload does not fit the declared module space
    #[error(
        "module payload of {needed} bytes does not fit the {available} bytes available \
         in module at 0x{offset:08X}"
    )]
    CapacityExceeded {
        /// Serialized payload size
        needed: usize,
        /// Body space declared by the module header
        available: usize,
        /// Offset of the module header in the image
        offset: usize,
    },

    /// Target image belongs to another board than the loaded record
    #[error(
        "motherboard model of loaded data differs from the target image \
         (loaded: {expected}, target: {found})"
    )]
    BoardMismatch {
        /// Board name captured at decode time
        expected: String,
        /// Board name found in the target image
        found: String,
    },

    /// Region required by the address storage kind is absent at write time
    #[error("{which} not found in target image; use a full firmware backup or factory image")]
    RegionNotFound {
        /// Region that was searched for
        which: &'static str,
    },

    /// A fixed-width field runs past the end of the image
    #[error("{section} at 0x{offset:08X} is truncated")]
    Truncated {
        /// Field being read
        section: &'static str,
        /// Offset the field starts at
        offset: usize,
    },

    /// A field holds bytes that cannot be interpreted
    #[error("{field} is malformed: {reason}")]
    MalformedField {
        /// Field being interpreted
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// The record lacks a field the board profile requires
    #[error("{field} is required by the board profile but missing from the record")]
    MissingField {
        /// Missing field
        field: &'static str,
    },

    /// The profile asks for a sub-record the module version cannot hold
    #[error("{variant} modules have no {field} record")]
    UnsupportedLayout {
        /// Module version
        variant: ModuleVariant,
        /// Sub-record that has no header in this version
        field: &'static str,
    },

    /// A module in the target image carries another version than the profile
    #[error("module at 0x{offset:08X} is {found}, profile expects {expected}")]
    VariantMismatch {
        /// Version required by the profile
        expected: ModuleVariant,
        /// Version found in the image
        found: ModuleVariant,
        /// Offset of the module header in the image
        offset: usize,
    },

    /// A module copy's declared size reaches into the next copy
    #[error("module at 0x{offset:08X} extends into the module at 0x{next:08X}")]
    ModuleOverlap {
        /// Offset of the oversized module
        offset: usize,
        /// Offset of the module it runs into
        next: usize,
    },
}

/// Result type alias using the codec Error type
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failed_check() {
        let e = Error::ConstantMismatch {
            section: "part 2 of long sensor-key record",
        };
        assert_eq!(
            e.to_string(),
            "part 2 of long sensor-key record does not match the expected bytes"
        );

        let e = Error::UnknownVariant { tag: 0xAB };
        assert_eq!(e.to_string(), "module version tag 0xAB is unknown");

        let e = Error::CapacityExceeded {
            needed: 17,
            available: 16,
            offset: 0x1000,
        };
        assert!(e.to_string().contains("0x00001000"));
    }
}
