//! Board profile type definitions

use std::borrow::Cow;

use crate::image::BOARD_NAME_LEN;
use crate::module::{AsciiMacHeader, LongKeyMagic, ModuleVariant};

/// Where the primary hardware address of a board lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum AddressStorage {
    /// Intel network-controller (GbE) region, outside the module
    NetworkRegion,
    /// ASCII-hex text inside the module
    Ascii {
        /// Record header
        header: AsciiMacHeader,
        /// Slot byte between header and text
        #[serde(default)]
        magic: Option<u8>,
    },
    /// Last six bytes of the system UUID
    UuidTail,
    /// Board has no hardware address to edit
    NotPresent,
}

impl AddressStorage {
    /// Short human readable description
    pub fn describe(&self) -> &'static str {
        match self {
            Self::NetworkRegion => "network controller region",
            Self::Ascii { .. } => "ASCII text in module",
            Self::UuidTail => "UUID tail",
            Self::NotPresent => "not present",
        }
    }
}

/// Sensor-key record layout of a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum SensorKeyLayout {
    /// No sensor-key record
    None,
    /// Key followed by a constant filler
    Short,
    /// Key, filler, magic block and mirrored key
    Long {
        /// Magic block selector
        magic: LongKeyMagic,
    },
}

/// When a missing hardware address may be taken from the UUID tail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum UuidTailFallback {
    /// Whenever no other copy is found
    Always,
    /// Only in full images (management engine present)
    #[default]
    FullImageOnly,
}

/// Where a resolved profile came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSource {
    /// Compiled-in table or a loaded board database
    Database,
    /// Built from what the module itself contains
    Detected,
    /// Completed by the caller from a partially resolved decode
    Caller,
}

fn default_true() -> bool {
    true
}

/// Static per-board layout configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct BoardProfile {
    /// Board name as stored in the `$BOOTEFI$` record
    pub name: Cow<'static, str>,
    /// Module version the board ships with
    pub variant: ModuleVariant,
    /// Primary hardware address storage
    pub hardware_address: AddressStorage,
    /// Sensor-key record layout
    pub sensor_key: SensorKeyLayout,
    /// Module holds a UUID record
    #[serde(default = "default_true")]
    pub uuid: bool,
    /// Module holds a serial number record
    #[serde(default = "default_true")]
    pub serial_number: bool,
    /// UUID-tail substitution policy
    #[serde(default)]
    pub uuid_tail_fallback: UuidTailFallback,
}

impl BoardProfile {
    /// Profile with UUID and serial records and the default fallback policy
    pub const fn new(
        name: &'static str,
        variant: ModuleVariant,
        hardware_address: AddressStorage,
        sensor_key: SensorKeyLayout,
    ) -> Self {
        Self {
            name: Cow::Borrowed(name),
            variant,
            hardware_address,
            sensor_key,
            uuid: true,
            serial_number: true,
            uuid_tail_fallback: UuidTailFallback::FullImageOnly,
        }
    }

    /// Same profile with another fallback policy
    pub const fn with_fallback(mut self, policy: UuidTailFallback) -> Self {
        self.uuid_tail_fallback = policy;
        self
    }

    /// Name padded with NULs to the on-disk field width
    ///
    /// Returns `None` when the name does not fit.
    pub fn padded_name(&self) -> Option<[u8; BOARD_NAME_LEN]> {
        let name = self.name.as_bytes();
        if name.len() > BOARD_NAME_LEN {
            return None;
        }
        let mut raw = [0u8; BOARD_NAME_LEN];
        raw[..name.len()].copy_from_slice(name);
        Some(raw)
    }

    /// Exact match against the raw on-disk name field
    pub fn matches(&self, raw_name: &[u8]) -> bool {
        self.padded_name()
            .is_some_and(|padded| padded.as_slice() == raw_name)
    }

    /// Check that the module version has a header for every record asked for
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() || self.name.len() > BOARD_NAME_LEN {
            return Err(format!(
                "board name '{}' must be 1 to {} bytes",
                self.name, BOARD_NAME_LEN
            ));
        }
        let headers = self.variant.headers();
        if self.sensor_key == SensorKeyLayout::Short && headers.short_key.is_none() {
            return Err(format!(
                "{}: {} modules have no short sensor-key record",
                self.name, self.variant
            ));
        }
        if matches!(self.sensor_key, SensorKeyLayout::Long { .. }) && headers.long_key.is_none() {
            return Err(format!(
                "{}: {} modules have no long sensor-key record",
                self.name, self.variant
            ));
        }
        if let AddressStorage::Ascii { header, .. } = self.hardware_address {
            if !AsciiMacHeader::candidates(self.variant).contains(&header) {
                return Err(format!(
                    "{}: ASCII address header {:?} does not belong to {} modules",
                    self.name, header, self.variant
                ));
            }
        }
        if self.hardware_address == AddressStorage::UuidTail && !self.uuid {
            return Err(format!(
                "{}: address stored in UUID tail but board has no UUID record",
                self.name
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_requires_exact_padding() {
        let profile = BoardProfile::new(
            "P8P67",
            ModuleVariant::SixSeries,
            AddressStorage::NetworkRegion,
            SensorKeyLayout::None,
        );
        let mut raw = [0u8; BOARD_NAME_LEN];
        raw[..5].copy_from_slice(b"P8P67");
        assert!(profile.matches(&raw));

        raw[6] = b'X';
        assert!(!profile.matches(&raw));

        let mut longer = [0u8; BOARD_NAME_LEN];
        longer[..9].copy_from_slice(b"P8P67-PRO");
        assert!(!profile.matches(&longer));
    }

    #[test]
    fn test_validate_rejects_short_key_on_seven_series() {
        let profile = BoardProfile::new(
            "TEST",
            ModuleVariant::SevenSeries,
            AddressStorage::NetworkRegion,
            SensorKeyLayout::Short,
        );
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_foreign_ascii_header() {
        let profile = BoardProfile::new(
            "TEST",
            ModuleVariant::SixSeries,
            AddressStorage::Ascii {
                header: AsciiMacHeader::Z77,
                magic: None,
            },
            SensorKeyLayout::None,
        );
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_with_fallback_keeps_layout() {
        const PROFILE: BoardProfile = BoardProfile::new(
            "TEST",
            ModuleVariant::C602,
            AddressStorage::UuidTail,
            SensorKeyLayout::Long {
                magic: LongKeyMagic::V1,
            },
        )
        .with_fallback(UuidTailFallback::Always);
        assert_eq!(PROFILE.uuid_tail_fallback, UuidTailFallback::Always);
        assert_eq!(PROFILE.name, "TEST");
        assert_eq!(PROFILE.hardware_address, AddressStorage::UuidTail);
        assert!(PROFILE.uuid && PROFILE.serial_number);
        assert!(PROFILE.validate().is_ok());
    }

    #[test]
    fn test_ron_defaults() {
        let profile: BoardProfile = ron::from_str(
            r#"(
                name: "CUSTOM-BOARD",
                variant: SevenSeries,
                hardware_address: Ascii(header: B75),
                sensor_key: Long(magic: V1),
            )"#,
        )
        .unwrap();
        assert!(profile.uuid);
        assert!(profile.serial_number);
        assert_eq!(profile.uuid_tail_fallback, UuidTailFallback::FullImageOnly);
        assert_eq!(
            profile.hardware_address,
            AddressStorage::Ascii {
                header: AsciiMacHeader::B75,
                magic: None
            }
        );
        assert!(profile.validate().is_ok());
    }
}
