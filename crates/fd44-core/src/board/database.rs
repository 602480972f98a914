//! Board profile table and runtime board database
//!
//! The compiled-in [`BOARDS`] table covers the known boards. A
//! [`BoardDatabase`] starts from that table and can be extended from RON
//! files, whose entries replace built-in profiles of the same name.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use super::types::{AddressStorage, BoardProfile, SensorKeyLayout};
use crate::module::{AsciiMacHeader, LongKeyMagic, ModuleVariant};

use AddressStorage::NetworkRegion;
use ModuleVariant::SixSeries;

const REALTEK_6: AddressStorage = AddressStorage::Ascii {
    header: AsciiMacHeader::SixSeries,
    magic: None,
};

const NO_KEY: SensorKeyLayout = SensorKeyLayout::None;
const SHORT: SensorKeyLayout = SensorKeyLayout::Short;
const LONG: SensorKeyLayout = SensorKeyLayout::Long {
    magic: LongKeyMagic::V1,
};

/// Known boards
///
/// Intel network controllers keep the address in the network region,
/// Realtek boards keep it as ASCII text in the module. Later chipsets are
/// described through RON board files.
pub static BOARDS: &[BoardProfile] = &[
    // P67
    BoardProfile::new("MaximusIV-Extreme", SixSeries, NetworkRegion, NO_KEY),
    BoardProfile::new("P8P67", SixSeries, REALTEK_6, SHORT),
    BoardProfile::new("P8P67-DELUXE", SixSeries, NetworkRegion, LONG),
    BoardProfile::new("P8P67-EVO", SixSeries, NetworkRegion, SHORT),
    BoardProfile::new("P8P67-PRO", SixSeries, NetworkRegion, SHORT),
    BoardProfile::new("P8P67-WS-REVOLUTION", SixSeries, NetworkRegion, NO_KEY),
    BoardProfile::new("SABERTOOTH-P67", SixSeries, NetworkRegion, SHORT),
    // Z68
    BoardProfile::new("Maximus-IV-Extreme-Z", SixSeries, NetworkRegion, NO_KEY),
    BoardProfile::new("MaximusIV-GENE-Z", SixSeries, NetworkRegion, NO_KEY),
    BoardProfile::new("MAXIMUS-IV-GENE-Z-GEN3", SixSeries, NetworkRegion, NO_KEY),
    BoardProfile::new("P8Z68-DELUXE", SixSeries, NetworkRegion, LONG),
    BoardProfile::new("P8Z68-DELUXE-GEN3", SixSeries, NetworkRegion, LONG),
    BoardProfile::new("P8Z68-V", SixSeries, NetworkRegion, NO_KEY),
    BoardProfile::new("P8Z68-V-GEN3", SixSeries, NetworkRegion, NO_KEY),
    BoardProfile::new("P8Z68-V-LE", SixSeries, REALTEK_6, NO_KEY),
    BoardProfile::new("P8Z68-V-LX", SixSeries, REALTEK_6, NO_KEY),
    BoardProfile::new("P8Z68-V-PRO", SixSeries, NetworkRegion, SHORT),
    BoardProfile::new("P8Z68-V-PRO-GEN3", SixSeries, NetworkRegion, SHORT),
];

/// Look up the built-in profile for a raw `$BOOTEFI$` board name field
pub fn lookup(raw_name: &[u8]) -> Option<BoardProfile> {
    BOARDS.iter().find(|p| p.matches(raw_name)).cloned()
}

/// Error type for board database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// I/O error reading files
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// RON parsing error
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Board profiles available at runtime
#[derive(Debug, Clone)]
pub struct BoardDatabase {
    profiles: Vec<BoardProfile>,
}

impl BoardDatabase {
    /// Database holding the compiled-in profiles
    pub fn new() -> Self {
        Self {
            profiles: BOARDS.to_vec(),
        }
    }

    /// Load profiles from a RON file holding a list of profiles
    ///
    /// Returns the number of profiles loaded.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize, DatabaseError> {
        let content = fs::read_to_string(path.as_ref())?;
        let count = self.load_str(&content)?;
        log::debug!("Loaded {} board profiles from {}", count, path.as_ref().display());
        Ok(count)
    }

    /// Load profiles from RON text
    pub fn load_str(&mut self, content: &str) -> Result<usize, DatabaseError> {
        let loaded: Vec<BoardProfile> = ron::from_str(content)?;

        for (i, profile) in loaded.iter().enumerate() {
            profile.validate().map_err(DatabaseError::Validation)?;
            if loaded[..i].iter().any(|p| p.name == profile.name) {
                return Err(DatabaseError::Validation(format!(
                    "duplicate board name: {}",
                    profile.name
                )));
            }
        }

        let count = loaded.len();
        for profile in loaded {
            match self.profiles.iter_mut().find(|p| p.name == profile.name) {
                Some(existing) => {
                    log::debug!("Overriding built-in profile {}", profile.name);
                    *existing = profile;
                }
                None => self.profiles.push(profile),
            }
        }
        Ok(count)
    }

    /// Find the profile for a raw `$BOOTEFI$` board name field
    pub fn lookup(&self, raw_name: &[u8]) -> Option<&BoardProfile> {
        self.profiles.iter().find(|p| p.matches(raw_name))
    }

    /// All profiles
    pub fn iter(&self) -> impl Iterator<Item = &BoardProfile> {
        self.profiles.iter()
    }

    /// Number of profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Check if the database holds no profiles
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for BoardDatabase {
    fn default() -> Self {
        Self::new()
    }
}
