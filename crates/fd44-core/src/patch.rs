//! TOML record files
//!
//! A record file carries field edits as text:
//!
//! ```toml
//! [record]
//! board = "P8Z68-DELUXE"
//! mac = "00:11:22:33:44:55"
//! uuid = "00112233-4455-6677-8899-AABBCCDDEEFF"
//! serial = "MT7012345678901"
//! sensor_key = "0123456789ABCDEF"
//! ```
//!
//! Every field is optional. Exporting a decoded record produces the same
//! format, so an exported file can be edited and written back.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::error::Error;
use crate::record::{MacAddress, ModuleRecord, SensorKey, SerialNumber, SystemUuid};

/// Error type for record file operations
#[derive(Debug, Error)]
pub enum PatchError {
    /// I/O error reading or writing files
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// TOML parsing error
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// TOML serialization error
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// A field value could not be interpreted
    #[error(transparent)]
    Field(#[from] Error),
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct RecordFile {
    record: RecordPatch,
}

/// Textual field edits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct RecordPatch {
    /// Board the record was exported from, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,
    /// Hardware address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    /// System UUID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Serial number text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    /// Sensor key in hex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_key: Option<String>,
}

impl RecordPatch {
    /// Patch reproducing every field of `record`
    pub fn from_record(record: &ModuleRecord, board: Option<&str>) -> Self {
        Self {
            board: board.map(str::to_owned),
            mac: record.hardware_address.map(|m| m.to_string()),
            uuid: record.uuid.map(|u| u.to_string()),
            serial: record.serial_number.map(|s| s.text()),
            sensor_key: record.sensor_key.map(|k| k.to_string()),
        }
    }

    /// Check if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.mac.is_none() && self.uuid.is_none() && self.serial.is_none() && self.sensor_key.is_none()
    }

    /// Fill fields missing here from `other`
    pub fn merge(self, other: RecordPatch) -> Self {
        Self {
            board: self.board.or(other.board),
            mac: self.mac.or(other.mac),
            uuid: self.uuid.or(other.uuid),
            serial: self.serial.or(other.serial),
            sensor_key: self.sensor_key.or(other.sensor_key),
        }
    }

    /// Apply the edits to a copy of `record`
    pub fn apply(&self, record: &ModuleRecord) -> Result<ModuleRecord, PatchError> {
        let mut patched = record.clone();
        if let Some(mac) = &self.mac {
            patched.hardware_address = Some(mac.parse::<MacAddress>()?);
            patched.address_substituted = false;
        }
        if let Some(uuid) = &self.uuid {
            patched.uuid = Some(uuid.parse::<SystemUuid>()?);
        }
        if let Some(serial) = &self.serial {
            patched.serial_number = Some(SerialNumber::from_text(serial)?);
        }
        if let Some(key) = &self.sensor_key {
            patched.sensor_key = Some(key.parse::<SensorKey>()?);
            patched.sensor_key_redundant = None;
        }
        Ok(patched)
    }

    /// Load a patch from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, PatchError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse a patch from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, PatchError> {
        let file: RecordFile = toml::from_str(content)?;
        Ok(file.record)
    }

    /// Save the patch to a TOML file
    pub fn to_toml_file(&self, path: impl AsRef<Path>) -> Result<(), PatchError> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Convert the patch to a TOML string
    pub fn to_toml_string(&self) -> Result<String, PatchError> {
        let file = RecordFile {
            record: self.clone(),
        };
        Ok(toml::to_string(&file)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_apply() {
        let patch = RecordPatch::from_toml_str(
            r#"
[record]
mac = "001122334455"
serial = "MF1234"
"#,
        )
        .unwrap();
        assert!(!patch.is_empty());

        let original = ModuleRecord {
            uuid: Some("000102030405060708090A0B0C0D0E0F".parse().unwrap()),
            address_substituted: true,
            ..Default::default()
        };
        let patched = patch.apply(&original).unwrap();
        assert_eq!(
            patched.hardware_address,
            Some(MacAddress([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]))
        );
        assert!(!patched.address_substituted);
        assert_eq!(patched.serial_number.unwrap().text(), "MF1234");
        assert_eq!(patched.uuid, original.uuid);
        assert_eq!(patched.sensor_key, None);
    }

    #[test]
    fn test_export_reimport() {
        let record = ModuleRecord {
            hardware_address: Some("AA:BB:CC:DD:EE:FF".parse().unwrap()),
            sensor_key: Some("0102030405060708".parse().unwrap()),
            serial_number: Some(SerialNumber::from_text("SN0001").unwrap()),
            ..Default::default()
        };
        let patch = RecordPatch::from_record(&record, Some("P8P67"));
        let text = patch.to_toml_string().unwrap();
        assert!(text.contains("[record]"));
        assert!(text.contains("mac = \"AA:BB:CC:DD:EE:FF\""));
        assert!(!text.contains("uuid"));

        let reread = RecordPatch::from_toml_str(&text).unwrap();
        assert_eq!(reread, patch);
        assert_eq!(reread.apply(&ModuleRecord::default()).unwrap(), record);
    }

    #[test]
    fn test_bad_field_is_reported() {
        let patch = RecordPatch {
            uuid: Some("not-a-uuid".into()),
            ..Default::default()
        };
        assert!(matches!(
            patch.apply(&ModuleRecord::default()).unwrap_err(),
            PatchError::Field(Error::MalformedField { field: "UUID", .. })
        ));
        assert!(matches!(
            RecordPatch::from_toml_str("[record\n").unwrap_err(),
            PatchError::Parse(_)
        ));
    }

    #[test]
    fn test_merge_prefers_self() {
        let cli = RecordPatch {
            mac: Some("00:00:00:00:00:01".into()),
            ..Default::default()
        };
        let file = RecordPatch {
            mac: Some("00:00:00:00:00:02".into()),
            serial: Some("S".into()),
            ..Default::default()
        };
        let merged = cli.merge(file);
        assert_eq!(merged.mac.as_deref(), Some("00:00:00:00:00:01"));
        assert_eq!(merged.serial.as_deref(), Some("S"));
    }
}
