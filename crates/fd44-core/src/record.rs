//! Editable identity fields of the module
//!
//! Field values are always held in their raw binary form, whatever the
//! on-disk encoding of the variant is.

use core::fmt;
use core::str::FromStr;

use crate::error::{Error, Result};
use crate::module::{LongKeyMagic, LONG_KEY_MASK, MAC_LEN, SENSOR_KEY_LEN, SERIAL_LEN, UUID_LEN};

/// Decode hex text into exactly `N` bytes, ignoring `:` and `-` separators
fn parse_hex<const N: usize>(field: &'static str, text: &str) -> Result<[u8; N]> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != ':' && *c != '-')
        .collect();
    let bytes = hex::decode(&cleaned).map_err(|e| Error::MalformedField {
        field,
        reason: e.to_string(),
    })?;
    bytes.try_into().map_err(|bytes: Vec<u8>| Error::MalformedField {
        field,
        reason: format!("expected {} bytes, got {}", N, bytes.len()),
    })
}

/// Network hardware address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress(pub [u8; MAC_LEN]);

impl MacAddress {
    /// Uppercase hex digits as stored by the ASCII variant
    pub fn to_ascii_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    /// Parse the 12 ASCII-hex digits stored in a module
    pub fn from_ascii_hex(text: &[u8]) -> Result<Self> {
        let text = core::str::from_utf8(text).map_err(|_| Error::MalformedField {
            field: "ASCII hardware address",
            reason: "not ASCII text".into(),
        })?;
        parse_hex("ASCII hardware address", text).map(Self)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl FromStr for MacAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_hex("hardware address", s).map(Self)
    }
}

/// System UUID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemUuid(pub [u8; UUID_LEN]);

impl SystemUuid {
    /// Last six bytes, which double as the hardware address on some boards
    pub fn tail(&self) -> MacAddress {
        let mut mac = [0u8; MAC_LEN];
        mac.copy_from_slice(&self.0[UUID_LEN - MAC_LEN..]);
        MacAddress(mac)
    }

    /// Copy of this UUID with its tail replaced by `mac`
    pub fn with_tail(&self, mac: MacAddress) -> Self {
        let mut uuid = self.0;
        uuid[UUID_LEN - MAC_LEN..].copy_from_slice(&mac.0);
        Self(uuid)
    }
}

impl fmt::Display for SystemUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}

impl FromStr for SystemUuid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_hex("UUID", s).map(Self)
    }
}

/// Thermal-sensor calibration key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorKey(pub [u8; SENSOR_KEY_LEN]);

impl SensorKey {
    /// Reversed, masked copy stored by the long record
    ///
    /// For every `i`, `key[i] == mirror[N - 1 - i] ^ mask[i]`.
    pub fn mirror(&self) -> [u8; SENSOR_KEY_LEN] {
        let mut mirror = [0u8; SENSOR_KEY_LEN];
        for (i, &k) in self.0.iter().enumerate() {
            mirror[SENSOR_KEY_LEN - 1 - i] = k ^ LONG_KEY_MASK[i];
        }
        mirror
    }

    /// Check that `mirror` is the reversed, masked copy of this key
    pub fn matches_mirror(&self, mirror: &[u8]) -> bool {
        mirror.len() == SENSOR_KEY_LEN
            && (0..SENSOR_KEY_LEN)
                .all(|i| self.0[i] == mirror[SENSOR_KEY_LEN - 1 - i] ^ LONG_KEY_MASK[i])
    }
}

impl fmt::Display for SensorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}

impl FromStr for SensorKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_hex("sensor key", s).map(Self)
    }
}

/// Magic block and mirrored copy carried by the long sensor-key record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedundantKey {
    /// Magic block selector
    pub magic: LongKeyMagic,
    /// Reversed, masked copy of the key
    pub mirror: [u8; SENSOR_KEY_LEN],
}

impl RedundantKey {
    /// Derive the redundant part for `key`
    pub fn derive(key: &SensorKey, magic: LongKeyMagic) -> Self {
        Self {
            magic,
            mirror: key.mirror(),
        }
    }
}

/// Textual sub-format of a serial number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialFormat {
    /// Factory board serial (`MT`/`MF` prefix)
    Factory,
    /// Any other text
    Generic,
}

/// Motherboard serial number, 16 bytes of NUL padded ASCII
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SerialNumber(pub [u8; SERIAL_LEN]);

impl SerialNumber {
    /// Build from text of at most 16 ASCII characters
    pub fn from_text(text: &str) -> Result<Self> {
        if !text.is_ascii() {
            return Err(Error::MalformedField {
                field: "serial number",
                reason: "not ASCII text".into(),
            });
        }
        if text.len() > SERIAL_LEN {
            return Err(Error::MalformedField {
                field: "serial number",
                reason: format!("{} characters, at most {} fit", text.len(), SERIAL_LEN),
            });
        }
        let mut raw = [0u8; SERIAL_LEN];
        raw[..text.len()].copy_from_slice(text.as_bytes());
        Ok(Self(raw))
    }

    /// Text up to the first NUL
    pub fn text(&self) -> String {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(SERIAL_LEN);
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }

    /// Sub-format, told apart by the leading characters
    pub fn format(&self) -> SerialFormat {
        match &self.0[..2] {
            b"MT" | b"MF" => SerialFormat::Factory,
            _ => SerialFormat::Generic,
        }
    }
}

impl fmt::Debug for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SerialNumber").field(&self.text()).finish()
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Editable contents of one module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleRecord {
    /// Hardware address, wherever it is stored
    pub hardware_address: Option<MacAddress>,
    /// Slot byte preceding the ASCII address on boards that have one
    pub address_magic: Option<u8>,
    /// Address was taken from the UUID tail because no other copy was found
    pub address_substituted: bool,
    /// Sensor key
    pub sensor_key: Option<SensorKey>,
    /// Redundant part of a long sensor-key record
    pub sensor_key_redundant: Option<RedundantKey>,
    /// System UUID
    pub uuid: Option<SystemUuid>,
    /// Motherboard serial number
    pub serial_number: Option<SerialNumber>,
}
