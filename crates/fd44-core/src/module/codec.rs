//! Sub-record codec for the module body
//!
//! Each sub-record starts with a version-specific header. Decoding walks the
//! records in the order they are written and validates the fixed blocks
//! around the fields. Encoding emits the records in canonical order:
//! ASCII address, sensor key, UUID, serial number.

use super::format::{
    AsciiMacHeader, LongKeyMagic, ModuleVariant, LONG_KEY_MAGIC_LEN, LONG_KEY_PART2,
    LONG_KEY_PART3, LONG_KEY_PART4, MAC_ASCII_LEN, SENSOR_KEY_LEN, SHORT_KEY_PART2,
};
use crate::board::{AddressStorage, BoardProfile, SensorKeyLayout};
use crate::error::{Error, Result};
use crate::record::{MacAddress, ModuleRecord, RedundantKey, SensorKey, SerialNumber, SystemUuid};
use crate::scan::{find_from, slice_at};

/// ASCII-hex hardware address record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsciiAddress {
    /// Header the record was found under
    pub header: AsciiMacHeader,
    /// Slot byte between header and text
    pub magic: Option<u8>,
    /// Decoded address
    pub mac: MacAddress,
}

/// Sensor-key record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRecord {
    /// Primary key
    pub key: SensorKey,
    /// Layout the record was stored in
    pub layout: SensorKeyLayout,
}

impl KeyRecord {
    /// Redundant part of a long record
    pub fn redundant(&self) -> Option<RedundantKey> {
        match self.layout {
            SensorKeyLayout::Long { magic } => Some(RedundantKey::derive(&self.key, magic)),
            _ => None,
        }
    }
}

/// Everything found in a module body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyFields {
    /// ASCII address record
    pub address: Option<AsciiAddress>,
    /// Sensor-key record
    pub sensor_key: Option<KeyRecord>,
    /// UUID record
    pub uuid: Option<SystemUuid>,
    /// Serial number record
    pub serial_number: Option<SerialNumber>,
}

/// Sequential reader over one sub-record
struct RecordReader<'a> {
    body: &'a [u8],
    base: usize,
    pos: usize,
}

impl<'a> RecordReader<'a> {
    /// Reader placed after a header found at `at`
    fn at(body: &'a [u8], base: usize, at: usize, header_len: usize) -> Self {
        log::debug!("Sub-record header at 0x{:08X}", base + at);
        Self {
            body,
            base,
            pos: at + header_len,
        }
    }

    /// Reader placed after the first `header` starting in `from..limit`
    fn find(body: &'a [u8], base: usize, header: &[u8], from: usize, limit: usize) -> Option<Self> {
        let at = first_header(body, header, from, limit)?;
        Some(Self::at(body, base, at, header.len()))
    }

    /// Offset just past the bytes consumed so far
    fn end(&self) -> usize {
        self.pos
    }

    fn peek(&self) -> Option<u8> {
        self.body.get(self.pos).copied()
    }

    fn skip(&mut self, len: usize) {
        self.pos += len;
    }

    fn take(&mut self, len: usize, section: &'static str) -> Result<&'a [u8]> {
        let bytes = slice_at(self.body, self.pos, len).ok_or(Error::Truncated {
            section,
            offset: self.base + self.pos,
        })?;
        self.pos += len;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self, section: &'static str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, section)?);
        Ok(out)
    }

    fn expect(&mut self, expected: &[u8], section: &'static str) -> Result<()> {
        if self.take(expected.len(), section)? != expected {
            return Err(Error::ConstantMismatch { section });
        }
        Ok(())
    }
}

/// First start of `header` in `from..limit`
fn first_header(body: &[u8], header: &[u8], from: usize, limit: usize) -> Option<usize> {
    find_from(body, header, from).filter(|&at| at < limit)
}

/// Earliest start of any of `headers` at or after `from`, or the body end
fn next_record(body: &[u8], headers: &[&[u8]], from: usize) -> usize {
    headers
        .iter()
        .filter_map(|header| find_from(body, header, from))
        .min()
        .unwrap_or(body.len())
}

fn decode_ascii_address(
    variant: ModuleVariant,
    body: &[u8],
    base: usize,
    from: usize,
    limit: usize,
) -> Result<Option<(AsciiAddress, usize)>> {
    let found = AsciiMacHeader::candidates(variant)
        .iter()
        .filter_map(|&header| {
            first_header(body, header.bytes(), from, limit).map(|at| (at, header))
        })
        .min_by_key(|&(at, _)| at);
    let Some((at, header)) = found else {
        return Ok(None);
    };

    let mut reader = RecordReader::at(body, base, at, header.bytes().len());
    // A non-hex byte after the header is the slot byte
    let magic = match reader.peek() {
        Some(b) if !b.is_ascii_hexdigit() => {
            reader.skip(1);
            Some(b)
        }
        _ => None,
    };
    let text = reader.take(MAC_ASCII_LEN, "ASCII hardware address")?;
    let mac = MacAddress::from_ascii_hex(text)?;
    reader.expect(&[0], "ASCII hardware address terminator")?;
    Ok(Some((AsciiAddress { header, magic, mac }, reader.end())))
}

fn decode_sensor_key(
    variant: ModuleVariant,
    body: &[u8],
    base: usize,
    from: usize,
    limit: usize,
) -> Result<Option<(KeyRecord, usize)>> {
    let headers = variant.headers();
    let short = headers
        .short_key
        .and_then(|header| first_header(body, header, from, limit).map(|at| (at, header)));
    let long = headers
        .long_key
        .and_then(|header| first_header(body, header, from, limit).map(|at| (at, header)));

    match (short, long) {
        (Some((at, header)), long) if long.map_or(true, |(long_at, _)| at < long_at) => {
            let mut reader = RecordReader::at(body, base, at, header.len());
            let key = SensorKey(reader.array("short sensor key")?);
            reader.expect(&SHORT_KEY_PART2, "part 2 of short sensor-key record")?;
            let record = KeyRecord {
                key,
                layout: SensorKeyLayout::Short,
            };
            Ok(Some((record, reader.end())))
        }
        (_, Some((at, header))) => {
            let mut reader = RecordReader::at(body, base, at, header.len());
            let key = SensorKey(reader.array("long sensor key")?);
            reader.expect(&LONG_KEY_PART2, "part 2 of long sensor-key record")?;
            let magic =
                LongKeyMagic::from_bytes(reader.take(LONG_KEY_MAGIC_LEN, "long sensor-key magic")?)
                    .ok_or(Error::ConstantMismatch {
                        section: "magic block of long sensor-key record",
                    })?;
            reader.expect(&LONG_KEY_PART3, "part 3 of long sensor-key record")?;
            let mirror = reader.take(SENSOR_KEY_LEN, "mirrored sensor key")?;
            if !key.matches_mirror(mirror) {
                return Err(Error::RedundancyMismatch);
            }
            reader.expect(&LONG_KEY_PART4, "part 4 of long sensor-key record")?;
            let record = KeyRecord {
                key,
                layout: SensorKeyLayout::Long { magic },
            };
            Ok(Some((record, reader.end())))
        }
        _ => Ok(None),
    }
}

/// Decode every sub-record present in a non-empty module body
///
/// Records are walked in canonical order. Each header is searched from the
/// end of the previous record and must start before the first header of any
/// later record, so field bytes that happen to look like a header are never
/// taken for one.
///
/// `base` is the image offset of the body, used in error reports.
pub fn decode_body(variant: ModuleVariant, body: &[u8], base: usize) -> Result<BodyFields> {
    let headers = variant.headers();
    let mut cursor = 0;

    let mut following: Vec<&[u8]> = headers.short_key.into_iter().chain(headers.long_key).collect();
    following.extend([headers.uuid, headers.serial]);
    let limit = next_record(body, &following, cursor);
    let address = decode_ascii_address(variant, body, base, cursor, limit)?.map(|(address, end)| {
        cursor = end;
        address
    });

    let limit = next_record(body, &[headers.uuid, headers.serial], cursor);
    let sensor_key = decode_sensor_key(variant, body, base, cursor, limit)?.map(|(key, end)| {
        cursor = end;
        key
    });

    let limit = next_record(body, &[headers.serial], cursor);
    let uuid = match RecordReader::find(body, base, headers.uuid, cursor, limit) {
        Some(mut reader) => {
            let uuid = SystemUuid(reader.array("UUID")?);
            cursor = reader.end();
            Some(uuid)
        }
        None => None,
    };

    let serial_number = match RecordReader::find(body, base, headers.serial, cursor, body.len()) {
        Some(mut reader) => {
            let serial = SerialNumber(reader.array("serial number")?);
            reader.expect(&[0], "serial number terminator")?;
            Some(serial)
        }
        None => None,
    };

    Ok(BodyFields {
        address,
        sensor_key,
        uuid,
        serial_number,
    })
}

/// Serialize the module payload for `record` as laid out by `profile`
///
/// The result holds only the sub-records; fill up to the module size is
/// added when the payload is written into an image.
pub fn encode_body(record: &ModuleRecord, profile: &BoardProfile) -> Result<Vec<u8>> {
    let variant = profile.variant;
    let headers = variant.headers();
    let mut payload = Vec::new();

    if let AddressStorage::Ascii { header, magic } = profile.hardware_address {
        if !AsciiMacHeader::candidates(variant).contains(&header) {
            return Err(Error::UnsupportedLayout {
                variant,
                field: "ASCII hardware address",
            });
        }
        let mac = record.hardware_address.ok_or(Error::MissingField {
            field: "hardware address",
        })?;
        payload.extend_from_slice(header.bytes());
        payload.extend(magic);
        payload.extend_from_slice(mac.to_ascii_hex().as_bytes());
        payload.push(0);
    }

    match profile.sensor_key {
        SensorKeyLayout::None => {}
        SensorKeyLayout::Short => {
            let header = headers.short_key.ok_or(Error::UnsupportedLayout {
                variant,
                field: "short sensor-key",
            })?;
            let key = record.sensor_key.ok_or(Error::MissingField { field: "sensor key" })?;
            payload.extend_from_slice(header);
            payload.extend_from_slice(&key.0);
            payload.extend_from_slice(&SHORT_KEY_PART2);
        }
        SensorKeyLayout::Long { magic } => {
            let header = headers.long_key.ok_or(Error::UnsupportedLayout {
                variant,
                field: "long sensor-key",
            })?;
            let key = record.sensor_key.ok_or(Error::MissingField { field: "sensor key" })?;
            let redundant = RedundantKey::derive(&key, magic);
            payload.extend_from_slice(header);
            payload.extend_from_slice(&key.0);
            payload.extend_from_slice(&LONG_KEY_PART2);
            payload.extend_from_slice(redundant.magic.bytes());
            payload.extend_from_slice(&LONG_KEY_PART3);
            payload.extend_from_slice(&redundant.mirror);
            payload.extend_from_slice(&LONG_KEY_PART4);
        }
    }

    if profile.uuid {
        let mut uuid = record.uuid.ok_or(Error::MissingField { field: "UUID" })?;
        if profile.hardware_address == AddressStorage::UuidTail {
            if let Some(mac) = record.hardware_address {
                uuid = uuid.with_tail(mac);
            }
        }
        payload.extend_from_slice(headers.uuid);
        payload.extend_from_slice(&uuid.0);
    }

    if profile.serial_number {
        let serial = record.serial_number.ok_or(Error::MissingField {
            field: "serial number",
        })?;
        payload.extend_from_slice(headers.serial);
        payload.extend_from_slice(&serial.0);
        payload.push(0);
    }

    log::debug!("Serialized {} byte module payload", payload.len());
    Ok(payload)
}
