//! Decode and encode pipelines
//!
//! Decoding runs scanning, profile resolution and field decoding in order;
//! the first failure ends the call. Encoding cross-checks the target board,
//! serializes the payload once and replicates it into every module copy.
//! Neither direction mutates its input.

use std::borrow::Cow;

use bitflags::bitflags;

use crate::board::{
    AddressStorage, BoardDatabase, BoardProfile, ProfileSource, SensorKeyLayout, UuidTailFallback,
};
use crate::error::{Error, Result};
use crate::image::{
    ascii_field, is_flashback_capsule, parse_bootefi, parse_gbe, parse_me, patch_gbe,
    read_board_name, BoardIdentity, ManagementEngineInfo, NetworkRegionInfo,
};
use crate::module::{
    decode_body, encode_body, find_modules, is_empty_body, write_modules, BodyFields,
    ModuleVariant,
};
use crate::record::ModuleRecord;

/// Image-level facts gathered before the module is decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    /// Board identity from the canonical `$BOOTEFI$` record
    pub identity: BoardIdentity,
    /// Management engine region, present in full images only
    pub management_engine: Option<ManagementEngineInfo>,
    /// Network controller region
    pub network_region: Option<NetworkRegionInfo>,
    /// Image is a USB BIOS Flashback capsule
    pub flashback_capsule: bool,
}

impl ImageInfo {
    /// Full flash image rather than a BIOS-only update
    pub fn is_full_image(&self) -> bool {
        self.management_engine.is_some()
    }
}

/// Successfully decoded image
///
/// `profile` describes where fields were actually found, which is not
/// always where they can be written back. A BIOS-only image of a board
/// whose address lives in the network region has no such region; the
/// address then comes from the UUID tail while the profile keeps
/// [`AddressStorage::NetworkRegion`], so [`encode_decoded`] on that same
/// image fails with [`Error::RegionNotFound`]. Check
/// `record.address_substituted` or write into a full image instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Image-level facts
    pub info: ImageInfo,
    /// Offset of the module the record was read from
    pub module_offset: usize,
    /// Decoded fields
    pub record: ModuleRecord,
    /// Profile describing the layout actually found
    pub profile: BoardProfile,
    /// Where the profile came from
    pub source: ProfileSource,
}

/// Image whose modules are all blank, with a known layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyImage {
    /// Image-level facts
    pub info: ImageInfo,
    /// Layout to use when personalizing the image
    pub profile: BoardProfile,
    /// Where the profile came from
    pub source: ProfileSource,
}

bitflags! {
    /// Choices a caller must make before a partially resolved image can be written
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Undecided: u8 {
        /// Where the hardware address is stored
        const ADDRESS_STORAGE = 1 << 0;
        /// Sensor-key record layout
        const SENSOR_KEY = 1 << 1;
    }
}

/// Blank image of a board missing from the profile table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialImage {
    /// Image-level facts
    pub info: ImageInfo,
    /// Module version read from the module header
    pub variant: ModuleVariant,
    /// Open choices
    pub undecided: Undecided,
}

impl PartialImage {
    /// Complete the layout with caller choices
    ///
    /// `hardware_address` may be `None` when the address storage was already
    /// decided by the presence of a network region.
    pub fn complete(
        self,
        hardware_address: Option<AddressStorage>,
        sensor_key: SensorKeyLayout,
    ) -> Result<EmptyImage> {
        let hardware_address = match hardware_address {
            Some(storage) => storage,
            None if !self.undecided.contains(Undecided::ADDRESS_STORAGE) => {
                AddressStorage::NetworkRegion
            }
            None => {
                return Err(Error::MissingField {
                    field: "hardware address storage",
                })
            }
        };
        let profile = BoardProfile {
            name: Cow::Owned(self.info.identity.name().into_owned()),
            variant: self.variant,
            hardware_address,
            sensor_key,
            uuid: true,
            serial_number: true,
            uuid_tail_fallback: UuidTailFallback::default(),
        };
        log::info!(
            "Layout for {} completed: address in {}, sensor key {:?}",
            profile.name,
            hardware_address.describe(),
            sensor_key
        );
        Ok(EmptyImage {
            info: self.info,
            profile,
            source: ProfileSource::Caller,
        })
    }
}

/// Outcome of a successful decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// Module holds data
    Valid(DecodedImage),
    /// Module is blank and the board layout is known
    Empty(EmptyImage),
    /// Module is blank and the board layout is unknown
    PartiallyResolved(PartialImage),
}

impl Decoded {
    /// Image-level facts
    pub fn info(&self) -> &ImageInfo {
        match self {
            Self::Valid(image) => &image.info,
            Self::Empty(image) => &image.info,
            Self::PartiallyResolved(image) => &image.info,
        }
    }

    /// Board identity
    pub fn identity(&self) -> &BoardIdentity {
        &self.info().identity
    }
}

/// Decode an image against the built-in board profiles
pub fn decode(image: &[u8]) -> Result<Decoded> {
    decode_with(image, &BoardDatabase::new())
}

/// Decode an image against a board database
pub fn decode_with(image: &[u8], boards: &BoardDatabase) -> Result<Decoded> {
    let info = scan_image(image)?;

    let modules = find_modules(image);
    let mut first_variant = None;
    let mut selected = None;
    for module in &modules {
        let variant = module.variant()?;
        first_variant.get_or_insert(variant);
        let body = module.body(image)?;
        if !is_empty_body(body) {
            selected = Some((module, variant, body));
            break;
        }
        log::debug!("Module at 0x{:08X} is empty", module.offset);
    }
    let first_variant = first_variant.ok_or(Error::SignatureNotFound {
        which: "FD44 module",
    })?;

    let profile = boards.lookup(&info.identity.board_name).cloned();
    match &profile {
        Some(p) => log::info!("Board {} uses a {} module", p.name, p.variant),
        None => log::info!("Board {} is not in the profile table", info.identity.name()),
    }

    let Some((module, variant, body)) = selected else {
        return Ok(resolve_empty(info, first_variant, profile));
    };

    let fields = decode_body(variant, body, module.body_offset())?;
    let (record, profile, source) = resolve_fields(&info, variant, fields, profile)?;
    log::info!(
        "Decoded module at 0x{:08X}, address in {}",
        module.offset,
        profile.hardware_address.describe()
    );

    Ok(Decoded::Valid(DecodedImage {
        info,
        module_offset: module.offset,
        record,
        profile,
        source,
    }))
}

fn scan_image(image: &[u8]) -> Result<ImageInfo> {
    let flashback_capsule = is_flashback_capsule(image);
    if flashback_capsule {
        log::info!("Image is a USB BIOS Flashback capsule");
    }
    let identity = parse_bootefi(image)?;
    let management_engine = parse_me(image);
    let network_region = parse_gbe(image)?;
    Ok(ImageInfo {
        identity,
        management_engine,
        network_region,
        flashback_capsule,
    })
}

fn resolve_empty(info: ImageInfo, variant: ModuleVariant, profile: Option<BoardProfile>) -> Decoded {
    match profile {
        Some(mut profile) => {
            if profile.variant != variant {
                log::warn!(
                    "Profile expects a {} module but the image holds a {} module",
                    profile.variant,
                    variant
                );
                profile.variant = variant;
            }
            Decoded::Empty(EmptyImage {
                info,
                profile,
                source: ProfileSource::Database,
            })
        }
        None => {
            let mut undecided = Undecided::SENSOR_KEY;
            if info.network_region.is_none() {
                undecided |= Undecided::ADDRESS_STORAGE;
            }
            Decoded::PartiallyResolved(PartialImage {
                info,
                variant,
                undecided,
            })
        }
    }
}

/// Build the record and the effective profile from decoded fields
///
/// A UUID-tail substitution the profile's policy does not permit keeps
/// the profile's own storage, even when that storage is absent from the
/// image.
fn resolve_fields(
    info: &ImageInfo,
    variant: ModuleVariant,
    fields: BodyFields,
    profile: Option<BoardProfile>,
) -> Result<(ModuleRecord, BoardProfile, ProfileSource)> {
    let wants_uuid = profile.as_ref().map_or(true, |p| p.uuid);
    let wants_serial = profile.as_ref().map_or(true, |p| p.serial_number);
    if wants_uuid && fields.uuid.is_none() {
        return Err(Error::SignatureNotFound { which: "UUID record" });
    }
    if wants_serial && fields.serial_number.is_none() {
        return Err(Error::SignatureNotFound {
            which: "serial number record",
        });
    }

    let mut record = ModuleRecord {
        sensor_key: fields.sensor_key.map(|k| k.key),
        sensor_key_redundant: fields.sensor_key.and_then(|k| k.redundant()),
        uuid: fields.uuid,
        serial_number: fields.serial_number,
        ..Default::default()
    };

    let storage = if let Some(ascii) = fields.address {
        record.hardware_address = Some(ascii.mac);
        record.address_magic = ascii.magic;
        AddressStorage::Ascii {
            header: ascii.header,
            magic: ascii.magic,
        }
    } else if let Some(region) = &info.network_region {
        record.hardware_address = Some(region.mac);
        AddressStorage::NetworkRegion
    } else if profile.as_ref().map(|p| p.hardware_address) == Some(AddressStorage::NotPresent) {
        AddressStorage::NotPresent
    } else if let Some(uuid) = fields.uuid {
        record.hardware_address = Some(uuid.tail());
        record.address_substituted = true;
        let policy = profile
            .as_ref()
            .map_or(UuidTailFallback::Always, |p| p.uuid_tail_fallback);
        let permitted = match policy {
            UuidTailFallback::Always => true,
            UuidTailFallback::FullImageOnly => info.is_full_image(),
        };
        match (&profile, permitted) {
            (Some(p), false) => p.hardware_address,
            _ => AddressStorage::UuidTail,
        }
    } else {
        profile
            .as_ref()
            .map_or(AddressStorage::NotPresent, |p| p.hardware_address)
    };
    if record.address_substituted {
        log::warn!("No hardware address copy found, using the UUID tail");
    }

    let detected_key = fields
        .sensor_key
        .map_or(SensorKeyLayout::None, |k| k.layout);

    let (mut effective, source) = match profile {
        Some(profile) => {
            if profile.variant != variant {
                log::warn!(
                    "Profile expects a {} module but the image holds a {} module",
                    profile.variant,
                    variant
                );
            }
            if profile.sensor_key != detected_key {
                log::warn!(
                    "Profile expects sensor key {:?} but the module holds {:?}",
                    profile.sensor_key,
                    detected_key
                );
            }
            if profile.hardware_address != storage {
                log::warn!(
                    "Profile stores the address in {} but it was found in {}",
                    profile.hardware_address.describe(),
                    storage.describe()
                );
            }
            (profile, ProfileSource::Database)
        }
        None => (
            BoardProfile {
                name: Cow::Owned(info.identity.name().into_owned()),
                variant,
                hardware_address: storage,
                sensor_key: detected_key,
                uuid: true,
                serial_number: true,
                uuid_tail_fallback: UuidTailFallback::default(),
            },
            ProfileSource::Detected,
        ),
    };
    effective.variant = variant;
    effective.hardware_address = storage;
    effective.sensor_key = detected_key;
    effective.uuid = fields.uuid.is_some();
    effective.serial_number = fields.serial_number.is_some();

    Ok((record, effective, source))
}

/// Write `record` into a copy of `image`
///
/// The target image must belong to the same board as `identity`. The
/// payload is laid out by `profile`, written into every module copy, and,
/// for network-region storage, the address is written into the region.
pub fn encode(
    image: &[u8],
    identity: &BoardIdentity,
    record: &ModuleRecord,
    profile: &BoardProfile,
) -> Result<Vec<u8>> {
    let target = read_board_name(image)?;
    if target != identity.board_name {
        return Err(Error::BoardMismatch {
            expected: identity.name().into_owned(),
            found: ascii_field(&target).into_owned(),
        });
    }

    let payload = encode_body(record, profile)?;
    let mut patched = write_modules(image, &payload, profile.variant)?;

    if profile.hardware_address == AddressStorage::NetworkRegion {
        let mac = record.hardware_address.ok_or(Error::MissingField {
            field: "hardware address",
        })?;
        patched = patch_gbe(&patched, mac)?;
    }

    log::info!("Wrote record for {}", identity.name());
    Ok(patched)
}

/// Write back a decoded image's record, possibly edited, into `image`
pub fn encode_decoded(image: &[u8], decoded: &DecodedImage) -> Result<Vec<u8>> {
    encode(image, &decoded.info.identity, &decoded.record, &decoded.profile)
}
