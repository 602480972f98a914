//! End-to-end properties of the decode and encode pipelines

mod common;

use common::{boards, profile, sample_record, ImageBuilder};
use fd44_core::board::{AddressStorage, BoardProfile, ProfileSource, SensorKeyLayout};
use fd44_core::image::{BoardIdentity, GBE_MAC_STUB};
use fd44_core::module::{
    encode_body, AsciiMacHeader, LongKeyMagic, ModuleVariant, LONG_KEY_MAGIC_LEN, LONG_KEY_MASK,
    LONG_KEY_PART2, LONG_KEY_PART3, MODULE_HEADER_LEN, SENSOR_KEY_LEN,
};
use fd44_core::record::{MacAddress, SensorKey, SerialNumber};
use fd44_core::scan::find_first;
use fd44_core::{decode_with, encode, encode_decoded, Decoded, DecodedImage, Error};

const MODULE_AT: usize = 0x1000;
const BODY_LEN: usize = 0x400;
const REGION_AT: usize = 0x200;
const REGION_MAC: [u8; 6] = [0x10, 0xBF, 0x48, 0x01, 0x02, 0x03];

fn decode(image: &[u8]) -> fd44_core::Result<Decoded> {
    decode_with(image, &boards())
}

fn valid(decoded: Decoded) -> DecodedImage {
    match decoded {
        Decoded::Valid(image) => image,
        other => panic!("expected a valid image, got {:?}", other),
    }
}

/// Image of `board` whose single module holds `sample_record()`
fn populated(board: &str) -> Vec<u8> {
    let profile = profile(board);
    let payload = encode_body(&sample_record(), &profile).unwrap();
    let mut builder = ImageBuilder::new(board);
    builder.module(MODULE_AT, profile.variant, BODY_LEN, &payload);
    if profile.hardware_address == AddressStorage::NetworkRegion {
        builder.network_region(REGION_AT, REGION_MAC);
    }
    builder.build()
}

#[test]
fn test_round_trip_unedited() {
    for board in ["P8P67-DELUXE", "P8P67", "B75-BOARD", "Z77-SLOT-BOARD", "X79-BOARD"] {
        let image = populated(board);
        let first = valid(decode(&image).unwrap());
        let written = encode_decoded(&image, &first).unwrap();
        let second = valid(decode(&written).unwrap());
        assert_eq!(second.record, first.record, "{}", board);
        assert_eq!(second.profile, first.profile, "{}", board);
        assert_eq!(second.source, ProfileSource::Database, "{}", board);
    }
}

#[test]
fn test_round_trip_with_edits() {
    let image = populated("B75-BOARD");
    let decoded = valid(decode(&image).unwrap());

    let mut edited = decoded.clone();
    edited.record.serial_number = Some(SerialNumber::from_text("MF1234567890123").unwrap());
    edited.record.hardware_address = Some("00:E0:4C:AA:BB:CC".parse().unwrap());
    let written = encode_decoded(&image, &edited).unwrap();

    let reread = valid(decode(&written).unwrap());
    assert_eq!(reread.record, edited.record);
    assert_eq!(reread.record.uuid, decoded.record.uuid);
    assert_eq!(reread.record.sensor_key, decoded.record.sensor_key);
}

#[test]
fn test_uuid_tail_follows_address_edit() {
    let image = populated("X79-BOARD");
    let decoded = valid(decode(&image).unwrap());
    assert_eq!(decoded.profile.hardware_address, AddressStorage::UuidTail);
    assert!(decoded.record.address_substituted);

    let mac: MacAddress = "00:E0:4C:AA:BB:CC".parse().unwrap();
    let mut edited = decoded.clone();
    edited.record.hardware_address = Some(mac);
    let written = encode_decoded(&image, &edited).unwrap();

    let reread = valid(decode(&written).unwrap());
    assert_eq!(reread.record.hardware_address, Some(mac));
    assert_eq!(reread.record.uuid.unwrap().tail(), mac);
    assert_eq!(
        reread.record.uuid.unwrap().0[..10],
        decoded.record.uuid.unwrap().0[..10]
    );
}

#[test]
fn test_long_key_mirror_identity() {
    let keys = [
        "0000000000000000",
        "FFFFFFFFFFFFFFFF",
        "0123456789ABCDEF",
        "FEDCBA9876543210",
        "8000000000000001",
        "13579BDF02468ACE",
    ];
    let board = "B75-BOARD";
    let profile = profile(board);
    let header = ModuleVariant::SevenSeries.headers().long_key.unwrap();
    let blank = ImageBuilder::new(board)
        .module(MODULE_AT, profile.variant, BODY_LEN, &[])
        .build();
    let identity = BoardIdentity::from_name(board).unwrap();

    for text in keys {
        let key: SensorKey = text.parse().unwrap();
        let mut record = sample_record();
        record.sensor_key = Some(key);
        let written = encode(&blank, &identity, &record, &profile).unwrap();

        let body = MODULE_AT + MODULE_HEADER_LEN;
        let start = body + find_first(&written[body..], header).unwrap();
        let mirror = start
            + header.len()
            + SENSOR_KEY_LEN
            + LONG_KEY_PART2.len()
            + LONG_KEY_MAGIC_LEN
            + LONG_KEY_PART3.len();
        let stored = &written[mirror..mirror + SENSOR_KEY_LEN];
        for i in 0..SENSOR_KEY_LEN {
            assert_eq!(key.0[i], stored[7 - i] ^ LONG_KEY_MASK[i], "{} byte {}", text, i);
        }

        let mut broken = written.clone();
        broken[mirror + 2] ^= 0x40;
        assert_eq!(decode(&broken).unwrap_err(), Error::RedundancyMismatch, "{}", text);
    }
}

#[test]
fn test_encoding_is_idempotent() {
    for board in ["P8P67-DELUXE", "H77M-BOARD", "X79-BOARD"] {
        let image = populated(board);
        let decoded = valid(decode(&image).unwrap());
        let once = encode_decoded(&image, &decoded).unwrap();
        let twice = encode_decoded(&image, &decoded).unwrap();
        assert_eq!(once, twice, "{}", board);
        assert_eq!(encode_decoded(&once, &decoded).unwrap(), once, "{}", board);
    }
}

#[test]
fn test_blank_body_is_empty_until_one_byte_changes() {
    const BLANK_LEN: usize = 4096;
    let blank = ImageBuilder::new("P8P67")
        .module(MODULE_AT, ModuleVariant::SixSeries, BLANK_LEN, &[])
        .build();
    assert!(matches!(decode(&blank).unwrap(), Decoded::Empty(_)));

    let body = MODULE_AT + MODULE_HEADER_LEN;
    for position in [0, 1, 35, 2048, BLANK_LEN - 1] {
        for value in [0x00, 0x0B, 0x7F, 0xFE] {
            let mut image = blank.clone();
            image[body + position] = value;
            assert!(
                !matches!(decode(&image), Ok(Decoded::Empty(_))),
                "byte 0x{:02X} at {} decoded as empty",
                value,
                position
            );
        }
    }
}

#[test]
fn test_capacity_boundary() {
    let board = "B75-BOARD";
    let profile = profile(board);
    let identity = BoardIdentity::from_name(board).unwrap();
    let record = sample_record();
    let needed = encode_body(&record, &profile).unwrap().len();

    let exact = ImageBuilder::new(board)
        .module(MODULE_AT, profile.variant, needed, &[])
        .build();
    let written = encode(&exact, &identity, &record, &profile).unwrap();
    assert_eq!(valid(decode(&written).unwrap()).record.serial_number, record.serial_number);

    let short = ImageBuilder::new(board)
        .module(MODULE_AT, profile.variant, needed - 1, &[])
        .build();
    assert_eq!(
        encode(&short, &identity, &record, &profile).unwrap_err(),
        Error::CapacityExceeded {
            needed,
            available: needed - 1,
            offset: MODULE_AT,
        }
    );
}

#[test]
fn test_replicates_into_tagged_copies_only() {
    let board = "B75-BOARD";
    let profile = profile(board);
    let identity = BoardIdentity::from_name(board).unwrap();
    let tagged = [MODULE_AT, 0x5000];
    let untagged = 0x3000;

    let mut builder = ImageBuilder::new(board);
    for offset in tagged {
        builder.module(offset, profile.variant, BODY_LEN, &[]);
    }
    builder.module_header(untagged, profile.variant, BODY_LEN, false);
    let image = builder.build();

    let written = encode(&image, &identity, &sample_record(), &profile).unwrap();
    let payload = encode_body(&sample_record(), &profile).unwrap();

    let bodies: Vec<_> = tagged
        .iter()
        .map(|&offset| offset + MODULE_HEADER_LEN..offset + MODULE_HEADER_LEN + BODY_LEN)
        .collect();
    assert_eq!(written[bodies[0].clone()], written[bodies[1].clone()]);
    assert_eq!(&written[bodies[0].start..bodies[0].start + payload.len()], payload.as_slice());

    for (i, (before, after)) in image.iter().zip(&written).enumerate() {
        if bodies.iter().any(|body| body.contains(&i)) {
            continue;
        }
        assert_eq!(before, after, "byte 0x{:X} outside the tagged copies changed", i);
    }
}

#[test]
fn test_board_mismatch_leaves_target_untouched() {
    let profile = BoardProfile::new(
        "BOARD-A",
        ModuleVariant::SevenSeries,
        AddressStorage::Ascii {
            header: AsciiMacHeader::B75,
            magic: None,
        },
        SensorKeyLayout::Long {
            magic: LongKeyMagic::V1,
        },
    );
    let identity = BoardIdentity::from_name("BOARD-A").unwrap();
    let target = ImageBuilder::new("BOARD-B")
        .module(MODULE_AT, ModuleVariant::SevenSeries, BODY_LEN, &[])
        .build();
    let before = target.clone();

    assert_eq!(
        encode(&target, &identity, &sample_record(), &profile).unwrap_err(),
        Error::BoardMismatch {
            expected: "BOARD-A".to_string(),
            found: "BOARD-B".to_string(),
        }
    );
    assert_eq!(target, before);
}

#[test]
fn test_placeholder_region_defers_to_second_copy() {
    let board = "P8P67-DELUXE";
    let payload = encode_body(&sample_record(), &profile(board)).unwrap();
    let configured = [0x00, 0xE0, 0x18, 0xC0, 0xFF, 0xEE];

    let image = ImageBuilder::new(board)
        .module(MODULE_AT, ModuleVariant::SixSeries, BODY_LEN, &payload)
        .network_region(REGION_AT, GBE_MAC_STUB)
        .network_region(0x8000, configured)
        .build();
    let decoded = valid(decode(&image).unwrap());
    assert_eq!(decoded.record.hardware_address, Some(MacAddress(configured)));
    assert_eq!(decoded.info.network_region.unwrap().offset, 0x8000);

    // without the placeholder the first copy wins
    let image = ImageBuilder::new(board)
        .module(MODULE_AT, ModuleVariant::SixSeries, BODY_LEN, &payload)
        .network_region(REGION_AT, REGION_MAC)
        .network_region(0x8000, configured)
        .build();
    let decoded = valid(decode(&image).unwrap());
    assert_eq!(decoded.record.hardware_address, Some(MacAddress(REGION_MAC)));
}
