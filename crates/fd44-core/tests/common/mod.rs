//! Synthetic firmware image builder for integration tests

#![allow(dead_code)]

use fd44_core::board::{BoardDatabase, BoardProfile};
use fd44_core::image::{BoardIdentity, BOARD_NAME_LEN, BOOTEFI_SIGNATURE, GBE_SIGNATURE};
use fd44_core::module::{ModuleVariant, MODULE_HEADER_LEN, MODULE_SIGNATURE, MODULE_TAG};
use fd44_core::record::{ModuleRecord, SerialNumber};

/// Default image size, large enough for a few modules and a region copy
pub const IMAGE_LEN: usize = 0x10000;

/// Where [`ImageBuilder::new`] puts the `$BOOTEFI$` record
pub const BOOTEFI_AT: usize = 0xF000;

/// Builds a flat image filled with erased flash bytes
pub struct ImageBuilder {
    data: Vec<u8>,
}

impl ImageBuilder {
    /// Blank image naming `board` in its `$BOOTEFI$` record
    pub fn new(board: &str) -> Self {
        let mut builder = Self {
            data: vec![0xFF; IMAGE_LEN],
        };
        builder.bootefi(BOOTEFI_AT, board);
        builder
    }

    /// Write a `$BOOTEFI$` record at `offset`
    pub fn bootefi(&mut self, offset: usize, board: &str) -> &mut Self {
        let mut record = Vec::new();
        record.extend_from_slice(BOOTEFI_SIGNATURE);
        record.extend_from_slice(&[0x00, 0x02, 0x00]);
        // firmware version 08.01
        record.extend_from_slice(&[0x08, 0x01]);
        let mut name = [0u8; BOARD_NAME_LEN];
        name[..board.len()].copy_from_slice(board.as_bytes());
        record.extend_from_slice(&name);
        record.extend_from_slice(&[0xFF; 21]);
        record.extend_from_slice(b"03/26/2012");
        self.data[offset..offset + record.len()].copy_from_slice(&record);
        self
    }

    /// Write a module header; the body is left as it is
    pub fn module_header(
        &mut self,
        offset: usize,
        variant: ModuleVariant,
        body_len: usize,
        tagged: bool,
    ) -> &mut Self {
        let declared = (MODULE_HEADER_LEN + body_len) as u32;
        let header = &mut self.data[offset..offset + MODULE_HEADER_LEN];
        header.fill(0x00);
        header[..16].copy_from_slice(&MODULE_SIGNATURE);
        header[16] = variant.tag();
        header[20..23].copy_from_slice(&declared.to_le_bytes()[..3]);
        if tagged {
            header[28..32].copy_from_slice(&MODULE_TAG);
        }
        self
    }

    /// Write a tagged module with room for `body_len` body bytes, holding
    /// `payload` followed by fill bytes
    pub fn module(
        &mut self,
        offset: usize,
        variant: ModuleVariant,
        body_len: usize,
        payload: &[u8],
    ) -> &mut Self {
        self.module_header(offset, variant, body_len, true);
        let body = offset + MODULE_HEADER_LEN;
        self.data[body..body + body_len].fill(0xFF);
        self.data[body..body + payload.len()].copy_from_slice(payload);
        self
    }

    /// Write a network region marker at `offset` with `mac` in front of it
    pub fn network_region(&mut self, offset: usize, mac: [u8; 6]) -> &mut Self {
        self.data[offset - 8..offset - 6].copy_from_slice(&[0x38, 0x01]);
        self.data[offset - 6..offset].copy_from_slice(&mac);
        self.data[offset..offset + GBE_SIGNATURE.len()].copy_from_slice(&GBE_SIGNATURE);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        self.data.clone()
    }
}

/// Board file describing later module versions, next to the built-in table
pub const EXTRA_BOARDS: &str = r#"[
    (name: "B75-BOARD", variant: SevenSeries,
     hardware_address: Ascii(header: B75), sensor_key: Long(magic: V1)),
    (name: "Z77-SLOT-BOARD", variant: SevenSeries,
     hardware_address: Ascii(header: Z77, magic: Some(1)), sensor_key: Long(magic: V1)),
    (name: "H77M-BOARD", variant: SevenSeries,
     hardware_address: Ascii(header: H77M), sensor_key: Long(magic: V1)),
    (name: "X79-BOARD", variant: C602,
     hardware_address: UuidTail, sensor_key: Long(magic: V1), uuid_tail_fallback: Always),
]"#;

/// Built-in table extended with [`EXTRA_BOARDS`]
pub fn boards() -> BoardDatabase {
    let mut boards = BoardDatabase::new();
    boards.load_str(EXTRA_BOARDS).unwrap();
    boards
}

/// Profile of `board` from [`boards`]
pub fn profile(board: &str) -> BoardProfile {
    let identity = BoardIdentity::from_name(board).unwrap();
    boards()
        .lookup(&identity.board_name)
        .cloned()
        .unwrap_or_else(|| panic!("{} is not a known board", board))
}

/// A fully populated record
pub fn sample_record() -> ModuleRecord {
    ModuleRecord {
        hardware_address: Some("10:BF:48:01:02:03".parse().unwrap()),
        sensor_key: Some("13579BDF02468ACE".parse().unwrap()),
        uuid: Some("A1B2C3D4-E5F6-0718-293A-10BF48010203".parse().unwrap()),
        serial_number: Some(SerialNumber::from_text("MT7012345678901").unwrap()),
        ..Default::default()
    }
}
