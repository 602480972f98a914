//! `$BOOTEFI$` board identity record
//!
//! The record names the board and firmware build. Some images carry several
//! copies; the last one is canonical.

use std::borrow::Cow;

use crate::error::{Error, Result};
use crate::scan::{find_last, slice_at};

/// `$BOOTEFI$` marker
pub const BOOTEFI_SIGNATURE: &[u8; 9] = b"$BOOTEFI$";

const BOOTEFI_MAGIC_LEN: usize = 3;
const BOOTEFI_VERSION_LEN: usize = 2;
/// Width of the board name field
pub const BOARD_NAME_LEN: usize = 60;
/// Gap between the end of the name and the date
const BOOTEFI_DATE_OFFSET: usize = 21;
const BOOTEFI_DATE_LEN: usize = 10;
const RECOVERY_NAME_LEN: usize = 12;

/// Board identity extracted from the `$BOOTEFI$` record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardIdentity {
    /// Raw NUL padded board name field
    pub board_name: [u8; BOARD_NAME_LEN],
    /// Firmware version, two raw octets
    pub firmware_version: [u8; BOOTEFI_VERSION_LEN],
    /// Firmware build date text
    pub firmware_date: String,
    /// USB recovery file name, when the record carries one
    pub recovery_name: Option<String>,
}

impl BoardIdentity {
    /// Build an identity for a board name, as a caller constructing a record would
    pub fn from_name(name: &str) -> Result<Self> {
        if name.len() > BOARD_NAME_LEN {
            return Err(Error::MalformedField {
                field: "board name",
                reason: format!("longer than {} bytes", BOARD_NAME_LEN),
            });
        }
        let mut board_name = [0u8; BOARD_NAME_LEN];
        board_name[..name.len()].copy_from_slice(name.as_bytes());
        Ok(Self {
            board_name,
            firmware_version: [0; BOOTEFI_VERSION_LEN],
            firmware_date: String::new(),
            recovery_name: None,
        })
    }

    /// Board name up to the first NUL
    pub fn name(&self) -> Cow<'_, str> {
        ascii_field(&self.board_name)
    }

    /// Version as two zero-padded decimal octets, e.g. `0801` for `[8, 1]`
    pub fn version_string(&self) -> String {
        format!(
            "{:02}{:02}",
            self.firmware_version[0], self.firmware_version[1]
        )
    }
}

/// Text of a NUL padded ASCII field
pub(crate) fn ascii_field(raw: &[u8]) -> Cow<'_, str> {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end])
}

/// Offset of the canonical `$BOOTEFI$` record
pub fn find_bootefi(image: &[u8]) -> Option<usize> {
    find_last(image, BOOTEFI_SIGNATURE)
}

/// Read only the raw board name field of the canonical record
pub fn read_board_name(image: &[u8]) -> Result<[u8; BOARD_NAME_LEN]> {
    let pos = find_bootefi(image).ok_or(Error::SignatureNotFound { which: "$BOOTEFI$" })?;
    let offset = pos + BOOTEFI_SIGNATURE.len() + BOOTEFI_MAGIC_LEN + BOOTEFI_VERSION_LEN;
    let raw = slice_at(image, offset, BOARD_NAME_LEN).ok_or(Error::Truncated {
        section: "board name",
        offset,
    })?;
    let mut name = [0u8; BOARD_NAME_LEN];
    name.copy_from_slice(raw);
    Ok(name)
}

/// Parse the canonical `$BOOTEFI$` record
pub fn parse_bootefi(image: &[u8]) -> Result<BoardIdentity> {
    let pos = find_bootefi(image).ok_or(Error::SignatureNotFound { which: "$BOOTEFI$" })?;
    log::debug!("$BOOTEFI$ record at 0x{:08X}", pos);

    let mut offset = pos + BOOTEFI_SIGNATURE.len() + BOOTEFI_MAGIC_LEN;
    let version = slice_at(image, offset, BOOTEFI_VERSION_LEN).ok_or(Error::Truncated {
        section: "firmware version",
        offset,
    })?;
    let firmware_version = [version[0], version[1]];
    offset += BOOTEFI_VERSION_LEN;

    let board_name = read_board_name(image)?;
    offset += BOARD_NAME_LEN + BOOTEFI_DATE_OFFSET;

    let date = slice_at(image, offset, BOOTEFI_DATE_LEN).ok_or(Error::Truncated {
        section: "firmware date",
        offset,
    })?;
    let firmware_date = ascii_field(date).into_owned();
    offset += BOOTEFI_DATE_LEN;

    let recovery_name = slice_at(image, offset, RECOVERY_NAME_LEN).and_then(parse_recovery_name);

    Ok(BoardIdentity {
        board_name,
        firmware_version,
        firmware_date,
        recovery_name,
    })
}

/// Accept only a printable 8.3 file name
fn parse_recovery_name(raw: &[u8]) -> Option<String> {
    let name = ascii_field(raw);
    let (stem, ext) = name.split_once('.')?;
    let valid = |s: &str, max: usize| {
        !s.is_empty() && s.len() <= max && s.bytes().all(|b| b.is_ascii_graphic() && b != b'.')
    };
    (valid(stem, 8) && valid(ext, 3)).then(|| name.into_owned())
}
