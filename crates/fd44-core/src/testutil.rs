//! Synthetic image builders shared by unit tests

use crate::image::{BOARD_NAME_LEN, GBE_SIGNATURE};
use crate::module::{MODULE_HEADER_LEN, MODULE_SIGNATURE, MODULE_TAG};

/// Write a `$BOOTEFI$` record at `offset`, followed by `tail`
pub fn put_bootefi(image: &mut [u8], offset: usize, name: &str, tail: &[u8]) {
    let mut pos = offset;
    let mut put = |bytes: &[u8]| {
        image[pos..pos + bytes.len()].copy_from_slice(bytes);
        pos += bytes.len();
    };
    put(b"$BOOTEFI$");
    put(&[0x00, 0x02, 0x00]);
    put(&[0x08, 0x01]);
    let mut raw = [0u8; BOARD_NAME_LEN];
    raw[..name.len()].copy_from_slice(name.as_bytes());
    put(&raw);
    put(&[0xFF; 21]);
    put(b"05/14/2012");
    put(tail);
}

/// Write a module header at `offset`
pub fn put_module_header(image: &mut [u8], offset: usize, tag: u8, declared_len: usize, tagged: bool) {
    let header = &mut image[offset..offset + MODULE_HEADER_LEN];
    header.fill(0);
    header[..16].copy_from_slice(&MODULE_SIGNATURE);
    header[16] = tag;
    header[20..23].copy_from_slice(&(declared_len as u32).to_le_bytes()[..3]);
    if tagged {
        header[28..32].copy_from_slice(&MODULE_TAG);
    }
}

/// Write a tagged module with `body` followed by fill bytes
pub fn put_module(image: &mut [u8], offset: usize, tag: u8, declared_len: usize, body: &[u8]) {
    put_module_header(image, offset, tag, declared_len, true);
    let start = offset + MODULE_HEADER_LEN;
    let end = offset + declared_len;
    image[start..end].fill(0xFF);
    image[start..start + body.len()].copy_from_slice(body);
}

/// Write a network region marker at `offset`, preceded by version and address
pub fn put_gbe(image: &mut [u8], offset: usize, mac: [u8; 6]) {
    image[offset - 8..offset - 6].copy_from_slice(&[0x38, 0x01]);
    image[offset - 6..offset].copy_from_slice(&mac);
    image[offset..offset + GBE_SIGNATURE.len()].copy_from_slice(&GBE_SIGNATURE);
}
