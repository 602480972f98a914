//! Module header and occurrence search
//!
//! The module is an FFS file. Its header is read in place with `zerocopy`;
//! the checksum byte of the FFS header doubles as the module version tag.

use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

use super::format::{ModuleVariant, FILL, MODULE_HEADER_LEN, MODULE_SIGNATURE, MODULE_TAG};
use crate::error::{Error, Result};
use crate::scan::find_all;

/// On-disk module header
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct ModuleHeader {
    /// File GUID, equal to [`MODULE_SIGNATURE`]
    pub signature: [u8; 16],
    /// Module version tag
    pub variant_tag: u8,
    /// FFS file checksum
    pub file_checksum: u8,
    /// FFS file type
    pub file_type: u8,
    /// FFS attributes
    pub attributes: u8,
    /// Size of the file including this header, 24-bit little endian
    pub size: [u8; 3],
    /// FFS state
    pub state: u8,
    _reserved0: [u8; 4],
    /// Confirmation tag, equal to [`MODULE_TAG`] for genuine modules
    pub tag: [u8; 4],
    _reserved1: [u8; 4],
}

const _: () = assert!(core::mem::size_of::<ModuleHeader>() == MODULE_HEADER_LEN);

impl ModuleHeader {
    /// Read a header from the start of `data`
    pub fn read(data: &[u8]) -> Option<&Self> {
        Self::ref_from_prefix(data).ok().map(|(header, _)| header)
    }

    /// Declared file size, header included
    pub fn declared_len(&self) -> usize {
        let [a, b, c] = self.size;
        u32::from_le_bytes([a, b, c, 0]) as usize
    }

    /// Check for the confirmation tag
    pub fn is_tagged(&self) -> bool {
        self.tag == MODULE_TAG
    }
}

/// One accepted module occurrence in an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleInstance {
    /// Offset of the header in the image
    pub offset: usize,
    /// Raw version tag
    pub tag: u8,
    /// Declared size including the header
    pub declared_len: usize,
}

impl ModuleInstance {
    /// Module version, failing for tags outside the known set
    pub fn variant(&self) -> Result<ModuleVariant> {
        ModuleVariant::from_tag(self.tag).ok_or(Error::UnknownVariant { tag: self.tag })
    }

    /// Body bytes available after the header
    pub fn capacity(&self) -> usize {
        self.declared_len.saturating_sub(MODULE_HEADER_LEN)
    }

    /// Offset of the first body byte
    pub fn body_offset(&self) -> usize {
        self.offset + MODULE_HEADER_LEN
    }

    /// Borrow the body from `image`
    ///
    /// Fails when the declared size does not even cover the header.
    pub fn body<'a>(&self, image: &'a [u8]) -> Result<&'a [u8]> {
        if self.declared_len < MODULE_HEADER_LEN {
            return Err(Error::MalformedField {
                field: "module size",
                reason: format!(
                    "declared size {} at 0x{:08X} is smaller than the {} byte header",
                    self.declared_len, self.offset, MODULE_HEADER_LEN
                ),
            });
        }
        let start = self.body_offset();
        image
            .get(start..start + self.capacity())
            .ok_or(Error::Truncated {
                section: "module body",
                offset: self.offset,
            })
    }
}

/// Check whether a module body holds nothing but fill bytes
pub fn is_empty_body(body: &[u8]) -> bool {
    body.iter().all(|&b| b == FILL)
}

/// Every module occurrence carrying the confirmation tag, in image order
///
/// Signature matches without the tag are skipped.
pub fn find_modules(image: &[u8]) -> Vec<ModuleInstance> {
    find_all(image, &MODULE_SIGNATURE)
        .filter_map(|offset| {
            let Some(header) = ModuleHeader::read(&image[offset..]) else {
                log::debug!("Module signature at 0x{:08X} has a truncated header", offset);
                return None;
            };
            if !header.is_tagged() {
                log::debug!("Module signature at 0x{:08X} lacks the confirmation tag", offset);
                return None;
            }
            log::debug!(
                "Module at 0x{:08X}: tag 0x{:02X}, {} bytes",
                offset,
                header.variant_tag,
                header.declared_len()
            );
            Some(ModuleInstance {
                offset,
                tag: header.variant_tag,
                declared_len: header.declared_len(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{put_module, put_module_header};

    #[test]
    fn test_header_fields() {
        let mut image = vec![0xFF; 0x100];
        put_module_header(&mut image, 0, 0xCD, 0x012345, true);
        let header = ModuleHeader::read(&image).unwrap();
        assert_eq!(header.signature, MODULE_SIGNATURE);
        assert_eq!(header.variant_tag, 0xCD);
        assert_eq!(header.declared_len(), 0x012345);
        assert!(header.is_tagged());
        assert!(ModuleHeader::read(&image[..MODULE_HEADER_LEN - 1]).is_none());
    }

    #[test]
    fn test_untagged_occurrences_are_skipped() {
        let mut image = vec![0xFF; 0x1000];
        put_module(&mut image, 0x100, 0xD3, 0x80, &[]);
        put_module_header(&mut image, 0x400, 0xD3, 0x80, false);
        put_module(&mut image, 0x800, 0xD1, 0x100, &[1, 2, 3]);

        let modules = find_modules(&image);
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].offset, 0x100);
        assert_eq!(modules[0].variant().unwrap(), ModuleVariant::SixSeries);
        assert_eq!(modules[1].offset, 0x800);
        assert_eq!(modules[1].variant().unwrap(), ModuleVariant::C602);
        assert_eq!(modules[1].capacity(), 0x100 - MODULE_HEADER_LEN);
        assert!(is_empty_body(modules[0].body(&image).unwrap()));
        assert!(!is_empty_body(modules[1].body(&image).unwrap()));
    }

    #[test]
    fn test_unknown_tag_and_truncated_body() {
        let mut image = vec![0xFF; 0x80];
        put_module_header(&mut image, 0x10, 0x42, 0x1000, true);
        let module = find_modules(&image)[0];
        assert_eq!(module.variant().unwrap_err(), Error::UnknownVariant { tag: 0x42 });
        assert!(matches!(
            module.body(&image).unwrap_err(),
            Error::Truncated { .. }
        ));
    }

    #[test]
    fn test_size_below_header_is_malformed() {
        let mut image = vec![0xFF; 0x100];
        put_module_header(&mut image, 0x10, 0xD3, 0x10, true);
        image[0x10 + MODULE_HEADER_LEN..0x10 + MODULE_HEADER_LEN + 8].fill(0x00);
        let module = find_modules(&image)[0];
        assert!(matches!(
            module.body(&image).unwrap_err(),
            Error::MalformedField {
                field: "module size",
                ..
            }
        ));
    }

    #[test]
    fn test_header_cut_by_image_end() {
        let mut image = vec![0xFF; 0x40];
        image[0x30..0x40].copy_from_slice(&MODULE_SIGNATURE);
        assert!(find_modules(&image).is_empty());
    }
}
