//! Writing a payload into every module copy of an image

use super::format::{ModuleVariant, FILL};
use super::header::find_modules;
use crate::error::{Error, Result};

/// Return a copy of `image` with every accepted module body replaced by
/// `payload` followed by fill bytes up to that module's declared size
///
/// All copies are checked before any is written: each must carry the
/// `variant` tag, have room for the payload and end before the next copy.
pub fn write_modules(image: &[u8], payload: &[u8], variant: ModuleVariant) -> Result<Vec<u8>> {
    let modules = find_modules(image);
    if modules.is_empty() {
        return Err(Error::SignatureNotFound { which: "FD44 module" });
    }

    for module in &modules {
        let found = module.variant()?;
        if found != variant {
            return Err(Error::VariantMismatch {
                expected: variant,
                found,
                offset: module.offset,
            });
        }
        module.body(image)?;
        if module.capacity() < payload.len() {
            return Err(Error::CapacityExceeded {
                needed: payload.len(),
                available: module.capacity(),
                offset: module.offset,
            });
        }
    }
    for pair in modules.windows(2) {
        if pair[0].offset + pair[0].declared_len > pair[1].offset {
            return Err(Error::ModuleOverlap {
                offset: pair[0].offset,
                next: pair[1].offset,
            });
        }
    }

    let mut patched = image.to_vec();
    for module in &modules {
        let start = module.body_offset();
        let body = &mut patched[start..start + module.capacity()];
        body[..payload.len()].copy_from_slice(payload);
        body[payload.len()..].fill(FILL);
        log::debug!(
            "Wrote {} byte payload into module at 0x{:08X}",
            payload.len(),
            module.offset
        );
    }
    log::info!("Updated {} module copies", modules.len());

    Ok(patched)
}
