//! Write command implementation

use super::{load_image, save_image};
use crate::cli::{EditArgs, LayoutChoiceArgs};
use fd44_core::board::BoardDatabase;
use fd44_core::patch::RecordPatch;
use fd44_core::record::ModuleRecord;
use fd44_core::{decode_with, encode, Decoded, Undecided};
use std::path::Path;

/// Collect field edits from a record file and command line flags
///
/// Flags take precedence over the file.
fn collect_edits(edits: &EditArgs) -> Result<RecordPatch, Box<dyn std::error::Error>> {
    let flags = RecordPatch {
        board: None,
        mac: edits.mac.clone(),
        uuid: edits.uuid.clone(),
        serial: edits.serial.clone(),
        sensor_key: edits.sensor_key.clone(),
    };
    match &edits.record {
        Some(path) => {
            let file = RecordPatch::from_toml_file(path)?;
            log::info!("Loaded record from {:?}", path);
            Ok(flags.merge(file))
        }
        None => Ok(flags),
    }
}

/// Decode `input`, apply edits, and write the fields into `target`
pub fn cmd_write(
    input: &Path,
    target: &Path,
    output: &Path,
    edits: &EditArgs,
    layout: &LayoutChoiceArgs,
    boards: &BoardDatabase,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = load_image(input)?;
    let target_image = if target == input {
        source.clone()
    } else {
        load_image(target)?
    };
    let patch = collect_edits(edits)?;

    let (identity, record, profile) = match decode_with(&source, boards)? {
        Decoded::Valid(valid) => {
            if layout.address_storage.is_some() || layout.key_layout.is_some() {
                log::warn!("Module already holds data, layout choices are ignored");
            }
            (valid.info.identity, valid.record, valid.profile)
        }
        Decoded::Empty(empty) => {
            log::info!("Source module is empty, writing only the given fields");
            (empty.info.identity, ModuleRecord::default(), empty.profile)
        }
        Decoded::PartiallyResolved(partial) => {
            if partial.undecided.contains(Undecided::ADDRESS_STORAGE)
                && layout.address_storage.is_none()
            {
                return Err("Board is not in the profile table: --address-storage is required".into());
            }
            let key_layout = layout
                .key_layout
                .ok_or("Board is not in the profile table: --key-layout is required")?;
            let completed =
                partial.complete(layout.address_storage.map(Into::into), key_layout.into())?;
            (completed.info.identity, ModuleRecord::default(), completed.profile)
        }
    };

    if patch.is_empty() {
        log::info!("No field edits given, copying fields unchanged");
    }
    let record = patch.apply(&record)?;

    let patched = encode(&target_image, &identity, &record, &profile)?;
    save_image(output, &patched)?;

    println!(
        "Wrote identity of {} into {:?}, saved to {:?}",
        identity.name(),
        target,
        output
    );
    Ok(())
}
