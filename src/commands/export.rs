//! Export command implementation

use super::load_image;
use fd44_core::board::BoardDatabase;
use fd44_core::patch::RecordPatch;
use fd44_core::{decode_with, Decoded};
use std::path::Path;

/// Export the decoded fields of an image as a TOML record file
pub fn cmd_export(
    input: &Path,
    output: Option<&Path>,
    boards: &BoardDatabase,
) -> Result<(), Box<dyn std::error::Error>> {
    let image = load_image(input)?;

    let valid = match decode_with(&image, boards)? {
        Decoded::Valid(valid) => valid,
        Decoded::Empty(_) | Decoded::PartiallyResolved(_) => {
            return Err(format!("{}: module is empty, nothing to export", input.display()).into());
        }
    };

    let board = valid.info.identity.name();
    let patch = RecordPatch::from_record(&valid.record, Some(&board));

    if let Some(out) = output {
        patch.to_toml_file(out)?;
        println!("Saved record to {:?}", out);
    } else {
        print!("{}", patch.to_toml_string()?);
    }

    Ok(())
}
