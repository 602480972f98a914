//! CLI command implementations
//!
//! Every command works on image files: an image is loaded whole, decoded or
//! patched in memory, and saved to a new file. Images are never modified in
//! place.

pub mod boards;
pub mod export;
pub mod show;
pub mod write;

use std::fs;
use std::path::Path;

/// Load a whole firmware image
pub fn load_image(path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let data = fs::read(path).map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
    if data.is_empty() {
        return Err(format!("{} is empty", path.display()).into());
    }
    log::debug!("Loaded {} bytes from {}", data.len(), path.display());
    Ok(data)
}

/// Save a patched firmware image
pub fn save_image(path: &Path, data: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
    fs::write(path, data).map_err(|e| format!("Cannot write {}: {}", path.display(), e))?;
    log::debug!("Saved {} bytes to {}", data.len(), path.display());
    Ok(())
}
