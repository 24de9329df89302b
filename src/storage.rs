use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::types::Listing;

/// Load the previously saved snapshot.
///
/// A missing, unreadable or corrupt file is an empty snapshot.
pub fn load_listings(path: &Path) -> Vec<Listing> {
    if !path.exists() {
        tracing::debug!("No snapshot at {:?}, starting empty", path);
        return vec![];
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!("Unreadable snapshot {:?}: {}", path, e);
            return vec![];
        }
    };

    serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::debug!("Corrupt snapshot {:?}: {}", path, e);
        vec![]
    })
}

/// Overwrite the snapshot file with `listings` as a JSON array.
pub fn save_listings(path: &Path, listings: &[Listing]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create snapshot directory {:?}", parent))?;
    }

    let json = serde_json::to_string_pretty(listings).context("Failed to serialize listings")?;
    fs::write(path, json).with_context(|| format!("Failed to write listings to {:?}", path))?;
    Ok(())
}
