use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PhotodeckError, Result};
use crate::naming::is_media_file;

/// Immediate contents of one directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShallowListing {
    pub files: Vec<String>,
    pub folders: Vec<String>,
}

/// List the media files and subdirectories directly inside `dir`.
///
/// No recursion and no metadata. Both lists are sorted by name.
pub fn scan_single(dir: &Path) -> Result<ShallowListing> {
    let read_dir = std::fs::read_dir(dir).map_err(|e| PhotodeckError::unreadable(dir, e))?;

    let mut listing = ShallowListing::default();
    for entry in read_dir {
        let entry = entry.map_err(|e| PhotodeckError::unreadable(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();

        // Follow symlinks so a linked album shows up as a folder
        let is_dir = match std::fs::metadata(entry.path()) {
            Ok(meta) => meta.is_dir(),
            Err(e) => {
                log::debug!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };

        if is_dir {
            listing.folders.push(name);
        } else if is_media_file(&name) {
            listing.files.push(name);
        }
    }

    listing.files.sort();
    listing.folders.sort();
    Ok(listing)
}
