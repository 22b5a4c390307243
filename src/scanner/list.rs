use crate::error::{Error, Result};
use crate::model::DirectoryEntry;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, trace};

/// List the immediate non-directory entries of `dir`, sorted by file name.
///
/// Any failure while reading the directory aborts the listing; a run never
/// starts from a partial snapshot.
pub fn list_entries(dir: &Path) -> Result<Vec<DirectoryEntry>> {
    let read_error = |source: io::Error| Error::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for entry_result in fs::read_dir(dir).map_err(read_error)? {
        let entry = entry_result.map_err(read_error)?;
        let path = entry.path();

        // Follow symlinks so a link to a directory is treated as one.
        let is_dir = match fs::metadata(&path) {
            Ok(metadata) => metadata.is_dir(),
            Err(err) => {
                // Dangling symlink or a file removed since the listing; let
                // the unit of work report it.
                trace!("No metadata for {}: {}", path.display(), err);
                false
            }
        };
        if is_dir {
            trace!("Skipping directory {}", path.display());
            continue;
        }

        entries.push(DirectoryEntry::new(path, entry.file_name()));
    }

    entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    debug!("{} entries listed in {}", entries.len(), dir.display());
    Ok(entries)
}
