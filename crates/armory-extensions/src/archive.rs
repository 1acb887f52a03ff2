//! Safe release archive extraction
//!
//! Expands a release zip into a destination directory while enforcing
//! containment: every entry's resolved path must stay under the
//! destination after path cleaning. Archive-supplied paths are never
//! trusted. On a containment violation the extraction aborts; partial
//! contents may remain and callers should treat the destination as
//! failed and remove it.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use tracing::{debug, trace};
use zip::ZipArchive;

use armory_core::{Error, Result};

/// Extract a release zip into `dest`
///
/// Directory entries are created idempotently. File entries are written
/// with create/truncate semantics, parents created as needed, and the
/// entry's recorded unix mode applied where the platform supports it.
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| Error::decode(format!("Not a valid zip archive: {}", e)))?;

    debug!(
        "Extracting {} entries from {} to {}",
        archive.len(),
        archive_path.display(),
        dest.display()
    );

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| Error::decode(format!("Failed to read archive entry: {}", e)))?;

        // Reject absolute paths and any `..` component before touching disk
        let Some(relative) = entry.enclosed_name() else {
            return Err(Error::path_traversal(entry.name()));
        };

        let out_path = dest.join(&relative);
        if !out_path.starts_with(dest) {
            return Err(Error::path_traversal(entry.name()));
        }

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }

        trace!("Writing {}", out_path.display());
        let mut out_file = File::create(&out_path)?;
        io::copy(&mut entry, &mut out_file)?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&out_path, fs::Permissions::from_mode(mode))?;
        }
    }

    Ok(())
}
