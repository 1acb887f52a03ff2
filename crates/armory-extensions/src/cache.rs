//! Installed-set discovery
//!
//! Rebuilds the mapping of installed extension names to versions by
//! scanning the managed directory. Each installed extension lives in a
//! subdirectory named `<name>_<version>`; the split happens on the last
//! underscore because extension names routinely contain underscores of
//! their own.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, warn};

use armory_core::Result;

/// Scan the extension directory into a name -> version mapping
///
/// Plain files and subdirectories without an underscore are ignored.
/// If two directories claim the same extension name at different
/// versions, the last one scanned wins and a warning is logged.
pub fn scan_installed(dir: &Path) -> Result<BTreeMap<String, String>> {
    let mut installed = BTreeMap::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }

        let file_name = entry.file_name();
        let Some(base) = file_name.to_str() else {
            continue;
        };

        let Some((name, version)) = base.rsplit_once('_') else {
            debug!("Ignoring non-extension directory '{}'", base);
            continue;
        };

        if let Some(previous) = installed.insert(name.to_string(), version.to_string()) {
            warn!(
                "Extension '{}' is installed at multiple versions ({} and {}); using {}",
                name, previous, version, version
            );
        }
    }

    debug!("Found {} installed extension(s) in {}", installed.len(), dir.display());
    Ok(installed)
}
