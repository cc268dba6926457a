//! Report harvesting from the workspace into the caller's destination.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

/// Copy every `<base_name>.<ext>` file from `src` into `dest`.
///
/// Runs after the tool has exited, whatever the invocation outcome.
/// Existing files are overwritten, so harvesting an unchanged workspace
/// twice yields the same set of files. Copy failures are logged and
/// skipped; they never alter the invocation result and never block the
/// workspace cleanup that follows. Returns the number of files copied.
pub fn harvest_reports(src: &Path, base_name: &str, dest: &Path) -> usize {
    if base_name.is_empty() {
        return 0;
    }

    if let Err(e) = fs::create_dir_all(dest) {
        warn!(dest = %dest.display(), error = %e, "cannot create report destination");
        return 0;
    }

    let entries = match fs::read_dir(src) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(src = %src.display(), error = %e, "cannot read analysis workspace");
            return 0;
        }
    };

    let prefix = format!("{base_name}.");
    let mut copied = 0;

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) if name.starts_with(&prefix) => name.to_string(),
            _ => continue,
        };
        match fs::copy(&path, dest.join(&name)) {
            Ok(_) => {
                debug!(report = %name, "harvested report");
                copied += 1;
            }
            Err(e) => warn!(report = %name, error = %e, "failed to copy report"),
        }
    }

    copied
}
