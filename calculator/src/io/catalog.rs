//! Plugin directory enumeration under a catalog root.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::CatalogError;

/// List plugin directories under `root`, sorted by directory name.
///
/// Plain files and directories whose name starts with `.` or `_` (caches,
/// scratch space) are skipped.
pub fn plugin_dirs(root: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    let unreadable = |source| CatalogError::Unreadable {
        root: root.to_path_buf(),
        source,
    };
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name();
        if name.to_string_lossy().starts_with(['.', '_']) {
            debug!(dir = %path.display(), "skipping non-plugin directory");
            continue;
        }
        dirs.push(path);
    }
    dirs.sort();
    Ok(dirs)
}
