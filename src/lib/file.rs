// SPDX-License-Identifier: Apache-2.0

use std::io::Write;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use crate::NetRenderError;

pub(crate) const DEFAULT_FILE_MODE: u32 = 0o644;
const ROOT_DIR: &str = "/";

/// Resolve a path relative to the target root, `/` when not defined.
pub(crate) fn target_path(target: Option<&Path>, rel_path: &str) -> PathBuf {
    target
        .unwrap_or_else(|| Path::new(ROOT_DIR))
        .join(rel_path.trim_start_matches('/'))
}

/// Read file content, `Ok(None)` if not exist.
pub(crate) fn read_file(path: &Path) -> Result<Option<String>, NetRenderError> {
    match std::fs::read_to_string(path) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write file with specified mode, parent folders created if required.
pub(crate) fn write_file(
    path: &Path,
    content: &str,
    mode: u32,
) -> Result<(), NetRenderError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut fd = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)?;
    fd.write_all(content.as_bytes())?;
    // The mode of `open()` only applies to new file
    fd.set_permissions(std::fs::Permissions::from_mode(mode))?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

/// Create symbolic link unless `link` already exists.
pub(crate) fn symlink_if_missing(
    original: &str,
    link: &Path,
) -> Result<(), NetRenderError> {
    if link.symlink_metadata().is_ok() {
        log::debug!("{} already exists", link.display());
        return Ok(());
    }
    if let Some(parent) = link.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::os::unix::fs::symlink(original, link)?;
    log::debug!("Created symbolic link {} -> {original}", link.display());
    Ok(())
}
