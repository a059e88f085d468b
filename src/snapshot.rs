//! Filesystem helpers for the Copy/Release stage pair.
//!
//! Browser databases are snapshotted into a private uuid-named workspace
//! under the system temp dir before parsing, so a locked or in-use original
//! is never opened directly. SQLite sidecar files (WAL/SHM/journal) are
//! carried along when present.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

const SIDECAR_SUFFIXES: [&str; 3] = ["-wal", "-shm", "-journal"];

pub fn ensure_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

/// Private working location for one item's snapshot.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub dir: PathBuf,
    pub file: PathBuf,
}

/// Copy `source` (plus any SQLite sidecars) into a fresh temp workspace.
pub fn snapshot_db(source: &Path) -> io::Result<Workspace> {
    let dir = std::env::temp_dir().join(format!("browser-data-export-{}", Uuid::new_v4()));
    fs::create_dir_all(&dir)?;

    let file_name = source
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("data"));
    let dest = dir.join(&file_name);

    if let Err(e) = fs::copy(source, &dest) {
        let _ = fs::remove_dir_all(&dir);
        return Err(e);
    }

    for suffix in SIDECAR_SUFFIXES {
        let mut sidecar = source.as_os_str().to_os_string();
        sidecar.push(suffix);
        let sidecar = PathBuf::from(sidecar);
        if sidecar.exists() {
            let mut sidecar_dest = dest.as_os_str().to_os_string();
            sidecar_dest.push(suffix);
            // Sidecars can vanish between the exists check and the copy
            // while the browser is running; the main snapshot is what counts.
            let _ = fs::copy(&sidecar, PathBuf::from(sidecar_dest));
        }
    }

    debug!("snapshotted {:?} into {:?}", source, dir);
    Ok(Workspace { dir, file: dest })
}

/// Delete a workspace and everything in it.
pub fn remove_workspace(workspace: &Workspace) -> io::Result<()> {
    fs::remove_dir_all(&workspace.dir)
}
