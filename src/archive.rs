//! Post-run archiving of the export directory.
//!
//! Produces a single `<dir>.tar.gz` artifact next to the export directory,
//! containing the directory and everything under it.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use flate2::{write::GzEncoder, Compression};
use tracing::info;
use walkdir::WalkDir;

use crate::error::{ExtractError, ExtractResult};

pub fn compress_dir(dir: &Path) -> ExtractResult<PathBuf> {
    compress_dir_inner(dir).map_err(|source| ExtractError::Archive {
        dir: dir.to_path_buf(),
        source,
    })
}

fn compress_dir_inner(dir: &Path) -> io::Result<PathBuf> {
    let artifact = PathBuf::from(format!("{}.tar.gz", dir.display()));
    let root = dir
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("results"));

    let file = File::create(&artifact)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for entry in WalkDir::new(dir).min_depth(1) {
        let entry = entry.map_err(io::Error::other)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        builder.append_path_with_name(entry.path(), root.join(rel))?;
    }

    let encoder = builder.into_inner()?;
    encoder.finish()?;

    info!("archived {:?} into {:?}", dir, artifact);
    Ok(artifact)
}
