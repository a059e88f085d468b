//! Error types for the extraction pipeline.
//!
//! Every stage failure is represented here so callers can log it and move
//! on; nothing in this module is ever allowed to abort a run.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::items::ItemKind;

/// The four per-item pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Copy,
    Parse,
    Release,
    Output,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Copy, Stage::Parse, Stage::Release, Stage::Output];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Copy => "copy",
            Stage::Parse => "parse",
            Stage::Release => "release",
            Stage::Output => "output",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported browser {0:?}")]
    Selection(String),

    #[error("profile directory not found: {0:?}")]
    Profile(PathBuf),

    #[error("{browser}: master key unavailable: {reason}")]
    Key { browser: String, reason: String },

    #[error("cannot copy {path:?}: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse {kind}: {reason}")]
    Parse { kind: ItemKind, reason: String },

    #[error("cannot release working copy {path:?}: {source}")]
    Release {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write {kind} output: {reason}")]
    Output { kind: ItemKind, reason: String },

    #[error("cannot archive {dir:?}: {source}")]
    Archive {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type ExtractResult<T> = Result<T, ExtractError>;
