//! Data items and their record collections.
//!
//! One item is one data category (passwords, cookies, history, bookmarks)
//! belonging to one browser handle. Items move through the pipeline's fixed
//! Copy → Parse → Release → Output sequence; each stage body lives here,
//! the sequencing lives in `pipeline`.

pub mod bookmark;
pub mod cookie;
pub mod history;
pub mod password;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::browser::{BrowserFamily, SecretKey};
use crate::error::{ExtractError, ExtractResult};
use crate::output::OutputSink;
use crate::snapshot::{self, Workspace};

pub use bookmark::Bookmark;
pub use cookie::Cookie;
pub use history::HistoryEntry;
pub use password::Password;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Passwords,
    Cookies,
    History,
    Bookmarks,
}

impl ItemKind {
    pub const ALL: [ItemKind; 4] = [
        ItemKind::Passwords,
        ItemKind::Cookies,
        ItemKind::History,
        ItemKind::Bookmarks,
    ];

    /// Label used in export filenames and aggregate keys.
    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Passwords => "password",
            ItemKind::Cookies => "cookie",
            ItemKind::History => "history",
            ItemKind::Bookmarks => "bookmark",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parsed record collection for one item.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Records {
    Passwords(Vec<Password>),
    Cookies(Vec<Cookie>),
    History(Vec<HistoryEntry>),
    Bookmarks(Vec<Bookmark>),
}

impl Records {
    pub fn empty(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Passwords => Records::Passwords(Vec::new()),
            ItemKind::Cookies => Records::Cookies(Vec::new()),
            ItemKind::History => Records::History(Vec::new()),
            ItemKind::Bookmarks => Records::Bookmarks(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Records::Passwords(v) => v.len(),
            Records::Cookies(v) => v.len(),
            Records::History(v) => v.len(),
            Records::Bookmarks(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render the collection as CSV, header included.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        match self {
            Records::Passwords(v) => {
                out.push_str(password::CSV_HEADER);
                out.push('\n');
                for r in v {
                    out.push_str(&password::csv_row(r));
                    out.push('\n');
                }
            }
            Records::Cookies(v) => {
                out.push_str(cookie::CSV_HEADER);
                out.push('\n');
                for r in v {
                    out.push_str(&cookie::csv_row(r));
                    out.push('\n');
                }
            }
            Records::History(v) => {
                out.push_str(history::CSV_HEADER);
                out.push('\n');
                for r in v {
                    out.push_str(&history::csv_row(r));
                    out.push('\n');
                }
            }
            Records::Bookmarks(v) => {
                out.push_str(bookmark::CSV_HEADER);
                out.push('\n');
                for r in v {
                    out.push_str(&bookmark::csv_row(r));
                    out.push('\n');
                }
            }
        }
        out
    }
}

/// The four-stage capability surface the pipeline drives items through.
pub trait DataItem {
    fn kind(&self) -> ItemKind;
    /// Snapshot the (possibly locked) source file into a private workspace.
    fn copy(&mut self) -> ExtractResult<()>;
    /// Populate the record collection from the working copy.
    fn parse(&mut self, key: Option<&SecretKey>) -> ExtractResult<()>;
    /// Discard working resources for the item.
    fn release(&mut self) -> ExtractResult<()>;
    /// Serialize whatever records exist through the configured sink.
    fn output(&self, browser: &str, sink: &mut OutputSink<'_>) -> ExtractResult<()>;
}

/// Parse routine selected when the handle constructs its items, so the
/// pipeline never inspects the browser variant at run time.
#[derive(Debug, Clone, Copy)]
pub enum ParseStrategy {
    Chromium,
    Firefox,
}

impl From<BrowserFamily> for ParseStrategy {
    fn from(family: BrowserFamily) -> Self {
        match family {
            BrowserFamily::Chromium => ParseStrategy::Chromium,
            BrowserFamily::Firefox => ParseStrategy::Firefox,
        }
    }
}

impl ParseStrategy {
    fn parse(
        &self,
        kind: ItemKind,
        path: &Path,
        key: Option<&SecretKey>,
    ) -> anyhow::Result<Records> {
        let records = match (self, kind) {
            (ParseStrategy::Chromium, ItemKind::Passwords) => {
                Records::Passwords(password::chromium(path, key)?)
            }
            (ParseStrategy::Chromium, ItemKind::Cookies) => {
                Records::Cookies(cookie::chromium(path, key)?)
            }
            (ParseStrategy::Chromium, ItemKind::History) => {
                Records::History(history::chromium(path)?)
            }
            (ParseStrategy::Chromium, ItemKind::Bookmarks) => {
                Records::Bookmarks(bookmark::chromium(path)?)
            }
            (ParseStrategy::Firefox, ItemKind::Passwords) => {
                Records::Passwords(password::firefox(path)?)
            }
            (ParseStrategy::Firefox, ItemKind::Cookies) => {
                Records::Cookies(cookie::firefox(path)?)
            }
            (ParseStrategy::Firefox, ItemKind::History) => {
                Records::History(history::firefox(path)?)
            }
            (ParseStrategy::Firefox, ItemKind::Bookmarks) => {
                Records::Bookmarks(bookmark::firefox(path)?)
            }
        };
        Ok(records)
    }
}

/// Concrete item backed by one file inside a browser profile.
pub struct ProfileItem {
    kind: ItemKind,
    strategy: ParseStrategy,
    source: PathBuf,
    workspace: Option<Workspace>,
    records: Option<Records>,
}

impl ProfileItem {
    pub fn new(kind: ItemKind, strategy: ParseStrategy, source: PathBuf) -> Self {
        Self {
            kind,
            strategy,
            source,
            workspace: None,
            records: None,
        }
    }
}

impl DataItem for ProfileItem {
    fn kind(&self) -> ItemKind {
        self.kind
    }

    fn copy(&mut self) -> ExtractResult<()> {
        let workspace = snapshot::snapshot_db(&self.source).map_err(|source| {
            ExtractError::Copy {
                path: self.source.clone(),
                source,
            }
        })?;
        self.workspace = Some(workspace);
        Ok(())
    }

    fn parse(&mut self, key: Option<&SecretKey>) -> ExtractResult<()> {
        let path = match &self.workspace {
            Some(ws) => ws.file.clone(),
            // Copy failed earlier; the parse attempt still runs and fails
            // on its own terms, per the fail-open pipeline contract.
            None => {
                return Err(ExtractError::Parse {
                    kind: self.kind,
                    reason: "no working copy available".to_string(),
                })
            }
        };

        let records =
            self.strategy
                .parse(self.kind, &path, key)
                .map_err(|e| ExtractError::Parse {
                    kind: self.kind,
                    reason: e.to_string(),
                })?;
        self.records = Some(records);
        Ok(())
    }

    fn release(&mut self) -> ExtractResult<()> {
        let Some(workspace) = self.workspace.take() else {
            return Ok(());
        };
        snapshot::remove_workspace(&workspace).map_err(|source| ExtractError::Release {
            path: workspace.dir.clone(),
            source,
        })
    }

    fn output(&self, browser: &str, sink: &mut OutputSink<'_>) -> ExtractResult<()> {
        // Output always runs, even for an item whose parse failed; an empty
        // collection of the right kind is emitted in that case.
        let empty = Records::empty(self.kind);
        let records = self.records.as_ref().unwrap_or(&empty);
        sink.write(browser, self.kind, records)
    }
}

/// Convert a Chrome/WebKit timestamp (microseconds since 1601-01-01) to
/// unix seconds.
pub(crate) fn chrome_epoch_to_unix(value: i64) -> i64 {
    if value <= 0 {
        return 0;
    }
    (value / 1_000_000 - 11_644_473_600).max(0)
}

/// Human-readable UTC timestamp for CSV output; zero renders empty.
pub(crate) fn format_unix(ts: i64) -> String {
    if ts <= 0 {
        return String::new();
    }
    match chrono::DateTime::from_timestamp(ts, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => String::new(),
    }
}

/// Quote a CSV field, doubling embedded quotes.
pub(crate) fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
