//! Browsing history extraction.

use anyhow::Result;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::items::{chrome_epoch_to_unix, csv_field, format_unix};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub url: String,
    pub title: String,
    pub visit_count: i64,
    pub last_visit_at: i64,
}

pub const CSV_HEADER: &str = "url,title,visit_count,last_visit_at";

pub fn csv_row(h: &HistoryEntry) -> String {
    format!(
        "{},{},{},{}",
        csv_field(&h.url),
        csv_field(&h.title),
        h.visit_count,
        csv_field(&format_unix(h.last_visit_at)),
    )
}

/// Extract history from a Chromium `History` snapshot.
pub fn chromium(db_path: &Path) -> Result<Vec<HistoryEntry>> {
    let conn = Connection::open(db_path)?;

    let mut stmt =
        conn.prepare("SELECT url, title, visit_count, last_visit_time FROM urls")?;

    let rows = stmt.query_map([], |row| {
        Ok(HistoryEntry {
            url: row.get(0)?,
            title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            visit_count: row.get(2)?,
            last_visit_at: chrome_epoch_to_unix(row.get(3)?),
        })
    })?;

    let mut entries = Vec::new();
    for entry in rows {
        entries.push(entry?);
    }

    entries.sort_by(|a, b| b.visit_count.cmp(&a.visit_count));
    Ok(entries)
}

/// Extract history from a Firefox `places.sqlite` snapshot.
pub fn firefox(db_path: &Path) -> Result<Vec<HistoryEntry>> {
    let conn = Connection::open(db_path)?;

    let mut stmt = conn.prepare(
        "SELECT url, title, visit_count, last_visit_date
         FROM moz_places
         WHERE visit_count > 0",
    )?;

    let rows = stmt.query_map([], |row| {
        // last_visit_date is PRTime: microseconds since the unix epoch
        let last_visit: Option<i64> = row.get(3)?;
        Ok(HistoryEntry {
            url: row.get(0)?,
            title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            visit_count: row.get(2)?,
            last_visit_at: last_visit.unwrap_or(0) / 1_000_000,
        })
    })?;

    let mut entries = Vec::new();
    for entry in rows {
        entries.push(entry?);
    }

    entries.sort_by(|a, b| b.visit_count.cmp(&a.visit_count));
    Ok(entries)
}
