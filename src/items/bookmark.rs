//! Bookmark extraction.
//!
//! Chromium keeps bookmarks in a JSON file (`Bookmarks`), Firefox in the
//! `moz_bookmarks`/`moz_places` tables of `places.sqlite`.

use anyhow::Result;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::items::{chrome_epoch_to_unix, csv_field, format_unix};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    pub url: String,
    pub title: String,
    pub folder: String,
    pub date_added: i64,
}

pub const CSV_HEADER: &str = "url,title,folder,date_added";

pub fn csv_row(b: &Bookmark) -> String {
    format!(
        "{},{},{},{}",
        csv_field(&b.url),
        csv_field(&b.title),
        csv_field(&b.folder),
        csv_field(&format_unix(b.date_added)),
    )
}

/// Extract bookmarks from a Chromium `Bookmarks` JSON snapshot.
pub fn chromium(json_path: &Path) -> Result<Vec<Bookmark>> {
    let data = std::fs::read_to_string(json_path)?;
    let json: serde_json::Value = serde_json::from_str(&data)?;

    let mut bookmarks = Vec::new();
    if let Some(roots) = json.get("roots").and_then(|v| v.as_object()) {
        for (root_name, root) in roots {
            walk_chromium_node(root, root_name, &mut bookmarks);
        }
    }

    Ok(bookmarks)
}

fn walk_chromium_node(node: &serde_json::Value, folder: &str, out: &mut Vec<Bookmark>) {
    let Some(children) = node.get("children").and_then(|v| v.as_array()) else {
        return;
    };
    for child in children {
        let is_folder = child.get("type").and_then(|v| v.as_str()) == Some("folder");
        let name = child.get("name").and_then(|v| v.as_str()).unwrap_or("");

        if is_folder {
            let nested = format!("{}/{}", folder, name);
            walk_chromium_node(child, &nested, out);
        } else if let Some(url) = child.get("url").and_then(|v| v.as_str()) {
            // date_added is webkit epoch microseconds stored as a string
            let date_added = child
                .get("date_added")
                .and_then(|v| v.as_str())
                .and_then(|s| s.parse::<i64>().ok())
                .unwrap_or(0);
            out.push(Bookmark {
                url: url.to_string(),
                title: name.to_string(),
                folder: folder.to_string(),
                date_added: chrome_epoch_to_unix(date_added),
            });
        }
    }
}

/// Extract bookmarks from a Firefox `places.sqlite` snapshot.
pub fn firefox(db_path: &Path) -> Result<Vec<Bookmark>> {
    let conn = Connection::open(db_path)?;

    let mut stmt = conn.prepare(
        "SELECT p.url, b.title, b.dateAdded
         FROM moz_bookmarks b
         JOIN moz_places p ON b.fk = p.id
         WHERE b.type = 1
         ORDER BY b.position",
    )?;

    let rows = stmt.query_map([], |row| {
        let date_added: Option<i64> = row.get(2)?;
        Ok(Bookmark {
            url: row.get(0)?,
            title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            folder: String::new(),
            date_added: date_added.unwrap_or(0) / 1_000_000,
        })
    })?;

    let mut bookmarks = Vec::new();
    for bookmark in rows {
        bookmarks.push(bookmark?);
    }
    Ok(bookmarks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chromium_bookmarks_walk_nested_folders() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Bookmarks");
        std::fs::write(
            &path,
            r#"{
                "roots": {
                    "bookmark_bar": {
                        "children": [
                            {"type": "url", "name": "Example", "url": "https://example.com",
                             "date_added": "13300000000000000"},
                            {"type": "folder", "name": "Work", "children": [
                                {"type": "url", "name": "Docs", "url": "https://docs.example"}
                            ]}
                        ]
                    }
                }
            }"#,
        )
        .unwrap();

        let got = chromium(&path).unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].folder, "bookmark_bar");
        assert_eq!(got[1].folder, "bookmark_bar/Work");
        assert_eq!(got[1].url, "https://docs.example");
    }

    #[test]
    fn firefox_bookmarks_join_places() {
        let tmp = tempfile::tempdir().unwrap();
        let db = tmp.path().join("places.sqlite");
        let conn = Connection::open(&db).unwrap();
        conn.execute_batch(
            "CREATE TABLE moz_places (id INTEGER PRIMARY KEY, url TEXT);
            CREATE TABLE moz_bookmarks (
                id INTEGER PRIMARY KEY, type INTEGER, fk INTEGER,
                title TEXT, position INTEGER, dateAdded INTEGER
            );
            INSERT INTO moz_places VALUES (1, 'https://example.com');
            INSERT INTO moz_bookmarks VALUES (1, 1, 1, 'Example', 0, 1700000000000000);
            INSERT INTO moz_bookmarks VALUES (2, 2, NULL, 'A Folder', 1, NULL);",
        )
        .unwrap();
        drop(conn);

        let got = firefox(&db).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].title, "Example");
        assert_eq!(got[0].date_added, 1_700_000_000);
    }
}
