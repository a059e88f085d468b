//! Saved login extraction.
//!
//! Chromium stores logins in the `Login Data` SQLite database with
//! `v10`-encrypted password blobs. Firefox keeps them in `logins.json`
//! encrypted with NSS, which this tool does not decrypt; those entries are
//! exported with placeholder fields so the record set is still visible.

use anyhow::Result;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::browser::SecretKey;
use crate::crypto;
use crate::items::{chrome_epoch_to_unix, csv_field, format_unix};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Password {
    pub url: String,
    pub username: String,
    pub password: String,
    pub created_at: i64,
}

pub const CSV_HEADER: &str = "url,username,password,created_at";

pub fn csv_row(p: &Password) -> String {
    format!(
        "{},{},{},{}",
        csv_field(&p.url),
        csv_field(&p.username),
        csv_field(&p.password),
        csv_field(&format_unix(p.created_at)),
    )
}

/// Extract logins from a Chromium `Login Data` snapshot.
///
/// A missing key is not fatal: encrypted values fall back to a placeholder
/// so the rest of the record survives.
pub fn chromium(db_path: &Path, key: Option<&SecretKey>) -> Result<Vec<Password>> {
    let conn = Connection::open(db_path)?;

    let mut stmt = conn
        .prepare("SELECT origin_url, username_value, password_value, date_created FROM logins")?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Vec<u8>>(2)?,
            row.get::<_, i64>(3)?,
        ))
    })?;

    let mut passwords = Vec::new();
    for row in rows {
        let (url, username, blob, date_created) = row?;

        let password = if crypto::is_encrypted(&blob) {
            match key {
                Some(key) => crypto::decrypt_v10(key.as_bytes(), &blob)
                    .unwrap_or_else(|_| "[decryption failed]".to_string()),
                None => "[key unavailable]".to_string(),
            }
        } else {
            String::from_utf8_lossy(&blob).to_string()
        };

        passwords.push(Password {
            url,
            username,
            password,
            created_at: chrome_epoch_to_unix(date_created),
        });
    }

    passwords.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(passwords)
}

/// Extract logins from a Firefox `logins.json` snapshot.
pub fn firefox(logins_path: &Path) -> Result<Vec<Password>> {
    let content = std::fs::read_to_string(logins_path)?;
    let json: serde_json::Value = serde_json::from_str(&content)?;

    let mut passwords = Vec::new();
    if let Some(logins) = json["logins"].as_array() {
        for login in logins {
            passwords.push(Password {
                url: login["hostname"].as_str().unwrap_or("").to_string(),
                username: "[encrypted - NSS]".to_string(),
                password: "[encrypted - NSS]".to_string(),
                created_at: login["timeCreated"].as_i64().unwrap_or(0) / 1000,
            });
        }
    }

    Ok(passwords)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn firefox_logins_are_placeholder_records() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("logins.json");
        std::fs::write(
            &path,
            r#"{"logins":[{"hostname":"https://example.com","timeCreated":1700000000000}]}"#,
        )
        .unwrap();

        let got = firefox(&path).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].url, "https://example.com");
        assert_eq!(got[0].password, "[encrypted - NSS]");
        assert_eq!(got[0].created_at, 1_700_000_000);
    }

    #[test]
    fn chromium_reads_and_decrypts_logins() {
        let tmp = tempfile::tempdir().unwrap();
        let db = tmp.path().join("Login Data");
        let conn = Connection::open(&db).unwrap();
        conn.execute_batch(
            "CREATE TABLE logins (
                origin_url TEXT, username_value TEXT,
                password_value BLOB, date_created INTEGER
            );",
        )
        .unwrap();
        conn.execute(
            "INSERT INTO logins VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                "https://example.com",
                "alice",
                b"plaintext-pw".to_vec(),
                13_300_000_000_000_000_i64,
            ],
        )
        .unwrap();
        drop(conn);

        let got = chromium(&db, None).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].username, "alice");
        // unencrypted blob passes through untouched
        assert_eq!(got[0].password, "plaintext-pw");
        assert!(got[0].created_at > 1_600_000_000);
    }

    #[test]
    fn csv_row_escapes_quotes() {
        let p = Password {
            url: "https://example.com/\"x\"".into(),
            username: "a,b".into(),
            password: "p".into(),
            created_at: 0,
        };
        let row = csv_row(&p);
        assert!(row.contains("\"https://example.com/\"\"x\"\"\""));
        assert!(row.contains("\"a,b\""));
    }
}
