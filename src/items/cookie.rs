//! Cookie store extraction.

use anyhow::Result;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::browser::SecretKey;
use crate::crypto;
use crate::items::{chrome_epoch_to_unix, csv_field, format_unix};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cookie {
    pub host: String,
    pub name: String,
    pub value: String,
    pub path: String,
    pub is_secure: bool,
    pub is_http_only: bool,
    pub expires_at: i64,
}

pub const CSV_HEADER: &str = "host,name,value,path,is_secure,is_http_only,expires_at";

pub fn csv_row(c: &Cookie) -> String {
    format!(
        "{},{},{},{},{},{},{}",
        csv_field(&c.host),
        csv_field(&c.name),
        csv_field(&c.value),
        csv_field(&c.path),
        c.is_secure,
        c.is_http_only,
        csv_field(&format_unix(c.expires_at)),
    )
}

/// Extract cookies from a Chromium `Cookies` snapshot. Encrypted values are
/// decrypted with the handle's key when available.
pub fn chromium(db_path: &Path, key: Option<&SecretKey>) -> Result<Vec<Cookie>> {
    let conn = Connection::open(db_path)?;

    let mut stmt = conn.prepare(
        "SELECT host_key, name, value, encrypted_value, path,
                is_secure, is_httponly, expires_utc
         FROM cookies",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Vec<u8>>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, bool>(5)?,
            row.get::<_, bool>(6)?,
            row.get::<_, i64>(7)?,
        ))
    })?;

    let mut cookies = Vec::new();
    for row in rows {
        let (host, name, clear_value, blob, path, is_secure, is_http_only, expires_utc) = row?;

        let value = if !clear_value.is_empty() {
            clear_value
        } else if crypto::is_encrypted(&blob) {
            match key {
                Some(key) => crypto::decrypt_v10(key.as_bytes(), &blob)
                    .unwrap_or_else(|_| "[decryption failed]".to_string()),
                None => "[key unavailable]".to_string(),
            }
        } else {
            String::from_utf8_lossy(&blob).to_string()
        };

        cookies.push(Cookie {
            host,
            name,
            value,
            path,
            is_secure,
            is_http_only,
            expires_at: chrome_epoch_to_unix(expires_utc),
        });
    }

    Ok(cookies)
}

/// Extract cookies from a Firefox `cookies.sqlite` snapshot. No key needed.
pub fn firefox(db_path: &Path) -> Result<Vec<Cookie>> {
    let conn = Connection::open(db_path)?;

    let mut stmt = conn.prepare(
        "SELECT host, name, value, path, isSecure, isHttpOnly, expiry FROM moz_cookies",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(Cookie {
            host: row.get(0)?,
            name: row.get(1)?,
            value: row.get(2)?,
            path: row.get(3)?,
            is_secure: row.get::<_, i64>(4)? != 0,
            is_http_only: row.get::<_, i64>(5)? != 0,
            expires_at: row.get(6)?,
        })
    })?;

    let mut cookies = Vec::new();
    for cookie in rows {
        cookies.push(cookie?);
    }
    Ok(cookies)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn firefox_cookie_extraction() {
        let tmp = tempfile::tempdir().unwrap();
        let db = tmp.path().join("cookies.sqlite");
        let conn = Connection::open(&db).unwrap();
        conn.execute_batch(
            "CREATE TABLE moz_cookies (
                host TEXT, name TEXT, value TEXT, path TEXT,
                isSecure INTEGER, isHttpOnly INTEGER, expiry INTEGER
            );
            INSERT INTO moz_cookies VALUES
                ('example.com', 'sid', 'abc123', '/', 1, 1, 1900000000);",
        )
        .unwrap();
        drop(conn);

        let got = firefox(&db).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].name, "sid");
        assert!(got[0].is_secure);
        assert!(got[0].is_http_only);
    }

    #[test]
    fn chromium_clear_value_wins_over_blob() {
        let tmp = tempfile::tempdir().unwrap();
        let db = tmp.path().join("Cookies");
        let conn = Connection::open(&db).unwrap();
        conn.execute_batch(
            "CREATE TABLE cookies (
                host_key TEXT, name TEXT, value TEXT, encrypted_value BLOB,
                path TEXT, is_secure INTEGER, is_httponly INTEGER, expires_utc INTEGER
            );",
        )
        .unwrap();
        conn.execute(
            "INSERT INTO cookies VALUES ('a.example', 'n', 'clear', ?1, '/', 0, 0, 0)",
            rusqlite::params![b"v10garbage".to_vec()],
        )
        .unwrap();
        drop(conn);

        let got = chromium(&db, None).unwrap();
        assert_eq!(got[0].value, "clear");
    }
}
