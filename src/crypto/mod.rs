//! Decryption support for browser secrets.
//!
//! Chromium-family browsers are handled here; Firefox logins are NSS-encrypted
//! and outside this tool's scope (entries are exported with placeholders).

pub mod chromium;

pub use chromium::{decrypt_v10, is_encrypted, unlock_master_key};
