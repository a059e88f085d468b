//! Chromium master-key unlock and value decryption.
//!
//! `v10` values are AES-128-CBC with a fixed IV (16 space characters). The
//! key is derived with PBKDF2-HMAC-SHA1 over the safe-storage password:
//! - macOS: password lives in the Keychain, 1003 iterations
//! - Linux: the `v10` fallback password is the literal "peanuts", 1 iteration
//!   (keyring-backed `v11` values are not supported)

use std::path::Path;

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};
use anyhow::{anyhow, Result};

type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// Fixed IV used by Chromium on macOS and Linux (16 bytes of 0x20).
const FIXED_IV: [u8; 16] = [0x20; 16];

const SALT: &[u8] = b"saltysalt";
const KEY_LENGTH: usize = 16;

#[cfg(target_os = "macos")]
const PBKDF2_ITERATIONS: u32 = 1003;
#[cfg(not(target_os = "macos"))]
const PBKDF2_ITERATIONS: u32 = 1;

/// Obtain the 16-byte AES key for a Chromium-family browser.
///
/// `key_file` overrides platform lookup entirely: its contents are used as
/// the safe-storage password. Otherwise the password comes from the macOS
/// Keychain (via `security`) or the Linux `peanuts` fallback.
pub fn unlock_master_key(keychain_service: &str, key_file: Option<&Path>) -> Result<Vec<u8>> {
    let password = match key_file {
        Some(path) => std::fs::read_to_string(path)
            .map(|s| s.trim().to_string())
            .map_err(|e| anyhow!("cannot read key file {:?}: {}", path, e))?,
        None => safe_storage_password(keychain_service)?,
    };
    Ok(derive_key(&password, PBKDF2_ITERATIONS))
}

#[cfg(target_os = "macos")]
fn safe_storage_password(service: &str) -> Result<String> {
    use std::process::Command;

    // -w prints the password only
    let output = Command::new("security")
        .args(["find-generic-password", "-s", service, "-w"])
        .output()?;

    if !output.status.success() {
        return Err(anyhow!(
            "Keychain lookup failed for service {:?}: {}",
            service,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    Ok(String::from_utf8(output.stdout)?.trim().to_string())
}

#[cfg(target_os = "linux")]
fn safe_storage_password(_service: &str) -> Result<String> {
    Ok("peanuts".to_string())
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn safe_storage_password(service: &str) -> Result<String> {
    Err(anyhow!(
        "safe-storage lookup for {:?} is not supported on this platform",
        service
    ))
}

fn derive_key(password: &str, iterations: u32) -> Vec<u8> {
    use pbkdf2::pbkdf2_hmac;
    use sha1::Sha1;

    let mut key = vec![0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha1>(password.as_bytes(), SALT, iterations, &mut key);
    key
}

/// Decrypt one `v10`-prefixed value. Non-prefixed values pass through as-is
/// when they are valid UTF-8 (older profiles store some values in the clear).
pub fn decrypt_v10(key: &[u8], encrypted: &[u8]) -> Result<String> {
    if encrypted.is_empty() {
        return Ok(String::new());
    }

    if !encrypted.starts_with(b"v10") {
        return String::from_utf8(encrypted.to_vec())
            .map_err(|_| anyhow!("unknown encryption scheme"));
    }

    let ciphertext = &encrypted[3..];
    if ciphertext.is_empty() {
        return Ok(String::new());
    }

    let mut buf = ciphertext.to_vec();
    let decryptor = Aes128CbcDec::new_from_slices(key, &FIXED_IV)
        .map_err(|e| anyhow!("invalid key length: {}", e))?;

    match decryptor.decrypt_padded_mut::<Pkcs7>(&mut buf) {
        Ok(plaintext) => String::from_utf8(plaintext.to_vec())
            .map_err(|e| anyhow!("decrypted value is not UTF-8: {}", e)),
        Err(e) => Err(anyhow!(
            "AES-CBC decryption failed ({:?}), ciphertext length {}",
            e,
            ciphertext.len()
        )),
    }
}

/// Whether a stored value carries the Chromium encryption prefix.
pub fn is_encrypted(data: &[u8]) -> bool {
    data.len() >= 3 && data.starts_with(b"v10")
}

#[cfg(test)]
mod tests {
    use super::*;
    use aes::cipher::BlockEncryptMut;

    type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;

    fn encrypt_v10(key: &[u8], plaintext: &[u8]) -> Vec<u8> {
        let mut buf = vec![0u8; plaintext.len() + 16];
        buf[..plaintext.len()].copy_from_slice(plaintext);
        let ciphertext = Aes128CbcEnc::new_from_slices(key, &FIXED_IV)
            .unwrap()
            .encrypt_padded_mut::<Pkcs7>(&mut buf, plaintext.len())
            .unwrap();
        let mut payload = b"v10".to_vec();
        payload.extend_from_slice(ciphertext);
        payload
    }

    #[test]
    fn derived_key_is_16_bytes() {
        assert_eq!(derive_key("peanuts", 1).len(), 16);
        assert_eq!(derive_key("some keychain password", 1003).len(), 16);
    }

    #[test]
    fn v10_round_trip() {
        let key = derive_key("peanuts", 1);
        let payload = encrypt_v10(&key, b"hunter2");
        assert!(is_encrypted(&payload));
        assert_eq!(decrypt_v10(&key, &payload).unwrap(), "hunter2");
    }

    #[test]
    fn wrong_key_fails() {
        let key = derive_key("peanuts", 1);
        let other = derive_key("walnuts", 1);
        let payload = encrypt_v10(&key, b"hunter2");
        assert_ne!(decrypt_v10(&other, &payload).ok().as_deref(), Some("hunter2"));
    }

    #[test]
    fn plaintext_passes_through() {
        let key = derive_key("peanuts", 1);
        assert_eq!(decrypt_v10(&key, b"already plain").unwrap(), "already plain");
        assert_eq!(decrypt_v10(&key, b"").unwrap(), "");
    }

    #[test]
    fn prefix_detection() {
        assert!(is_encrypted(b"v10somedata"));
        assert!(!is_encrypted(b"v1"));
        assert!(!is_encrypted(b"plain"));
    }
}
