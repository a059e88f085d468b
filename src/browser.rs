//! Browser handles: the per-browser capability surface the run drives.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::crypto;
use crate::error::{ExtractError, ExtractResult};
use crate::items::{DataItem, ItemKind, ParseStrategy, ProfileItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserFamily {
    Chromium,
    Firefox,
}

/// Opaque key material for one Chromium-family handle.
///
/// Obtained once per run, reused for every item of the handle, and never
/// persisted. The Debug impl redacts the bytes so the key cannot leak
/// through logging.
#[derive(Clone)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(<{} bytes redacted>)", self.0.len())
    }
}

/// One resolved browser: name, profile location, key state and items.
pub trait BrowserAgent {
    fn name(&self) -> &str;
    fn family(&self) -> BrowserFamily;
    fn profile(&self) -> &Path;
    /// Initialize the handle's secret key. A no-op for Firefox handles.
    fn unlock_key(&mut self) -> ExtractResult<()>;
    fn secret_key(&self) -> Option<&SecretKey>;
    /// Enumerate the data items present in the profile.
    fn list_items(&self) -> ExtractResult<Vec<Box<dyn DataItem>>>;
}

pub struct ChromiumBrowser {
    name: String,
    profile: PathBuf,
    keychain_service: &'static str,
    key_file: Option<PathBuf>,
    key: Option<SecretKey>,
}

impl ChromiumBrowser {
    pub fn new(
        name: impl Into<String>,
        profile: PathBuf,
        keychain_service: &'static str,
        key_file: Option<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            profile,
            keychain_service,
            key_file,
            key: None,
        }
    }

    fn item_source(&self, kind: ItemKind) -> Option<PathBuf> {
        let candidate = match kind {
            ItemKind::Passwords => self.profile.join("Login Data"),
            ItemKind::Cookies => {
                // Newer Chromium moved the cookie store under Network/
                let network = self.profile.join("Network").join("Cookies");
                if network.exists() {
                    network
                } else {
                    self.profile.join("Cookies")
                }
            }
            ItemKind::History => self.profile.join("History"),
            ItemKind::Bookmarks => self.profile.join("Bookmarks"),
        };
        candidate.exists().then_some(candidate)
    }
}

impl BrowserAgent for ChromiumBrowser {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> BrowserFamily {
        BrowserFamily::Chromium
    }

    fn profile(&self) -> &Path {
        &self.profile
    }

    fn unlock_key(&mut self) -> ExtractResult<()> {
        let key = crypto::unlock_master_key(self.keychain_service, self.key_file.as_deref())
            .map_err(|e| ExtractError::Key {
                browser: self.name.clone(),
                reason: e.to_string(),
            })?;
        self.key = Some(SecretKey::new(key));
        Ok(())
    }

    fn secret_key(&self) -> Option<&SecretKey> {
        self.key.as_ref()
    }

    fn list_items(&self) -> ExtractResult<Vec<Box<dyn DataItem>>> {
        if !self.profile.is_dir() {
            return Err(ExtractError::Profile(self.profile.clone()));
        }

        // Strategy is fixed at construction: items never re-inspect the
        // browser variant at parse time.
        let strategy = ParseStrategy::from(self.family());
        let mut items: Vec<Box<dyn DataItem>> = Vec::new();
        for kind in ItemKind::ALL {
            if let Some(source) = self.item_source(kind) {
                debug!("{}: found {} source at {:?}", self.name, kind, source);
                items.push(Box::new(ProfileItem::new(kind, strategy, source)));
            }
        }
        Ok(items)
    }
}

pub struct FirefoxBrowser {
    name: String,
    profile: PathBuf,
}

impl FirefoxBrowser {
    pub fn new(name: impl Into<String>, profile: PathBuf) -> Self {
        Self {
            name: name.into(),
            profile,
        }
    }

    fn item_source(&self, kind: ItemKind) -> Option<PathBuf> {
        let candidate = match kind {
            ItemKind::Passwords => self.profile.join("logins.json"),
            ItemKind::Cookies => self.profile.join("cookies.sqlite"),
            ItemKind::History | ItemKind::Bookmarks => self.profile.join("places.sqlite"),
        };
        candidate.exists().then_some(candidate)
    }
}

impl BrowserAgent for FirefoxBrowser {
    fn name(&self) -> &str {
        &self.name
    }

    fn family(&self) -> BrowserFamily {
        BrowserFamily::Firefox
    }

    fn profile(&self) -> &Path {
        &self.profile
    }

    fn unlock_key(&mut self) -> ExtractResult<()> {
        // Firefox item parsing is keyless; nothing to unlock.
        Ok(())
    }

    fn secret_key(&self) -> Option<&SecretKey> {
        None
    }

    fn list_items(&self) -> ExtractResult<Vec<Box<dyn DataItem>>> {
        if !self.profile.is_dir() {
            return Err(ExtractError::Profile(self.profile.clone()));
        }

        let strategy = ParseStrategy::from(self.family());
        let mut items: Vec<Box<dyn DataItem>> = Vec::new();
        for kind in ItemKind::ALL {
            if let Some(source) = self.item_source(kind) {
                debug!("{}: found {} source at {:?}", self.name, kind, source);
                items.push(Box::new(ProfileItem::new(kind, strategy, source)));
            }
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn secret_key_debug_is_redacted() {
        let key = SecretKey::new(vec![1, 2, 3, 4]);
        let rendered = format!("{:?}", key);
        assert_eq!(rendered, "SecretKey(<4 bytes redacted>)");
        assert!(!rendered.contains('1'));
    }

    #[test]
    fn chromium_enumerates_only_present_sources() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("History"), b"x").unwrap();
        fs::write(tmp.path().join("Bookmarks"), b"{}").unwrap();

        let browser = ChromiumBrowser::new(
            "chrome",
            tmp.path().to_path_buf(),
            "Chrome Safe Storage",
            None,
        );
        let items = browser.list_items().unwrap();
        let kinds: Vec<ItemKind> = items.iter().map(|i| i.kind()).collect();
        assert_eq!(kinds, vec![ItemKind::History, ItemKind::Bookmarks]);
    }

    #[test]
    fn chromium_prefers_network_cookie_store() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("Network")).unwrap();
        fs::write(tmp.path().join("Network").join("Cookies"), b"x").unwrap();
        fs::write(tmp.path().join("Cookies"), b"x").unwrap();

        let browser = ChromiumBrowser::new(
            "chrome",
            tmp.path().to_path_buf(),
            "Chrome Safe Storage",
            None,
        );
        let source = browser.item_source(ItemKind::Cookies).unwrap();
        assert!(source.ends_with(Path::new("Network").join("Cookies")));
    }

    #[test]
    fn missing_profile_is_an_enumeration_error() {
        let browser = FirefoxBrowser::new("firefox", PathBuf::from("/nonexistent/profile"));
        assert!(matches!(
            browser.list_items(),
            Err(ExtractError::Profile(_))
        ));
    }

    #[test]
    fn firefox_unlock_is_a_no_op() {
        let mut browser = FirefoxBrowser::new("firefox", PathBuf::from("/tmp"));
        assert!(browser.unlock_key().is_ok());
        assert!(browser.secret_key().is_none());
    }
}
