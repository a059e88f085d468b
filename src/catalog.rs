//! Browser catalog: the supported families and how their default profiles
//! are discovered on disk.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::browser::{BrowserAgent, BrowserFamily, ChromiumBrowser, FirefoxBrowser};
use crate::error::{ExtractError, ExtractResult};

struct BrowserSpec {
    name: &'static str,
    family: BrowserFamily,
    keychain_service: &'static str,
    /// Default profile location relative to the home directory.
    profile_macos: &'static str,
    profile_linux: &'static str,
}

/// For Firefox-family entries the profile fields point at the profiles root;
/// the concrete default profile is discovered by scanning it.
const CATALOG: &[BrowserSpec] = &[
    BrowserSpec {
        name: "chrome",
        family: BrowserFamily::Chromium,
        keychain_service: "Chrome Safe Storage",
        profile_macos: "Library/Application Support/Google/Chrome/Default",
        profile_linux: ".config/google-chrome/Default",
    },
    BrowserSpec {
        name: "chrome-beta",
        family: BrowserFamily::Chromium,
        keychain_service: "Chrome Safe Storage",
        profile_macos: "Library/Application Support/Google/Chrome Beta/Default",
        profile_linux: ".config/google-chrome-beta/Default",
    },
    BrowserSpec {
        name: "chromium",
        family: BrowserFamily::Chromium,
        keychain_service: "Chromium Safe Storage",
        profile_macos: "Library/Application Support/Chromium/Default",
        profile_linux: ".config/chromium/Default",
    },
    BrowserSpec {
        name: "edge",
        family: BrowserFamily::Chromium,
        keychain_service: "Microsoft Edge Safe Storage",
        profile_macos: "Library/Application Support/Microsoft Edge/Default",
        profile_linux: ".config/microsoft-edge/Default",
    },
    BrowserSpec {
        name: "brave",
        family: BrowserFamily::Chromium,
        keychain_service: "Brave Safe Storage",
        profile_macos: "Library/Application Support/BraveSoftware/Brave-Browser/Default",
        profile_linux: ".config/BraveSoftware/Brave-Browser/Default",
    },
    BrowserSpec {
        name: "vivaldi",
        family: BrowserFamily::Chromium,
        keychain_service: "Vivaldi Safe Storage",
        profile_macos: "Library/Application Support/Vivaldi/Default",
        profile_linux: ".config/vivaldi/Default",
    },
    BrowserSpec {
        name: "opera",
        family: BrowserFamily::Chromium,
        keychain_service: "Opera Safe Storage",
        profile_macos: "Library/Application Support/com.operasoftware.Opera",
        profile_linux: ".config/opera",
    },
    BrowserSpec {
        name: "firefox",
        family: BrowserFamily::Firefox,
        keychain_service: "",
        profile_macos: "Library/Application Support/Firefox/Profiles",
        profile_linux: ".mozilla/firefox",
    },
];

/// Names of all supported browsers, in catalog order.
pub fn list() -> Vec<&'static str> {
    CATALOG.iter().map(|spec| spec.name).collect()
}

/// Resolve a name filter against locally detected default profiles.
///
/// `"all"` yields every browser whose profile exists; an exact name yields
/// at most that one browser. An unknown name is a selection error.
pub fn resolve(filter: &str) -> ExtractResult<Vec<Box<dyn BrowserAgent>>> {
    let specs = matching_specs(filter)?;

    let mut browsers: Vec<Box<dyn BrowserAgent>> = Vec::new();
    for spec in specs {
        match discover_profile(spec) {
            Some(profile) => browsers.push(build_handle(spec, profile, None)),
            None => debug!("no local profile found for {}", spec.name),
        }
    }
    Ok(browsers)
}

/// Resolve with caller-supplied profile (and optional key) paths, bound
/// verbatim to the matching handle(s). Default discovery is never invoked.
pub fn resolve_custom(
    filter: &str,
    profile: &Path,
    key_file: Option<&Path>,
) -> ExtractResult<Vec<Box<dyn BrowserAgent>>> {
    let specs = matching_specs(filter)?;

    Ok(specs
        .into_iter()
        .map(|spec| {
            build_handle(
                spec,
                profile.to_path_buf(),
                key_file.map(|p| p.to_path_buf()),
            )
        })
        .collect())
}

fn matching_specs(filter: &str) -> ExtractResult<Vec<&'static BrowserSpec>> {
    if filter == "all" {
        return Ok(CATALOG.iter().collect());
    }
    let matched: Vec<&BrowserSpec> = CATALOG.iter().filter(|s| s.name == filter).collect();
    if matched.is_empty() {
        return Err(ExtractError::Selection(filter.to_string()));
    }
    Ok(matched)
}

fn build_handle(
    spec: &'static BrowserSpec,
    profile: PathBuf,
    key_file: Option<PathBuf>,
) -> Box<dyn BrowserAgent> {
    match spec.family {
        BrowserFamily::Chromium => Box::new(ChromiumBrowser::new(
            spec.name,
            profile,
            spec.keychain_service,
            key_file,
        )),
        BrowserFamily::Firefox => Box::new(FirefoxBrowser::new(spec.name, profile)),
    }
}

fn discover_profile(spec: &BrowserSpec) -> Option<PathBuf> {
    let base = home_dir()?.join(platform_profile(spec)?);
    match spec.family {
        BrowserFamily::Chromium => base.is_dir().then_some(base),
        BrowserFamily::Firefox => default_firefox_profile(&base),
    }
}

fn platform_profile(spec: &BrowserSpec) -> Option<&'static str> {
    if cfg!(target_os = "macos") {
        Some(spec.profile_macos)
    } else if cfg!(target_os = "linux") {
        Some(spec.profile_linux)
    } else {
        None
    }
}

/// Scan a Firefox profiles root for the profile that actually holds data.
fn default_firefox_profile(root: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(root).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() && path.join("places.sqlite").exists() {
            debug!("found Firefox profile at {:?}", path);
            return Some(path);
        }
    }
    None
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
