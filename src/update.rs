//! Update checking and download.
//!
//! Queries the GitHub releases API for the latest release, compares it to
//! the running version, and downloads/extracts the Windows zip asset.
//! Checks are throttled to once per calendar day through the
//! `lastUpdateCheck` setting. Nothing here is ever fatal to the main
//! application: network failures are logged and reported as "no update".

use chrono::Local;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

const RELEASES_URL: &str = "https://api.github.com/repos/jcosten/audiotoggle/releases/latest";
const USER_AGENT: &str = "AudioToggle-UpdateChecker";

/// Update service error types.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("update download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("update archive is invalid: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("update file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("update has no download URL")]
    NoDownloadUrl,
}

/// Metadata for an available release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateInfo {
    pub version: String,
    pub download_url: String,
    pub release_notes: String,
    pub prerelease: bool,
}

#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    prerelease: bool,
    #[serde(default)]
    zipball_url: Option<String>,
    #[serde(default)]
    assets: Vec<GitHubAsset>,
}

#[derive(Debug, Deserialize)]
struct GitHubAsset {
    name: String,
    browser_download_url: Option<String>,
}

/// Checks GitHub for newer releases.
pub struct UpdateService {
    client: reqwest::blocking::Client,
    current_version: String,
}

impl UpdateService {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            current_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    /// Fetch the latest release. Returns `None` when there is no usable
    /// release or the request fails; errors are logged, never propagated.
    pub fn check_for_updates(&self) -> Option<UpdateInfo> {
        match self.fetch_latest_release() {
            Ok(info) => info,
            Err(e) => {
                warn!(error = %e, "update check failed");
                None
            }
        }
    }

    fn fetch_latest_release(&self) -> Result<Option<UpdateInfo>, UpdateError> {
        let release: GitHubRelease = self
            .client
            .get(RELEASES_URL)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()?
            .error_for_status()?
            .json()?;

        debug!(tag = %release.tag_name, assets = release.assets.len(), "found release");

        // Prefer the Windows zip asset, then any zip, then the source zipball.
        let asset_url = release
            .assets
            .iter()
            .find(|a| {
                let name = a.name.to_ascii_lowercase();
                name.contains("audiotoggle_windows") && name.contains(".zip")
            })
            .or_else(|| {
                release
                    .assets
                    .iter()
                    .find(|a| a.name.to_ascii_lowercase().contains(".zip"))
            })
            .and_then(|a| a.browser_download_url.clone());

        let download_url = match asset_url.or(release.zipball_url) {
            Some(url) => url,
            None => {
                debug!("release has no downloadable asset");
                return Ok(None);
            }
        };

        Ok(Some(UpdateInfo {
            version: release.tag_name.trim_start_matches('v').to_string(),
            download_url,
            release_notes: release.body.unwrap_or_default(),
            prerelease: release.prerelease,
        }))
    }

    /// True when the release is newer than the running version.
    pub fn is_update_available(&self, info: &UpdateInfo) -> bool {
        is_version_newer(&info.version, &self.current_version)
    }

    /// Download the release archive to `path`.
    pub fn download_update(&self, info: &UpdateInfo, path: &Path) -> Result<(), UpdateError> {
        if info.download_url.is_empty() {
            return Err(UpdateError::NoDownloadUrl);
        }

        let mut response = self
            .client
            .get(&info.download_url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()?
            .error_for_status()?;

        let mut file = File::create(path)?;
        response.copy_to(&mut file)?;
        debug!(path = %path.display(), "downloaded update");
        Ok(())
    }

    /// Extract a downloaded archive into `dir`.
    pub fn extract_update(&self, archive: &Path, dir: &Path) -> Result<(), UpdateError> {
        let file = File::open(archive)?;
        let mut zip = zip::ZipArchive::new(file)?;
        zip.extract(dir)?;
        Ok(())
    }
}

impl Default for UpdateService {
    fn default() -> Self {
        Self::new()
    }
}

/// Compare dotted numeric versions; falls back to a case-insensitive string
/// compare when either side does not parse.
pub fn is_version_newer(candidate: &str, current: &str) -> bool {
    match (parse_version(candidate), parse_version(current)) {
        (Some(new), Some(old)) => new > old,
        _ => candidate.to_ascii_lowercase() > current.to_ascii_lowercase(),
    }
}

fn parse_version(text: &str) -> Option<Vec<u64>> {
    let parts: Vec<u64> = text
        .trim()
        .split('.')
        .map(|p| p.parse().ok())
        .collect::<Option<Vec<u64>>>()?;
    if parts.is_empty() {
        None
    } else {
        Some(parts)
    }
}

/// Today's date in the `lastUpdateCheck` format.
pub fn today_stamp() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// True when no check has run today. `last_check` is the stored
/// `lastUpdateCheck` value; empty or malformed values always allow a check.
pub fn should_check_today(last_check: &str, today: &str) -> bool {
    last_check != today
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_versions_compare_numerically() {
        assert!(is_version_newer("1.2.0", "1.1.9"));
        assert!(is_version_newer("0.2.0", "0.1.0"));
        assert!(is_version_newer("1.10.0", "1.9.0"));
        assert!(!is_version_newer("1.0.0", "1.0.0"));
        assert!(!is_version_newer("0.9.9", "1.0.0"));
    }

    #[test]
    fn unparseable_versions_fall_back_to_string_compare() {
        assert!(is_version_newer("beta-2", "beta-1"));
        assert!(!is_version_newer("alpha", "beta"));
    }

    #[test]
    fn daily_throttle_allows_one_check_per_day() {
        assert!(should_check_today("", "2026-08-06"));
        assert!(should_check_today("2026-08-05", "2026-08-06"));
        assert!(!should_check_today("2026-08-06", "2026-08-06"));
    }

    #[test]
    fn release_json_parses_and_picks_windows_asset() {
        let json = r#"{
            "tag_name": "v1.3.0",
            "body": "notes",
            "prerelease": false,
            "zipball_url": "https://example.invalid/zipball",
            "assets": [
                {"name": "AudioToggle_Linux.tar.gz", "browser_download_url": "https://example.invalid/linux"},
                {"name": "AudioToggle_Windows_x64.zip", "browser_download_url": "https://example.invalid/windows"}
            ]
        }"#;
        let release: GitHubRelease = serde_json::from_str(json).unwrap();
        assert_eq!(release.tag_name, "v1.3.0");
        assert_eq!(release.assets.len(), 2);

        let windows_asset = release
            .assets
            .iter()
            .find(|a| {
                let name = a.name.to_ascii_lowercase();
                name.contains("audiotoggle_windows") && name.contains(".zip")
            })
            .unwrap();
        assert_eq!(
            windows_asset.browser_download_url.as_deref(),
            Some("https://example.invalid/windows")
        );
    }

    #[test]
    fn tag_prefix_is_stripped() {
        assert_eq!("v1.3.0".trim_start_matches('v'), "1.3.0");
    }
}
