//! Per-channel remote metadata retrieval
//!
//! Each channel has its own metadata source and document shape: the release
//! channel reads a maven-style metadata document, the snapshot channel reads
//! plain-text version/build files, and the mod channel queries the release
//! registry's JSON API. Every fetch is preceded by a short TCP probe of the
//! endpoint host so an offline machine fails fast instead of waiting out the
//! full request timeout.

use crate::build_info::parse_build_timestamp;
use crate::channel::Channel;
use crate::error::UpdateError;
use crate::types::RemoteRelease;
use log::{debug, info, warn};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::net::TcpStream;
use url::Url;

const RELEASE_URL: &str = "https://releases.runehall.org/";
const SNAPSHOT_URL: &str = "https://downloads.runehall.org/dailysnapshots/";
const REGISTRY_API_URL: &str = "https://api.github.com";

/// GitHub repo serving the community-mod releases
const MOD_REPO: &str = "runehall-community/runehall-classic";

const RELEASE_ARTIFACT_DIR: &str = "runehall/runehall-desktop";
const RELEASE_ARTIFACT: &str = "runehall-desktop";
const SNAPSHOT_ARTIFACT: &str = "runehall-installer";

const UPDATE_HTTP_USER_AGENT: &str = "Runehall-Updater";

/// Connect timeout for the pre-fetch reachability probe
const PROBE_TIMEOUT: Duration = Duration::from_secs(1);
/// Connect/read timeout for metadata requests
const METADATA_TIMEOUT: Duration = Duration::from_secs(5);

/// The release version is normally taken from the metadata document's release
/// tag; the plain version file is the legacy retrieval mode.
const VERSION_FROM_METADATA: bool = true;

/// Package extensions the updater knows how to hand off after download
pub const ACCEPTED_PACKAGE_EXTENSIONS: [&str; 3] = [".jar", ".zip", ".tar.bz2"];

/// Root URLs the fetch strategies read from. Defaults point at the production
/// hosts; tests inject local servers.
#[derive(Debug, Clone)]
pub struct RemoteEndpoints {
    pub release_base: String,
    pub snapshot_base: String,
    pub registry_api_base: String,
}

impl Default for RemoteEndpoints {
    fn default() -> Self {
        Self {
            release_base: RELEASE_URL.to_string(),
            snapshot_base: SNAPSHOT_URL.to_string(),
            registry_api_base: REGISTRY_API_URL.to_string(),
        }
    }
}

impl RemoteEndpoints {
    fn join(base: &str, rest: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), rest)
    }

    pub fn release_metadata_url(&self) -> String {
        Self::join(
            &self.release_base,
            &format!("{RELEASE_ARTIFACT_DIR}/maven-metadata.xml"),
        )
    }

    pub fn release_version_url(&self) -> String {
        Self::join(&self.release_base, &format!("{RELEASE_ARTIFACT_DIR}/version.txt"))
    }

    pub fn release_package_url(&self, version: &str) -> String {
        Self::join(
            &self.release_base,
            &format!("{RELEASE_ARTIFACT_DIR}/{version}/{RELEASE_ARTIFACT}-{version}.tar.bz2"),
        )
    }

    pub fn snapshot_version_url(&self) -> String {
        Self::join(&self.snapshot_base, "version.txt")
    }

    pub fn snapshot_build_url(&self) -> String {
        Self::join(&self.snapshot_base, "build.txt")
    }

    pub fn snapshot_package_url(&self, version: &str) -> String {
        Self::join(&self.snapshot_base, &format!("{SNAPSHOT_ARTIFACT}-{version}.jar"))
    }

    pub fn registry_latest_url(&self) -> String {
        Self::join(
            &self.registry_api_base,
            &format!("repos/{MOD_REPO}/releases/latest"),
        )
    }
}

/// Shared HTTP client for metadata requests
pub(crate) fn build_metadata_client() -> Result<Client, UpdateError> {
    let client = Client::builder()
        .user_agent(UPDATE_HTTP_USER_AGENT)
        .connect_timeout(METADATA_TIMEOUT)
        .timeout(METADATA_TIMEOUT)
        .build()?;
    Ok(client)
}

/// Probe the endpoint's host on its HTTPS (or explicit) port before any
/// metadata request. Unreachable hosts fail fast with `NetworkUnavailable`.
pub(crate) async fn ensure_reachable(endpoint: &str) -> Result<(), UpdateError> {
    let parsed = Url::parse(endpoint)
        .map_err(|e| UpdateError::MetadataMalformed(format!("invalid endpoint '{endpoint}': {e}")))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| UpdateError::MetadataMalformed(format!("endpoint '{endpoint}' has no host")))?;
    let port = parsed.port_or_known_default().unwrap_or(443);
    let addr = format!("{host}:{port}");

    debug!("Probing {} before metadata fetch", addr);
    match tokio::time::timeout(PROBE_TIMEOUT, TcpStream::connect(&addr)).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => {
            warn!("Host {} unreachable: {}", addr, e);
            Err(UpdateError::NetworkUnavailable(addr))
        }
        Err(_) => {
            warn!("Host {} did not accept a connection within {:?}", addr, PROBE_TIMEOUT);
            Err(UpdateError::NetworkUnavailable(addr))
        }
    }
}

/// Latest-release response from the registry API. Only the fields the updater
/// needs are deserialized; everything else in the body is ignored.
#[derive(Debug, Deserialize)]
struct RegistryRelease {
    tag_name: Option<String>,
    #[serde(default)]
    assets: Vec<RegistryAsset>,
}

#[derive(Debug, Deserialize)]
struct RegistryAsset {
    browser_download_url: String,
}

/// Fetch the latest release for `channel`, dispatched exhaustively
pub async fn fetch_channel_release(
    client: &Client,
    endpoints: &RemoteEndpoints,
    channel: Channel,
) -> Result<RemoteRelease, UpdateError> {
    match channel {
        Channel::None => Err(UpdateError::ChannelUnresolved),
        Channel::Release => fetch_release(client, endpoints).await,
        Channel::Snapshot => fetch_snapshot(client, endpoints).await,
        Channel::ModRelease => fetch_mod_release(client, endpoints).await,
    }
}

async fn fetch_document(client: &Client, url: &str) -> Result<String, UpdateError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| UpdateError::RemoteUnavailable(format!("request to {url} failed: {e}")))?;

    if !response.status().is_success() {
        return Err(UpdateError::RemoteUnavailable(format!(
            "HTTP {} for {}",
            response.status(),
            url
        )));
    }

    response
        .text()
        .await
        .map_err(|e| UpdateError::RemoteUnavailable(format!("reading {url} failed: {e}")))
}

/// Release channel: version from the metadata document's release tag, package
/// URL constructed deterministically from the version.
async fn fetch_release(
    client: &Client,
    endpoints: &RemoteEndpoints,
) -> Result<RemoteRelease, UpdateError> {
    ensure_reachable(&endpoints.release_base).await?;

    let version = if VERSION_FROM_METADATA {
        let xml = fetch_document(client, &endpoints.release_metadata_url()).await?;
        extract_release_tag(&xml).ok_or_else(|| {
            UpdateError::MetadataMalformed("no <release> element in release metadata".to_string())
        })?
    } else {
        fetch_document(client, &endpoints.release_version_url())
            .await?
            .trim()
            .to_string()
    };

    if version.is_empty() {
        return Err(UpdateError::MetadataMalformed(
            "empty release version".to_string(),
        ));
    }

    info!("Latest release version: {}", version);
    Ok(RemoteRelease {
        package_url: endpoints.release_package_url(&version),
        version,
        build_timestamp: None,
    })
}

/// Snapshot channel: plain-text version and build-timestamp files
async fn fetch_snapshot(
    client: &Client,
    endpoints: &RemoteEndpoints,
) -> Result<RemoteRelease, UpdateError> {
    ensure_reachable(&endpoints.snapshot_base).await?;

    let version = fetch_document(client, &endpoints.snapshot_version_url())
        .await?
        .trim()
        .to_string();
    if version.is_empty() {
        return Err(UpdateError::MetadataMalformed(
            "empty snapshot version".to_string(),
        ));
    }

    let build_raw = fetch_document(client, &endpoints.snapshot_build_url()).await?;
    let build_timestamp = parse_build_timestamp(&build_raw).ok_or_else(|| {
        UpdateError::MetadataMalformed(format!("unparseable snapshot build timestamp '{}'", build_raw.trim()))
    })?;

    info!("Latest snapshot: {} built {}", version, build_timestamp);
    Ok(RemoteRelease {
        package_url: endpoints.snapshot_package_url(&version),
        version,
        build_timestamp: Some(build_timestamp),
    })
}

/// Mod channel: the registry's latest-release endpoint, JSON body
async fn fetch_mod_release(
    client: &Client,
    endpoints: &RemoteEndpoints,
) -> Result<RemoteRelease, UpdateError> {
    ensure_reachable(&endpoints.registry_api_base).await?;

    let url = endpoints.registry_latest_url();
    info!("Checking for mod updates at {}", url);

    let response = client
        .get(&url)
        .header("Accept", "application/vnd.github.v3+json")
        .send()
        .await
        .map_err(|e| UpdateError::RemoteUnavailable(format!("request to {url} failed: {e}")))?;

    if !response.status().is_success() {
        return Err(UpdateError::RemoteUnavailable(format!(
            "HTTP {}",
            response.status()
        )));
    }

    let release: RegistryRelease = response
        .json()
        .await
        .map_err(|e| UpdateError::MetadataMalformed(format!("registry response: {e}")))?;

    let version = match release.tag_name {
        Some(tag) if !tag.is_empty() => tag,
        _ => {
            return Err(UpdateError::MetadataMalformed(
                "missing tag_name in registry response".to_string(),
            ))
        }
    };

    let asset = match release.assets.iter().find(|asset| {
        ACCEPTED_PACKAGE_EXTENSIONS
            .iter()
            .any(|ext| asset.browser_download_url.ends_with(ext))
    }) {
        Some(asset) => asset,
        None => {
            let first = release.assets.first().ok_or(UpdateError::NoDownloadAsset)?;
            warn!(
                "No release asset matching {:?}; falling back to '{}'",
                ACCEPTED_PACKAGE_EXTENSIONS, first.browser_download_url
            );
            first
        }
    };

    // Opaque locator; only well-formedness is checked.
    Url::parse(&asset.browser_download_url).map_err(|e| {
        UpdateError::MetadataMalformed(format!(
            "asset URL '{}': {e}",
            asset.browser_download_url
        ))
    })?;

    info!("Latest mod release: {} ({})", version, asset.browser_download_url);
    Ok(RemoteRelease {
        version,
        package_url: asset.browser_download_url.clone(),
        build_timestamp: None,
    })
}

/// Relaxed scrape of the `<release>` element; the last match wins, matching
/// how the metadata document lists historic entries before the current one.
fn extract_release_tag(xml: &str) -> Option<String> {
    static RELEASE_TAG: OnceLock<Regex> = OnceLock::new();
    let pattern = RELEASE_TAG
        .get_or_init(|| Regex::new(r"<release>(.*?)</release>").expect("release pattern is valid"));
    pattern
        .captures_iter(xml)
        .last()
        .map(|captures| captures[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_tag_takes_last_match() {
        let xml = "<metadata><release>2.0.8</release><release>2.0.9</release></metadata>";
        assert_eq!(extract_release_tag(xml).unwrap(), "2.0.9");
    }

    #[test]
    fn test_release_tag_absent() {
        assert_eq!(extract_release_tag("<metadata></metadata>"), None);
    }

    #[test]
    fn test_release_package_url_shape() {
        let endpoints = RemoteEndpoints::default();
        assert_eq!(
            endpoints.release_package_url("2.0.9"),
            "https://releases.runehall.org/runehall/runehall-desktop/2.0.9/runehall-desktop-2.0.9.tar.bz2"
        );
    }

    #[test]
    fn test_snapshot_urls_shape() {
        let endpoints = RemoteEndpoints {
            snapshot_base: "http://127.0.0.1:9000/snaps".to_string(),
            ..RemoteEndpoints::default()
        };
        assert_eq!(
            endpoints.snapshot_version_url(),
            "http://127.0.0.1:9000/snaps/version.txt"
        );
        assert_eq!(
            endpoints.snapshot_package_url("2026.03.14"),
            "http://127.0.0.1:9000/snaps/runehall-installer-2026.03.14.jar"
        );
    }

    #[test]
    fn test_registry_latest_url_shape() {
        let endpoints = RemoteEndpoints::default();
        assert_eq!(
            endpoints.registry_latest_url(),
            "https://api.github.com/repos/runehall-community/runehall-classic/releases/latest"
        );
    }

    #[test]
    fn test_registry_release_ignores_unknown_fields() {
        let body = r#"{
            "tag_name": "v2.1.0",
            "html_url": "https://example.invalid/releases/v2.1.0",
            "prerelease": false,
            "assets": [
                {"browser_download_url": "https://x/app-2.1.0.zip", "size": 123}
            ]
        }"#;
        let release: RegistryRelease = serde_json::from_str(body).unwrap();
        assert_eq!(release.tag_name.as_deref(), Some("v2.1.0"));
        assert_eq!(release.assets.len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_host_fails_fast() {
        // nothing listens on port 9 locally
        let err = ensure_reachable("http://127.0.0.1:9/").await.unwrap_err();
        assert!(matches!(err, UpdateError::NetworkUnavailable(_)));
    }
}
