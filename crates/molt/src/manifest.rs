use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use molt_apply::DIGEST_LEN;
use serde::Deserialize;

use crate::config::UpdateConfig;
use crate::error::UpdateError;
use crate::transport;

/// Latest available version as advertised by a manifest endpoint.
///
/// Produced fresh by every manifest fetch and never persisted. The digest is
/// validated to be exactly [`DIGEST_LEN`] bytes before this type exists, so
/// downstream code can bind it directly to SHA-256 verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    /// Opaque version identifier, compared only for equality.
    pub version: String,
    /// SHA-256 digest the installed image must hash to.
    pub sha256: [u8; DIGEST_LEN],
}

#[derive(Deserialize)]
struct RawManifest {
    #[serde(rename = "Version")]
    version: String,
    #[serde(rename = "Sha256")]
    sha256: String,
}

/// Fetch and decode the version manifest for the configured command and
/// platform.
pub(crate) fn fetch_version_info(
    client: &reqwest::blocking::Client,
    config: &UpdateConfig,
) -> Result<VersionInfo, UpdateError> {
    let url = config.manifest_url();
    let response = transport::fetch(client, &url)?;
    let body = response
        .bytes()
        .map_err(|error| UpdateError::request(&url, error))?;
    parse_manifest(&body)
}

fn parse_manifest(body: &[u8]) -> Result<VersionInfo, UpdateError> {
    let raw: RawManifest =
        serde_json::from_slice(body).map_err(|error| UpdateError::manifest(error.to_string()))?;

    let decoded = BASE64
        .decode(&raw.sha256)
        .map_err(|error| UpdateError::manifest(format!("digest is not base64: {error}")))?;

    let sha256: [u8; DIGEST_LEN] = decoded
        .try_into()
        .map_err(|bytes: Vec<u8>| UpdateError::DigestLength { got: bytes.len() })?;

    Ok(VersionInfo {
        version: raw.version,
        sha256,
    })
}
