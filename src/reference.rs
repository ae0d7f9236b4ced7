//! File references
//!
//! A reference is the opaque token the host stores next to a picked file so
//! the file can be re-fetched later, independent of any browsing session. It
//! carries the remote path plus the user/key/server context needed to
//! re-authenticate the download, and optionally a pre-resolved download URL.
//!
//! Encoded as base64 over a JSON payload so the host can treat it as a plain
//! string blob.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::RepositoryError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    /// Remote path of the referenced file
    pub filepath: String,
    /// User the reference was created for
    pub user: String,
    /// Portal SSO secret key
    pub secret_key: String,
    /// Automation endpoint of the Nuxeo server
    pub url_nuxeo: String,
    /// Direct download URL, empty unless pre-resolved at creation time
    #[serde(default)]
    pub downloadurl: String,
}

impl FileReference {
    /// Serialize to the opaque blob form stored by the host.
    pub fn encode(&self) -> String {
        BASE64.encode(serde_json::to_vec(self).unwrap_or_default())
    }

    /// Parse a stored blob back into a reference.
    pub fn decode(blob: &str) -> Result<Self, RepositoryError> {
        let bytes = BASE64
            .decode(blob.trim())
            .map_err(|e| RepositoryError::InvalidReference(format!("bad base64: {}", e)))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| RepositoryError::InvalidReference(format!("bad payload: {}", e)))
    }

    /// Last path segment of the download URL, used as the attachment
    /// filename when serving the file.
    pub fn download_basename(&self) -> &str {
        self.downloadurl.rsplit('/').next().unwrap_or("")
    }
}

/// Build the direct download URL for a file blob:
/// `<base>/nxfile/<repository>/<id>/blobholder:0/<filename>`, with exactly
/// one slash after the base.
pub fn download_url(base: &str, id: &str, filename: &str, repository: &str) -> String {
    let mut url = base.to_string();
    if !url.ends_with('/') {
        url.push('/');
    }
    url.push_str(&format!(
        "nxfile/{}/{}/blobholder:0/{}",
        repository, id, filename
    ));
    url
}
