//! Remote client boundary
//!
//! The actual Nuxeo Automation client (authentication, HTTP, wire protocol)
//! lives outside this crate. Everything here talks to it through the
//! [`NuxeoClient`] trait; implementations wrap whatever transport the host
//! ships with.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::RepositoryError;
use crate::reference::FileReference;

/// A document as returned by the remote repository.
///
/// Read-only from this crate's perspective. Dates, sizes and author come in
/// through the property bag under the usual Nuxeo schema prefixes
/// (`dc:created`, `common:size`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteDocument {
    /// Remote type tag, e.g. "Folder", "Workspace", "Picture", "File"
    pub doc_type: String,
    pub title: String,
    pub path: String,
    #[serde(default)]
    pub properties: HashMap<String, String>,
    /// Picture documents carry their filename outside the property bag
    #[serde(default)]
    pub picture_filename: Option<String>,
}

impl RemoteDocument {
    pub fn new(doc_type: &str, title: &str, path: &str) -> Self {
        Self {
            doc_type: doc_type.to_string(),
            title: title.to_string(),
            path: path.to_string(),
            properties: HashMap::new(),
            picture_filename: None,
        }
    }

    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }

    /// Property lookup, empty string when absent (remote omits unset fields).
    pub fn property(&self, key: &str) -> &str {
        self.properties.get(key).map(String::as_str).unwrap_or("")
    }
}

/// Live metadata for a single remote file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    /// Remote document UID
    pub id: String,
    /// Blob filename; may be empty, fall back to `title`
    pub filename: String,
    pub title: String,
    pub doc_type: String,
    /// Name of the backing repository, used in download URLs
    pub repository: String,
    pub size: u64,
}

/// Operations required from the external Nuxeo Automation client.
///
/// Implementations report remote-side failures as
/// [`RepositoryError::Repository`] with the server message attached; this
/// crate wraps and re-raises them, it never retries.
#[async_trait]
pub trait NuxeoClient: Send + Sync {
    /// Resolve the current user's personal workspace root path.
    async fn user_workspace_path(&self) -> Result<String, RepositoryError>;

    /// List the direct children of a container path.
    async fn list_children(&self, path: &str) -> Result<Vec<RemoteDocument>, RepositoryError>;

    /// Full-text search scoped under a path.
    async fn search(
        &self,
        query: &str,
        scope_path: &str,
    ) -> Result<Vec<RemoteDocument>, RepositoryError>;

    /// Fetch live metadata for a path; `None` when the document is gone.
    async fn file_info(&self, path: &str) -> Result<Option<FileInfo>, RepositoryError>;

    /// Download the referenced file's bytes.
    async fn download(&self, reference: &FileReference) -> Result<Vec<u8>, RepositoryError>;

    /// Check whether the referenced file still exists remotely.
    async fn exists(&self, reference: &FileReference) -> Result<bool, RepositoryError>;
}
