//! Repository plugin facade
//!
//! [`WorkspaceRepository`] is the surface the host application drives by
//! contract: listing and search, the file-reference lifecycle, downloads and
//! response streaming, plus the capability queries. It owns the parsed admin
//! configuration and a [`NuxeoClient`] doing the actual remote calls; the
//! host threads the per-user [`BrowseSession`] through listing calls.

use tracing::{debug, info};

use crate::client::{FileInfo, NuxeoClient};
use crate::config::RepositoryParams;
use crate::error::RepositoryError;
use crate::listing::{build_entries, Listing};
use crate::nav::{build_breadcrumb, manage_url, resolve_listing_path};
use crate::reference::{download_url, FileReference};
use crate::transfer::{
    stream_attachment, write_temp, DownloadedFile, ReferencedFile, ResponseSink,
};

/// Host-supplied construction context for one plugin instance.
#[derive(Debug, Clone)]
pub struct RepositoryContext {
    /// Instance identifier assigned by the host
    pub repository_id: i64,
    /// Logged-in user the instance acts for
    pub user_name: String,
    /// Portal SSO secret key
    pub secret_key: String,
}

/// Per-user browsing state, stored by the host between requests.
///
/// Requests for one user are serialized by the host, so plain last-writer-wins
/// semantics are enough.
#[derive(Debug, Clone)]
pub struct BrowseSession {
    pub last_path: String,
}

impl Default for BrowseSession {
    fn default() -> Self {
        Self {
            last_path: "/".to_string(),
        }
    }
}

/// Localized string lookup, backed by the host's string table.
pub trait StringTable: Send + Sync {
    fn lookup(&self, key: &str) -> String;
}

/// Append the automation endpoint to the configured base URL.
fn automation_url(base: &str) -> String {
    let mut url = base.to_string();
    if !url.ends_with('/') {
        url.push('/');
    }
    url.push_str("site/automation");
    url
}

/// The repository plugin itself.
pub struct WorkspaceRepository<C: NuxeoClient> {
    context: RepositoryContext,
    params: RepositoryParams,
    /// Automation endpoint derived from the configured base URL
    url_nuxeo: String,
    strings: Box<dyn StringTable>,
    client: C,
    /// Resolved once per instance, on first use
    user_workspace_path: Option<String>,
}

impl<C: NuxeoClient> std::fmt::Debug for WorkspaceRepository<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceRepository")
            .field("context", &self.context)
            .field("params", &self.params)
            .field("url_nuxeo", &self.url_nuxeo)
            .field("user_workspace_path", &self.user_workspace_path)
            .finish_non_exhaustive()
    }
}

impl<C: NuxeoClient> WorkspaceRepository<C> {
    /// Build an instance from the admin settings document.
    ///
    /// Configuration problems are fatal here: the host gets a
    /// [`RepositoryError::Configuration`] and never sees a half-configured
    /// instance.
    pub fn new(
        context: RepositoryContext,
        settings_xml: &str,
        strings: Box<dyn StringTable>,
        client: C,
    ) -> Result<Self, RepositoryError> {
        let params = RepositoryParams::from_xml(settings_xml).map_err(|e| {
            RepositoryError::Configuration(format!("{}: {}", strings.lookup("configerror"), e))
        })?;
        let url_nuxeo = automation_url(&params.url);
        info!(
            repository_id = context.repository_id,
            user = %context.user_name,
            url = %params.url,
            "workspace repository instance configured"
        );
        Ok(Self {
            context,
            params,
            url_nuxeo,
            strings,
            client,
            user_workspace_path: None,
        })
    }

    /// The user's workspace root, fetched once and cached for the instance.
    async fn workspace_root(&mut self) -> Result<String, RepositoryError> {
        if let Some(ref path) = self.user_workspace_path {
            return Ok(path.clone());
        }
        let path = self.client.user_workspace_path().await?;
        debug!(root = %path, "resolved user workspace root");
        self.user_workspace_path = Some(path.clone());
        Ok(path)
    }

    /// List the contents of `path` for the host file picker.
    ///
    /// An empty path falls back to the session's last visited path and from
    /// there to the user's workspace root. The resolved path is written back
    /// to the session on success.
    pub async fn get_listing(
        &mut self,
        path: &str,
        session: &mut BrowseSession,
    ) -> Result<Listing, RepositoryError> {
        let root = self.workspace_root().await?;

        let requested = if path.is_empty() {
            session.last_path.clone()
        } else {
            path.to_string()
        };
        // The manage link reflects the path as requested, before the
        // root fallback is applied.
        let manage = manage_url(&self.params.url_base_user_manage, &requested);

        let resolved = resolve_listing_path(&requested, &session.last_path, &root)?;
        let documents = self.client.list_children(&resolved).await?;
        let entries = build_entries(&documents, &self.params);
        let trail = build_breadcrumb(&resolved, &root, &self.strings.lookup("nuxeoRoot"));

        info!(path = %resolved, entries = entries.len(), "listed repository path");
        session.last_path = resolved;
        Ok(Listing::new(entries, trail, manage))
    }

    /// Search the repository, scoped under the session's last visited path.
    pub async fn search(
        &mut self,
        query: &str,
        session: &BrowseSession,
    ) -> Result<Listing, RepositoryError> {
        let root = self.workspace_root().await?;
        let scope = session.last_path.clone();

        let manage = manage_url(&self.params.url_base_user_manage, &scope);
        let documents = self.client.search(query, &scope).await?;
        let entries = build_entries(&documents, &self.params);
        let trail = build_breadcrumb(&scope, &root, &self.strings.lookup("nuxeoRoot"));

        info!(query = %query, scope = %scope, hits = entries.len(), "searched repository");
        Ok(Listing::new(entries, trail, manage))
    }

    /// Create the opaque reference blob for a picked source path.
    ///
    /// With `use_file_reference` set the download URL is pre-resolved from
    /// live metadata; a remote failure there aborts reference creation.
    pub async fn get_file_reference(
        &self,
        source: &str,
        use_file_reference: bool,
    ) -> Result<String, RepositoryError> {
        let mut reference = FileReference {
            filepath: source.to_string(),
            user: self.context.user_name.clone(),
            secret_key: self.context.secret_key.clone(),
            url_nuxeo: self.url_nuxeo.clone(),
            downloadurl: String::new(),
        };

        if use_file_reference {
            match self.client.file_info(source).await {
                Ok(Some(info)) => {
                    reference.downloadurl = self.file_download_url(&info);
                }
                Ok(None) => {}
                Err(e) => {
                    return Err(RepositoryError::CannotCreateReference(e.to_string()));
                }
            }
        }
        Ok(reference.encode())
    }

    fn file_download_url(&self, info: &FileInfo) -> String {
        let title = if info.filename.is_empty() {
            &info.title
        } else {
            &info.filename
        };
        download_url(&self.params.url, &info.id, title, &info.repository)
    }

    /// Download the referenced file into a temp file.
    ///
    /// `filename` seeds the generated temp name; the caller owns the
    /// resulting path.
    pub async fn get_file(
        &self,
        blob: &str,
        filename: &str,
    ) -> Result<DownloadedFile, RepositoryError> {
        let reference = FileReference::decode(blob)?;
        let bytes = self
            .client
            .download(&reference)
            .await
            .map_err(|e| RepositoryError::Download(e.to_string()))?;
        let path = write_temp(filename, &bytes).await?;
        Ok(DownloadedFile {
            path,
            url: reference.filepath,
        })
    }

    /// Resolve a stored reference against live remote metadata.
    ///
    /// Returns `None` when the file no longer exists remotely (a valid
    /// outcome, not an error). Pictures are materialized locally; any other
    /// type only reports its remote size, sparing the transfer.
    pub async fn get_file_by_reference(
        &self,
        blob: &str,
    ) -> Result<Option<ReferencedFile>, RepositoryError> {
        let reference = FileReference::decode(blob)?;

        let info = match self.client.file_info(&reference.filepath).await? {
            Some(info) => info,
            None => return Ok(None),
        };

        if info.doc_type == "Picture" {
            let bytes = self
                .client
                .download(&reference)
                .await
                .map_err(|e| RepositoryError::Download(e.to_string()))?;
            let filepath = write_temp("", &bytes).await?;
            Ok(Some(ReferencedFile::Local { filepath }))
        } else {
            Ok(Some(ReferencedFile::Size {
                filesize: info.size,
            }))
        }
    }

    /// Stream the referenced file to the host's response channel with
    /// attachment headers.
    ///
    /// A negative existence check ends the request as not-found before any
    /// download is attempted. Lifetime, filter and force-download arrive from
    /// the host contract but do not alter how the bytes are served here.
    pub async fn send_file(
        &self,
        blob: &str,
        _lifetime_secs: u64,
        _filter: u32,
        _force_download: bool,
        sink: &mut dyn ResponseSink,
    ) -> Result<(), RepositoryError> {
        let reference = FileReference::decode(blob)?;

        if !self.client.exists(&reference).await? {
            return Err(RepositoryError::NotFound(reference.filepath));
        }

        let bytes = self
            .client
            .download(&reference)
            .await
            .map_err(|e| RepositoryError::Download(e.to_string()))?;
        info!(path = %reference.filepath, size = bytes.len(), "sending referenced file");
        stream_attachment(sink, &reference, &bytes)
    }

    /// Human-readable origin of a picked source, shown by the host.
    pub fn file_source_info(&self, source: &str) -> String {
        format!("Nuxeo ({}) : {}", self.context.user_name, source)
    }

    /// Bitmask of return types the admin enabled for this instance.
    pub fn supported_returntypes(&self) -> u32 {
        self.params.return_type_mask()
    }

    /// All file types can be picked from this repository.
    pub fn supported_filetypes(&self) -> &'static str {
        "*"
    }
}
