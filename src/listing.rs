//! Listing construction
//!
//! Reshapes the documents returned by the remote repository into the listing
//! structure the host UI renders: containers first (folders, workspaces),
//! then content entries (pictures and generic files), each with display
//! title, dates, author and an icon key.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::RemoteDocument;
use crate::config::RepositoryParams;
use crate::nav::Crumb;

const THUMBNAIL_SIZE: u32 = 64;

/// A browsable container (folder, workspace).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerEntry {
    pub title: String,
    pub path: String,
    /// Raw remote creation date string
    pub date: String,
    /// Icon key, lowercased normalized type ("folder", "workspace", ...)
    pub thumbnail: String,
    pub thumbnail_height: u32,
    pub thumbnail_width: u32,
    /// Always empty; children load dynamically
    pub children: Vec<ListEntry>,
}

/// A downloadable content item (picture or generic file).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentEntry {
    pub title: String,
    /// Remote path, used as the download source
    pub source: String,
    pub size: u64,
    pub datecreated: Option<i64>,
    pub datemodified: Option<i64>,
    pub author: String,
    pub thumbnail: String,
    pub thumbnail_height: u32,
    pub thumbnail_width: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListEntry {
    Container(ContainerEntry),
    Content(ContentEntry),
}

impl ListEntry {
    pub fn is_container(&self) -> bool {
        matches!(self, ListEntry::Container(_))
    }

    pub fn title(&self) -> &str {
        match self {
            ListEntry::Container(e) => &e.title,
            ListEntry::Content(e) => &e.title,
        }
    }
}

/// A complete browse/search result, ready for the host UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub list: Vec<ListEntry>,
    /// Breadcrumb trail from the workspace root to the listed path
    pub path: Vec<Crumb>,
    /// URL of the external management UI for the listed path
    pub manage: String,
    /// Children load on demand
    pub dynload: bool,
    pub nosearch: bool,
    /// The repository handles auth itself, no logout icon
    pub nologin: bool,
}

impl Listing {
    pub fn new(list: Vec<ListEntry>, path: Vec<Crumb>, manage: String) -> Self {
        Self {
            list,
            path,
            manage,
            dynload: true,
            nosearch: false,
            nologin: true,
        }
    }
}

/// Normalize a remote container type for display and icon lookup.
fn normalize_container_type(doc_type: &str) -> &str {
    match doc_type {
        "UserWorkspace" => "Workspace",
        "OrderedFolder" => "Folder",
        other => other,
    }
}

/// Icon key for a filename, derived from its extension.
fn extension_icon(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && !ext.contains('/') => {
            format!("f/{}", ext.to_lowercase())
        }
        _ => "f/unknown".to_string(),
    }
}

/// Parse a remote date string into a unix timestamp.
///
/// Nuxeo emits ISO-8601 with offset; older servers emit a bare
/// "YYYY-MM-DD HH:MM:SS" taken as UTC. Anything else is reported as absent.
pub(crate) fn parse_timestamp(value: &str) -> Option<i64> {
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc().timestamp())
}

fn container_entry(doc: &RemoteDocument) -> ContainerEntry {
    let display_type = normalize_container_type(&doc.doc_type);
    ContainerEntry {
        title: doc.title.clone(),
        path: doc.path.clone(),
        date: doc.property("dc:created").to_string(),
        thumbnail: display_type.to_lowercase(),
        thumbnail_height: THUMBNAIL_SIZE,
        thumbnail_width: THUMBNAIL_SIZE,
        children: Vec::new(),
    }
}

fn content_entry(doc: &RemoteDocument, title: String, thumbnail: String) -> ContentEntry {
    ContentEntry {
        title,
        source: doc.path.clone(),
        size: doc.property("common:size").parse().unwrap_or(0),
        datecreated: parse_timestamp(doc.property("dc:created")),
        datemodified: parse_timestamp(doc.property("dc:modified")),
        author: doc.property("dc:creator").to_string(),
        thumbnail,
        thumbnail_height: THUMBNAIL_SIZE,
        thumbnail_width: THUMBNAIL_SIZE,
    }
}

/// Classify documents into listing entries, containers first.
///
/// Classification is total and first-match-wins: container types (including
/// the user workspace marker) take precedence over "Picture", which takes
/// precedence over the generic file rule. Input order is preserved within
/// each group.
pub fn build_entries(documents: &[RemoteDocument], params: &RepositoryParams) -> Vec<ListEntry> {
    let mut containers = Vec::new();
    let mut files = Vec::new();

    for doc in documents {
        if params.is_container_type(&doc.doc_type) {
            containers.push(ListEntry::Container(container_entry(doc)));
        } else if doc.doc_type == "Picture" {
            let title = match doc.picture_filename.as_deref() {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => doc.title.clone(),
            };
            // Pictures get a generic image icon regardless of actual format
            files.push(ListEntry::Content(content_entry(
                doc,
                title,
                extension_icon(".png"),
            )));
        } else {
            let filename = doc.property("file:filename");
            let title = if filename.is_empty() {
                doc.title.clone()
            } else {
                filename.to_string()
            };
            let thumbnail = extension_icon(&title);
            files.push(ListEntry::Content(content_entry(doc, title, thumbnail)));
        }
    }

    debug!(
        containers = containers.len(),
        files = files.len(),
        "built listing entries"
    );
    containers.extend(files);
    containers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> RepositoryParams {
        RepositoryParams {
            conteners: vec![
                "Folder".to_string(),
                "OrderedFolder".to_string(),
                "Workspace".to_string(),
            ],
            contents: vec!["File".to_string(), "Picture".to_string()],
            returntypes: vec![],
            url: "https://nuxeo.example.com/nuxeo".to_string(),
            url_base_user_manage: "https://nuxeo.example.com/ui".to_string(),
        }
    }

    #[test]
    fn test_containers_ordered_before_files() {
        let docs = vec![
            RemoteDocument::new("File", "notes.txt", "/ws/notes.txt"),
            RemoteDocument::new("Folder", "Archive", "/ws/Archive"),
            RemoteDocument::new("Picture", "photo", "/ws/photo"),
            RemoteDocument::new("Workspace", "Shared", "/ws/Shared"),
        ];
        let entries = build_entries(&docs, &params());
        assert_eq!(entries.len(), 4);
        assert!(entries[0].is_container());
        assert!(entries[1].is_container());
        assert_eq!(entries[0].title(), "Archive");
        assert_eq!(entries[1].title(), "Shared");
        assert_eq!(entries[2].title(), "notes.txt");
        assert_eq!(entries[3].title(), "photo");
    }

    #[test]
    fn test_all_containers_stay_in_input_order() {
        let docs = vec![
            RemoteDocument::new("Workspace", "B", "/b"),
            RemoteDocument::new("Folder", "A", "/a"),
        ];
        let entries = build_entries(&docs, &params());
        assert!(entries.iter().all(ListEntry::is_container));
        assert_eq!(entries[0].title(), "B");
        assert_eq!(entries[1].title(), "A");
    }

    #[test]
    fn test_user_workspace_normalizes_to_workspace_icon() {
        let docs = vec![RemoteDocument::new("UserWorkspace", "jdoe", "/uw/jdoe")];
        let entries = build_entries(&docs, &params());
        match &entries[0] {
            ListEntry::Container(e) => assert_eq!(e.thumbnail, "workspace"),
            _ => panic!("expected container"),
        }
    }

    #[test]
    fn test_ordered_folder_normalizes_to_folder() {
        let docs = vec![RemoteDocument::new("OrderedFolder", "stuff", "/ws/stuff")];
        let entries = build_entries(&docs, &params());
        match &entries[0] {
            ListEntry::Container(e) => assert_eq!(e.thumbnail, "folder"),
            _ => panic!("expected container"),
        }
    }

    // A type listed as a container never falls through to the Picture rule,
    // even for a hypothetical document matching both.
    #[test]
    fn test_container_rule_precedes_picture_rule() {
        let mut p = params();
        p.conteners.push("Picture".to_string());
        let docs = vec![RemoteDocument::new("Picture", "odd", "/ws/odd")];
        let entries = build_entries(&docs, &p);
        assert!(entries[0].is_container());
    }

    #[test]
    fn test_picture_title_prefers_picture_filename() {
        let mut doc = RemoteDocument::new("Picture", "IMG_0001", "/ws/img");
        doc.picture_filename = Some("holiday.jpg".to_string());
        let entries = build_entries(&[doc], &params());
        assert_eq!(entries[0].title(), "holiday.jpg");

        let mut doc = RemoteDocument::new("Picture", "IMG_0001", "/ws/img");
        doc.picture_filename = Some(String::new());
        let entries = build_entries(&[doc], &params());
        assert_eq!(entries[0].title(), "IMG_0001");
    }

    #[test]
    fn test_file_title_prefers_filename_property() {
        let doc = RemoteDocument::new("File", "Quarterly report", "/ws/q")
            .with_property("file:filename", "q3-report.pdf")
            .with_property("common:size", "4096")
            .with_property("dc:creator", "jdoe")
            .with_property("dc:created", "2024-03-01T10:00:00+01:00");
        let entries = build_entries(&[doc], &params());
        match &entries[0] {
            ListEntry::Content(e) => {
                assert_eq!(e.title, "q3-report.pdf");
                assert_eq!(e.thumbnail, "f/pdf");
                assert_eq!(e.size, 4096);
                assert_eq!(e.author, "jdoe");
                assert_eq!(e.datecreated, Some(1709283600));
            }
            _ => panic!("expected content"),
        }
    }

    #[test]
    fn test_file_without_extension_gets_unknown_icon() {
        let doc = RemoteDocument::new("File", "Makefile", "/ws/Makefile");
        let entries = build_entries(&[doc], &params());
        match &entries[0] {
            ListEntry::Content(e) => assert_eq!(e.thumbnail, "f/unknown"),
            _ => panic!("expected content"),
        }
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(
            parse_timestamp("1970-01-01T00:00:00+00:00"),
            Some(0)
        );
        assert_eq!(parse_timestamp("1970-01-01 00:00:10"), Some(10));
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_empty_document_set_yields_empty_listing() {
        let entries = build_entries(&[], &params());
        assert!(entries.is_empty());
    }
}
