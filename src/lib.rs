//! Nuxeo workspace repository adapter
//!
//! Lets a plugin-driven host application browse, search and fetch files from
//! a Nuxeo document repository scoped to the user's personal workspace. The
//! host drives [`WorkspaceRepository`] by contract; all network I/O goes
//! through the [`NuxeoClient`] trait implemented by the host's automation
//! client.
//!
//! ```text
//! ┌──────────────┐   get_listing / search / get_file    ┌───────────────┐
//! │ host picker  │ ───────────────────────────────────▶ │ Workspace     │
//! │  framework   │ ◀─────────────── Listing / temp file │  Repository   │
//! └──────────────┘                                      └───────┬───────┘
//!                                                               │ NuxeoClient
//!                                                               ▼
//!                                                       remote Nuxeo server
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod listing;
pub mod nav;
pub mod reference;
pub mod repository;
pub mod transfer;

pub use client::{FileInfo, NuxeoClient, RemoteDocument};
pub use config::{
    RepositoryParams, RETURN_EXTERNAL, RETURN_INTERNAL, RETURN_REFERENCE, USER_WORKSPACE_TYPE,
};
pub use error::RepositoryError;
pub use listing::{ContainerEntry, ContentEntry, ListEntry, Listing};
pub use nav::Crumb;
pub use reference::FileReference;
pub use repository::{BrowseSession, RepositoryContext, StringTable, WorkspaceRepository};
pub use transfer::{DownloadedFile, ReferencedFile, ResponseSink};
