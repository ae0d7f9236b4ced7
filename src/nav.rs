//! Path navigation
//!
//! Resolves which remote path a listing call actually targets and builds the
//! breadcrumb trail shown above the listing. An empty requested path falls
//! back to the session's last visited path, and from there to the user's
//! workspace root.

use serde::{Deserialize, Serialize};

use crate::error::RepositoryError;

/// One breadcrumb step: display name plus the path it navigates to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crumb {
    pub name: String,
    pub path: String,
}

/// Resolve the effective listing path.
///
/// Empty request falls back to `last_visited`; an empty or root result is
/// substituted with the user workspace root. Fails when that root itself is
/// unknown (remote resolution failed or returned nothing).
pub fn resolve_listing_path(
    requested: &str,
    last_visited: &str,
    user_root: &str,
) -> Result<String, RepositoryError> {
    let mut path = if requested.is_empty() {
        last_visited.to_string()
    } else {
        requested.to_string()
    };

    if path.is_empty() || path == "/" {
        if user_root.is_empty() {
            return Err(RepositoryError::Repository(
                "user workspace root could not be resolved".to_string(),
            ));
        }
        path = user_root.to_string();
    }
    Ok(path)
}

/// Build the breadcrumb trail for `path` relative to the user workspace root.
///
/// Always starts with the synthetic root crumb (`root_label`, "/"). Segments
/// between the root and the target accumulate their full paths. A suffix
/// without any separator produces a single crumb whose path is the bare
/// suffix, not the accumulated one; that quirk is long-standing observable
/// behavior and is kept as is.
pub fn build_breadcrumb(path: &str, user_root: &str, root_label: &str) -> Vec<Crumb> {
    let mut trail = vec![Crumb {
        name: root_label.to_string(),
        path: "/".to_string(),
    }];

    let suffix = path.strip_prefix(user_root).unwrap_or("");
    if suffix.is_empty() {
        return trail;
    }

    if suffix.contains('/') {
        let mut accumulated = user_root.to_string();
        for part in suffix.split('/').filter(|p| !p.is_empty()) {
            accumulated.push('/');
            accumulated.push_str(part);
            trail.push(Crumb {
                name: part.to_string(),
                path: accumulated.clone(),
            });
        }
    } else {
        trail.push(Crumb {
            name: suffix.to_string(),
            path: suffix.to_string(),
        });
    }
    trail
}

/// Build the "manage" URL for the current path: the configured base joined
/// with the path by exactly one slash. Root and empty paths return the base
/// unchanged.
pub fn manage_url(base: &str, path: &str) -> String {
    if path.is_empty() || path == "/" {
        return base.to_string();
    }
    let mut url = base.to_string();
    if !url.ends_with('/') && !path.starts_with('/') {
        url.push('/');
    }
    if let Some(stripped) = path.strip_prefix('/') {
        if url.ends_with('/') {
            url.push_str(stripped);
        } else {
            url.push('/');
            url.push_str(stripped);
        }
    } else {
        url.push_str(path);
    }
    url
}
