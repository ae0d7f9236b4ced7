//! Admin settings parsing
//!
//! The host application stores a single XML settings document maintained by
//! the site administrator. It declares which remote document types behave as
//! containers, which as contents, which Moodle-style return types are enabled,
//! and the base/manage URLs of the Nuxeo server. Parsed once at construction
//! into an immutable [`RepositoryParams`].

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use crate::error::RepositoryError;

/// File is copied into the host's own storage.
pub const RETURN_INTERNAL: u32 = 1;
/// File stays external, only a link is kept.
pub const RETURN_EXTERNAL: u32 = 2;
/// File is kept as a live reference into the remote repository.
pub const RETURN_REFERENCE: u32 = 4;

/// Document type marking a user's personal workspace root.
pub const USER_WORKSPACE_TYPE: &str = "UserWorkspace";

/// Immutable per-instance configuration, loaded from the admin XML document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryParams {
    /// Remote types treated as browsable containers
    pub conteners: Vec<String>,
    /// Remote types treated as plain contents
    pub contents: Vec<String>,
    /// Enabled return-type flag values
    pub returntypes: Vec<u32>,
    /// Nuxeo server base URL
    pub url: String,
    /// Base URL the user is redirected to for the "manage" action
    pub url_base_user_manage: String,
}

impl RepositoryParams {
    /// Parse the `admin_config` settings tree.
    ///
    /// Fails with [`RepositoryError::Configuration`] when the document is
    /// malformed or a required scalar is missing; the caller treats that as
    /// fatal for the instance.
    pub fn from_xml(xml: &str) -> Result<Self, RepositoryError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        #[derive(PartialEq)]
        enum Section {
            Root,
            Conteners,
            Contents,
            ReturnTypes,
            Url,
            ManageUrl,
        }

        let mut section = Section::Root;
        let mut in_entry = false;

        let mut conteners = Vec::new();
        let mut contents = Vec::new();
        let mut returntypes = Vec::new();
        let mut url = String::new();
        let mut url_base_user_manage = String::new();

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.name().as_ref() {
                    b"conteners" => section = Section::Conteners,
                    b"contents" => section = Section::Contents,
                    b"returntypes" => section = Section::ReturnTypes,
                    b"url" => section = Section::Url,
                    b"url_base_user_manage" => section = Section::ManageUrl,
                    b"entry" => {
                        in_entry = true;
                        if section == Section::ReturnTypes {
                            if let Some(value) = Self::enabled_entry_value(e)? {
                                returntypes.push(value);
                            }
                        }
                    }
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => {
                    // Return-type entries are usually self-closing:
                    // <entry enable="true" value="4"/>
                    if e.name().as_ref() == b"entry" && section == Section::ReturnTypes {
                        if let Some(value) = Self::enabled_entry_value(e)? {
                            returntypes.push(value);
                        }
                    }
                }
                Ok(Event::Text(ref e)) => {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    match section {
                        Section::Conteners if in_entry => conteners.push(text),
                        Section::Contents if in_entry => contents.push(text),
                        Section::Url => url = text,
                        Section::ManageUrl => url_base_user_manage = text,
                        _ => {}
                    }
                }
                Ok(Event::End(ref e)) => match e.name().as_ref() {
                    b"entry" => in_entry = false,
                    b"conteners" | b"contents" | b"returntypes" | b"url"
                    | b"url_base_user_manage" => section = Section::Root,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(RepositoryError::Configuration(format!(
                        "malformed settings XML: {}",
                        e
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        if url.is_empty() {
            return Err(RepositoryError::Configuration(
                "missing admin_config/url".to_string(),
            ));
        }
        if url_base_user_manage.is_empty() {
            return Err(RepositoryError::Configuration(
                "missing admin_config/url_base_user_manage".to_string(),
            ));
        }

        Ok(Self {
            conteners,
            contents,
            returntypes,
            url,
            url_base_user_manage,
        })
    }

    fn enabled_entry_value(
        e: &quick_xml::events::BytesStart<'_>,
    ) -> Result<Option<u32>, RepositoryError> {
        let mut enabled = false;
        let mut value: Option<u32> = None;
        for attr in e.attributes() {
            let attr = attr.map_err(|e| {
                RepositoryError::Configuration(format!("bad returntype attribute: {}", e))
            })?;
            match attr.key.as_ref() {
                b"enable" => enabled = attr.value.as_ref() == b"true",
                b"value" => {
                    value = String::from_utf8_lossy(attr.value.as_ref()).parse().ok();
                }
                _ => {}
            }
        }
        Ok(if enabled { value } else { None })
    }

    /// Container test: configured container types plus the fixed user
    /// workspace marker.
    pub fn is_container_type(&self, doc_type: &str) -> bool {
        doc_type == USER_WORKSPACE_TYPE || self.conteners.iter().any(|t| t == doc_type)
    }

    /// Bitmask of enabled return types; all three when none is configured.
    pub fn return_type_mask(&self) -> u32 {
        if self.returntypes.is_empty() {
            RETURN_INTERNAL | RETURN_EXTERNAL | RETURN_REFERENCE
        } else {
            self.returntypes.iter().sum()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTINGS: &str = r#"
        <settings>
          <admin_config>
            <conteners>
              <entry>Folder</entry>
              <entry>OrderedFolder</entry>
              <entry>Workspace</entry>
            </conteners>
            <contents>
              <entry>File</entry>
              <entry>Picture</entry>
            </contents>
            <returntypes>
              <entry enable="true" value="1"/>
              <entry enable="false" value="2"/>
              <entry enable="true" value="4"/>
            </returntypes>
            <url>https://nuxeo.example.com/nuxeo</url>
            <url_base_user_manage>https://nuxeo.example.com/ui</url_base_user_manage>
          </admin_config>
        </settings>
    "#;

    #[test]
    fn test_parse_settings() {
        let params = RepositoryParams::from_xml(SETTINGS).unwrap();
        assert_eq!(params.conteners, vec!["Folder", "OrderedFolder", "Workspace"]);
        assert_eq!(params.contents, vec!["File", "Picture"]);
        assert_eq!(params.returntypes, vec![1, 4]);
        assert_eq!(params.url, "https://nuxeo.example.com/nuxeo");
        assert_eq!(params.url_base_user_manage, "https://nuxeo.example.com/ui");
    }

    #[test]
    fn test_missing_url_is_fatal() {
        let xml = r#"
            <settings><admin_config>
              <conteners><entry>Folder</entry></conteners>
              <url_base_user_manage>https://x/ui</url_base_user_manage>
            </admin_config></settings>
        "#;
        let err = RepositoryParams::from_xml(xml).unwrap_err();
        assert!(matches!(err, RepositoryError::Configuration(_)));
    }

    #[test]
    fn test_missing_manage_url_is_fatal() {
        let xml = r#"
            <settings><admin_config>
              <url>https://nuxeo.example.com/nuxeo</url>
            </admin_config></settings>
        "#;
        assert!(RepositoryParams::from_xml(xml).is_err());
    }

    #[test]
    fn test_container_type_includes_user_workspace() {
        let params = RepositoryParams::from_xml(SETTINGS).unwrap();
        assert!(params.is_container_type("UserWorkspace"));
        assert!(params.is_container_type("OrderedFolder"));
        assert!(!params.is_container_type("Picture"));
    }

    #[test]
    fn test_return_type_mask() {
        let params = RepositoryParams::from_xml(SETTINGS).unwrap();
        assert_eq!(params.return_type_mask(), 5);
    }

    #[test]
    fn test_return_type_mask_defaults_to_all() {
        let xml = r#"
            <settings><admin_config>
              <url>https://x/nuxeo</url>
              <url_base_user_manage>https://x/ui</url_base_user_manage>
            </admin_config></settings>
        "#;
        let params = RepositoryParams::from_xml(xml).unwrap();
        assert_eq!(params.return_type_mask(), 7);
    }
}
