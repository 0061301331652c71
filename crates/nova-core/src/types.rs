//! Core types for Nova
//!
//! Defines:
//! - Client configuration
//! - Route parameters of a navigation
//! - Editor tabs
//! - Navigation targets and loading-overlay tokens

use crate::error::NovaError;
use nova_artifact::ItemTypePredefined;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NovaConfig {
    /// Server root, e.g. `https://nova.example.com`
    pub base_url: String,
    /// Value of the `Session-Token` header
    pub session_token: Option<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Message catalog locale
    pub locale: String,
    /// Buffered errors per artifact error stream
    pub error_stream_capacity: usize,
}

impl NovaConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse a TOML document
    ///
    /// # Errors
    /// Returns `NovaError::Config` on malformed TOML
    pub fn from_toml_str(source: &str) -> Result<Self, NovaError> {
        toml::from_str(source).map_err(|e| NovaError::Config(e.to_string()))
    }

    /// Load from a TOML file, then apply `NOVA_BASE_URL` and
    /// `NOVA_SESSION_TOKEN` from the environment
    ///
    /// # Errors
    /// Returns `NovaError::Config` if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, NovaError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| NovaError::Config(format!("{}: {e}", path.display())))?;
        Ok(Self::from_toml_str(&source)?.with_env_overrides())
    }

    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("NOVA_BASE_URL") {
            self.base_url = url;
        }
        if let Ok(token) = std::env::var("NOVA_SESSION_TOKEN") {
            self.session_token = Some(token);
        }
        self
    }
}

impl Default for NovaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            session_token: None,
            request_timeout_secs: 30,
            locale: "en-US".to_string(),
            error_stream_capacity: 16,
        }
    }
}

/// Route parameters of the item state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateParams {
    pub id: String,
    /// Absent means "latest"
    pub version: Option<String>,
    /// Present when the user arrived through a breadcrumb or deep link
    pub path: Option<String>,
}

impl StateParams {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Requested version, when the parameter is a valid integer
    #[must_use]
    pub fn requested_version(&self) -> Option<i32> {
        self.version.as_deref().and_then(|v| v.trim().parse().ok())
    }
}

/// Editor tab opened for an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorTab {
    Diagram,
    Glossary,
    General,
    Details,
    Collection,
    Process,
}

impl EditorTab {
    /// Tab for an item type. Root collection folders (directly under the
    /// project) open on the general tab.
    #[must_use]
    pub fn for_item(
        predefined_type: ItemTypePredefined,
        parent_id: Option<i32>,
        project_id: i32,
    ) -> Self {
        match predefined_type {
            t if t.is_diagram() => Self::Diagram,
            ItemTypePredefined::Glossary => Self::Glossary,
            ItemTypePredefined::Project => Self::General,
            ItemTypePredefined::CollectionFolder if parent_id == Some(project_id) => Self::General,
            ItemTypePredefined::ArtifactCollection => Self::Collection,
            ItemTypePredefined::Process => Self::Process,
            _ => Self::Details,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Diagram => "diagram",
            Self::Glossary => "glossary",
            Self::General => "general",
            Self::Details => "details",
            Self::Collection => "collection",
            Self::Process => "process",
        }
    }
}

/// Where to navigate next
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTarget {
    pub id: i32,
    pub version: Option<i32>,
    /// Replace the current history entry
    pub redirect: bool,
}

impl NavigationTarget {
    #[must_use]
    pub fn redirect_to(id: i32) -> Self {
        Self {
            id,
            version: None,
            redirect: true,
        }
    }
}

/// Handle returned by the loading overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadingToken(pub u64);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn editor_tab_mapping() {
        use ItemTypePredefined as T;

        for t in [
            T::GenericDiagram,
            T::BusinessProcess,
            T::DomainDiagram,
            T::Storyboard,
            T::UseCaseDiagram,
            T::UseCase,
            T::UiMockup,
        ] {
            assert_eq!(EditorTab::for_item(t, Some(2), 1), EditorTab::Diagram);
        }
        assert_eq!(EditorTab::for_item(T::Glossary, None, 1), EditorTab::Glossary);
        assert_eq!(EditorTab::for_item(T::Project, None, 1), EditorTab::General);
        assert_eq!(EditorTab::for_item(T::ArtifactCollection, Some(5), 1), EditorTab::Collection);
        assert_eq!(EditorTab::for_item(T::Process, Some(5), 1), EditorTab::Process);
        assert_eq!(EditorTab::for_item(T::Document, Some(5), 1), EditorTab::Details);
    }

    #[test]
    fn collection_folder_depends_on_parent() {
        let t = ItemTypePredefined::CollectionFolder;
        assert_eq!(EditorTab::for_item(t, Some(1), 1), EditorTab::General);
        assert_eq!(EditorTab::for_item(t, Some(8), 1), EditorTab::Details);
    }

    #[test]
    fn requested_version_ignores_garbage() {
        assert_eq!(StateParams::new("5").with_version("3").requested_version(), Some(3));
        assert_eq!(StateParams::new("5").with_version("abc").requested_version(), None);
        assert_eq!(StateParams::new("5").requested_version(), None);
    }

    #[test]
    fn config_from_toml() {
        let config = NovaConfig::from_toml_str(
            r#"
            base_url = "https://nova.example.com"
            request_timeout_secs = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://nova.example.com");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.locale, "en-US");
    }

    #[test]
    fn config_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nova.toml");
        std::fs::write(&path, "locale = \"de-DE\"\n").unwrap();

        let config = NovaConfig::load(&path).unwrap();
        assert_eq!(config.locale, "de-DE");
        assert!(NovaConfig::load(dir.path().join("missing.toml")).is_err());
    }

    proptest! {
        #[test]
        fn prop_unknown_types_open_details(code in 0x10000i32..0x20000) {
            let t = ItemTypePredefined::from(code);
            prop_assert_eq!(EditorTab::for_item(t, None, 1), EditorTab::Details);
        }
    }
}
