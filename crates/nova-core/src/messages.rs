//! User-visible messages and their localization catalog

use std::collections::HashMap;
use std::fmt;

/// Catalog keys the state layer posts messages with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    ArtifactVersionNotFound,
    ArtifactGoToNotAvailable,
    HttpErrorNotFound,
    PublishSuccess,
    ProcessRegenerateUserStories,
    ArtifactLockAlreadyLocked,
    ArtifactLockDoesNotExist,
}

impl MessageKey {
    pub const ALL: [MessageKey; 7] = [
        MessageKey::ArtifactVersionNotFound,
        MessageKey::ArtifactGoToNotAvailable,
        MessageKey::HttpErrorNotFound,
        MessageKey::PublishSuccess,
        MessageKey::ProcessRegenerateUserStories,
        MessageKey::ArtifactLockAlreadyLocked,
        MessageKey::ArtifactLockDoesNotExist,
    ];

    /// Key as it appears in the catalog
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ArtifactVersionNotFound => "Artifact_Version_NotFound",
            Self::ArtifactGoToNotAvailable => "Artifact_GoTo_NotAvailable",
            Self::HttpErrorNotFound => "HttpError_NotFound",
            Self::PublishSuccess => "Publish_Success_Message",
            Self::ProcessRegenerateUserStories => "ST_ProcessType_RegenerateUS_Message",
            Self::ArtifactLockAlreadyLocked => "Artifact_Lock_AlreadyLocked",
            Self::ArtifactLockDoesNotExist => "Artifact_Lock_DoesNotExist",
        }
    }

    fn default_text(self) -> &'static str {
        match self {
            Self::ArtifactVersionNotFound => "The requested artifact version does not exist.",
            Self::ArtifactGoToNotAvailable => "This item cannot be opened in the editor.",
            Self::HttpErrorNotFound => "The item you are looking for does not exist or has been deleted.",
            Self::PublishSuccess => "Changes have been published.",
            Self::ProcessRegenerateUserStories => {
                "The process changed. User stories generated from it may need to be regenerated."
            }
            Self::ArtifactLockAlreadyLocked => "The artifact is locked by another user.",
            Self::ArtifactLockDoesNotExist => "The artifact no longer exists.",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageLevel {
    Error,
    Warning,
    Info,
}

/// Message handed to the message service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    pub level: MessageLevel,
    pub key: MessageKey,
    pub text: String,
}

/// Localized message catalog
#[derive(Debug, Clone, Default)]
pub struct Localization {
    overrides: HashMap<&'static str, String>,
}

impl Localization {
    /// Catalog with built-in English texts
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the text for a key
    #[must_use]
    pub fn with_text(mut self, key: MessageKey, text: impl Into<String>) -> Self {
        self.overrides.insert(key.as_str(), text.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: MessageKey) -> &str {
        self.overrides
            .get(key.as_str())
            .map_or_else(|| key.default_text(), String::as_str)
    }

    #[must_use]
    pub fn message(&self, level: MessageLevel, key: MessageKey) -> UserMessage {
        UserMessage {
            level,
            key,
            text: self.get(key).to_string(),
        }
    }
}
