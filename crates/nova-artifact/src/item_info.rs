//! Item descriptors resolved from a raw id
//!
//! An [`ItemInfoResult`] tells the client what a bare id points at (project,
//! artifact or sub-artifact) before any typed model is fetched. It is created
//! fresh on every navigation and never mutated.

use crate::artifact::{RolePermissions, UserRef};
use crate::item_type::ItemTypePredefined;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of item an id resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Project,
    Artifact,
    SubArtifact,
}

/// Descriptor for an id (and optional version)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInfoResult {
    /// Artifact or project id; for sub-artifacts the owning artifact id
    pub id: i32,
    #[serde(default)]
    pub sub_artifact_id: Option<i32>,
    pub project_id: i32,
    #[serde(default)]
    pub parent_id: Option<i32>,
    pub name: String,
    pub predefined_type: ItemTypePredefined,
    #[serde(default)]
    pub item_type_id: Option<i32>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub version: Option<i32>,
    #[serde(default)]
    pub version_count: i32,
    #[serde(default)]
    pub order_index: Option<f64>,
    #[serde(default)]
    pub permissions: RolePermissions,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub deleted_date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_by_user: Option<UserRef>,
    #[serde(default)]
    pub locked_by_user: Option<UserRef>,
    #[serde(default)]
    pub locked_date_time: Option<DateTime<Utc>>,
}

impl ItemInfoResult {
    #[inline]
    #[must_use]
    pub fn is_sub_artifact(&self) -> bool {
        self.sub_artifact_id.is_some()
    }

    #[inline]
    #[must_use]
    pub fn is_project(&self) -> bool {
        !self.is_sub_artifact()
            && (self.predefined_type == ItemTypePredefined::Project || self.id == self.project_id)
    }

    #[inline]
    #[must_use]
    pub fn is_artifact(&self) -> bool {
        !self.is_sub_artifact() && !self.is_project()
    }

    #[must_use]
    pub fn kind(&self) -> ItemKind {
        if self.is_sub_artifact() {
            ItemKind::SubArtifact
        } else if self.is_project() {
            ItemKind::Project
        } else {
            ItemKind::Artifact
        }
    }
}
