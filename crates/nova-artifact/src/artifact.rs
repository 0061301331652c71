//! Artifact details as served by the artifact store

use crate::item_info::ItemInfoResult;
use crate::item_type::ItemTypePredefined;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version number of an artifact that has never been published
pub const UNPUBLISHED_VERSION: i32 = -1;

/// Reference to a user (lock owner, deleter, author)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: i32,
    pub display_name: String,
}

impl UserRef {
    #[must_use]
    pub fn new(id: i32, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }
}

/// Role permission bit set granted to the current user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RolePermissions(pub u32);

impl RolePermissions {
    pub const NONE: Self = Self(0);
    pub const READ: Self = Self(1);
    pub const EDIT: Self = Self(1 << 1);
    pub const TRACE: Self = Self(1 << 2);
    pub const COMMENT: Self = Self(1 << 3);
    pub const DELETE: Self = Self(1 << 4);
    pub const ALL: Self = Self(0b1_1111);

    #[inline]
    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    #[must_use]
    pub fn can_edit(self) -> bool {
        self.contains(Self::EDIT)
    }
}

impl std::ops::BitOr for RolePermissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Kind of a property value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyKind {
    Text,
    RichText,
    Number,
    Date,
    Choice,
    User,
}

/// Custom property value on an artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyValue {
    pub property_type_id: i32,
    pub name: String,
    pub kind: PropertyKind,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub is_read_only: bool,
}

/// Artifact details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactModel {
    pub id: i32,
    pub project_id: i32,
    #[serde(default)]
    pub parent_id: Option<i32>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub prefix: String,
    pub predefined_type: ItemTypePredefined,
    #[serde(default)]
    pub item_type_id: Option<i32>,
    #[serde(default = "unpublished")]
    pub version: i32,
    #[serde(default)]
    pub order_index: Option<f64>,
    #[serde(default)]
    pub permissions: RolePermissions,
    #[serde(default)]
    pub locked_by_user: Option<UserRef>,
    #[serde(default)]
    pub locked_date_time: Option<DateTime<Utc>>,
    /// Present when a saved draft exists on the server
    #[serde(default)]
    pub last_saved_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub custom_property_values: Vec<PropertyValue>,
}

fn unpublished() -> i32 {
    UNPUBLISHED_VERSION
}

impl ArtifactModel {
    /// Minimal model with identity only
    #[must_use]
    pub fn new(
        id: i32,
        project_id: i32,
        name: impl Into<String>,
        predefined_type: ItemTypePredefined,
    ) -> Self {
        Self {
            id,
            project_id,
            parent_id: None,
            name: name.into(),
            description: None,
            prefix: String::new(),
            predefined_type,
            item_type_id: None,
            version: UNPUBLISHED_VERSION,
            order_index: None,
            permissions: RolePermissions::ALL,
            locked_by_user: None,
            locked_date_time: None,
            last_saved_on: None,
            custom_property_values: Vec::new(),
        }
    }

    /// Synthetic descriptor for a project root
    #[must_use]
    pub fn project(id: i32, name: impl Into<String>) -> Self {
        let mut model = Self::new(id, id, name, ItemTypePredefined::Project);
        model.item_type_id = Some(ItemTypePredefined::Project.code());
        model.permissions = RolePermissions::READ;
        model
    }

    /// Whether the artifact has a published version or a saved draft
    #[inline]
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.version > 0 || self.last_saved_on.is_some()
    }
}

impl From<&ItemInfoResult> for ArtifactModel {
    fn from(info: &ItemInfoResult) -> Self {
        Self {
            id: info.id,
            project_id: info.project_id,
            parent_id: info.parent_id,
            name: info.name.clone(),
            description: None,
            prefix: info.prefix.clone().unwrap_or_default(),
            predefined_type: info.predefined_type,
            item_type_id: info.item_type_id,
            version: info.version.unwrap_or(if info.version_count > 0 {
                info.version_count
            } else {
                UNPUBLISHED_VERSION
            }),
            order_index: info.order_index,
            permissions: info.permissions,
            locked_by_user: info.locked_by_user.clone(),
            locked_date_time: info.locked_date_time,
            last_saved_on: None,
            custom_property_values: Vec::new(),
        }
    }
}

/// Outcome of a lock request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LockResultKind {
    Success,
    AlreadyLocked,
    DoesNotExist,
    AccessDenied,
}

/// Lock response for a single artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockResult {
    pub result: LockResultKind,
    #[serde(default)]
    pub lock_owner: Option<UserRef>,
    #[serde(default)]
    pub locked_date_time: Option<DateTime<Utc>>,
}

impl LockResult {
    #[must_use]
    pub fn success(owner: UserRef) -> Self {
        Self {
            result: LockResultKind::Success,
            lock_owner: Some(owner),
            locked_date_time: Some(Utc::now()),
        }
    }
}

/// Details of a sub-artifact (shape or connector) fetched on demand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubArtifactModel {
    pub id: i32,
    pub parent_id: i32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub predefined_type: ItemTypePredefined,
    #[serde(default)]
    pub custom_property_values: Vec<PropertyValue>,
}
