//! Nova Artifact Model
//!
//! Wire types shared by every layer of the Nova client.
//!
//! # Core Concepts
//!
//! - [`ItemInfoResult`]: what a bare id resolves to (project, artifact, sub-artifact)
//! - [`ItemTypePredefined`]: numeric item-type codes with group masks
//! - [`ArtifactModel`]: artifact details from the artifact store
//! - [`ProcessModel`]: process graph (shapes, links, decision merges)
//! - [`ArtifactChanges`]: partial save payload
//! - [`FieldDescriptor`]: property editor field, editable or read-only
//!
//! # Example
//!
//! ```rust,ignore
//! use nova_artifact::{ItemInfoResult, ItemKind};
//!
//! let info: ItemInfoResult = serde_json::from_str(body)?;
//! if info.kind() == ItemKind::SubArtifact {
//!     // navigate to the owning artifact
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod artifact;
mod changes;
mod diagram;
mod field;
mod item_info;
mod item_type;
mod process;

pub use artifact::{
    ArtifactModel, LockResult, LockResultKind, PropertyKind, PropertyValue, RolePermissions,
    SubArtifactModel, UserRef, UNPUBLISHED_VERSION,
};
pub use changes::{ArtifactChanges, ChangesBuilder, PropertyChange};
pub use diagram::{DiagramConnection, DiagramModel, DiagramShape, ShapeStyle};
pub use field::{FieldDescriptor, FieldKind, FieldMode};
pub use item_info::{ItemInfoResult, ItemKind};
pub use item_type::{
    ItemTypePredefined, BASELINE_ARTIFACT_GROUP, COLLECTION_ARTIFACT_GROUP,
    PRIMITIVE_ARTIFACT_GROUP, SUB_ARTIFACT_GROUP,
};
pub use process::{
    ArtifactReference, DecisionBranchDestinationLink, ModelError, PersonaReference,
    ProcessLink, ProcessModel, ProcessShape, PropertyValueInformation, PropertyValues,
    ShapeFlags,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
