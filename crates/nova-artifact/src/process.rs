//! Process graph model (shapes and links)
//!
//! This is the payload exchanged with `/svc/bpartifactstore/process/{id}` and
//! `/svc/bpartifactstore/processupdate/{id}`.

use crate::item_type::ItemTypePredefined;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Structural problems in a process payload
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Two shapes share an id
    #[error("duplicate shape id {0}")]
    DuplicateShape(i32),

    /// A link points at a shape that is not part of the process
    #[error("link {source_id} -> {destination_id} references a missing shape")]
    DanglingLink { source_id: i32, destination_id: i32 },

    /// Edit addressed a shape that does not exist
    #[error("no shape with id {0}")]
    UnknownShape(i32),
}

/// Property value with its type metadata, keyed by a lower camel-case name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyValueInformation {
    pub property_name: String,
    #[serde(default)]
    pub type_predefined: i32,
    #[serde(default)]
    pub type_id: Option<i32>,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl PropertyValueInformation {
    #[must_use]
    pub fn new(property_name: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            property_name: property_name.into(),
            type_predefined: 0,
            type_id: None,
            value,
        }
    }
}

/// Keyed property values of a process or shape
pub type PropertyValues = IndexMap<String, PropertyValueInformation>;

/// Reference to another artifact (associated artifact, persona)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactReference {
    pub id: i32,
    pub project_id: i32,
    pub name: String,
    #[serde(default)]
    pub type_prefix: String,
    #[serde(default)]
    pub project_name: Option<String>,
    pub base_item_type_predefined: ItemTypePredefined,
    #[serde(default)]
    pub version: Option<i32>,
    #[serde(default)]
    pub link: Option<String>,
}

/// Persona assigned to a process or task
pub type PersonaReference = ArtifactReference;

/// Indicator flags shown on a shape
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeFlags {
    #[serde(default)]
    pub has_comments: bool,
    #[serde(default)]
    pub has_traces: bool,
}

/// One shape of a process diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessShape {
    pub id: i32,
    pub name: String,
    pub project_id: i32,
    pub parent_id: i32,
    #[serde(default)]
    pub type_prefix: String,
    pub base_item_type_predefined: ItemTypePredefined,
    #[serde(default)]
    pub property_values: PropertyValues,
    #[serde(default)]
    pub associated_artifact: Option<ArtifactReference>,
    #[serde(default)]
    pub persona_reference: Option<PersonaReference>,
    #[serde(default)]
    pub flags: ShapeFlags,
}

impl ProcessShape {
    /// Shape created on the client that the server has never seen
    #[inline]
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.id <= 0
    }
}

/// Directed connection between two shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessLink {
    pub source_id: i32,
    pub destination_id: i32,
    pub orderindex: f64,
    #[serde(default)]
    pub label: Option<String>,
}

/// Merge point for the branches of a decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionBranchDestinationLink {
    pub destination_id: i32,
    pub orderindex: f64,
    #[serde(default)]
    pub source_ids: Vec<i32>,
}

/// Full process payload
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessModel {
    pub id: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub project_id: i32,
    #[serde(default)]
    pub type_prefix: String,
    #[serde(default)]
    pub base_item_type_predefined: ItemTypePredefined,
    #[serde(default)]
    pub shapes: Vec<ProcessShape>,
    #[serde(default)]
    pub links: Vec<ProcessLink>,
    #[serde(default)]
    pub decision_branch_destination_links: Vec<DecisionBranchDestinationLink>,
    #[serde(default)]
    pub property_values: PropertyValues,
    #[serde(default)]
    pub artifact_persona_references: Vec<PersonaReference>,
    #[serde(default)]
    pub sub_artifact_persona_references: Vec<PersonaReference>,
}

impl ProcessModel {
    #[must_use]
    pub fn shape(&self, id: i32) -> Option<&ProcessShape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    /// Check that shape ids are unique and every link joins two known shapes
    ///
    /// # Errors
    /// Returns the first structural problem found
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut ids = HashSet::with_capacity(self.shapes.len());
        for shape in &self.shapes {
            if !ids.insert(shape.id) {
                return Err(ModelError::DuplicateShape(shape.id));
            }
        }
        for link in &self.links {
            if !ids.contains(&link.source_id) || !ids.contains(&link.destination_id) {
                return Err(ModelError::DanglingLink {
                    source_id: link.source_id,
                    destination_id: link.destination_id,
                });
            }
        }
        Ok(())
    }
}
