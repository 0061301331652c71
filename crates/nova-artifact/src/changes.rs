//! Partial save payloads
//!
//! An [`ArtifactChanges`] carries only what the user touched since the last
//! save. Process artifacts additionally attach the full processed graph.

use crate::process::ProcessModel;
use serde::{Deserialize, Serialize};

/// New value for one custom property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyChange {
    pub property_type_id: i32,
    pub value: serde_json::Value,
}

/// Changes sent on save
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactChanges {
    pub id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_property_values: Vec<PropertyChange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<ProcessModel>,
}

impl ArtifactChanges {
    #[must_use]
    pub fn new(id: i32) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// True when nothing besides the id would be sent
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.custom_property_values.is_empty()
            && self.process.is_none()
    }

    /// Record a property change, replacing an earlier change to the same property
    pub fn set_property(&mut self, property_type_id: i32, value: serde_json::Value) {
        match self
            .custom_property_values
            .iter_mut()
            .find(|c| c.property_type_id == property_type_id)
        {
            Some(existing) => existing.value = value,
            None => self.custom_property_values.push(PropertyChange {
                property_type_id,
                value,
            }),
        }
    }
}

/// Builder for [`ArtifactChanges`]
#[derive(Debug, Clone, Default)]
pub struct ChangesBuilder {
    changes: ArtifactChanges,
}

impl ChangesBuilder {
    #[inline]
    #[must_use]
    pub fn new(id: i32) -> Self {
        Self {
            changes: ArtifactChanges::new(id),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.changes.name = Some(name.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.changes.description = Some(description.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn property(mut self, property_type_id: i32, value: serde_json::Value) -> Self {
        self.changes.set_property(property_type_id, value);
        self
    }

    #[inline]
    #[must_use]
    pub fn process(mut self, process: ProcessModel) -> Self {
        self.changes.process = Some(process);
        self
    }

    #[inline]
    #[must_use]
    pub fn build(self) -> ArtifactChanges {
        self.changes
    }
}

impl From<ArtifactChanges> for ChangesBuilder {
    fn from(changes: ArtifactChanges) -> Self {
        Self { changes }
    }
}
