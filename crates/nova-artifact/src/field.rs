//! Property editor field descriptors
//!
//! Whether a field is editable is decided once, when the descriptor is
//! built from the owning artifact's state. There is no way to flip a
//! descriptor to read-only afterwards; rebuild it instead.

use crate::artifact::{PropertyKind, PropertyValue};
use serde::Serialize;

/// Input control used for an editable field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    TextInput,
    RichTextEditor,
    NumberInput,
    DatePicker,
    Select,
    UserPicker,
}

impl From<PropertyKind> for FieldKind {
    fn from(kind: PropertyKind) -> Self {
        match kind {
            PropertyKind::Text => Self::TextInput,
            PropertyKind::RichText => Self::RichTextEditor,
            PropertyKind::Number => Self::NumberInput,
            PropertyKind::Date => Self::DatePicker,
            PropertyKind::Choice => Self::Select,
            PropertyKind::User => Self::UserPicker,
        }
    }
}

/// Editable or read-only, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "control", rename_all = "camelCase")]
pub enum FieldMode {
    Editable(FieldKind),
    ReadOnly,
}

/// One field of the property editor
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub key: String,
    pub label: String,
    pub mode: FieldMode,
    pub value: serde_json::Value,
}

impl FieldDescriptor {
    /// Build a descriptor for a property. The field is read-only when the
    /// artifact is read-only or the property itself is.
    #[must_use]
    pub fn for_property(property: &PropertyValue, artifact_read_only: bool) -> Self {
        let mode = if artifact_read_only || property.is_read_only {
            FieldMode::ReadOnly
        } else {
            FieldMode::Editable(property.kind.into())
        };

        Self {
            key: format!("property_{}", property.property_type_id),
            label: property.name.clone(),
            mode,
            value: property.value.clone(),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self.mode, FieldMode::Editable(_))
    }
}
