//! Predefined item types
//!
//! Item types are transmitted as numeric codes. Related types share a group
//! bit so that whole families (baselines and reviews, collections,
//! sub-artifacts) can be tested with a single mask.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Group bit for primitive (ordinary) artifact types
pub const PRIMITIVE_ARTIFACT_GROUP: i32 = 0x1000;
/// Group bit for baselines and reviews
pub const BASELINE_ARTIFACT_GROUP: i32 = 0x2000;
/// Group bit for collections
pub const COLLECTION_ARTIFACT_GROUP: i32 = 0x4000;
/// Group bit for sub-artifacts (shapes, connectors)
pub const SUB_ARTIFACT_GROUP: i32 = 0x8000;

/// Predefined item type of a project, artifact or sub-artifact
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum ItemTypePredefined {
    #[default]
    None,
    Project,

    PrimitiveFolder,
    Glossary,
    TextualRequirement,
    BusinessProcess,
    Actor,
    UseCase,
    DataElement,
    UiMockup,
    GenericDiagram,
    Document,
    Storyboard,
    DomainDiagram,
    UseCaseDiagram,
    Process,

    BaselineFolder,
    ArtifactBaseline,
    ArtifactReviewPackage,
    Review,

    CollectionFolder,
    ArtifactCollection,

    ProcessShape,
    ProcessLink,
    DiagramShape,
    DiagramConnector,

    /// Code this client does not know about
    Unknown(i32),
}

impl ItemTypePredefined {
    /// Numeric wire code
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Project => 1,

            Self::PrimitiveFolder => PRIMITIVE_ARTIFACT_GROUP | 1,
            Self::Glossary => PRIMITIVE_ARTIFACT_GROUP | 2,
            Self::TextualRequirement => PRIMITIVE_ARTIFACT_GROUP | 3,
            Self::BusinessProcess => PRIMITIVE_ARTIFACT_GROUP | 4,
            Self::Actor => PRIMITIVE_ARTIFACT_GROUP | 5,
            Self::UseCase => PRIMITIVE_ARTIFACT_GROUP | 6,
            Self::DataElement => PRIMITIVE_ARTIFACT_GROUP | 7,
            Self::UiMockup => PRIMITIVE_ARTIFACT_GROUP | 8,
            Self::GenericDiagram => PRIMITIVE_ARTIFACT_GROUP | 9,
            Self::Document => PRIMITIVE_ARTIFACT_GROUP | 10,
            Self::Storyboard => PRIMITIVE_ARTIFACT_GROUP | 11,
            Self::DomainDiagram => PRIMITIVE_ARTIFACT_GROUP | 12,
            Self::UseCaseDiagram => PRIMITIVE_ARTIFACT_GROUP | 13,
            Self::Process => PRIMITIVE_ARTIFACT_GROUP | 14,

            Self::BaselineFolder => BASELINE_ARTIFACT_GROUP | 1,
            Self::ArtifactBaseline => BASELINE_ARTIFACT_GROUP | 2,
            Self::ArtifactReviewPackage => BASELINE_ARTIFACT_GROUP | 3,
            Self::Review => BASELINE_ARTIFACT_GROUP | 4,

            Self::CollectionFolder => COLLECTION_ARTIFACT_GROUP | 1,
            Self::ArtifactCollection => COLLECTION_ARTIFACT_GROUP | 2,

            Self::ProcessShape => SUB_ARTIFACT_GROUP | 1,
            Self::ProcessLink => SUB_ARTIFACT_GROUP | 2,
            Self::DiagramShape => SUB_ARTIFACT_GROUP | 3,
            Self::DiagramConnector => SUB_ARTIFACT_GROUP | 4,

            Self::Unknown(code) => code,
        }
    }

    /// Baselines, baseline folders and review packages
    #[inline]
    #[must_use]
    pub fn is_baseline_or_review(self) -> bool {
        self.code() & BASELINE_ARTIFACT_GROUP != 0
    }

    /// Collection folders and collections
    #[inline]
    #[must_use]
    pub fn is_collection(self) -> bool {
        self.code() & COLLECTION_ARTIFACT_GROUP != 0
    }

    /// Shapes and connectors living inside an artifact
    #[inline]
    #[must_use]
    pub fn is_sub_artifact(self) -> bool {
        self.code() & SUB_ARTIFACT_GROUP != 0
    }

    /// Types rendered on a diagram surface
    #[must_use]
    pub fn is_diagram(self) -> bool {
        matches!(
            self,
            Self::GenericDiagram
                | Self::BusinessProcess
                | Self::DomainDiagram
                | Self::Storyboard
                | Self::UseCaseDiagram
                | Self::UseCase
                | Self::UiMockup
        )
    }
}

impl From<i32> for ItemTypePredefined {
    fn from(code: i32) -> Self {
        const KNOWN: [ItemTypePredefined; 26] = [
            ItemTypePredefined::None,
            ItemTypePredefined::Project,
            ItemTypePredefined::PrimitiveFolder,
            ItemTypePredefined::Glossary,
            ItemTypePredefined::TextualRequirement,
            ItemTypePredefined::BusinessProcess,
            ItemTypePredefined::Actor,
            ItemTypePredefined::UseCase,
            ItemTypePredefined::DataElement,
            ItemTypePredefined::UiMockup,
            ItemTypePredefined::GenericDiagram,
            ItemTypePredefined::Document,
            ItemTypePredefined::Storyboard,
            ItemTypePredefined::DomainDiagram,
            ItemTypePredefined::UseCaseDiagram,
            ItemTypePredefined::Process,
            ItemTypePredefined::BaselineFolder,
            ItemTypePredefined::ArtifactBaseline,
            ItemTypePredefined::ArtifactReviewPackage,
            ItemTypePredefined::Review,
            ItemTypePredefined::CollectionFolder,
            ItemTypePredefined::ArtifactCollection,
            ItemTypePredefined::ProcessShape,
            ItemTypePredefined::ProcessLink,
            ItemTypePredefined::DiagramShape,
            ItemTypePredefined::DiagramConnector,
        ];

        KNOWN
            .iter()
            .copied()
            .find(|t| t.code() == code)
            .unwrap_or(Self::Unknown(code))
    }
}

impl From<ItemTypePredefined> for i32 {
    fn from(value: ItemTypePredefined) -> Self {
        value.code()
    }
}

impl fmt::Display for ItemTypePredefined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "Unknown({code:#x})"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn baseline_group_membership() {
        assert!(ItemTypePredefined::ArtifactBaseline.is_baseline_or_review());
        assert!(ItemTypePredefined::BaselineFolder.is_baseline_or_review());
        assert!(ItemTypePredefined::ArtifactReviewPackage.is_baseline_or_review());
        assert!(ItemTypePredefined::Review.is_baseline_or_review());
        assert!(!ItemTypePredefined::Process.is_baseline_or_review());
        assert!(!ItemTypePredefined::Project.is_baseline_or_review());
    }

    #[test]
    fn serde_uses_numeric_codes() {
        let json = serde_json::to_string(&ItemTypePredefined::Process).unwrap();
        assert_eq!(json, (PRIMITIVE_ARTIFACT_GROUP | 14).to_string());

        let parsed: ItemTypePredefined = serde_json::from_str("16385").unwrap();
        assert_eq!(parsed, ItemTypePredefined::CollectionFolder);
    }

    #[test]
    fn unknown_code_is_preserved() {
        let parsed = ItemTypePredefined::from(0x1fff);
        assert_eq!(parsed, ItemTypePredefined::Unknown(0x1fff));
        assert_eq!(parsed.code(), 0x1fff);
    }

    proptest! {
        #[test]
        fn prop_code_is_stable(code in any::<i32>()) {
            prop_assert_eq!(ItemTypePredefined::from(code).code(), code);
        }
    }
}
