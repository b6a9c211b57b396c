//! # Federation Sources
//!
//! The fixed set of collections a person's records are scattered across,
//! and the one canonical precedence order used to resolve field conflicts.

use shared_types::CollectionId;

/// A federation source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Demographic profile records.
    ProfileFolder,
    /// Structured health questionnaire records.
    StructuredQuestionnaire,
    /// Pre-keying-scheme registry, keyed by exact stored name.
    LegacyRegistry,
    /// Fields derived from the most recent visit entry.
    VisitDerived,
}

impl Source {
    /// The canonical precedence order. Every merge iterates this array;
    /// no call site orders sources on its own.
    pub const PRECEDENCE: [Source; 4] = [
        Source::ProfileFolder,
        Source::StructuredQuestionnaire,
        Source::LegacyRegistry,
        Source::VisitDerived,
    ];

    /// The collection backing this source.
    #[must_use]
    pub fn collection(self) -> CollectionId {
        match self {
            Self::ProfileFolder => CollectionId::ProfileFolder,
            Self::StructuredQuestionnaire => CollectionId::StructuredQuestionnaire,
            Self::LegacyRegistry => CollectionId::LegacyRegistry,
            Self::VisitDerived => CollectionId::VisitLog,
        }
    }

    /// Short name for logging.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProfileFolder => "profile_folder",
            Self::StructuredQuestionnaire => "structured_questionnaire",
            Self::LegacyRegistry => "legacy_registry",
            Self::VisitDerived => "visit_derived",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored field names shared by the person-record collections.
pub mod record_fields {
    /// Display name as entered.
    pub const NAME: &str = "name";
    /// Normalized name, maintained by the intake flow for keyed
    /// collections. Legacy registry rows predate it.
    pub const NORMALIZED_NAME: &str = "normalized_name";
    /// ISO `yyyy-mm-dd` birth date.
    pub const BIRTH_DATE: &str = "birth_date";
    /// Sex as recorded.
    pub const SEX: &str = "sex";
    /// Guardian name.
    pub const GUARDIAN: &str = "guardian";
    /// Guardian phone.
    pub const GUARDIAN_PHONE: &str = "guardian_phone";
    /// Allergy list.
    pub const ALLERGIES: &str = "allergies";
    /// Chronic condition list.
    pub const CHRONIC_CONDITIONS: &str = "chronic_conditions";
    /// Weight in kilograms.
    pub const WEIGHT_KG: &str = "weight_kg";
    /// Height; historically recorded in meters or centimeters, undeclared.
    pub const HEIGHT: &str = "height";
    /// Person key a visit entry belongs to.
    pub const PERSON_KEY: &str = "person_key";
    /// Millisecond timestamp of a visit.
    pub const VISITED_AT: &str = "visited_at";
    /// Visit reason.
    pub const REASON: &str = "reason";
    /// Visit notes.
    pub const NOTES: &str = "notes";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_order_is_fixed() {
        assert_eq!(
            Source::PRECEDENCE,
            [
                Source::ProfileFolder,
                Source::StructuredQuestionnaire,
                Source::LegacyRegistry,
                Source::VisitDerived,
            ]
        );
    }

    #[test]
    fn test_each_source_maps_to_its_collection() {
        assert_eq!(
            Source::ProfileFolder.collection(),
            CollectionId::ProfileFolder
        );
        assert_eq!(Source::VisitDerived.collection(), CollectionId::VisitLog);
    }
}
