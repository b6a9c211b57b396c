//! # Document Model
//!
//! The hosted document store is schemaless; this module gives the subsystems
//! a typed view of it. A [`Document`] is an ordered field map addressed by a
//! [`CollectionId`] and a string key.
//!
//! ## Clusters
//!
//! - **Addressing**: [`CollectionId`], document keys
//! - **Values**: [`FieldValue`] with emptiness semantics
//! - **Container**: [`Document`]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// ADDRESSING
// =============================================================================

/// The fixed set of collections this core reads and writes.
///
/// The surrounding application owns many more collections; only these six
/// participate in access control and record federation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CollectionId {
    /// One document per principal: role, statuses, session token.
    Accounts,
    /// Demographic profile records (highest federation precedence).
    ProfileFolder,
    /// Structured health questionnaire records.
    StructuredQuestionnaire,
    /// Pre-keying-scheme records, looked up by exact stored name.
    LegacyRegistry,
    /// Append-only visit encounters (lowest federation precedence).
    VisitLog,
    /// Guardian and emergency contact records.
    Contacts,
}

impl CollectionId {
    /// Stable collection name used for store addressing and logging.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accounts => "accounts",
            Self::ProfileFolder => "profile_folder",
            Self::StructuredQuestionnaire => "structured_questionnaire",
            Self::LegacyRegistry => "legacy_registry",
            Self::VisitLog => "visit_log",
            Self::Contacts => "contacts",
        }
    }
}

impl std::fmt::Display for CollectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// VALUES
// =============================================================================

/// A single stored field value.
///
/// The store is dynamically typed; this enum covers the value shapes the
/// record shapes in scope actually use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// UTF-8 text.
    Text(String),
    /// Double-precision number (weights, heights, counts).
    Number(f64),
    /// Boolean flag.
    Flag(bool),
    /// Millisecond Unix timestamp.
    Stamp(i64),
    /// Homogeneous list (visit summaries, allergy lists).
    Items(Vec<FieldValue>),
}

impl FieldValue {
    /// Text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric content. Text that parses as a number is accepted because
    /// legacy records store measurements as strings.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().replace(',', ".").parse().ok(),
            _ => None,
        }
    }

    /// Boolean content. Legacy records encode flags as the strings
    /// `"sim"`/`"nao"` or `"true"`/`"false"`; both spellings are accepted.
    #[must_use]
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            Self::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "sim" | "1" => Some(true),
                "false" | "nao" | "não" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Millisecond timestamp content.
    #[must_use]
    pub fn as_stamp(&self) -> Option<i64> {
        match self {
            Self::Stamp(ms) => Some(*ms),
            Self::Number(n) => Some(*n as i64),
            _ => None,
        }
    }

    /// List content, if this is a list value.
    #[must_use]
    pub fn as_items(&self) -> Option<&[FieldValue]> {
        match self {
            Self::Items(v) => Some(v),
            _ => None,
        }
    }

    /// Whether this value counts as absent for federation purposes.
    ///
    /// Empty text and empty lists are treated the same as a missing field:
    /// the merge must fall through to the next source.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Items(v) => v.is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

// =============================================================================
// CONTAINER
// =============================================================================

/// A document: its key within its collection plus an ordered field map.
///
/// `BTreeMap` keeps field iteration deterministic, which in turn keeps
/// federation output deterministic for identical inputs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Key of this document within its collection.
    pub key: String,
    /// Field name to value.
    pub fields: BTreeMap<String, FieldValue>,
}

impl Document {
    /// Create an empty document with the given key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Raw field access.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Text field, `None` when missing, non-text, or blank.
    #[must_use]
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field)
            .filter(|v| !v.is_empty())
            .and_then(FieldValue::as_text)
    }

    /// Numeric field.
    #[must_use]
    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_number)
    }

    /// Boolean field.
    #[must_use]
    pub fn flag(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(FieldValue::as_flag)
    }

    /// Millisecond timestamp field.
    #[must_use]
    pub fn stamp(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(FieldValue::as_stamp)
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> &mut Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Builder-style `set` for fixture construction.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    /// Whether the document has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
