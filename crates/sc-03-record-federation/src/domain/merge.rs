//! # Consolidation Rules
//!
//! Pure merge logic: given whichever per-source documents resolution found,
//! produce one consolidated record under the canonical precedence order.
//! For every output field the first non-empty value in precedence order
//! wins; values are never concatenated or averaged, and recency plays no
//! part.
//!
//! The one computed exception is BMI, which is recomputed from the resolved
//! weight and unit-normalized height rather than trusted verbatim from any
//! source.

use super::keys::{normalize_name, PersonKey};
use super::sources::{record_fields, Source};
use chrono::NaiveDate;
use shared_types::{Document, FieldValue};

/// Heights above this are taken to be centimeters. Nobody is four meters
/// tall; plenty of records store `170` where others store `1.70`.
const HEIGHT_CM_THRESHOLD: f64 = 3.0;

/// One prior encounter, in visit order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitSummary {
    /// Visit date.
    pub date: Option<NaiveDate>,
    /// Reason for the visit.
    pub reason: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl VisitSummary {
    /// Decode a visit-log document.
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        let date = doc
            .stamp(record_fields::VISITED_AT)
            .and_then(|ms| chrono::DateTime::from_timestamp_millis(ms))
            .map(|dt| dt.date_naive());
        Self {
            date,
            reason: doc.text(record_fields::REASON).map(str::to_string),
            notes: doc.text(record_fields::NOTES).map(str::to_string),
        }
    }
}

/// The materialized join of a person's physical records. Assembled on
/// demand, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidatedRecord {
    /// Display name (highest-precedence spelling).
    pub name: String,
    /// Birth date.
    pub birth_date: Option<NaiveDate>,
    /// Sex as recorded.
    pub sex: Option<String>,
    /// Guardian name.
    pub guardian: Option<String>,
    /// Guardian phone.
    pub guardian_phone: Option<String>,
    /// Allergy list (first non-empty list wins; never concatenated).
    pub allergies: Vec<String>,
    /// Chronic condition list.
    pub chronic_conditions: Vec<String>,
    /// Resolved weight in kilograms.
    pub weight_kg: Option<f64>,
    /// Resolved height, normalized to meters.
    pub height_m: Option<f64>,
    /// Body-mass index recomputed from the resolved weight and height.
    pub bmi: Option<f64>,
    /// Prior encounters.
    pub visits: Vec<VisitSummary>,
    /// Which sources contributed, in precedence order.
    pub contributing_sources: Vec<Source>,
}

/// Recompute BMI from weight and a height of undeclared unit.
///
/// Height values above [`HEIGHT_CM_THRESHOLD`] are treated as centimeters
/// and divided by 100 before squaring, so `170` and `1.70` yield the same
/// index. Rounded to one decimal.
#[must_use]
pub fn compute_bmi(weight_kg: f64, height: f64) -> Option<f64> {
    if weight_kg <= 0.0 || height <= 0.0 {
        return None;
    }
    let meters = normalize_height(height);
    Some((weight_kg / (meters * meters) * 10.0).round() / 10.0)
}

/// Normalize a height of undeclared unit to meters.
#[must_use]
pub fn normalize_height(height: f64) -> f64 {
    if height > HEIGHT_CM_THRESHOLD {
        height / 100.0
    } else {
        height
    }
}

/// Merge per-source documents into one consolidated record.
///
/// `present` holds at most one document per source; order does not matter
/// because every lookup below walks [`Source::PRECEDENCE`]. The optional
/// contact document fills guardian fields still empty after the merge.
#[must_use]
pub fn consolidate(
    key: &PersonKey,
    present: &[(Source, Document)],
    visits: Vec<VisitSummary>,
    contact: Option<&Document>,
) -> ConsolidatedRecord {
    let name = first_text(present, record_fields::NAME)
        .unwrap_or_else(|| key.normalized_name.clone());
    let birth_date = first_text(present, record_fields::BIRTH_DATE)
        .and_then(|s| parse_birth_date(&s))
        .or(key.birth_date);

    let mut guardian = first_text(present, record_fields::GUARDIAN);
    let mut guardian_phone = first_text(present, record_fields::GUARDIAN_PHONE);
    if let Some(contact) = contact {
        guardian = guardian.or_else(|| {
            contact
                .text(record_fields::GUARDIAN)
                .map(str::to_string)
        });
        guardian_phone = guardian_phone.or_else(|| {
            contact
                .text(record_fields::GUARDIAN_PHONE)
                .map(str::to_string)
        });
    }

    let weight_kg = first_number(present, record_fields::WEIGHT_KG);
    let height = first_number(present, record_fields::HEIGHT);
    let bmi = match (weight_kg, height) {
        (Some(w), Some(h)) => compute_bmi(w, h),
        _ => None,
    };

    ConsolidatedRecord {
        name,
        birth_date,
        sex: first_text(present, record_fields::SEX),
        guardian,
        guardian_phone,
        allergies: first_list(present, record_fields::ALLERGIES),
        chronic_conditions: first_list(present, record_fields::CHRONIC_CONDITIONS),
        weight_kg,
        height_m: height.map(normalize_height),
        bmi,
        visits,
        contributing_sources: Source::PRECEDENCE
            .iter()
            .copied()
            .filter(|s| present.iter().any(|(ps, _)| ps == s))
            .collect(),
    }
}

/// Parse an ISO `yyyy-mm-dd` birth date.
#[must_use]
pub fn parse_birth_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

fn doc_for(present: &[(Source, Document)], source: Source) -> Option<&Document> {
    present
        .iter()
        .find(|(s, _)| *s == source)
        .map(|(_, doc)| doc)
}

fn first_text(present: &[(Source, Document)], field: &str) -> Option<String> {
    Source::PRECEDENCE.iter().find_map(|source| {
        doc_for(present, *source)
            .and_then(|doc| doc.text(field))
            .map(str::to_string)
    })
}

fn first_number(present: &[(Source, Document)], field: &str) -> Option<f64> {
    Source::PRECEDENCE.iter().find_map(|source| {
        doc_for(present, *source).and_then(|doc| doc.number(field))
    })
}

fn first_list(present: &[(Source, Document)], field: &str) -> Vec<String> {
    Source::PRECEDENCE
        .iter()
        .find_map(|source| {
            doc_for(present, *source)
                .and_then(|doc| doc.get(field))
                .filter(|v| !v.is_empty())
                .and_then(FieldValue::as_items)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(FieldValue::as_text)
                        .map(str::to_string)
                        .collect()
                })
        })
        .unwrap_or_default()
}

// =============================================================================
// SEARCH CANDIDATES
// =============================================================================

/// One autocomplete hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Display name as stored in the contributing source.
    pub name: String,
    /// Normalized name (dedup key component).
    pub normalized_name: String,
    /// Birth date (dedup key component).
    pub birth_date: Option<NaiveDate>,
    /// The source this candidate came from.
    pub source: Source,
}

impl Candidate {
    /// Build a candidate from a source document. `None` when the document
    /// has no usable name.
    #[must_use]
    pub fn from_document(source: Source, doc: &Document) -> Option<Self> {
        let name = doc.text(record_fields::NAME)?.to_string();
        let normalized_name = doc
            .text(record_fields::NORMALIZED_NAME)
            .map(str::to_string)
            .unwrap_or_else(|| normalize_name(&name));
        let birth_date = doc
            .text(record_fields::BIRTH_DATE)
            .and_then(parse_birth_date);
        Some(Self {
            name,
            normalized_name,
            birth_date,
            source,
        })
    }

    /// Identity for deduplication across sources.
    #[must_use]
    pub fn dedup_key(&self) -> (String, Option<NaiveDate>) {
        (self.normalized_name.clone(), self.birth_date)
    }

    /// Rank against a normalized term: exact-prefix matches first, then
    /// word-boundary matches, then the rest.
    #[must_use]
    pub fn rank_against(&self, normalized_term: &str) -> u8 {
        if self.normalized_name.starts_with(normalized_term) {
            0
        } else if self
            .normalized_name
            .split_whitespace()
            .any(|word| word.starts_with(normalized_term))
        {
            1
        } else {
            2
        }
    }
}
