//! # Person Keys
//!
//! One canonical key derivation for the whole subsystem. Both resolution
//! and search normalize names the same way; nothing else derives keys.

use chrono::NaiveDate;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Search terms shorter than this (after normalization) short-circuit to an
/// empty result without issuing any query, bounding query volume.
pub const MIN_PREFIX_LEN: usize = 3;

/// Normalize a person name: NFD-decompose and strip diacritics, casefold,
/// collapse whitespace runs, trim.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    let stripped: String = name.nfd().filter(|c| !is_combining_mark(*c)).collect();
    stripped
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// The derivable key shared by a person's physical records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PersonKey {
    /// Normalized full name.
    pub normalized_name: String,
    /// Birth date, when known. Part of the key because homonyms are common
    /// across school years.
    pub birth_date: Option<NaiveDate>,
}

impl PersonKey {
    /// Derive the key from a display name and an optional birth date.
    #[must_use]
    pub fn derive(name: &str, birth_date: Option<NaiveDate>) -> Self {
        Self {
            normalized_name: normalize_name(name),
            birth_date,
        }
    }

    /// Rendering used as the document key in keyed collections:
    /// `"<name>"` or `"<name>|<yyyy-mm-dd>"`.
    #[must_use]
    pub fn storage_key(&self) -> String {
        match self.birth_date {
            Some(date) => format!("{}|{}", self.normalized_name, date.format("%Y-%m-%d")),
            None => self.normalized_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_diacritics_and_case() {
        assert_eq!(normalize_name("João  da Conceição"), "joao da conceicao");
        assert_eq!(normalize_name("ANA SILVA"), "ana silva");
        assert_eq!(normalize_name("  Ana\tSilva  "), "ana silva");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_name("Márcia-Helena  dos Santos");
        assert_eq!(normalize_name(&once), once);
    }

    #[test]
    fn test_same_person_same_key_across_casings() {
        let a = PersonKey::derive("Ana Silva", None);
        let b = PersonKey::derive("ANA  SILVA", None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_storage_key_includes_birth_date_when_known() {
        let date = NaiveDate::from_ymd_opt(2014, 3, 9).unwrap();
        let keyed = PersonKey::derive("Ana Silva", Some(date));
        assert_eq!(keyed.storage_key(), "ana silva|2014-03-09");
        let unkeyed = PersonKey::derive("Ana Silva", None);
        assert_eq!(unkeyed.storage_key(), "ana silva");
    }
}
