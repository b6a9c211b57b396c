//! # Record Federator
//!
//! Orchestrates the two federation operations: on-demand person resolution
//! and prefix search. Every source query runs concurrently under the
//! configured deadline; a failing source degrades to an empty contribution
//! and only all sources failing surfaces an error.

use crate::config::FederationConfig;
use crate::domain::{
    consolidate, normalize_name, record_fields, Candidate, ConsolidatedRecord, FederationError,
    PersonKey, Source, VisitSummary, MIN_PREFIX_LEN,
};
use chrono::NaiveDate;
use futures::future;
use sc_01_change_watcher::DocumentStore;
use shared_types::{CollectionId, Document, StoreError};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Upper bound sentinel for prefix-range queries: `[term, term + sentinel)`
/// covers every string starting with `term`.
pub const PREFIX_UPPER_SENTINEL: char = '\u{f8ff}';

/// Cap on visit entries fetched during resolution.
const VISIT_SCAN_LIMIT: usize = 64;

/// Outcome of one source lookup during resolution.
enum Lookup {
    Hit(Document),
    Miss,
    Failed,
}

/// Cross-collection person resolution and search.
pub struct RecordFederator<S: DocumentStore> {
    store: Arc<S>,
    config: FederationConfig,
}

impl<S: DocumentStore> RecordFederator<S> {
    /// Create a federator over a store.
    pub fn new(store: Arc<S>, config: FederationConfig) -> Self {
        Self { store, config }
    }

    /// Resolve one person into a consolidated record.
    ///
    /// Point lookups against the profile, questionnaire, and visit sources
    /// run in parallel under the derived key; when the key misses
    /// everywhere, an exact-name lookup against the legacy registry is the
    /// fallback (legacy rows predate the keying scheme).
    ///
    /// # Errors
    ///
    /// - [`FederationError::NotFound`] - every source answered, none had
    ///   the person
    /// - [`FederationError::Unavailable`] - every source failed; retryable
    pub async fn resolve_person(
        &self,
        name: &str,
        birth_date: Option<NaiveDate>,
    ) -> Result<ConsolidatedRecord, FederationError> {
        let key = PersonKey::derive(name, birth_date);
        let storage_key = key.storage_key();

        let (profile, questionnaire, visit_docs, contact) = tokio::join!(
            self.point_lookup(CollectionId::ProfileFolder, &storage_key),
            self.point_lookup(CollectionId::StructuredQuestionnaire, &storage_key),
            self.visit_lookup(&storage_key),
            self.point_lookup(CollectionId::Contacts, &storage_key),
        );

        let mut failed = 0_usize;
        let mut present: Vec<(Source, Document)> = Vec::new();

        match profile {
            Lookup::Hit(doc) => present.push((Source::ProfileFolder, doc)),
            Lookup::Miss => {}
            Lookup::Failed => failed += 1,
        }
        match questionnaire {
            Lookup::Hit(doc) => present.push((Source::StructuredQuestionnaire, doc)),
            Lookup::Miss => {}
            Lookup::Failed => failed += 1,
        }
        let mut visits: Vec<VisitSummary> = Vec::new();
        match visit_docs {
            Ok(mut docs) if !docs.is_empty() => {
                // Most recent first; the freshest entry doubles as the
                // visit-derived merge source.
                docs.sort_by_key(|d| std::cmp::Reverse(d.stamp(record_fields::VISITED_AT)));
                visits = docs.iter().map(VisitSummary::from_document).collect();
                present.push((Source::VisitDerived, docs.remove(0)));
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "Visit source failed, degrading to empty");
                failed += 1;
            }
        }

        if failed == 3 {
            return Err(FederationError::Unavailable { sources_failed: 3 });
        }

        if present.is_empty() {
            match self.legacy_fallback(name).await {
                Some(doc) => present.push((Source::LegacyRegistry, doc)),
                None => return Err(FederationError::NotFound),
            }
        }

        // Contact failures never fail a resolution; the record just lacks
        // guardian data.
        let contact_doc = match contact {
            Lookup::Hit(doc) => Some(doc),
            Lookup::Miss => None,
            Lookup::Failed => {
                debug!("Contact source failed, omitting guardian fields");
                None
            }
        };

        Ok(consolidate(&key, &present, visits, contact_doc.as_ref()))
    }

    /// Prefix search for autocomplete. Finite and restartable; every call
    /// is independent, with no cursor state.
    ///
    /// Terms shorter than [`MIN_PREFIX_LEN`] normalized characters return
    /// empty without issuing any query. Results are deduplicated on
    /// (normalized name, birth date), keeping the first occurrence in
    /// source-precedence order, ranked exact-prefix first, and truncated
    /// to the configured cap.
    ///
    /// # Errors
    ///
    /// - [`FederationError::Unavailable`] - every source failed
    pub async fn search_by_prefix(&self, term: &str) -> Result<Vec<Candidate>, FederationError> {
        let normalized = normalize_name(term);
        if normalized.chars().count() < MIN_PREFIX_LEN {
            return Ok(Vec::new());
        }

        let queries = Source::PRECEDENCE
            .iter()
            .map(|source| self.prefix_query(*source, &normalized));
        let results = future::join_all(queries).await;

        let mut failed = 0_usize;
        let mut seen: HashSet<(String, Option<NaiveDate>)> = HashSet::new();
        let mut candidates: Vec<Candidate> = Vec::new();
        for (source, result) in Source::PRECEDENCE.iter().zip(results) {
            match result {
                Ok(docs) => {
                    for doc in docs {
                        if let Some(candidate) = Candidate::from_document(*source, &doc) {
                            if seen.insert(candidate.dedup_key()) {
                                candidates.push(candidate);
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!(source = %source, error = %e, "Search source failed, skipping");
                    failed += 1;
                }
            }
        }
        if failed == Source::PRECEDENCE.len() {
            return Err(FederationError::Unavailable {
                sources_failed: failed,
            });
        }

        // Stable sort keeps source-precedence order within a rank.
        candidates.sort_by(|a, b| {
            a.rank_against(&normalized)
                .cmp(&b.rank_against(&normalized))
                .then_with(|| a.normalized_name.cmp(&b.normalized_name))
        });
        candidates.truncate(self.config.max_results);
        Ok(candidates)
    }

    async fn point_lookup(&self, collection: CollectionId, key: &str) -> Lookup {
        let fetch = self.store.get(collection, key);
        match tokio::time::timeout(self.config.query_timeout(), fetch).await {
            Ok(Ok(Some(doc))) => Lookup::Hit(doc),
            Ok(Ok(None)) => Lookup::Miss,
            Ok(Err(e)) => {
                warn!(collection = %collection, error = %e, "Source lookup failed, degrading to empty");
                Lookup::Failed
            }
            Err(_) => {
                warn!(collection = %collection, "Source lookup timed out, degrading to empty");
                Lookup::Failed
            }
        }
    }

    async fn visit_lookup(&self, storage_key: &str) -> Result<Vec<Document>, StoreError> {
        let upper = format!("{storage_key}{PREFIX_UPPER_SENTINEL}");
        let scan = self.store.query_range(
            CollectionId::VisitLog,
            record_fields::PERSON_KEY,
            storage_key,
            &upper,
            VISIT_SCAN_LIMIT,
        );
        match tokio::time::timeout(self.config.query_timeout(), scan).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Unreachable("visit scan timed out".into())),
        }
    }

    /// Exact-name lookup in the legacy registry. The old intake tool keyed
    /// rows by the name exactly as typed, usually uppercased; both the
    /// as-given and uppercased spellings are tried.
    async fn legacy_fallback(&self, name: &str) -> Option<Document> {
        for candidate_key in [name.trim().to_string(), name.trim().to_uppercase()] {
            let fetch = self.store.get(CollectionId::LegacyRegistry, &candidate_key);
            match tokio::time::timeout(self.config.query_timeout(), fetch).await {
                Ok(Ok(Some(doc))) => return Some(doc),
                Ok(Ok(None)) => {}
                Ok(Err(e)) => {
                    warn!(error = %e, "Legacy fallback lookup failed");
                }
                Err(_) => {
                    warn!("Legacy fallback lookup timed out");
                }
            }
        }
        None
    }

    async fn prefix_query(
        &self,
        source: Source,
        normalized_term: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let limit = self.config.per_source_limit;
        let timeout = self.config.query_timeout();
        match source {
            Source::LegacyRegistry => {
                // Legacy rows have no normalized-name field; query both the
                // as-typed and uppercased spellings of the stored name.
                let mut hits = Vec::new();
                let mut errors = 0;
                for term in [normalized_term.to_string(), normalized_term.to_uppercase()] {
                    let upper = format!("{term}{PREFIX_UPPER_SENTINEL}");
                    let scan = self.store.query_range(
                        source.collection(),
                        record_fields::NAME,
                        &term,
                        &upper,
                        limit,
                    );
                    match tokio::time::timeout(timeout, scan).await {
                        Ok(Ok(docs)) => hits.extend(docs),
                        Ok(Err(_)) | Err(_) => errors += 1,
                    }
                }
                if errors == 2 {
                    return Err(StoreError::Unreachable("legacy registry scan failed".into()));
                }
                Ok(hits)
            }
            _ => {
                let upper = format!("{normalized_term}{PREFIX_UPPER_SENTINEL}");
                let scan = self.store.query_range(
                    source.collection(),
                    record_fields::NORMALIZED_NAME,
                    normalized_term,
                    &upper,
                    limit,
                );
                match tokio::time::timeout(timeout, scan).await {
                    Ok(result) => result,
                    Err(_) => Err(StoreError::Unreachable("prefix scan timed out".into())),
                }
            }
        }
    }
}
