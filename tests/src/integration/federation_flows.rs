//! # Record Federation Flows
//!
//! Resolution and search against a fully-populated store: the
//! search-then-resolve round trip a clinician performs, freshness after
//! writes, and degradation with a source down.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sc_01_change_watcher::{DocumentStore, MemoryDocumentStore, MergeSemantics};
    use sc_03_record_federation::{
        compute_bmi, domain::record_fields, FederationConfig, PersonKey, RecordFederator, Source,
    };
    use shared_types::{CollectionId, Document, FieldValue};

    async fn put(store: &MemoryDocumentStore, collection: CollectionId, key: &str, doc: Document) {
        store
            .put(collection, key, doc, MergeSemantics::Overwrite)
            .await
            .unwrap();
    }

    /// Populate every collection with one person, "Ana Silva", plus a
    /// legacy-only "Bruno Costa".
    async fn seed(store: &MemoryDocumentStore) -> String {
        let key = PersonKey::derive("Ana Silva", None).storage_key();
        put(
            store,
            CollectionId::ProfileFolder,
            &key,
            Document::new(&key)
                .with(record_fields::NAME, "Ana Silva")
                .with(record_fields::NORMALIZED_NAME, "ana silva")
                .with(record_fields::BIRTH_DATE, "2014-03-09")
                .with(record_fields::SEX, "F")
                .with(record_fields::HEIGHT, 145.0),
        )
        .await;
        put(
            store,
            CollectionId::StructuredQuestionnaire,
            &key,
            Document::new(&key)
                .with(record_fields::NAME, "Ana Silva")
                .with(record_fields::NORMALIZED_NAME, "ana silva")
                .with(record_fields::WEIGHT_KG, 40.0)
                .with(
                    record_fields::ALLERGIES,
                    FieldValue::Items(vec!["pollen".into()]),
                ),
        )
        .await;
        put(
            store,
            CollectionId::VisitLog,
            &format!("{key}#1"),
            Document::new(format!("{key}#1"))
                .with(record_fields::PERSON_KEY, key.as_str())
                .with(record_fields::NAME, "Ana Silva")
                .with(record_fields::NORMALIZED_NAME, "ana silva")
                .with(record_fields::VISITED_AT, FieldValue::Stamp(1_650_000_000_000))
                .with(record_fields::REASON, "headache"),
        )
        .await;
        put(
            store,
            CollectionId::Contacts,
            &key,
            Document::new(&key)
                .with(record_fields::GUARDIAN, "Marta Silva")
                .with(record_fields::GUARDIAN_PHONE, "555-0101"),
        )
        .await;
        put(
            store,
            CollectionId::LegacyRegistry,
            "BRUNO COSTA",
            Document::new("BRUNO COSTA")
                .with(record_fields::NAME, "BRUNO COSTA")
                .with(record_fields::SEX, "M"),
        )
        .await;
        key
    }

    #[tokio::test]
    async fn test_search_then_resolve_round_trip() {
        let store = Arc::new(MemoryDocumentStore::new());
        seed(&store).await;
        let federator = RecordFederator::new(store.clone(), FederationConfig::for_testing());

        // The clinician types a prefix, picks a candidate, and opens the
        // consolidated record under the candidate's identity.
        let hits = federator.search_by_prefix("ana").await.unwrap();
        let picked = &hits[0];
        assert_eq!(picked.normalized_name, "ana silva");

        let record = federator
            .resolve_person(&picked.name, picked.birth_date)
            .await
            .unwrap();
        assert_eq!(record.name, "Ana Silva");
        assert_eq!(record.guardian.as_deref(), Some("Marta Silva"));
        assert_eq!(record.bmi, compute_bmi(40.0, 145.0));
        assert_eq!(record.visits.len(), 1);
        assert_eq!(
            record.contributing_sources,
            vec![
                Source::ProfileFolder,
                Source::StructuredQuestionnaire,
                Source::VisitDerived,
            ]
        );
    }

    #[tokio::test]
    async fn test_resolution_reflects_subsequent_writes() {
        let store = Arc::new(MemoryDocumentStore::new());
        let key = seed(&store).await;
        let federator = RecordFederator::new(store.clone(), FederationConfig::for_testing());

        let before = federator.resolve_person("Ana Silva", None).await.unwrap();
        assert_eq!(before.weight_kg, Some(40.0));

        let mut patch = Document::new(&key);
        patch.set(record_fields::WEIGHT_KG, 42.5);
        store
            .put(
                CollectionId::StructuredQuestionnaire,
                &key,
                patch,
                MergeSemantics::MergeFields,
            )
            .await
            .unwrap();

        // Nothing is cached between resolutions.
        let after = federator.resolve_person("Ana Silva", None).await.unwrap();
        assert_eq!(after.weight_kg, Some(42.5));
        assert_eq!(after.bmi, compute_bmi(42.5, 145.0));
    }

    #[tokio::test]
    async fn test_legacy_only_person_is_searchable_and_resolvable() {
        let store = Arc::new(MemoryDocumentStore::new());
        seed(&store).await;
        let federator = RecordFederator::new(store.clone(), FederationConfig::for_testing());

        let hits = federator.search_by_prefix("bruno").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source, Source::LegacyRegistry);

        let record = federator.resolve_person("Bruno Costa", None).await.unwrap();
        assert_eq!(record.contributing_sources, vec![Source::LegacyRegistry]);
        assert_eq!(record.sex.as_deref(), Some("M"));
    }

    #[tokio::test]
    async fn test_degraded_source_does_not_break_the_round_trip() {
        let store = Arc::new(MemoryDocumentStore::new());
        seed(&store).await;
        store.fail_collection(CollectionId::StructuredQuestionnaire, true);
        let federator = RecordFederator::new(store.clone(), FederationConfig::for_testing());

        let hits = federator.search_by_prefix("ana").await.unwrap();
        assert!(!hits.is_empty());

        let record = federator.resolve_person("Ana Silva", None).await.unwrap();
        // The questionnaire's weight is gone; everything else survives.
        assert_eq!(record.weight_kg, None);
        assert_eq!(record.bmi, None);
        assert_eq!(record.sex.as_deref(), Some("F"));
    }
}
