//! Scenario tests for the reconciliation workflows, run against the
//! in-memory store.

mod support;

use loket::config::LinkDeduplication;
use loket::db::ObjectStore;
use loket::Error;
use loket_object_model::{EntityKind, Filter, ObjectRecord};
use serde_json::json;
use support::{attach_document_body, populate_case_body, test_config, test_state, test_state_with};

#[tokio::test]
async fn registration_creates_once_then_conflicts() {
    // First registration creates, the repeat errors, and exactly one
    // record exists after both calls.
    let (store, state) = test_state();
    let body = json!({"referenceNumber": "Z1"});

    let reply = state.intake.register_case(&body).await.unwrap();
    assert_eq!(reply["CaseIdentificationReply"]["identification"], "Z1");

    let err = state.intake.register_case(&body).await.unwrap_err();
    assert!(matches!(err, Error::Duplicate { .. }));
    assert_eq!(err.to_string(), "The case with id Z1 already exists");

    let cases = store
        .search(EntityKind::Case, &Filter::identification("Z1"))
        .await
        .unwrap();
    assert_eq!(cases.len(), 1);
}

#[tokio::test]
async fn concurrent_registration_creates_exactly_one() {
    // The per-key lock closes the resolve-then-create race.
    let (store, state) = test_state();
    let body = json!({"referenceNumber": "Z1"});

    let mut handles = Vec::new();
    for _ in 0..8 {
        let intake = state.intake.clone();
        let body = body.clone();
        handles.push(tokio::spawn(
            async move { intake.register_case(&body).await },
        ));
    }

    let mut created = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(Error::Duplicate { .. }) => duplicates += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(duplicates, 7);

    let cases = store
        .search(EntityKind::Case, &Filter::identification("Z1"))
        .await
        .unwrap();
    assert_eq!(cases.len(), 1);
}

#[tokio::test]
async fn ambiguous_registration_is_a_conflict_without_mutation() {
    let (store, state) = test_state();
    for _ in 0..2 {
        store
            .save(ObjectRecord::new(
                EntityKind::Case,
                json!({"identification": "Z1"}),
            ))
            .await
            .unwrap();
    }

    let err = state
        .intake
        .register_case(&json!({"referenceNumber": "Z1"}))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Duplicate { .. }));

    let cases = store
        .search(EntityKind::Case, &Filter::identification("Z1"))
        .await
        .unwrap();
    assert_eq!(cases.len(), 2);
}

#[tokio::test]
async fn population_builds_the_type_graph_and_updates_the_case() {
    // An unseen case type yields one CaseType plus its children,
    // the registered case updated, success reply.
    let (store, state) = test_state();
    state
        .intake
        .register_case(&json!({"referenceNumber": "Z2"}))
        .await
        .unwrap();

    let reply = state
        .intake
        .populate_case(&populate_case_body("Z2", "T1"))
        .await
        .unwrap();
    assert_eq!(reply["Acknowledgement"]["identification"], "Z2");

    let case_types = store
        .search(EntityKind::CaseType, &Filter::identification("T1"))
        .await
        .unwrap();
    assert_eq!(case_types.len(), 1);
    let properties = store
        .search(EntityKind::Property, &Filter::new())
        .await
        .unwrap();
    assert_eq!(properties.len(), 2);
    let role_types = store
        .search(EntityKind::RoleType, &Filter::new())
        .await
        .unwrap();
    assert_eq!(role_types.len(), 1);

    let cases = store
        .search(EntityKind::Case, &Filter::identification("Z2"))
        .await
        .unwrap();
    assert_eq!(cases.len(), 1);
    assert_eq!(
        cases[0].attr_str("caseType"),
        Some(case_types[0].id.to_string().as_str())
    );
    assert_eq!(cases[0].attr_str("description"), Some("Tree felling permit"));
}

#[tokio::test]
async fn population_requires_prior_registration() {
    // The population workflow never creates a case.
    let (store, state) = test_state();

    let err = state
        .intake
        .populate_case(&populate_case_body("Z9", "T1"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "The case with id Z9 does not exist");

    let cases = store
        .search(EntityKind::Case, &Filter::new())
        .await
        .unwrap();
    assert!(cases.is_empty());
}

#[tokio::test]
async fn repeated_population_reuses_the_type_graph() {
    // Populating twice does not duplicate the type or its children.
    let (store, state) = test_state();
    state
        .intake
        .register_case(&json!({"referenceNumber": "Z2"}))
        .await
        .unwrap();

    state
        .intake
        .populate_case(&populate_case_body("Z2", "T1"))
        .await
        .unwrap();
    state
        .intake
        .populate_case(&populate_case_body("Z2", "T1"))
        .await
        .unwrap();

    assert_eq!(
        store
            .search(EntityKind::CaseType, &Filter::new())
            .await
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        store
            .search(EntityKind::Property, &Filter::new())
            .await
            .unwrap()
            .len(),
        2
    );
    assert_eq!(
        store
            .search(EntityKind::RoleType, &Filter::new())
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn document_attachment_updates_links_and_materializes() {
    let (store, state) = test_state();
    state
        .intake
        .register_case(&json!({"referenceNumber": "Z2"}))
        .await
        .unwrap();
    state
        .intake
        .populate_case(&populate_case_body("Z2", "T1"))
        .await
        .unwrap();
    state
        .intake
        .register_document(&json!({"referenceNumber": "D1"}))
        .await
        .unwrap();

    // "hello" in base64; case type T1 is on the allow list.
    let reply = state
        .intake
        .populate_document(&attach_document_body("Z2", "D1", Some("aGVsbG8="), None))
        .await
        .unwrap();
    assert_eq!(reply["Acknowledgement"]["subject"], "caseDocument");
    assert_eq!(reply["Acknowledgement"]["documentIdentification"], "D1");

    let documents = store
        .search(EntityKind::Document, &Filter::identification("D1"))
        .await
        .unwrap();
    assert_eq!(documents.len(), 1);
    let document = &documents[0];

    // No prior version seeds 1; content decoded and sized.
    assert_eq!(document.attr("version").unwrap(), &json!(1));
    assert_eq!(document.attr("contentSize").unwrap(), &json!(5));
    assert_eq!(document.attr_str("title"), Some("Site sketch"));
    let content_url = document.attr_str("contentUrl").unwrap();
    assert_eq!(
        content_url,
        format!(
            "http://localhost:8080/api/documents/{}/download",
            document.id
        )
    );

    // The document type was created and attached to the case type.
    let document_types = store
        .search(EntityKind::DocumentType, &Filter::new())
        .await
        .unwrap();
    assert_eq!(document_types.len(), 1);
    assert_eq!(document_types[0].attr_str("description"), Some("Evidence"));
    assert_eq!(
        document.attr_str("documentType"),
        Some(document_types[0].id.to_string().as_str())
    );

    // One link between the case and the document.
    let links = store
        .search(EntityKind::CaseDocumentLink, &Filter::new())
        .await
        .unwrap();
    assert_eq!(links.len(), 1);
    let case = &store
        .search(EntityKind::Case, &Filter::identification("Z2"))
        .await
        .unwrap()[0];
    assert_eq!(
        links[0].attr_str("case"),
        Some(case.id.to_string().as_str())
    );
    assert_eq!(
        links[0].attr_str("document"),
        Some(document.id.to_string().as_str())
    );
}

#[tokio::test]
async fn document_version_advances_from_the_draft() {
    // A prior version v stores v + 1.
    let (store, state) = test_state();
    state
        .intake
        .register_case(&json!({"referenceNumber": "Z2"}))
        .await
        .unwrap();
    state
        .intake
        .populate_case(&populate_case_body("Z2", "T1"))
        .await
        .unwrap();
    state
        .intake
        .register_document(&json!({"referenceNumber": "D1"}))
        .await
        .unwrap();

    state
        .intake
        .populate_document(&attach_document_body("Z2", "D1", Some("aGVsbG8="), Some("2")))
        .await
        .unwrap();

    let documents = store
        .search(EntityKind::Document, &Filter::identification("D1"))
        .await
        .unwrap();
    assert_eq!(documents[0].attr("version").unwrap(), &json!(3));
}

#[tokio::test]
async fn ambiguous_case_blocks_document_attachment() {
    // Two matching cases mean conflict, with no document or link
    // mutation.
    let (store, state) = test_state();
    for _ in 0..2 {
        store
            .save(ObjectRecord::new(
                EntityKind::Case,
                json!({"identification": "Z2"}),
            ))
            .await
            .unwrap();
    }

    let err = state
        .intake
        .populate_document(&attach_document_body("Z2", "D1", None, None))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "More than one case exists with id Z2");

    assert!(store
        .search(EntityKind::Document, &Filter::new())
        .await
        .unwrap()
        .is_empty());
    assert!(store
        .search(EntityKind::CaseDocumentLink, &Filter::new())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn unregistered_document_blocks_attachment() {
    let (store, state) = test_state();
    state
        .intake
        .register_case(&json!({"referenceNumber": "Z2"}))
        .await
        .unwrap();
    state
        .intake
        .populate_case(&populate_case_body("Z2", "T1"))
        .await
        .unwrap();

    let err = state
        .intake
        .populate_document(&attach_document_body("Z2", "D9", None, None))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "The document with id D9 does not exist");

    assert!(store
        .search(EntityKind::CaseDocumentLink, &Filter::new())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn case_without_type_blocks_attachment() {
    let (_, state) = test_state();
    state
        .intake
        .register_case(&json!({"referenceNumber": "Z2"}))
        .await
        .unwrap();
    state
        .intake
        .register_document(&json!({"referenceNumber": "D1"}))
        .await
        .unwrap();

    let err = state
        .intake
        .populate_document(&attach_document_body("Z2", "D1", None, None))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::CaseTypeNotSet { .. }));
}

#[tokio::test]
async fn attachment_skips_materialization_off_the_allow_list() {
    let mut config = test_config();
    config.attachment.case_type_allow_list = vec!["OTHER".into()];
    let (store, state) = test_state_with(config);

    state
        .intake
        .register_case(&json!({"referenceNumber": "Z2"}))
        .await
        .unwrap();
    state
        .intake
        .populate_case(&populate_case_body("Z2", "T1"))
        .await
        .unwrap();
    state
        .intake
        .register_document(&json!({"referenceNumber": "D1"}))
        .await
        .unwrap();

    state
        .intake
        .populate_document(&attach_document_body("Z2", "D1", Some("aGVsbG8="), None))
        .await
        .unwrap();

    let documents = store
        .search(EntityKind::Document, &Filter::identification("D1"))
        .await
        .unwrap();
    // Draft fields merge as-is, but no version seeding, sizing, or URL.
    assert!(documents[0].attr("contentSize").is_none());
    assert!(documents[0].attr("contentUrl").is_none());
    assert!(documents[0].attr("version").is_none());
    // The link is still created.
    assert_eq!(
        store
            .search(EntityKind::CaseDocumentLink, &Filter::new())
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn link_policy_append_accumulates_and_upsert_reuses() {
    for (policy, expected_links) in [
        (LinkDeduplication::Append, 2),
        (LinkDeduplication::Upsert, 1),
    ] {
        let mut config = test_config();
        config.reconciliation.link_deduplication = policy;
        let (store, state) = test_state_with(config);

        state
            .intake
            .register_case(&json!({"referenceNumber": "Z2"}))
            .await
            .unwrap();
        state
            .intake
            .populate_case(&populate_case_body("Z2", "T1"))
            .await
            .unwrap();
        state
            .intake
            .register_document(&json!({"referenceNumber": "D1"}))
            .await
            .unwrap();

        for _ in 0..2 {
            state
                .intake
                .populate_document(&attach_document_body("Z2", "D1", None, None))
                .await
                .unwrap();
        }

        let links = store
            .search(EntityKind::CaseDocumentLink, &Filter::new())
            .await
            .unwrap();
        assert_eq!(links.len(), expected_links);
    }
}

#[tokio::test]
async fn document_reply_is_a_pure_mapping_passthrough() {
    let (store, state) = test_state();

    let reply = state
        .intake
        .document_reply(&json!({"identification": "D1"}))
        .unwrap();
    assert_eq!(reply["Acknowledgement"]["subject"], "document");
    assert_eq!(reply["Acknowledgement"]["identification"], "D1");

    // No repository access happened.
    assert!(store
        .search(EntityKind::Document, &Filter::new())
        .await
        .unwrap()
        .is_empty());
}
