//! Shared helpers for the scenario tests: an app wired over the
//! in-memory store, with knobs for the reconciliation policies and the
//! attachment allow list.
#![allow(dead_code)]

use loket::config::{
    AmbiguousChildPolicy, AttachmentConfig, Config, DatabaseConfig, LinkDeduplication,
    LoggingConfig, ReconciliationConfig, ServerConfig,
};
use loket::db::InMemoryObjectStore;
use loket::state::AppState;
use std::sync::Arc;

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            public_base_url: "http://localhost:8080".into(),
            cors_origins: vec![],
        },
        database: DatabaseConfig {
            url: "postgresql://unused".into(),
            pool_min_size: 1,
            pool_max_size: 1,
            pool_timeout_seconds: 1,
        },
        reconciliation: ReconciliationConfig {
            ambiguous_child: AmbiguousChildPolicy::Skip,
            link_deduplication: LinkDeduplication::Append,
        },
        attachment: AttachmentConfig {
            case_type_allow_list: vec!["T1".into()],
            download_path: vec!["documents".into(), "{id}".into(), "download".into()],
            default_format: "application/pdf".into(),
        },
        logging: LoggingConfig {
            level: "debug".into(),
            json: false,
            file_enabled: false,
            file_directory: "./logs".into(),
            file_prefix: "loket-test".into(),
        },
    }
}

pub fn test_state() -> (Arc<InMemoryObjectStore>, AppState) {
    test_state_with(test_config())
}

pub fn test_state_with(config: Config) -> (Arc<InMemoryObjectStore>, AppState) {
    let store = Arc::new(InMemoryObjectStore::new());
    let state = AppState::with_store(Arc::new(config), store.clone());
    (store, state)
}

/// A full case-population message body in the wire dialect, for case
/// `case_number` under case type `type_code`.
pub fn populate_case_body(case_number: &str, type_code: &str) -> serde_json::Value {
    serde_json::json!({
        "case": {
            "caseNumber": case_number,
            "description": "Tree felling permit",
            "startDate": "2024-01-05",
            "caseType": {
                "code": type_code,
                "description": "Permit request",
                "properties": {"property": [
                    {"name": "surface", "value": "120"},
                    {"name": "species", "value": "oak"}
                ]},
                "roles": {"role": {"description": "Applicant", "genericDescription": "initiator"}}
            }
        }
    })
}

/// A document-attachment message body in the wire dialect.
pub fn attach_document_body(
    case_number: &str,
    document_number: &str,
    content: Option<&str>,
    version: Option<&str>,
) -> serde_json::Value {
    serde_json::json!({
        "caseNumber": case_number,
        "document": {
            "documentNumber": document_number,
            "title": "Site sketch",
            "format": "image/png",
            "version": version,
            "content": content,
            "documentType": {"description": "Evidence"}
        }
    })
}
