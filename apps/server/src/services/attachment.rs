//! File materialization for allow-listed case types.
//!
//! An explicit, narrow carve-out: only documents whose owning case type
//! is on the configured allow list get version management, content
//! decoding, and a retrieval endpoint.

use crate::{config::AttachmentConfig, Error, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use loket_object_model::{DocumentDraft, StoredObject};
use serde_json::Value as JsonValue;
use url::Url;

pub struct AttachmentService {
    case_type_allow_list: Vec<String>,
    download_path: Vec<String>,
    default_format: String,
    public_base_url: String,
}

impl AttachmentService {
    pub fn new(config: &AttachmentConfig, public_base_url: String) -> Self {
        Self {
            case_type_allow_list: config.case_type_allow_list.clone(),
            download_path: config.download_path.clone(),
            default_format: config.default_format.clone(),
            public_base_url,
        }
    }

    /// Whether documents under this case type get file materialization.
    pub fn applies_to(&self, case_type_identification: Option<&str>) -> bool {
        case_type_identification
            .is_some_and(|id| self.case_type_allow_list.iter().any(|allowed| allowed == id))
    }

    /// Seed or advance the version, decode inbound content, and stamp the
    /// retrieval endpoint onto the document.
    ///
    /// Version: no prior version on the draft seeds `1`; a prior version
    /// `v` stores `v + 1`. Content is decoded only when present,
    /// non-empty, and not itself a URL.
    pub fn materialize(&self, document: &mut StoredObject, draft: &DocumentDraft) -> Result<()> {
        let version = match draft.version {
            Some(prior) => prior + 1,
            None => 1,
        };
        document.set_attr("version", version);

        if document.attr_str("format").is_none() {
            document.set_attr("format", self.default_format.as_str());
        }

        if let Some(content) = draft.content.as_deref() {
            if !content.is_empty() && Url::parse(content).is_err() {
                let bytes = BASE64.decode(content).map_err(|_| Error::InvalidContent {
                    identification: draft.identification.clone(),
                })?;
                document.set_attr("contentSize", JsonValue::from(bytes.len()));
                document.set_attr("content", content);
            }
        }

        let endpoint = self.download_endpoint(&document.id.to_string());
        document.set_attr("contentUrl", endpoint);

        Ok(())
    }

    /// Build the retrieval URL by substituting the document identity into
    /// the configured path template.
    pub fn download_endpoint(&self, id: &str) -> String {
        let base = self.public_base_url.trim_end_matches('/');
        let path: Vec<String> = self
            .download_path
            .iter()
            .map(|segment| {
                if segment == "id" || segment == "[id]" || segment == "{id}" {
                    id.to_string()
                } else {
                    segment.clone()
                }
            })
            .collect();
        format!("{base}/api/{}", path.join("/"))
    }
}
