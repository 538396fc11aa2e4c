//! Request handlers for the wire protocol.

use crate::{state::AppState, Error, Result};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use loket_object_model::EntityKind;
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

pub async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Receive an inbound envelope, dispatch on the message kind, and reply
/// with the wire envelope for the outcome. Business outcomes come back as
/// 400 error envelopes; infrastructure faults as a generic 500.
pub async fn receive(State(state): State<AppState>, body: String) -> Response {
    match process(&state, &body).await {
        Ok(payload) => xml_response(StatusCode::OK, &payload),
        Err(error) => error.into_response(),
    }
}

async fn process(state: &AppState, body: &str) -> Result<JsonValue> {
    let (message, content) = loket_envelope::decode(body)?;
    tracing::debug!(message = %message, "Dispatching inbound message");

    match message.as_str() {
        "RegisterCaseIdentification" => state.intake.register_case(&content).await,
        "RegisterDocumentIdentification" => state.intake.register_document(&content).await,
        "PopulateCase" => state.intake.populate_case(&content).await,
        "AttachCaseDocument" => state.intake.populate_document(&content).await,
        "DocumentReply" => state.intake.document_reply(&content),
        other => Err(Error::UnknownMessage(other.to_string())),
    }
}

fn xml_response(status: StatusCode, payload: &JsonValue) -> Response {
    match loket_envelope::encode(payload) {
        Ok(body) => (
            status,
            [(header::CONTENT_TYPE, "text/xml; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(error) => {
            Error::Internal(format!("failed to encode response envelope: {error}"))
                .into_response()
        }
    }
}

/// Serve the decoded content of a materialized document.
pub async fn download_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match fetch_document_content(&state, &id).await {
        Ok((format, bytes)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, format)],
            bytes,
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}

async fn fetch_document_content(state: &AppState, id: &str) -> Result<(String, Vec<u8>)> {
    let not_found = || Error::NotFound {
        kind: EntityKind::Document,
        identification: id.to_string(),
    };

    let object_id = Uuid::parse_str(id).map_err(|_| not_found())?;
    let document = state
        .store
        .get(object_id)
        .await?
        .filter(|object| object.kind == EntityKind::Document)
        .ok_or_else(not_found)?;

    // A document without materialized content has nothing to serve.
    let content = document.attr_str("content").ok_or_else(not_found)?;
    let bytes = BASE64.decode(content).map_err(|_| Error::InvalidContent {
        identification: id.to_string(),
    })?;

    let format = document
        .attr_str("format")
        .unwrap_or("application/octet-stream")
        .to_string();
    Ok((format, bytes))
}
