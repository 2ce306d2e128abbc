//! Request handlers.
//!
//! Bodies are taken as raw JSON values so that every malformed request,
//! including one that is not JSON at all, is answered with the same
//! `{"error": ...}` shape.

use crate::error::InvoiceError;
use crate::server::AppState;
use crate::service::{extract_items, render_document_blocking};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::info;

/// `POST /api/parse` — `{prompt}` → `{items}`.
pub async fn parse(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, InvoiceError> {
    let body = json_object(body)?;

    let prompt = match body.get("prompt") {
        None | Some(Value::Null) => "",
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Err(InvoiceError::InvalidBody("prompt must be a string".into())),
    };

    let output = extract_items(state.generator.as_ref(), prompt, &state.config).await?;
    info!("Parsed {} items successfully", output.items.len());
    Ok(Json(json!({ "items": output.items })))
}

/// `POST /api/generate-pdf` — `{items, docType?}` → PDF attachment.
pub async fn generate_pdf(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, InvoiceError> {
    let mut body = json_object(body)?;

    let items = match body.remove("items") {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(InvoiceError::MissingItems),
    };

    let doc_type = match body.remove("docType") {
        None | Some(Value::Null) => state.config.default_doc_type.clone(),
        Some(Value::String(s)) => s,
        Some(_) => return Err(InvoiceError::InvalidDocType),
    };

    let item_count = items.len();
    let doc = render_document_blocking(items, doc_type).await?;
    info!(
        "PDF generated with {} items ({} page(s))",
        item_count, doc.page_count
    );

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_str(&content_disposition(&doc.filename))
            .map_err(|e| InvoiceError::RenderFailed(format!("invalid filename header: {e}")))?,
    );
    Ok((headers, doc.bytes).into_response())
}

/// `GET /health`.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "AI Facturation Backend is running",
    }))
}

fn json_object(body: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, InvoiceError> {
    match body {
        Ok(Json(Value::Object(map))) => Ok(map),
        Ok(Json(_)) => Err(InvoiceError::InvalidBody("expected a JSON object".into())),
        Err(rejection) => Err(InvoiceError::InvalidBody(rejection.body_text())),
    }
}

/// `attachment; filename="…"`, plus an RFC 5987 `filename*` when the name
/// is not plain ASCII.
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();

    if fallback == filename {
        format!("attachment; filename=\"{filename}\"")
    } else {
        format!(
            "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
            urlencoding::encode(filename)
        )
    }
}
