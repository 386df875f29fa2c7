//! Request handlers for the `/message` API.
//!
//! Storage calls are synchronous, so every handler hops onto the blocking
//! pool before touching the store.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use depot::{Digest, Entry};

use crate::error::{ServerError, ServerResult};
use crate::router::AppState;

/// Run a storage call on the blocking pool.
async fn blocking<F, T>(f: F) -> ServerResult<T>
where
    F: FnOnce() -> depot::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::Internal(format!("storage task failed: {}", e)))?
        .map_err(ServerError::from)
}

#[derive(Debug, Default, Deserialize)]
pub struct WriteParams {
    pub attachment: Option<String>,
}

impl WriteParams {
    fn wants_attachment(&self) -> bool {
        matches!(
            self.attachment.as_deref(),
            Some("1" | "y" | "yes" | "true")
        )
    }
}

/// A parsed `POST /message` body.
#[derive(Debug)]
pub struct WriteRequest {
    pub key: String,
    pub value: Value,
    pub attachment: Option<Vec<u8>>,
}

impl WriteRequest {
    /// Parse `{"key": .., "value": .., "attachment": "<hex>"}`.
    ///
    /// The attachment field is only read when `with_attachment` is set.
    pub fn parse(body: &[u8], with_attachment: bool) -> ServerResult<Self> {
        let doc: Value = serde_json::from_slice(body)
            .map_err(|e| ServerError::BadRequest(format!("invalid JSON: {}", e)))?;
        let Value::Object(mut doc) = doc else {
            return Err(ServerError::BadRequest("body must be a JSON object".into()));
        };

        let key = match doc.remove("key") {
            Some(Value::String(key)) => key,
            Some(_) => return Err(ServerError::BadRequest("key must be a string".into())),
            None => return Err(ServerError::BadRequest("missing key".into())),
        };
        let value = doc
            .remove("value")
            .ok_or_else(|| ServerError::BadRequest("missing value".into()))?;

        let attachment = if with_attachment {
            Some(decode_attachment(&doc)?)
        } else {
            None
        };

        Ok(Self {
            key,
            value,
            attachment,
        })
    }
}

fn decode_attachment(doc: &Map<String, Value>) -> ServerResult<Vec<u8>> {
    let hex = doc
        .get("attachment")
        .and_then(Value::as_str)
        .ok_or_else(|| ServerError::BadRequest("missing attachment".into()))?;
    hex::decode(hex).map_err(|e| ServerError::BadRequest(format!("attachment is not hex: {}", e)))
}

/// `POST /message`
pub async fn write_message(
    State(state): State<AppState>,
    Query(params): Query<WriteParams>,
    body: Bytes,
) -> ServerResult<StatusCode> {
    let request = WriteRequest::parse(&body, params.wants_attachment())?;
    let storage = state.storage.clone();

    blocking(move || {
        storage.write(
            &request.key,
            &request.value,
            request.attachment.as_deref(),
        )
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `GET /message`: every key with its number of versions.
pub async fn list_messages(State(state): State<AppState>) -> ServerResult<Json<Value>> {
    let storage = state.storage.clone();
    let listing = blocking(move || {
        storage
            .keys()?
            .into_iter()
            .map(|key| -> depot::Result<Value> {
                let versions = storage.count(key.as_str())?;
                Ok(json!({ "key": key, "versions": versions }))
            })
            .collect::<depot::Result<Vec<Value>>>()
    })
    .await?;

    Ok(Json(json!({ "keys": listing })))
}

/// `GET /message/:key`
pub async fn read_message(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ServerResult<Json<Value>> {
    let storage = state.storage.clone();
    let lookup = key.clone();
    let value = blocking(move || storage.read(&lookup)).await?;

    Ok(Json(json!({ "key": key, "value": value })))
}

/// `GET /message/:key/backlog`
pub async fn message_backlog(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ServerResult<Json<Value>> {
    let storage = state.storage.clone();
    let lookup = key.clone();
    let entries: Vec<Entry> =
        blocking(move || storage.backlog(&lookup).map(Iterator::collect)).await?;

    Ok(Json(json!({ "key": key, "entries": entries })))
}

/// `GET /attachment/:digest`
pub async fn read_attachment(
    State(state): State<AppState>,
    Path(digest): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let digest = Digest::from_hex(&digest)
        .map_err(|e| ServerError::BadRequest(e.to_string()))?;
    let storage = state.storage.clone();
    let bytes = blocking(move || storage.attachment(&digest)).await?;

    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes))
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}
