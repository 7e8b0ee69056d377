use axum::{debug_handler, extract::State, Json};
use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::instrument;

use crate::api::errors::StoreError;
use crate::api::types::{
    RevalidatePathRequest, RevalidatePathResponse, RevalidateTagRequest, RevalidateTagResponse,
};
use crate::cache::RevalidateType;
use crate::router;

const MISSING_PATHS_MESSAGE: &str = "Please provide a non-empty \"path\" or \"paths\" field.";
const MISSING_TAGS_MESSAGE: &str = "Please provide a non-empty \"tag\" or \"tags\" field.";

/// Collects revalidation targets: the single value first, then the list.
/// Non-string entries are skipped, values are trimmed, empty values dropped
/// and duplicates removed keeping the first occurrence.
pub fn normalize_targets(single: Option<&Value>, list: Option<&Value>) -> Vec<String> {
    let single = single.and_then(Value::as_str).into_iter();
    let list = list
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str);

    let mut targets: Vec<String> = Vec::new();
    for target in single.chain(list).map(str::trim) {
        if !target.is_empty() && !targets.iter().any(|seen| seen == target) {
            targets.push(target.to_string());
        }
    }
    targets
}

fn parse_kind(kind: Option<&Value>) -> Result<Option<RevalidateType>, StoreError> {
    match kind {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|_| {
            StoreError::BadRequest(format!(
                "Unknown revalidation type {value}. Use \"page\" or \"layout\"."
            ))
        }),
    }
}

// Anything that is not a JSON object is rejected the same way as malformed JSON.
fn parse_payload<T: DeserializeOwned>(body: &Bytes) -> Result<T, StoreError> {
    match serde_json::from_slice::<Value>(body)? {
        payload @ Value::Object(_) => Ok(serde_json::from_value(payload)?),
        _ => Err(StoreError::BadRequest("Invalid JSON payload.".to_string())),
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[debug_handler]
#[instrument(skip_all)]
pub async fn revalidate_path(
    State(state): State<router::State>,
    body: Bytes,
) -> Result<Json<RevalidatePathResponse>, StoreError> {
    let payload: RevalidatePathRequest = parse_payload(&body)?;
    let paths = normalize_targets(payload.path.as_ref(), payload.paths.as_ref());
    if paths.is_empty() {
        return Err(StoreError::BadRequest(MISSING_PATHS_MESSAGE.to_string()));
    }
    let kind = parse_kind(payload.kind.as_ref())?;

    for path in &paths {
        state
            .page_cache
            .revalidate_path(path, kind.unwrap_or(RevalidateType::Page))?;
    }
    tracing::info!(?paths, ?kind, "revalidated paths");

    Ok(Json(RevalidatePathResponse {
        success: true,
        revalidated: true,
        paths,
        kind,
        now: now(),
    }))
}

#[debug_handler]
#[instrument(skip_all)]
pub async fn revalidate_tag(
    State(state): State<router::State>,
    body: Bytes,
) -> Result<Json<RevalidateTagResponse>, StoreError> {
    let payload: RevalidateTagRequest = parse_payload(&body)?;
    let tags = normalize_targets(payload.tag.as_ref(), payload.tags.as_ref());
    if tags.is_empty() {
        return Err(StoreError::BadRequest(MISSING_TAGS_MESSAGE.to_string()));
    }

    for tag in &tags {
        state.catalog.invalidate_tag(tag)?;
        state.page_cache.revalidate_tag(tag)?;
    }
    tracing::info!(?tags, "revalidated tags");

    Ok(Json(RevalidateTagResponse {
        success: true,
        revalidated: true,
        tags,
        now: now(),
    }))
}
