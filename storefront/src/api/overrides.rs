use axum::{debug_handler, extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use bytes::Bytes;
use serde_json::Value;
use tracing::instrument;

use crate::api::errors::StoreError;
use crate::api::types::{OverridesResponse, SuccessResponse};
use crate::overrides::{merge_overrides, override_cookie, removal_cookie};
use crate::router;

#[debug_handler]
#[instrument(skip_all)]
pub async fn get_overrides(
    State(state): State<router::State>,
    jar: CookieJar,
) -> Json<OverridesResponse> {
    Json(OverridesResponse {
        overrides: state.cipher.read(&jar),
    })
}

/// Merges the posted object into the visitor's overrides and writes them
/// back to the cookie.
#[debug_handler]
#[instrument(skip_all)]
pub async fn set_overrides(
    State(state): State<router::State>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<SuccessResponse>), StoreError> {
    let update = match serde_json::from_slice::<Value>(&body)? {
        Value::Object(update) => update,
        _ => {
            return Err(StoreError::BadRequest(
                "Overrides must be a JSON object.".to_string(),
            ))
        }
    };

    let current = state.cipher.read(&jar);
    let merged = merge_overrides(current, update);
    tracing::info!(keys = ?merged.keys().collect::<Vec<_>>(), "storing flag overrides");

    let token = state
        .cipher
        .encrypt(&merged)
        .map_err(|e| StoreError::OverrideEncryptionError(e.to_string()))?;
    let cookie = override_cookie(token, *state.config.secure_cookies);

    Ok((jar.add(cookie), Json(SuccessResponse::ok())))
}

#[instrument(skip_all)]
pub async fn clear_overrides(jar: CookieJar) -> (CookieJar, Json<SuccessResponse>) {
    tracing::info!("clearing flag overrides");
    (jar.add(removal_cookie()), Json(SuccessResponse::ok()))
}
