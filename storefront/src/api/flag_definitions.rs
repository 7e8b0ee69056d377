use axum::{debug_handler, extract::State, Json};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use sha2::{Digest, Sha256};
use tracing::instrument;

use crate::api::errors::StoreError;
use crate::flags::{registry::provider_data, ProviderData};
use crate::router;

/// Flag definitions for the toolbar.
#[instrument(skip_all)]
pub async fn flags() -> Json<ProviderData> {
    Json(provider_data())
}

/// Flag discovery for external tooling. Same payload as [`flags`], but only
/// for callers presenting the flags secret as a bearer token.
#[debug_handler]
#[instrument(skip_all)]
pub async fn discovery(
    State(state): State<router::State>,
    authorization: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<Json<ProviderData>, StoreError> {
    let Some(TypedHeader(authorization)) = authorization else {
        return Err(StoreError::NoAuthenticationProvided);
    };

    if !secrets_match(authorization.token(), &state.config.flags_secret) {
        tracing::warn!("rejected flag discovery request with invalid token");
        return Err(StoreError::InvalidCredentials);
    }

    Ok(Json(provider_data()))
}

// Comparing digests keeps the comparison independent of where the inputs differ.
fn secrets_match(presented: &str, expected: &str) -> bool {
    Sha256::digest(presented.as_bytes()) == Sha256::digest(expected.as_bytes())
}
