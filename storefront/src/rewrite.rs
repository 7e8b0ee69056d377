//! Rewrites public page paths to carry the visitor's flag decisions.
//!
//! `/` becomes `/{code}` and `/products/...` becomes `/{code}/products/...`,
//! where `code` is the signed encoding of every precomputed flag after
//! applying the visitor's overrides. Pages then render one variant per code,
//! which keeps every variant cacheable.

use axum::{
    extract::{Request, State},
    http::{uri::PathAndQuery, Uri},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::flags::{registry::resolve_flags, CodeError, FlagCodec, PRECOMPUTE_FLAGS};
use crate::metrics_consts::REQUEST_REWRITE_COUNTER;
use crate::overrides::FlagOverrides;
use crate::router;

/// Whether `path` is a page whose variants depend on flags.
pub fn should_rewrite(path: &str) -> bool {
    path == "/" || path == "/products" || path.starts_with("/products/")
}

pub fn rewrite_path(code: &str, path: &str) -> String {
    if path == "/" {
        format!("/{code}")
    } else {
        format!("/{code}{path}")
    }
}

/// The code for the visitor's resolved flags: overrides where they hold an
/// allowed value, decisions everywhere else.
pub fn code_for_overrides(
    codec: &FlagCodec,
    overrides: &FlagOverrides,
) -> Result<String, CodeError> {
    let values = resolve_flags(&PRECOMPUTE_FLAGS, overrides);
    codec.serialize(&PRECOMPUTE_FLAGS, values.as_slice())
}

fn rewritten_uri(uri: &Uri, code: &str) -> Result<Uri, axum::http::Error> {
    let path = rewrite_path(code, uri.path());
    let path_and_query = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path,
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query)?);
    Ok(Uri::from_parts(parts)?)
}

/// Runs ahead of routing. Requests outside the page paths pass through
/// untouched, and nothing about the override cookie can fail a request.
pub async fn rewrite_request(
    State(state): State<router::State>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    if !should_rewrite(req.uri().path()) {
        return next.run(req).await;
    }

    let overrides = state.cipher.read(&jar);
    let rewritten = code_for_overrides(&state.codec, &overrides)
        .map_err(|e| e.to_string())
        .and_then(|code| rewritten_uri(req.uri(), &code).map_err(|e| e.to_string()));

    match rewritten {
        Ok(uri) => {
            tracing::debug!(from = %req.uri(), to = %uri, "rewriting page request");
            metrics::counter!(REQUEST_REWRITE_COUNTER).increment(1);
            *req.uri_mut() = uri;
        }
        Err(e) => {
            tracing::error!(path = req.uri().path(), error = %e, "could not rewrite page request");
        }
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("/", true)]
    #[case("/products", true)]
    #[case("/products/1", true)]
    #[case("/products/1/reviews", true)]
    #[case("/cart", false)]
    #[case("/api/flag-overrides", false)]
    #[case("/productsale", false)]
    #[case("/_toolbar.js", false)]
    fn test_should_rewrite(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(should_rewrite(path), expected);
    }

    #[rstest]
    #[case("/", "/abc")]
    #[case("/products", "/abc/products")]
    #[case("/products/2", "/abc/products/2")]
    fn test_rewrite_path(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(rewrite_path("abc", path), expected);
    }

    #[test]
    fn test_rewritten_uri_keeps_query() {
        let uri: Uri = "/products/1?ref=home".parse().unwrap();
        let rewritten = rewritten_uri(&uri, "abc").unwrap();
        assert_eq!(rewritten.path(), "/abc/products/1");
        assert_eq!(rewritten.query(), Some("ref=home"));
    }

    #[test]
    fn test_same_overrides_give_same_code() {
        let codec = FlagCodec::new("secret");
        let overrides = json!({"showNewLayout": true}).as_object().cloned().unwrap();

        let first = code_for_overrides(&codec, &overrides).unwrap();
        let second = code_for_overrides(&codec, &overrides).unwrap();
        assert_eq!(first, second);

        let without = code_for_overrides(&codec, &FlagOverrides::new()).unwrap();
        assert_ne!(first, without);
    }

    #[test]
    fn test_code_decodes_to_resolved_values() {
        let codec = FlagCodec::new("secret");
        let overrides = json!({"enablePromoBanner": false})
            .as_object()
            .cloned()
            .unwrap();
        let code = code_for_overrides(&codec, &overrides).unwrap();
        let values = codec.deserialize(&PRECOMPUTE_FLAGS, &code).unwrap();
        assert_eq!(values.as_slice(), &[false, false]);
    }
}
