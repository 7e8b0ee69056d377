//! Server-rendered HTML pages.
//!
//! The home and product pages are reached through a flag code in the first
//! path segment (see `rewrite`), decode it back into flag values and branch
//! on them. Their output is cached per code in the page cache.

pub mod cart;
pub mod components;
pub mod home;
pub mod layout;
pub mod product;
pub mod toolbar;

use std::future::Future;
use std::sync::Arc;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use chrono::{DateTime, Utc};

use crate::api::errors::StoreError;
use crate::cache::CachedPage;
use crate::catalog::PRODUCTS_TAG;
use crate::flags::{CodeError, FlagValues};
use crate::metrics_consts::INVALID_FLAG_CODE_COUNTER;
use crate::pages::layout::{back_to_shop_header, escape_html, render_document};
use crate::router;

pub const CACHE_STATUS_HEADER: &str = "x-storefront-cache";

/// Result of rendering a cacheable page.
pub enum PageOutcome {
    Found(String),
    NotFound(&'static str),
}

fn html_response(
    status: StatusCode,
    html: impl Into<String>,
    cache_status: &'static str,
) -> Response {
    let mut response = (status, Html(html.into())).into_response();
    response
        .headers_mut()
        .insert(CACHE_STATUS_HEADER, HeaderValue::from_static(cache_status));
    response
}

pub fn render_not_found(message: &str) -> String {
    render_document(&format!(
        r#"<div class="min-h-screen bg-gray-50">
{header}
<main class="mx-auto max-w-3xl px-4 py-16 text-center sm:px-6 lg:px-8">
<h1 class="text-3xl font-bold text-gray-900">404</h1>
<p class="mt-4 text-gray-600">{message}</p>
</main>
</div>"#,
        header = back_to_shop_header(),
        message = escape_html(message),
    ))
}

pub fn not_found_response(message: &str) -> Response {
    let mut response = (StatusCode::NOT_FOUND, Html(render_not_found(message))).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

/// Fallback for every unrouted path.
pub async fn not_found() -> Response {
    not_found_response("This page could not be found.")
}

/// Flag values for `code`, or `None` when the code is forged, stale or
/// simply not a code.
pub fn decode_code(state: &router::State, code: &str) -> Option<FlagValues> {
    match state.codec.decode_code(code) {
        Ok(values) => Some(values),
        Err(e) => {
            log_invalid_code(code, &e);
            None
        }
    }
}

fn log_invalid_code(code: &str, error: &CodeError) {
    tracing::debug!(code, error = %error, "rejecting invalid flag code");
    metrics::counter!(INVALID_FLAG_CODE_COUNTER).increment(1);
}

/// Serves `rewritten_path` from the page cache, rendering and caching it on a
/// miss. Only successful renders are cached, and only when no revalidation
/// happened while rendering.
pub async fn serve_cached<F, Fut>(
    state: &router::State,
    rewritten_path: String,
    public_path: String,
    render: F,
) -> Result<Response, StoreError>
where
    F: FnOnce(DateTime<Utc>) -> Fut,
    Fut: Future<Output = Result<PageOutcome, StoreError>>,
{
    if let Some(page) = state.page_cache.get(&rewritten_path).await {
        return Ok(html_response(StatusCode::OK, page.html.as_ref(), "HIT"));
    }

    let generation = state.page_cache.generation();
    let rendered_at = Utc::now();
    match render(rendered_at).await? {
        PageOutcome::Found(html) => {
            let html: Arc<str> = Arc::from(html);
            state
                .page_cache
                .insert_unless_revalidated(
                    rewritten_path,
                    CachedPage {
                        html: html.clone(),
                        public_path,
                        rendered_at,
                    },
                    &[PRODUCTS_TAG],
                    generation,
                )
                .await;
            Ok(html_response(StatusCode::OK, html.as_ref(), "MISS"))
        }
        PageOutcome::NotFound(message) => Ok(not_found_response(message)),
    }
}
