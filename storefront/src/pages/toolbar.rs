use axum::http::header;
use axum::response::IntoResponse;

const TOOLBAR_SCRIPT: &str = include_str!("../../assets/toolbar.js");

/// Serves the flags toolbar overlay that every page loads.
pub async fn toolbar_script() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=300"),
        ],
        TOOLBAR_SCRIPT,
    )
}
