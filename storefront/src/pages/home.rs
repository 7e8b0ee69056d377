use axum::{
    extract::{Path, State},
    response::Response,
};
use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::api::errors::StoreError;
use crate::catalog::Product;
use crate::flags::{Flag, FlagValues};
use crate::pages::components::{
    render_product_card, render_promo_banner, render_timestamp_badge,
};
use crate::pages::layout::render_document;
use crate::pages::{decode_code, serve_cached, PageOutcome};
use crate::router;

pub fn render_home(
    products: &[Product],
    flags: &FlagValues,
    rendered_at: DateTime<Utc>,
) -> String {
    let grid_columns = if flags.get(Flag::ShowNewLayout) {
        "lg:grid-cols-4"
    } else {
        "lg:grid-cols-3"
    };
    let banner = if flags.get(Flag::EnablePromoBanner) {
        render_promo_banner()
    } else {
        String::new()
    };
    let cards: String = products.iter().map(render_product_card).collect();

    render_document(&format!(
        r#"<div class="min-h-screen bg-gray-50">
<header class="bg-white shadow">
<div class="mx-auto max-w-7xl px-4 py-6 sm:px-6 lg:px-8 flex justify-between items-center">
<h1 class="text-3xl font-bold text-gray-900">Demo Shop</h1>
<a href="/cart" class="rounded-lg bg-blue-600 px-4 py-2 text-white font-semibold hover:bg-blue-700 transition-colors">Cart</a>
</div>
</header>
<main class="mx-auto max-w-7xl px-4 py-8 sm:px-6 lg:px-8">
<div class="mb-6">{badge}</div>
{banner}
<div class="mb-8">
<h2 class="text-2xl font-bold text-gray-900 mb-4">Featured Products</h2>
<div class="grid grid-cols-1 gap-6 sm:grid-cols-2 {grid_columns}">
{cards}
</div>
</div>
</main>
</div>"#,
        badge = render_timestamp_badge("Server rendered at", rendered_at),
    ))
}

async fn render_home_page(
    state: &router::State,
    code: &str,
    rendered_at: DateTime<Utc>,
) -> Result<PageOutcome, StoreError> {
    let Some(flags) = decode_code(state, code) else {
        return Ok(PageOutcome::NotFound("This page could not be found."));
    };
    let products = state.catalog.list().await?;
    Ok(PageOutcome::Found(render_home(&products, &flags, rendered_at)))
}

#[instrument(skip_all, fields(code = %code))]
pub async fn home_page(
    State(state): State<router::State>,
    Path(code): Path<String>,
) -> Result<Response, StoreError> {
    serve_cached(&state, format!("/{code}"), "/".to_string(), |rendered_at| {
        render_home_page(&state, &code, rendered_at)
    })
    .await
}
