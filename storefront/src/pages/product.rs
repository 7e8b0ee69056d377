use axum::{
    extract::{Path, State},
    response::Response,
};
use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::api::errors::StoreError;
use crate::cache::CachedPage;
use crate::catalog::{Product, PRODUCTS_TAG};
use crate::flags::{Flag, FlagValues, PRECOMPUTE_FLAGS};
use crate::metrics_consts::PRERENDERED_PAGES_GAUGE;
use crate::pages::components::render_timestamp_badge;
use crate::pages::layout::{back_to_shop_header, escape_html, render_document};
use crate::pages::{decode_code, serve_cached, PageOutcome};
use crate::router;

const PRODUCT_NOT_FOUND: &str = "This product could not be found.";

fn render_side_by_side(product: &Product) -> String {
    format!(
        r#"<div class="grid grid-cols-1 gap-8 lg:grid-cols-2" data-layout="side-by-side">
<div class="relative aspect-square overflow-hidden rounded-lg bg-gray-100">
<img src="{image}" alt="{name}" class="h-full w-full object-cover">
</div>
<div class="space-y-6">
<div>
<h1 class="text-4xl font-bold text-gray-900">{name}</h1>
<p class="mt-2 text-sm text-gray-600">{category}</p>
</div>
<p class="text-xl text-gray-700">{description}</p>
<div class="flex items-center gap-4">
<span class="text-3xl font-bold text-gray-900">${price:.2}</span>
</div>
<a href="/cart?items={id}:1" class="block w-full rounded-lg bg-blue-600 py-4 text-center text-lg font-semibold text-white hover:bg-blue-700 transition-colors">Add to Cart</a>
</div>
</div>"#,
        id = escape_html(&product.id),
        image = escape_html(&product.image),
        name = escape_html(&product.name),
        category = escape_html(&product.category),
        description = escape_html(&product.description),
        price = product.price,
    )
}

fn render_stacked(product: &Product) -> String {
    format!(
        r#"<div class="rounded-lg bg-white p-8" data-layout="stacked">
<div class="relative mb-6 aspect-video overflow-hidden rounded-lg bg-gray-100">
<img src="{image}" alt="{name}" class="h-full w-full object-cover">
</div>
<div class="space-y-4">
<h1 class="text-3xl font-bold text-gray-900">{name}</h1>
<p class="text-gray-600">{category}</p>
<p class="text-lg text-gray-700">{description}</p>
<div class="flex items-center justify-between border-t pt-4">
<span class="text-2xl font-bold text-gray-900">${price:.2}</span>
<a href="/cart?items={id}:1" class="rounded-lg bg-blue-600 px-8 py-3 font-semibold text-white hover:bg-blue-700 transition-colors">Add to Cart</a>
</div>
</div>
</div>"#,
        id = escape_html(&product.id),
        image = escape_html(&product.image),
        name = escape_html(&product.name),
        category = escape_html(&product.category),
        description = escape_html(&product.description),
        price = product.price,
    )
}

pub fn render_product(
    product: &Product,
    flags: &FlagValues,
    rendered_at: DateTime<Utc>,
) -> String {
    let details = if flags.get(Flag::ShowNewLayout) {
        render_side_by_side(product)
    } else {
        render_stacked(product)
    };

    render_document(&format!(
        r#"<div class="min-h-screen bg-gray-50">
{header}
<main class="mx-auto max-w-7xl px-4 py-8 sm:px-6 lg:px-8">
<div class="mb-6">{badge}</div>
{details}
</main>
</div>"#,
        header = back_to_shop_header(),
        badge = render_timestamp_badge("Server rendered at", rendered_at),
    ))
}

async fn render_product_page(
    state: &router::State,
    flags: Option<FlagValues>,
    id: &str,
    rendered_at: DateTime<Utc>,
) -> Result<PageOutcome, StoreError> {
    let Some(flags) = flags else {
        return Ok(PageOutcome::NotFound("This page could not be found."));
    };
    match state.catalog.get_by_id(id).await? {
        Some(product) => Ok(PageOutcome::Found(render_product(
            &product,
            &flags,
            rendered_at,
        ))),
        None => Ok(PageOutcome::NotFound(PRODUCT_NOT_FOUND)),
    }
}

#[instrument(skip_all, fields(code = %code, product_id = %id))]
pub async fn product_page(
    State(state): State<router::State>,
    Path((code, id)): Path<(String, String)>,
) -> Result<Response, StoreError> {
    let rewritten_path = format!("/{code}/products/{id}");
    let public_path = format!("/products/{id}");

    serve_cached(&state, rewritten_path, public_path, |rendered_at| {
        render_product_page(&state, decode_code(&state, &code), &id, rendered_at)
    })
    .await
}

/// Renders the detail pages of `product_ids` for every flag code and stores
/// them in the page cache. Returns how many pages were cached.
#[instrument(skip_all)]
pub async fn prerender_product_pages(
    state: &router::State,
    product_ids: &[String],
) -> Result<usize, StoreError> {
    let codes = state.codec.generate_permutations(&PRECOMPUTE_FLAGS);
    let mut cached = 0;

    for code in &codes {
        let flags = state.codec.decode_code(code).ok();
        for id in product_ids {
            let rendered_at = Utc::now();
            let PageOutcome::Found(html) =
                render_product_page(state, flags.clone(), id, rendered_at).await?
            else {
                tracing::warn!(product_id = %id, "skipping prerender of unknown product");
                continue;
            };

            state
                .page_cache
                .insert(
                    format!("/{code}/products/{id}"),
                    CachedPage {
                        html: html.into(),
                        public_path: format!("/products/{id}"),
                        rendered_at,
                    },
                    &[PRODUCTS_TAG],
                )
                .await;
            cached += 1;
        }
    }

    metrics::gauge!(PRERENDERED_PAGES_GAUGE).set(cached as f64);
    tracing::info!(codes = codes.len(), pages = cached, "prerendered product pages");
    Ok(cached)
}
