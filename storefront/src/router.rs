use std::future::ready;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::{
    api::{flag_definitions, overrides, revalidate},
    cache::PageCache,
    catalog::{CatalogStore, ProductSource},
    config::Config,
    flags::FlagCodec,
    metrics_utils::{setup_metrics_recorder, track_metrics},
    overrides::OverrideCipher,
    pages,
};

#[derive(Clone)]
pub struct State {
    pub config: Config,
    pub catalog: CatalogStore,
    pub page_cache: PageCache,
    // Both keyed by the flags secret.
    pub cipher: OverrideCipher,
    pub codec: FlagCodec,
}

impl State {
    pub fn new(config: Config, source: Arc<dyn ProductSource + Send + Sync>) -> Self {
        State {
            catalog: CatalogStore::new(source, config.cache_max_entries),
            page_cache: PageCache::new(
                config.cache_max_entries,
                Duration::from_secs(config.page_cache_ttl_seconds),
            ),
            cipher: OverrideCipher::new(&config.flags_secret),
            codec: FlagCodec::new(&config.flags_secret),
            config,
        }
    }
}

pub fn router(state: State) -> Router {
    let status_router = Router::new()
        .route("/_liveness", get(|| ready("ok")))
        .route("/_readiness", get(readiness));

    let api_router = Router::new()
        .route("/api/flags", get(flag_definitions::flags))
        .route("/.well-known/vercel/flags", get(flag_definitions::discovery))
        .route(
            "/api/flag-overrides",
            get(overrides::get_overrides)
                .post(overrides::set_overrides)
                .delete(overrides::clear_overrides),
        )
        .route("/api/revalidate/path", post(revalidate::revalidate_path))
        .route("/api/revalidate/tag", post(revalidate::revalidate_tag))
        .layer(ConcurrencyLimitLayer::new(state.config.max_concurrency));

    // Page paths arrive here already rewritten to carry a flag code.
    let page_router = Router::new()
        .route("/:code", get(pages::home::home_page))
        .route("/:code/products/:id", get(pages::product::product_page))
        .route("/cart", get(pages::cart::cart_page))
        .route("/_toolbar.js", get(pages::toolbar::toolbar_script));

    let enable_metrics = state.config.enable_metrics;
    let router = Router::new()
        .merge(status_router)
        .merge(api_router)
        .merge(page_router)
        .fallback(pages::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(track_metrics))
        .with_state(state);

    // Global metrics recorders get in the way of tests, so only install one when asked.
    if !enable_metrics {
        return router;
    }
    match setup_metrics_recorder() {
        Ok(recorder_handle) => {
            router.route("/metrics", get(move || ready(recorder_handle.render())))
        }
        Err(e) => {
            tracing::error!("Failed to install metrics recorder: {}", e);
            router
        }
    }
}

async fn readiness(
    axum::extract::State(state): axum::extract::State<State>,
) -> (StatusCode, &'static str) {
    match state.catalog.list().await {
        Ok(_) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::warn!("readiness check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "catalog unavailable")
        }
    }
}
