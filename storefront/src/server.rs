use std::future::Future;
use std::sync::Arc;

use axum::{extract::Request, ServiceExt};
use rand::{distributions::Alphanumeric, Rng};
use tokio::net::TcpListener;
use tower::Layer;

use crate::catalog::{ProductSource, StaticProductSource};
use crate::config::Config;
use crate::pages::product::prerender_product_pages;
use crate::rewrite::rewrite_request;
use crate::router;

pub async fn serve<F>(config: Config, listener: TcpListener, shutdown: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    serve_with_source(
        config,
        Arc::new(StaticProductSource::default()),
        listener,
        shutdown,
    )
    .await
}

pub async fn serve_with_source<F>(
    mut config: Config,
    source: Arc<dyn ProductSource + Send + Sync>,
    listener: TcpListener,
    shutdown: F,
) where
    F: Future<Output = ()> + Send + 'static,
{
    if config.flags_secret.is_empty() {
        tracing::warn!(
            "FLAGS_SECRET is not set, generating a random one. Override cookies and flag codes will not survive a restart"
        );
        config.flags_secret = rand::thread_rng()
            .sample_iter(Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
    }

    let state = router::State::new(config.clone(), source);

    if let Err(e) = prerender_product_pages(&state, &config.prerender_product_ids).await {
        tracing::error!("Failed to prerender product pages: {}", e);
    }

    // The rewrite has to run before routing, so it wraps the router instead
    // of being one of its layers.
    let rewrite = axum::middleware::from_fn_with_state(state.clone(), rewrite_request);
    let app = rewrite.layer(router::router(state));

    match listener.local_addr() {
        Ok(addr) => tracing::info!("listening on {:?}", addr),
        Err(e) => tracing::warn!("could not read listener address: {}", e),
    }
    if let Err(e) = axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown)
        .await
    {
        tracing::error!("Server error: {}", e);
    }
}
