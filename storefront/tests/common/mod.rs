#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::{Method, Response};
use tokio::net::TcpListener;
use tokio::sync::Notify;

use storefront::catalog::ProductSource;
use storefront::config::Config;
use storefront::overrides::OVERRIDES_COOKIE_NAME;
use storefront::server::{serve, serve_with_source};

pub struct ServerHandle {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
    client: reqwest::Client,
}

impl ServerHandle {
    pub async fn for_config(config: Config) -> ServerHandle {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let notify = Arc::new(Notify::new());
        let shutdown = notify.clone();

        tokio::spawn(async move {
            serve(config, listener, async move { notify.notified().await }).await
        });
        ServerHandle::new(addr, shutdown)
    }

    pub async fn for_source(
        config: Config,
        source: Arc<dyn ProductSource + Send + Sync>,
    ) -> ServerHandle {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let notify = Arc::new(Notify::new());
        let shutdown = notify.clone();

        tokio::spawn(async move {
            serve_with_source(config, source, listener, async move {
                notify.notified().await
            })
            .await
        });
        ServerHandle::new(addr, shutdown)
    }

    fn new(addr: SocketAddr, shutdown: Arc<Notify>) -> ServerHandle {
        // Redirects are not followed so page responses can be inspected as served.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();
        ServerHandle {
            addr,
            shutdown,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{:?}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str, overrides_cookie: Option<&str>) -> Response {
        self.request(Method::GET, path, overrides_cookie, None).await
    }

    pub async fn post_json<T: Into<reqwest::Body>>(
        &self,
        path: &str,
        body: T,
        overrides_cookie: Option<&str>,
    ) -> Response {
        self.request(Method::POST, path, overrides_cookie, Some(body.into()))
            .await
    }

    pub async fn delete(&self, path: &str, overrides_cookie: Option<&str>) -> Response {
        self.request(Method::DELETE, path, overrides_cookie, None)
            .await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        overrides_cookie: Option<&str>,
        body: Option<reqwest::Body>,
    ) -> Response {
        let mut request = self.client.request(method, self.url(path));
        if let Some(value) = overrides_cookie {
            request = request.header(COOKIE, format!("{OVERRIDES_COOKIE_NAME}={value}"));
        }
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }
        request.send().await.expect("failed to send request")
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.shutdown.notify_one()
    }
}

/// The raw `Set-Cookie` header for the overrides cookie, if the response has one.
pub fn overrides_set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&format!("{OVERRIDES_COOKIE_NAME}=")))
        .map(str::to_string)
}

/// The overrides cookie value set by the response, as a browser would store it.
pub fn overrides_cookie_value(response: &Response) -> Option<String> {
    let header = overrides_set_cookie(response)?;
    let pair = header.split(';').next()?;
    let (_, value) = pair.split_once('=')?;
    Some(value.to_string())
}
