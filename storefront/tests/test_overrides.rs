use anyhow::Result;
use assert_json_diff::assert_json_eq;
use reqwest::StatusCode;
use serde_json::{json, Value};

use storefront::config::DEFAULT_TEST_CONFIG;

pub mod common;
use common::*;

#[tokio::test]
async fn it_returns_empty_overrides_without_cookie() -> Result<()> {
    let server = ServerHandle::for_config(DEFAULT_TEST_CONFIG.clone()).await;

    let res = server.get("/api/flag-overrides", None).await;
    assert_eq!(StatusCode::OK, res.status());
    assert_json_eq!(res.json::<Value>().await?, json!({"overrides": {}}));

    Ok(())
}

#[tokio::test]
async fn it_sets_the_overrides_cookie() -> Result<()> {
    let server = ServerHandle::for_config(DEFAULT_TEST_CONFIG.clone()).await;

    let res = server
        .post_json(
            "/api/flag-overrides",
            json!({"showNewLayout": true}).to_string(),
            None,
        )
        .await;
    assert_eq!(StatusCode::OK, res.status());

    let set_cookie = overrides_set_cookie(&res).expect("overrides cookie");
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(!set_cookie.contains("HttpOnly"));
    assert!(!set_cookie.contains("Secure"));
    assert!(!set_cookie.contains("showNewLayout"));

    assert_json_eq!(res.json::<Value>().await?, json!({"success": true}));

    Ok(())
}

#[tokio::test]
async fn it_merges_posted_overrides() -> Result<()> {
    let server = ServerHandle::for_config(DEFAULT_TEST_CONFIG.clone()).await;

    let res = server
        .post_json(
            "/api/flag-overrides",
            json!({"showNewLayout": true, "enablePromoBanner": true}).to_string(),
            None,
        )
        .await;
    let cookie = overrides_cookie_value(&res).expect("overrides cookie");

    let res = server
        .post_json(
            "/api/flag-overrides",
            json!({"enablePromoBanner": false}).to_string(),
            Some(&cookie),
        )
        .await;
    assert_eq!(StatusCode::OK, res.status());
    let cookie = overrides_cookie_value(&res).expect("overrides cookie");

    let res = server.get("/api/flag-overrides", Some(&cookie)).await;
    assert_eq!(StatusCode::OK, res.status());
    assert_json_eq!(
        res.json::<Value>().await?,
        json!({"overrides": {"showNewLayout": true, "enablePromoBanner": false}})
    );

    Ok(())
}

#[tokio::test]
async fn it_clears_overrides_on_delete() -> Result<()> {
    let server = ServerHandle::for_config(DEFAULT_TEST_CONFIG.clone()).await;

    let res = server
        .post_json(
            "/api/flag-overrides",
            json!({"showNewLayout": true}).to_string(),
            None,
        )
        .await;
    let cookie = overrides_cookie_value(&res).expect("overrides cookie");

    let res = server.delete("/api/flag-overrides", Some(&cookie)).await;
    assert_eq!(StatusCode::OK, res.status());
    let set_cookie = overrides_set_cookie(&res).expect("removal cookie");
    assert!(set_cookie.contains("Max-Age=0"));
    let cleared = overrides_cookie_value(&res).expect("removal cookie");
    assert_eq!(cleared, "");
    assert_json_eq!(res.json::<Value>().await?, json!({"success": true}));

    let res = server.get("/api/flag-overrides", Some(&cleared)).await;
    assert_json_eq!(res.json::<Value>().await?, json!({"overrides": {}}));

    Ok(())
}

#[tokio::test]
async fn it_ignores_a_tampered_cookie() -> Result<()> {
    let server = ServerHandle::for_config(DEFAULT_TEST_CONFIG.clone()).await;

    let res = server.get("/api/flag-overrides", Some("not-a-token")).await;
    assert_eq!(StatusCode::OK, res.status());
    assert_json_eq!(res.json::<Value>().await?, json!({"overrides": {}}));

    let res = server.get("/", Some("not-a-token")).await;
    assert_eq!(StatusCode::OK, res.status());

    Ok(())
}

#[tokio::test]
async fn it_rejects_non_object_overrides() -> Result<()> {
    let server = ServerHandle::for_config(DEFAULT_TEST_CONFIG.clone()).await;

    let res = server
        .post_json("/api/flag-overrides", "[true]", None)
        .await;
    assert_eq!(StatusCode::BAD_REQUEST, res.status());
    assert!(overrides_set_cookie(&res).is_none());

    let res = server.post_json("/api/flag-overrides", "{", None).await;
    assert_eq!(StatusCode::BAD_REQUEST, res.status());
    assert_json_eq!(
        res.json::<Value>().await?,
        json!({"success": false, "message": "Invalid JSON payload."})
    );

    Ok(())
}
