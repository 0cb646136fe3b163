//! Storefront token handling of the GraphQL transport.
//!
//! Exercised through `/lookup-url`, which resolves paths with the storefront
//! GraphQL route query.

use axum::http::StatusCode;
use commerce_bridge_integration_tests::{GRAPHQL_PATH, TestContext, store_path};
use serde_json::json;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

fn category_route() -> serde_json::Value {
    json!({
        "data": {"site": {"route": {"node": {"__typename": "Category", "entityId": 18}}}}
    })
}

/// First token issued is `tok-1`, every later one `tok-2`.
async fn mount_rotating_tokens(ctx: &TestContext) {
    Mock::given(method("POST"))
        .and(path(store_path("/v3/storefront/api-token")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"token": "tok-1"}})))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&ctx.upstream)
        .await;
    ctx.mount_token("tok-2").await;
}

// ============================================================================
// Token issue
// ============================================================================

#[tokio::test]
async fn test_token_issued_once_and_reused() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path(store_path("/v3/storefront/api-token")))
        .and(header("X-Auth-Client", "client_1234"))
        .and(header("X-Auth-Token", "tok_9f8e7d6c"))
        .and(body_partial_json(json!({"channel_id": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"token": "tok-1"}})))
        .expect(1)
        .mount(&ctx.upstream)
        .await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(category_route()))
        .expect(2)
        .mount(&ctx.upstream)
        .await;

    for _ in 0..2 {
        let response = ctx.get("/lookup-url?url=/bath/").await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, json!({"id": 18, "type": "category"}));
    }
}

#[tokio::test]
async fn test_route_path_is_sent_as_variable() {
    let ctx = TestContext::new().await;
    ctx.mount_token("tok-1").await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_partial_json(json!({
            "operationName": "LookupRoute",
            "variables": {"path": "/bath/"},
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(category_route()))
        .expect(1)
        .mount(&ctx.upstream)
        .await;

    let response = ctx.get("/lookup-url?url=/bath/").await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_token_endpoint_failure_is_bad_gateway() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path(store_path("/v3/storefront/api-token")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"status": 403, "title": "Forbidden"})))
        .mount(&ctx.upstream)
        .await;

    let response = ctx.get("/lookup-url?url=/bath/").await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["error"], true);
}

// ============================================================================
// Refresh on 401
// ============================================================================

#[tokio::test]
async fn test_single_401_is_retried_with_new_token() {
    let ctx = TestContext::new().await;
    mount_rotating_tokens(&ctx).await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&ctx.upstream)
        .await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(header("Authorization", "Bearer tok-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(category_route()))
        .expect(1)
        .mount(&ctx.upstream)
        .await;

    let response = ctx.get("/lookup-url?url=/bath/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({"id": 18, "type": "category"}));
    assert_eq!(ctx.upstream_requests("/v3/storefront/api-token").await.len(), 2);
}

#[tokio::test]
async fn test_second_401_is_not_retried() {
    let ctx = TestContext::new().await;
    mount_rotating_tokens(&ctx).await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"status": 401, "title": "Unauthorized"})))
        .expect(2)
        .mount(&ctx.upstream)
        .await;

    let response = ctx.get("/lookup-url?url=/bath/").await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["error"], true);
    assert_eq!(response.body["status"], 401);
    assert_eq!(ctx.upstream_requests("/v3/storefront/api-token").await.len(), 2);
}

#[tokio::test]
async fn test_graphql_errors_are_bad_gateway() {
    let ctx = TestContext::new().await;
    ctx.mount_token("tok-1").await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{"message": "Field 'route' is missing arguments", "path": ["site", "route"]}],
        })))
        .mount(&ctx.upstream)
        .await;

    let response = ctx.get("/lookup-url?url=/bath/").await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
}
