//! Route contracts of the bridge API against a mock upstream.

use axum::http::{Method, StatusCode};
use commerce_bridge_integration_tests::{GRAPHQL_PATH, TestContext, request, store_path};
use serde_json::{Value, json};
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{body_partial_json, body_string_contains, method, path, query_param},
};

fn category(id: i64, parent_id: i64, name: &str, sort_order: i64) -> Value {
    json!({
        "id": id,
        "parent_id": parent_id,
        "name": name,
        "sort_order": sort_order,
        "custom_url": {"url": format!("/{}/", name.to_lowercase()), "is_customized": false},
    })
}

async fn mount_categories(ctx: &TestContext) {
    Mock::given(method("GET"))
        .and(path(store_path("/v3/catalog/categories")))
        .and(query_param("page", "1"))
        .and(query_param("limit", "250"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                category(18, 0, "Bath", 1),
                category(19, 18, "Towels", 0),
                category(20, 0, "Kitchen", 2),
                category(21, 18, "Soap", 1),
                category(23, 0, "Sale", 0),
            ],
            "meta": {"pagination": {"total": 5, "count": 5, "per_page": 250, "current_page": 1, "total_pages": 1}},
        })))
        .mount(&ctx.upstream)
        .await;
}

async fn mount_content_pages(ctx: &TestContext) {
    Mock::given(method("GET"))
        .and(path(store_path("/v3/content/pages")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": 7, "name": "About", "url": "/about/"},
                {"id": 8, "name": "Shipping", "url": "/shipping/"},
            ],
        })))
        .mount(&ctx.upstream)
        .await;
}

fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .map(|items| items.iter().filter_map(|item| item["id"].as_i64()).collect())
        .unwrap_or_default()
}

// ============================================================================
// Service
// ============================================================================

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!("ok"));
    assert!(response.header("x-request-id").is_some());
}

// ============================================================================
// Categories
// ============================================================================

#[tokio::test]
async fn test_category_listing_is_flattened_tree() {
    let ctx = TestContext::new().await;
    mount_categories(&ctx).await;

    let response = ctx.get("/categories").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(ids(&response.body), vec![23, 18, 19, 21, 20]);
    assert_eq!(response.body[0], json!({"id": 23, "label": "Sale"}));
    assert_eq!(response.header("x-total"), Some("5"));
    assert_eq!(response.header("x-hasnext"), Some("false"));
}

#[tokio::test]
async fn test_category_listing_filters() {
    let ctx = TestContext::new().await;
    mount_categories(&ctx).await;

    let response = ctx.get("/categories?parentId=18&keyword=SOAP").await;

    assert_eq!(ids(&response.body), vec![21]);
    assert_eq!(response.header("x-total"), Some("1"));
}

#[tokio::test]
async fn test_category_tree() {
    let ctx = TestContext::new().await;
    mount_categories(&ctx).await;

    let response = ctx.get("/categories/tree").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!([
            {"id": 23, "label": "Sale"},
            {"id": 18, "label": "Bath", "children": [
                {"id": 19, "label": "Towels"},
                {"id": 21, "label": "Soap"},
            ]},
            {"id": 20, "label": "Kitchen"},
        ])
    );
    assert_eq!(response.header("x-total"), Some("5"));
}

#[tokio::test]
async fn test_categories_by_ids_ignores_garbage() {
    let ctx = TestContext::new().await;
    mount_categories(&ctx).await;

    let response = ctx.get("/categories/ids/20,abc,0,19").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(ids(&response.body), vec![19, 20]);
}

#[tokio::test]
async fn test_category_storefront_url_uses_index() {
    let ctx = TestContext::new().await;
    mount_categories(&ctx).await;

    let first = ctx.get("/storefront-url?type=category&id=21").await;
    let second = ctx.get("/storefront-url?type=category&id=18").await;
    let missing = ctx.get("/storefront-url?type=category&id=999").await;

    assert_eq!(first.body, json!({"url": "/soap/"}));
    assert_eq!(second.body, json!({"url": "/bath/"}));
    assert_eq!(missing.body, json!({"url": null}));
    assert_eq!(ctx.upstream_requests("/v3/catalog/categories").await.len(), 1);
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_product_listing() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path(store_path("/v3/catalog/products")))
        .and(query_param("page", "2"))
        .and(query_param("include_fields", "name,sku"))
        .and(query_param("include", "primary_image"))
        .and(query_param("keyword", "chemex"))
        .and(query_param("categories:in", "18"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": 88,
                "name": "Chemex Coffeemaker 3 Cup",
                "sku": "CC3C",
                "primary_image": {"url_thumbnail": "https://cdn.example.com/t.jpg", "url_standard": "https://cdn.example.com/s.jpg"},
            }],
            "meta": {"pagination": {"total": 3, "count": 1, "per_page": 1, "current_page": 2, "total_pages": 3}},
        })))
        .expect(1)
        .mount(&ctx.upstream)
        .await;

    let response = ctx
        .get("/products?categoryId=18&keyword=chemex&page=2&lang=en")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!([{
            "id": 88,
            "label": "Chemex Coffeemaker 3 Cup",
            "extract": "CC3C",
            "thumbnail": "https://cdn.example.com/t.jpg",
            "image": "https://cdn.example.com/s.jpg",
        }])
    );
    assert_eq!(response.header("x-total"), Some("3"));
    assert_eq!(response.header("x-hasnext"), Some("true"));
}

#[tokio::test]
async fn test_product_storefront_url() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path(store_path("/v3/catalog/products/86")))
        .and(query_param("include_fields", "custom_url"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": 86, "custom_url": {"url": "/able-brewing-system/"}},
        })))
        .mount(&ctx.upstream)
        .await;

    let found = ctx.get("/storefront-url?type=product&id=86").await;
    let missing = ctx.get("/storefront-url?type=product&id=87").await;

    assert_eq!(found.body, json!({"url": "/able-brewing-system/"}));
    assert_eq!(missing.status, StatusCode::OK);
    assert_eq!(missing.body, json!({"url": null}));
}

// ============================================================================
// Content
// ============================================================================

#[tokio::test]
async fn test_content_listing_and_by_ids() {
    let ctx = TestContext::new().await;
    mount_content_pages(&ctx).await;

    let listing = ctx.get("/content?q=Ab").await;
    let by_ids = ctx.get("/content/ids/8").await;

    assert_eq!(listing.status, StatusCode::OK);
    assert_eq!(listing.body[0], json!({"id": 7, "label": "About", "extract": "/about/"}));
    assert_eq!(listing.header("x-total"), Some("2"));
    assert_eq!(ids(&by_ids.body), vec![8]);

    let requests = ctx.upstream_requests("/v3/content/pages").await;
    assert_eq!(requests[0].url.query(), Some("name%3Alike=Ab&limit=250"));
}

#[tokio::test]
async fn test_content_create_stores_embed_code() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path(store_path("/v3/content/pages")))
        .and(body_partial_json(json!({
            "type": "page",
            "name": "Über uns",
            "url": "/ueber-uns",
            "is_visible": true,
            "body": "",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": 42, "name": "Über uns"}})))
        .expect(1)
        .mount(&ctx.upstream)
        .await;
    Mock::given(method("PUT"))
        .and(path(store_path("/v3/content/pages/42")))
        .and(body_string_contains("&lt;caas-content content=\\\"42\\\" /&gt;"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": 42}})))
        .expect(1)
        .mount(&ctx.upstream)
        .await;

    let body = json!({
        "label": {"de": "Über uns", "en": "About us"},
        "path": {"de": "ueber-uns", "en": "about-us"},
        "released": true,
    });
    let response = ctx
        .send(request(Method::POST, "/content?lang=de", Some(&body)))
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body, json!({"id": 42}));
}

#[tokio::test]
async fn test_content_create_unique_name_is_field_error() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path(store_path("/v3/content/pages")))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "status": 422,
            "title": "Unprocessable Entity",
            "detail": "Name 'About' must be unique",
        })))
        .mount(&ctx.upstream)
        .await;

    let response = ctx
        .send(request(Method::POST, "/content", Some(&json!({"label": "About"}))))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        json!({
            "message": "Invalid field in body",
            "cause": [{"field": "label", "cause": "mustBeUnique", "code": "FIELD_MUST_BE_UNIQUE"}],
        })
    );
}

#[tokio::test]
async fn test_content_create_message_list_is_rejection() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path(store_path("/v3/content/pages")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!([{"message": "url is taken"}])))
        .mount(&ctx.upstream)
        .await;

    let response = ctx
        .send(request(Method::POST, "/content", Some(&json!({"label": "About"}))))
        .await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["message"], "url is taken");
    assert_eq!(response.body["status"], 400);
}

#[tokio::test]
async fn test_content_create_embed_failure_names_page() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path(store_path("/v3/content/pages")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": 43}})))
        .mount(&ctx.upstream)
        .await;
    Mock::given(method("PUT"))
        .and(path(store_path("/v3/content/pages/43")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ctx.upstream)
        .await;

    let response = ctx
        .send(request(Method::POST, "/content", Some(&json!({"label": "Orphan"}))))
        .await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert!(response.body["message"].as_str().unwrap_or_default().contains("43"));
}

#[tokio::test]
async fn test_content_update_and_delete_invalidate_index() {
    let ctx = TestContext::new().await;
    mount_content_pages(&ctx).await;
    Mock::given(method("PUT"))
        .and(path(store_path("/v3/content/pages/7")))
        .and(body_partial_json(json!({"name": "About us", "url": "/about-us"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": 7}})))
        .expect(1)
        .mount(&ctx.upstream)
        .await;
    Mock::given(method("DELETE"))
        .and(path(store_path("/v3/content/pages/8")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&ctx.upstream)
        .await;

    assert_eq!(ctx.get("/storefront-url?type=content&id=7").await.body, json!({"url": "/about/"}));

    let updated = ctx
        .send(request(
            Method::PUT,
            "/content/7",
            Some(&json!({"label": "About us", "path": "about-us"})),
        ))
        .await;
    assert_eq!(updated.status, StatusCode::NO_CONTENT);

    ctx.get("/storefront-url?type=content&id=7").await;

    let deleted = ctx.send(request(Method::DELETE, "/content/8", None)).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    ctx.get("/storefront-url?type=content&id=7").await;

    let index_loads = ctx
        .upstream_requests("/v3/content/pages")
        .await
        .into_iter()
        .filter(|r| r.method.as_str() == "GET")
        .count();
    assert_eq!(index_loads, 3);
}

// ============================================================================
// URL lookup
// ============================================================================

#[tokio::test]
async fn test_lookup_falls_back_to_content() {
    let ctx = TestContext::new().await;
    ctx.mount_token("tok-1").await;
    mount_content_pages(&ctx).await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"site": {"route": {"node": null}}},
        })))
        .mount(&ctx.upstream)
        .await;

    let page = ctx.get("/lookup-url?url=/shipping/").await;
    let home = ctx.get("/lookup-url?url=/").await;
    let miss = ctx.get("/lookup-url?url=/nowhere/").await;

    assert_eq!(page.body, json!({"id": 8, "type": "content"}));
    assert_eq!(home.body, json!({"id": "/", "type": "content"}));
    assert_eq!(miss.status, StatusCode::OK);
    assert_eq!(miss.body, json!({}));
}

#[tokio::test]
async fn test_lookup_without_url_is_empty() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/lookup-url").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({}));
    assert!(ctx.upstream.received_requests().await.unwrap_or_default().is_empty());
}

// ============================================================================
// Parameter validation
// ============================================================================

#[tokio::test]
async fn test_invalid_numeric_params_are_bad_requests() {
    let ctx = TestContext::new().await;

    for (uri, name) in [
        ("/categories?page=two", "page"),
        ("/categories/tree?parentId=root", "parentId"),
        ("/products?categoryId=x", "categoryId"),
        ("/content?page=-1", "page"),
        ("/storefront-url?type=product&id=abc", "id"),
        ("/storefront-url?type=product", "id"),
    ] {
        let response = ctx.get(uri).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(
            response.body,
            json!({"message": format!("Invalid value for '{name}'")}),
            "{uri}"
        );
    }

    let response = ctx.send(request(Method::DELETE, "/content/abc", None)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        json!({"message": "Invalid value for 'contentId': abc"})
    );
    assert!(ctx.upstream.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path(store_path("/v3/catalog/categories")))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"status": 503, "title": "Service Unavailable"})))
        .mount(&ctx.upstream)
        .await;

    let response = ctx.get("/categories").await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["error"], true);
    assert_eq!(response.body["status"], 503);
    assert_eq!(response.body["data"]["title"], "Service Unavailable");
}
