#![allow(clippy::unwrap_used)]
// Integration tests for `MarketClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dealdrop_api::models::{DealStatusUpdate, NewComment, OrderItem, OrderRequest};
use dealdrop_api::{Error, IDEMPOTENCY_HEADER, MarketClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, MarketClient) {
    let server = MockServer::start().await;
    let client =
        MarketClient::from_reqwest(&format!("{}/api", server.uri()), reqwest::Client::new())
            .unwrap();
    (server, client)
}

// ── Deals ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_deals_bare_array() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/deals"))
        .and(query_param("status", "active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "d1", "title": "Blender", "originalPrice": 100, "discountedPrice": 60 },
            { "_id": "d2", "title": "Kettle", "originalPrice": "40", "discountedPrice": "30" }
        ])))
        .mount(&server)
        .await;

    let deals = client.list_deals(Some("active")).await.unwrap();

    assert_eq!(deals.len(), 2);
    assert_eq!(deals[0].title, "Blender");
    assert_eq!(deals[1].original_price, Some(40.0));
}

#[tokio::test]
async fn test_deal_id_is_sent_as_one_segment() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/deals/..%2Fvendors%2Fx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "../vendors/x", "title": "Odd id"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/vendors/x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "_id": "x" })))
        .expect(0)
        .mount(&server)
        .await;

    let deal = client.get_deal("../vendors/x").await.unwrap();
    assert_eq!(deal.title, "Odd id");

    let err = client.get_deal("..").await.unwrap_err();
    assert!(matches!(err, Error::InvalidPathSegment { .. }), "{err:?}");
}

#[tokio::test]
async fn test_list_deals_wrapped() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/deals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "d1", "title": "Blender" }]
        })))
        .mount(&server)
        .await;

    let deals = client.list_deals(None).await.unwrap();
    assert_eq!(deals.len(), 1);
    assert_eq!(deals[0].id, "d1");
}

#[tokio::test]
async fn test_toggle_like_sends_bearer_and_returns_likes() {
    let (server, client) = setup().await;
    client.set_token(Some("session-token".to_string().into()));

    Mock::given(method("POST"))
        .and(path("/api/deals/d1/like"))
        .and(header("authorization", "Bearer session-token"))
        .and(body_json(json!({ "userId": "u1" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "likes": ["u1", "u7"] })),
        )
        .mount(&server)
        .await;

    let likes = client.toggle_like("d1", "u1").await.unwrap();
    assert_eq!(likes, vec!["u1".to_string(), "u7".to_string()]);
}

#[tokio::test]
async fn test_set_deal_status() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/deals/d1/status"))
        .and(body_json(json!({ "status": "rejected", "reason": "blurry photos" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "_id": "d1", "title": "Blender", "status": "rejected" }
        })))
        .mount(&server)
        .await;

    let deal = client
        .set_deal_status(
            "d1",
            &DealStatusUpdate {
                status: "rejected".into(),
                reason: Some("blurry photos".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(deal.status.as_deref(), Some("rejected"));
}

// ── Orders ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_order_carries_idempotency_key() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(header(IDEMPOTENCY_HEADER, "key-123"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "_id": "o1", "total": 120.5, "paymentReference": "ref-1"
        })))
        .mount(&server)
        .await;

    let order = client
        .create_order(
            &OrderRequest {
                user_id: "u1".into(),
                items: vec![OrderItem {
                    deal_id: "d1".into(),
                    quantity: 1,
                    unit_price: 120.5,
                }],
                payment_reference: "ref-1".into(),
            },
            "key-123",
        )
        .await
        .unwrap();

    assert_eq!(order.id, "o1");
    assert_eq!(order.total, Some(120.5));
}

// ── Comments ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_post_comment_reply() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/deals/d1/comments"))
        .and(body_json(json!({ "body": "same here", "parentId": "c1", "authorId": "u2" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "_id": "c2", "parentId": "c1", "author": { "_id": "u2" }, "content": "same here"
        })))
        .mount(&server)
        .await;

    let comment = client
        .post_comment(
            "d1",
            &NewComment {
                body: "same here".into(),
                parent_id: Some("c1".into()),
                author_id: "u2".into(),
            },
        )
        .await
        .unwrap();

    assert_eq!(comment.id, "c2");
    assert_eq!(comment.parent_id.as_deref(), Some("c1"));
    assert_eq!(comment.author_id.as_deref(), Some("u2"));
    assert_eq!(comment.body, "same here");
}

// ── Error mapping ───────────────────────────────────────────────────

#[tokio::test]
async fn test_error_message_is_surfaced() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/vendors/v1/status"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "message": "unknown status" })),
        )
        .mount(&server)
        .await;

    let result = client
        .set_vendor_status(
            "v1",
            &dealdrop_api::models::VendorStatusUpdate {
                status: "sleeping".into(),
                reason: None,
            },
        )
        .await;

    match result {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 422);
            assert_eq!(message, "unknown status");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthorized_and_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/deals/d1/vote"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "expired" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/deals/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let vote = client.vote("d1", "u1", 1).await;
    assert!(matches!(vote, Err(ref e) if e.is_auth_expired()), "got {vote:?}");

    let missing = client.get_deal("missing").await;
    assert!(matches!(missing, Err(ref e) if e.is_not_found()), "got {missing:?}");
}

#[tokio::test]
async fn test_malformed_body_keeps_raw_text() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/vendor-plans"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    match client.list_vendor_plans().await {
        Err(Error::Deserialization { body, .. }) => assert!(body.contains("oops")),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}
