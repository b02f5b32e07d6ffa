#![allow(clippy::unwrap_used)]
// Market facade against a wiremock backend.

mod common;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_stream::StreamExt;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use common::Fixture;
use dealdrop_core::{
    CommentId, CoreError, DealId, FilterCriteria, Market, Role, SortBy, VendorId,
};

fn deal_json(id: &str, title: &str, price: f64) -> serde_json::Value {
    json!({
        "_id": id,
        "title": title,
        "category": "electronics",
        "originalPrice": price * 2.0,
        "discountedPrice": price,
        "status": "active",
        "vendor": "v1",
        "likes": []
    })
}

async fn mount_active_deals(fixture: &Fixture) {
    Mock::given(method("GET"))
        .and(path("/api/deals"))
        .and(query_param("status", "active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            deal_json("d1", "Headphones", 10.0),
            deal_json("d2", "Kettle", 5.0),
            deal_json("d3", "Lamp", 20.0),
        ])))
        .mount(&fixture.server)
        .await;
}

// ── Browsing ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_browse_loads_catalog_and_sorts() {
    let fixture = Fixture::start().await;
    mount_active_deals(&fixture).await;
    let market = fixture.market();

    let criteria = FilterCriteria {
        sort_by: SortBy::PriceLow,
        ..FilterCriteria::default()
    };
    let page = market.browse(&criteria, 1).await.unwrap();

    let ids: Vec<&str> = page.items.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["d2", "d1", "d3"]);
    assert_eq!(page.total_items, 3);
    assert!(!page.has_next());
}

#[tokio::test]
async fn test_browse_saved_only_uses_store() {
    let fixture = Fixture::start().await;
    mount_active_deals(&fixture).await;
    let market = fixture.market();

    market.toggle_save(&DealId::new("d3")).unwrap();
    let criteria = FilterCriteria {
        show_saved_only: true,
        ..FilterCriteria::default()
    };
    let page = market.browse(&criteria, 1).await.unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id.as_str(), "d3");
}

#[tokio::test]
async fn test_deal_stream_yields_current_then_refreshed_catalog() {
    let fixture = Fixture::start().await;
    mount_active_deals(&fixture).await;
    let market = fixture.market();

    let mut deals = market.deals().into_stream();
    assert!(deals.next().await.unwrap().is_empty());

    market
        .refresh_deals(Some(dealdrop_core::DealStatus::Active))
        .await
        .unwrap();
    let snapshot = deals.next().await.unwrap();
    let ids: Vec<&str> = snapshot.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["d1", "d2", "d3"]);
}

#[tokio::test]
async fn test_store_stream_sees_saves() {
    let fixture = Fixture::start().await;
    let market = fixture.market();

    let mut states = market.store().subscribe().into_stream();
    assert!(states.next().await.unwrap().saved.is_empty());

    market.toggle_save(&DealId::new("d2")).unwrap();
    let state = states.next().await.unwrap();
    assert!(state.is_saved(&DealId::new("d2")));
}

#[tokio::test]
async fn test_saved_deals_skip_removed() {
    let fixture = Fixture::start().await;
    Mock::given(method("GET"))
        .and(path("/api/deals/d1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(deal_json("d1", "Headphones", 10.0)))
        .mount(&fixture.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/deals/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "no such deal" })))
        .mount(&fixture.server)
        .await;

    let market = fixture.market();
    market.toggle_save(&DealId::new("gone")).unwrap();
    market.toggle_save(&DealId::new("d1")).unwrap();

    let saved = market.saved_deals().await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].title, "Headphones");
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_verify_login_persists_session_and_sends_bearer() {
    let fixture = Fixture::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/verify"))
        .and(body_partial_json(json!({ "token": "magic-123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "bearer-xyz",
            "user": { "_id": "u7", "email": "ada@example.com", "name": "Ada", "role": "user" }
        })))
        .mount(&fixture.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/deals/d1/like"))
        .and(header("authorization", "Bearer bearer-xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "likes": ["u7"] })))
        .expect(1)
        .mount(&fixture.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/deals/d1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(deal_json("d1", "Headphones", 10.0)))
        .mount(&fixture.server)
        .await;

    let market = fixture.market();
    let session = market.verify_login(" magic-123 ").await.unwrap();
    assert_eq!(session.user_id.as_str(), "u7");

    market.toggle_like(&DealId::new("d1")).await.unwrap();

    // A fresh market restores the session from disk.
    drop(market);
    let reopened = fixture.market();
    assert_eq!(reopened.session().unwrap().email, "ada@example.com");
}

#[tokio::test]
async fn test_request_login_rejects_non_email() {
    let fixture = Fixture::start().await;
    let market = fixture.market();
    let err = market.request_login("not-an-email").await.unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { .. }));
}

// ── Engagement ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_toggle_like_reconciles_with_backend() {
    let fixture = Fixture::start().await;
    fixture.sign_in(Role::User);
    mount_active_deals(&fixture).await;
    Mock::given(method("POST"))
        .and(path("/api/deals/d1/like"))
        .and(body_partial_json(json!({ "userId": "u1" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "likes": ["u1", "u2", "u3"] })),
        )
        .mount(&fixture.server)
        .await;

    let market = fixture.market();
    market.refresh_deals(Some(dealdrop_core::DealStatus::Active)).await.unwrap();

    let outcome = market.toggle_like(&DealId::new("d1")).await.unwrap();
    assert!(outcome.liked);
    assert_eq!(outcome.likes, 3);

    let snapshot = market.deals_snapshot();
    let d1 = snapshot.iter().find(|d| d.id.as_str() == "d1").unwrap();
    assert_eq!(d1.like_count(), 3);
    // Position in the listing is kept.
    assert_eq!(snapshot[0].id.as_str(), "d1");
}

#[tokio::test]
async fn test_toggle_like_reverts_on_failure() {
    let fixture = Fixture::start().await;
    fixture.sign_in(Role::User);
    mount_active_deals(&fixture).await;
    Mock::given(method("POST"))
        .and(path("/api/deals/d1/like"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .mount(&fixture.server)
        .await;

    let market = fixture.market();
    market.refresh_deals(Some(dealdrop_core::DealStatus::Active)).await.unwrap();

    let err = market.toggle_like(&DealId::new("d1")).await.unwrap_err();
    assert!(matches!(err, CoreError::Api { status: Some(500), .. }), "{err:?}");

    let snapshot = market.deals_snapshot();
    let d1 = snapshot.iter().find(|d| d.id.as_str() == "d1").unwrap();
    assert_eq!(d1.like_count(), 0);
}

#[tokio::test]
async fn test_like_requires_session() {
    let fixture = Fixture::start().await;
    let market = fixture.market();
    let err = market.toggle_like(&DealId::new("d1")).await.unwrap_err();
    assert!(matches!(err, CoreError::NotSignedIn));
}

#[tokio::test]
async fn test_add_to_cart_fetches_deal_price() {
    let fixture = Fixture::start().await;
    Mock::given(method("GET"))
        .and(path("/api/deals/d1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(deal_json("d1", "Headphones", 10.0)))
        .mount(&fixture.server)
        .await;

    let market = fixture.market();
    market.add_to_cart(&DealId::new("d1"), 2).await.unwrap();
    market.add_to_cart(&DealId::new("d1"), 1).await.unwrap();

    let cart = market.store().cart();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].quantity, 3);
    assert!((market.store().cart_total() - 30.0).abs() < f64::EPSILON);
}

// ── Comments ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_comment_thread_and_reply() {
    let fixture = Fixture::start().await;
    fixture.sign_in(Role::User);
    Mock::given(method("GET"))
        .and(path("/api/deals/d1/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "_id": "c1",
                "body": "Is this still available?",
                "replies": [
                    { "_id": "c2", "body": "Yes, until Friday." }
                ]
            },
            { "_id": "c3", "parentId": "c2", "body": "Thanks!" }
        ])))
        .mount(&fixture.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/deals/d1/comments"))
        .and(body_partial_json(json!({ "parentId": "c1", "authorId": "u1" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "_id": "c4",
            "body": "Ordered one",
            "author": { "_id": "u1" }
        })))
        .mount(&fixture.server)
        .await;

    let market = fixture.market();
    let deal = DealId::new("d1");
    let mut thread = market.comment_thread(&deal).await.unwrap();
    assert_eq!(thread.len(), 3);

    let depths: Vec<(String, usize)> = thread
        .walk()
        .iter()
        .map(|e| (e.comment.id.to_string(), e.depth))
        .collect();
    assert_eq!(
        depths,
        vec![("c1".into(), 0), ("c2".into(), 1), ("c3".into(), 2)]
    );

    let reply = market
        .post_comment(&mut thread, &deal, "  Ordered one ", Some(&CommentId::new("c1")))
        .await
        .unwrap();
    assert_eq!(reply.parent_id, Some(CommentId::new("c1")));
    assert_eq!(thread.replies(&CommentId::new("c1")).len(), 2);
}

#[tokio::test]
async fn test_reply_to_unknown_parent_is_rejected_locally() {
    let fixture = Fixture::start().await;
    fixture.sign_in(Role::User);
    Mock::given(method("GET"))
        .and(path("/api/deals/d1/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&fixture.server)
        .await;

    let market = fixture.market();
    let deal = DealId::new("d1");
    let mut thread = market.comment_thread(&deal).await.unwrap();
    let err = market
        .post_comment(&mut thread, &deal, "hello", Some(&CommentId::new("nope")))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
}

// ── Moderation ──────────────────────────────────────────────────────

async fn mount_approval(fixture: &Fixture) {
    Mock::given(method("PATCH"))
        .and(path("/api/deals/d1/status"))
        .and(body_partial_json(json!({ "status": "active" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(deal_json("d1", "Headphones", 10.0)))
        .mount(&fixture.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/vendors/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "v1",
            "businessName": "Acme Audio",
            "email": "owner@acme.test",
            "status": "active"
        })))
        .mount(&fixture.server)
        .await;
}

#[tokio::test]
async fn test_approve_deal_emails_vendor() {
    let fixture = Fixture::start().await;
    fixture.sign_in(Role::Admin);
    mount_approval(&fixture).await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("authorization", "Bearer re_test_123"))
        .and(body_partial_json(json!({ "to": ["owner@acme.test"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "em_1" })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let market = fixture.market();
    let moderated = market.approve_deal(&DealId::new("d1")).await.unwrap();
    assert!(moderated.notified);
    assert_eq!(moderated.item.title, "Headphones");
}

#[tokio::test]
async fn test_approve_deal_survives_email_failure() {
    let fixture = Fixture::start().await;
    fixture.sign_in(Role::Admin);
    mount_approval(&fixture).await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "down" })))
        .mount(&fixture.server)
        .await;

    let market = fixture.market();
    let moderated = market.approve_deal(&DealId::new("d1")).await.unwrap();
    assert!(!moderated.notified);
}

#[tokio::test]
async fn test_moderation_requires_admin() {
    let fixture = Fixture::start().await;
    fixture.sign_in(Role::User);
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&fixture.server)
        .await;

    let market = fixture.market();
    let err = market
        .suspend_vendor(&VendorId::new("v1"), Some("spam".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::PermissionDenied { .. }));
}

#[tokio::test]
async fn test_market_without_state_path_is_in_memory() {
    let fixture = Fixture::start().await;
    let mut config = fixture.config();
    config.state_path = None;
    let market = Market::new(config).unwrap();
    market.toggle_save(&DealId::new("d1")).unwrap();
    assert!(market.store().path().is_none());
    assert!(!fixture.state_path().exists());
}
