#![allow(clippy::unwrap_used)]
// Integration tests for the Paystack and Resend clients using wiremock.

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dealdrop_api::paystack::InitializeRequest;
use dealdrop_api::{Email, Error, PaystackClient, ResendClient, TransactionStatus, TransportConfig};

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

async fn paystack() -> (MockServer, PaystackClient) {
    let server = MockServer::start().await;
    let client = PaystackClient::new(
        Url::parse(&server.uri()).unwrap(),
        &secret("sk_test_abc"),
        &TransportConfig::default(),
    )
    .unwrap();
    (server, client)
}

// ── Paystack ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_initialize_returns_authorization() {
    let (server, client) = paystack().await;

    Mock::given(method("POST"))
        .and(path("/transaction/initialize"))
        .and(header("authorization", "Bearer sk_test_abc"))
        .and(body_partial_json(json!({ "amount": 250_000, "reference": "ref-9" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "message": "Authorization URL created",
            "data": {
                "authorization_url": "https://checkout.paystack.com/xyz",
                "access_code": "xyz",
                "reference": "ref-9"
            }
        })))
        .mount(&server)
        .await;

    let auth = client
        .initialize(&InitializeRequest {
            email: "buyer@example.com".into(),
            amount: 250_000,
            reference: "ref-9".into(),
            currency: Some("NGN".into()),
            callback_url: None,
            metadata: None,
        })
        .await
        .unwrap();

    assert_eq!(auth.authorization_url, "https://checkout.paystack.com/xyz");
    assert_eq!(auth.reference, "ref-9");
}

#[tokio::test]
async fn test_verify_reports_status() {
    let (server, client) = paystack().await;

    Mock::given(method("GET"))
        .and(path("/transaction/verify/ref-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "message": "Verification successful",
            "data": { "status": "abandoned", "reference": "ref-9", "amount": 250000 }
        })))
        .mount(&server)
        .await;

    let v = client.verify("ref-9").await.unwrap();
    assert_eq!(v.status, TransactionStatus::Abandoned);
    assert_eq!(v.amount, 250_000);
}

#[tokio::test]
async fn test_verify_unknown_reference() {
    let (server, client) = paystack().await;

    Mock::given(method("GET"))
        .and(path("/transaction/verify/nope"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status": false,
            "message": "Transaction reference not found"
        })))
        .mount(&server)
        .await;

    match client.verify("nope").await {
        Err(Error::Payment { message }) => assert!(message.contains("not found")),
        other => panic!("expected Payment error, got: {other:?}"),
    }
}

// ── Resend ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_send_email() {
    let server = MockServer::start().await;
    let client = ResendClient::new(
        Url::parse(&server.uri()).unwrap(),
        &secret("re_key"),
        &TransportConfig::default(),
    )
    .unwrap();

    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("authorization", "Bearer re_key"))
        .and(body_partial_json(json!({ "to": ["v@example.com"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "em_1" })))
        .mount(&server)
        .await;

    let id = client
        .send(&Email {
            from: "deals@example.com".into(),
            to: vec!["v@example.com".into()],
            subject: "Approved".into(),
            html: "<p>ok</p>".into(),
        })
        .await
        .unwrap();
    assert_eq!(id, "em_1");
}

#[tokio::test]
async fn test_send_email_rejected() {
    let server = MockServer::start().await;
    let client = ResendClient::new(
        Url::parse(&server.uri()).unwrap(),
        &secret("re_key"),
        &TransportConfig::default(),
    )
    .unwrap();

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "message": "invalid from" })),
        )
        .mount(&server)
        .await;

    let result = client
        .send(&Email {
            from: "bad".into(),
            to: vec!["v@example.com".into()],
            subject: "x".into(),
            html: String::new(),
        })
        .await;
    assert!(
        matches!(result, Err(Error::Email { status: 422, ref message }) if message == "invalid from"),
        "got {result:?}"
    );
}
