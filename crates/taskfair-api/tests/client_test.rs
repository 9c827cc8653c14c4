#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskfair_api::endpoints::bookings::BookingScope;
use taskfair_api::endpoints::payments::RequestWithdrawal;
use taskfair_api::endpoints::providers::{ProviderSearch, ProviderSort};
use taskfair_api::endpoints::quotes::SubmitQuote;
use taskfair_api::{ApiClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

// ── Success-path tests ──────────────────────────────────────────────

#[tokio::test]
async fn test_list_categories() {
    let (server, client) = setup().await;

    let envelope = json!({
        "message": "ok",
        "data": [
            { "id": "cat-1", "name": "Cleaning", "provider_count": 42 },
            { "id": "cat-2", "name": "Plumbing" }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/get-categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&envelope))
        .mount(&server)
        .await;

    let categories = client.list_categories().await.unwrap();

    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].id, "cat-1");
    assert_eq!(categories[0].name, "Cleaning");
    assert_eq!(categories[0].provider_count, Some(42));
    assert_eq!(categories[1].provider_count, None);
}

#[tokio::test]
async fn test_search_providers_posts_criteria() {
    let (server, client) = setup().await;

    let envelope = json!({
        "data": [{
            "id": "prov-1",
            "name": "Ada's Plumbing",
            "category": "Plumbing",
            "rating": 4.8,
            "review_count": 120,
            "hourly_rate": "65.00",
            "is_verified": true
        }]
    });

    Mock::given(method("POST"))
        .and(path("/provider/search"))
        .and(body_json(json!({
            "category_id": "cat-2",
            "sort_by": "top_rated"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&envelope))
        .mount(&server)
        .await;

    let search = ProviderSearch {
        category_id: Some("cat-2".into()),
        sort_by: Some(ProviderSort::TopRated),
        ..ProviderSearch::default()
    };
    let providers = client.search_providers(&search).await.unwrap();

    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].name, "Ada's Plumbing");
    assert_eq!(providers[0].hourly_rate.as_deref(), Some("65.00"));
}

#[tokio::test]
async fn test_bearer_token_attached() {
    let (server, client) = setup().await;
    client.set_token(Some(SecretString::from("test-token".to_string())));

    Mock::given(method("POST"))
        .and(path("/booking/list"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let bookings = client.list_bookings(BookingScope::Upcoming).await.unwrap();
    assert!(bookings.is_empty());
}

#[tokio::test]
async fn test_cancel_booking_ack() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/booking/cancel"))
        .and(body_json(json!({ "booking_id": "bk-9" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Booking cancelled" })),
        )
        .mount(&server)
        .await;

    let ack = client.cancel_booking("bk-9").await.unwrap();
    assert_eq!(ack.message.as_deref(), Some("Booking cancelled"));
}

#[tokio::test]
async fn test_submit_quote_with_attachment_is_multipart() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/provider/quotes/submit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "id": "q-1", "request_id": "req-1", "status": "submitted" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let quote = SubmitQuote {
        request_id: "req-1".into(),
        price: "180.00".into(),
        message: "Can start Monday".into(),
    };
    let submitted = client
        .submit_quote_with_attachment(&quote, "estimate.pdf".into(), b"%PDF-1.4".to_vec())
        .await
        .unwrap();

    assert_eq!(submitted.id, "q-1");
    assert_eq!(submitted.request_id, "req-1");
}

// ── Error-classification tests ──────────────────────────────────────

#[tokio::test]
async fn test_error_envelope_wins_over_http_200() {
    let (server, client) = setup().await;

    // The body's error field is authoritative even on a 2xx.
    Mock::given(method("GET"))
        .and(path("/provider/bank-accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": { "msg": "Account not verified", "code": "E_VERIFY" }
        })))
        .mount(&server)
        .await;

    let result = client.list_bank_accounts().await;

    match result {
        Err(Error::Api {
            ref message,
            ref code,
            status,
        }) => {
            assert_eq!(message, "Account not verified");
            assert_eq!(code.as_deref(), Some("E_VERIFY"));
            assert_eq!(status, 200);
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_2xx_without_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/provider/withdrawals"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let result = client.list_withdrawals().await;

    match result {
        Err(Error::Api { ref message, status, .. }) => {
            assert!(message.contains("HTTP 500"), "got message: {message}");
            assert_eq!(status, 500);
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/provider/dashboard"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "msg": "Token expired" }
        })))
        .mount(&server)
        .await;

    let result = client.get_dashboard().await;

    assert!(matches!(result, Err(Error::Unauthorized)));
    assert!(result.unwrap_err().is_auth_expired());
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/get-categories"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let result = client.list_categories().await;

    match result {
        Err(Error::Deserialization { ref body, .. }) => {
            assert!(body.contains("not json"));
        }
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url);
    // Shut the server down so the port refuses connections.
    drop(server);

    let result = client.list_categories().await;

    match result {
        Err(ref e @ Error::Transport(_)) => assert!(e.is_transient()),
        other => panic!("expected Transport error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_withdrawal_request_round_trip() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/provider/withdrawals/request"))
        .and(body_json(json!({
            "amount": "250.00",
            "bank_account_id": "acct-1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": "wd-1",
                "amount": "250.00",
                "status": "pending",
                "requested_at": "2025-11-02T09:30:00Z"
            }
        })))
        .mount(&server)
        .await;

    let withdrawal = client
        .request_withdrawal(&RequestWithdrawal {
            amount: "250.00".into(),
            bank_account_id: "acct-1".into(),
        })
        .await
        .unwrap();

    assert_eq!(withdrawal.id, "wd-1");
    assert_eq!(withdrawal.status.as_deref(), Some("pending"));
}
