#![allow(clippy::unwrap_used)]
// Integration tests for the query cache: de-duplication, refetch
// coalescing, stale-settle discard, eviction, and error handling.

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskfair_api::endpoints::payments::list_bank_accounts_request;
use taskfair_api::{ApiClient, ApiRequest};
use taskfair_core::{QueryCache, QueryKey};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, QueryCache) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url);
    (server, QueryCache::new(client))
}

fn accounts_envelope(ids: &[&str]) -> serde_json::Value {
    json!({
        "data": ids.iter().map(|id| json!({
            "id": id,
            "bank_name": "First Bank",
            "account_name": "Ada L.",
            "last_four": "1234"
        })).collect::<Vec<_>>()
    })
}

// ── De-duplication ──────────────────────────────────────────────────

#[tokio::test]
async fn concurrent_subscribers_share_one_request() {
    let (server, cache) = setup().await;

    Mock::given(method("GET"))
        .and(path("/provider/bank-accounts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(accounts_envelope(&["acct-1"]))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Two screens mount simultaneously with the same key: the second
    // subscription must attach to the in-flight request.
    let mut first = cache.subscribe::<serde_json::Value>(
        QueryKey::from(["provider_accounts"]),
        list_bank_accounts_request(),
    );
    let mut second = cache.subscribe::<serde_json::Value>(
        QueryKey::from(["provider_accounts"]),
        list_bank_accounts_request(),
    );

    let (a, b) = tokio::join!(first.refetch(), second.refetch());

    assert!(!a.is_error && !b.is_error);
    assert_eq!(a.data.unwrap(), b.data.unwrap());
    // expect(1) verified on server drop
}

#[tokio::test]
async fn rapid_refetches_coalesce() {
    let (server, cache) = setup().await;

    Mock::given(method("GET"))
        .and(path("/provider/bank-accounts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(accounts_envelope(&["acct-1"]))
                .set_delay(Duration::from_millis(150)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let key = QueryKey::from(["provider_accounts"]);
    let mut first = cache.subscribe::<serde_json::Value>(key.clone(), list_bank_accounts_request());
    let mut second = cache.subscribe::<serde_json::Value>(key, list_bank_accounts_request());

    // Request 1: the shared subscription fetch.
    first.refetch().await;

    // Requests 2a/2b: issued in rapid succession, must coalesce into
    // one network call (request 2).
    let (a, b) = tokio::join!(first.refetch(), second.refetch());
    assert!(!a.is_error && !b.is_error);
}

#[tokio::test]
async fn refetch_transitions_fetching_flag() {
    let (server, cache) = setup().await;

    Mock::given(method("GET"))
        .and(path("/provider/bank-accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(accounts_envelope(&["acct-1"])))
        .mount(&server)
        .await;

    let mut handle = cache.subscribe::<serde_json::Value>(
        QueryKey::from(["provider_accounts"]),
        list_bank_accounts_request(),
    );

    // The subscription fetch starts immediately.
    assert!(handle.snapshot().is_fetching);
    assert!(handle.snapshot().is_loading);

    let settled = handle.refetch().await;
    assert!(!settled.is_fetching);
    assert!(!settled.is_loading);
    assert!(settled.data.is_some());
    assert!(settled.last_fetched_at.is_some());
}

#[tokio::test]
async fn refetch_with_unchanged_data_is_idempotent() {
    let (server, cache) = setup().await;

    Mock::given(method("GET"))
        .and(path("/provider/bank-accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(accounts_envelope(&["acct-1"])))
        .mount(&server)
        .await;

    let mut handle = cache.subscribe::<serde_json::Value>(
        QueryKey::from(["provider_accounts"]),
        list_bank_accounts_request(),
    );

    let before = handle.refetch().await;
    let after = handle.refetch().await;

    assert_eq!(before.data.unwrap(), after.data.unwrap());
}

// ── Failure handling ────────────────────────────────────────────────

#[tokio::test]
async fn unreachable_server_sets_error_and_no_data() {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    drop(server);
    let cache = QueryCache::new(ApiClient::with_client(reqwest::Client::new(), base_url));

    let mut handle = cache.subscribe::<serde_json::Value>(
        QueryKey::from(["provider_accounts"]),
        list_bank_accounts_request(),
    );
    let settled = handle.refetch().await;

    assert!(settled.is_error);
    assert!(settled.error.is_some());
    assert!(settled.data.is_none());
    assert!(!settled.is_loading);
}

#[tokio::test]
async fn error_keeps_last_successful_value() {
    let (server, cache) = setup().await;

    // First request succeeds, every later one fails.
    Mock::given(method("GET"))
        .and(path("/provider/bank-accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(accounts_envelope(&["acct-1"])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/provider/bank-accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": { "msg": "Temporarily unavailable" }
        })))
        .mount(&server)
        .await;

    let mut handle = cache.subscribe::<serde_json::Value>(
        QueryKey::from(["provider_accounts"]),
        list_bank_accounts_request(),
    );

    let ok = handle.refetch().await;
    assert!(!ok.is_error);
    let good_data = ok.data.unwrap();

    let failed = handle.refetch().await;
    assert!(failed.is_error);
    assert_eq!(failed.error.as_deref(), Some("Temporarily unavailable"));
    // Last successful value survives the failure.
    assert_eq!(failed.data.unwrap(), good_data);
}

// ── Stale-settle discard ────────────────────────────────────────────

#[tokio::test]
async fn invalidate_dooms_in_flight_fetch() {
    let (server, cache) = setup().await;

    // Request 1 answers slowly with v1; request 2 answers fast with v2.
    Mock::given(method("GET"))
        .and(path("/provider/bank-accounts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(accounts_envelope(&["stale-v1"]))
                .set_delay(Duration::from_millis(400)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/provider/bank-accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(accounts_envelope(&["fresh-v2"])))
        .mount(&server)
        .await;

    let key = QueryKey::from(["provider_accounts"]);
    let mut handle =
        cache.subscribe::<serde_json::Value>(key.clone(), list_bank_accounts_request());

    // Let the slow fetch get airborne, then bust it.
    tokio::time::sleep(Duration::from_millis(50)).await;
    cache.invalidate(&key);

    let settled = handle.refetch().await;
    let body = settled.data.unwrap();
    assert!(body.to_string().contains("fresh-v2"), "got: {body}");

    // Even after the doomed response's delay elapses, the fresher
    // value must not be clobbered.
    tokio::time::sleep(Duration::from_millis(500)).await;
    let still = handle.snapshot();
    assert!(still.data.unwrap().to_string().contains("fresh-v2"));
}

// ── Entry lifecycle ─────────────────────────────────────────────────

#[tokio::test]
async fn last_handle_drop_evicts_entry() {
    let (server, cache) = setup().await;

    Mock::given(method("GET"))
        .and(path("/provider/bank-accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(accounts_envelope(&["acct-1"])))
        .expect(2)
        .mount(&server)
        .await;

    let key = QueryKey::from(["provider_accounts"]);
    let mut handle =
        cache.subscribe::<serde_json::Value>(key.clone(), list_bank_accounts_request());
    handle.refetch().await;
    assert_eq!(cache.len(), 1);

    drop(handle);
    assert!(cache.is_empty());

    // Zero staleness: a fresh subscription revalidates (request 2).
    let mut again = cache.subscribe::<serde_json::Value>(key, list_bank_accounts_request());
    let settled = again.refetch().await;
    assert!(settled.data.is_some());
}

#[tokio::test]
async fn sibling_handles_keep_entry_alive() {
    let (server, cache) = setup().await;

    Mock::given(method("GET"))
        .and(path("/provider/bank-accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(accounts_envelope(&["acct-1"])))
        .mount(&server)
        .await;

    let key = QueryKey::from(["provider_accounts"]);
    let first = cache.subscribe::<serde_json::Value>(key.clone(), list_bank_accounts_request());
    let second = cache.subscribe::<serde_json::Value>(key, list_bank_accounts_request());

    drop(first);
    assert_eq!(cache.len(), 1);
    drop(second);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn dispose_tears_down_all_entries() {
    let (server, cache) = setup().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(accounts_envelope(&["acct-1"]))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let _a = cache.subscribe::<serde_json::Value>(
        QueryKey::from(["provider_accounts"]),
        list_bank_accounts_request(),
    );
    let _b = cache.subscribe::<serde_json::Value>(
        QueryKey::from(["withdrawals"]),
        ApiRequest::get("provider/withdrawals"),
    );
    assert_eq!(cache.len(), 2);

    cache.dispose();
    assert!(cache.is_empty());
}

// ── Typed mapping ───────────────────────────────────────────────────

#[tokio::test]
async fn subscribe_with_maps_wire_to_domain() {
    let (server, cache) = setup().await;

    Mock::given(method("GET"))
        .and(path("/provider/bank-accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(accounts_envelope(&["acct-1"])))
        .mount(&server)
        .await;

    use taskfair_api::endpoints::payments::BankAccountRecord;
    use taskfair_core::BankAccount;
    use taskfair_core::convert::into_domain;

    let mut handle = cache.subscribe_with(
        QueryKey::from(["provider_accounts"]),
        list_bank_accounts_request(),
        |records: Vec<BankAccountRecord>| into_domain::<_, BankAccount>(records),
    );

    let settled = handle.refetch().await;
    let accounts = settled.data.unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].masked_label(), "First Bank \u{00b7}\u{00b7}\u{00b7}\u{00b7}1234");
}
