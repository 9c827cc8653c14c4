#![allow(clippy::unwrap_used)]
// Integration tests for one-shot fetch tasks.

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskfair_api::endpoints::categories::CategoryRecord;
use taskfair_api::{ApiClient, ApiRequest};
use taskfair_core::FetchTask;

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    (server, ApiClient::with_client(reqwest::Client::new(), base_url))
}

#[tokio::test]
async fn fetch_on_mount_happy_path() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/get-categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "ok",
            "data": [{ "id": "cat-1", "name": "Cleaning" }]
        })))
        .mount(&server)
        .await;

    let mut task: FetchTask<Vec<CategoryRecord>> =
        FetchTask::spawn(&client, ApiRequest::get("get-categories"));

    // Loading starts true and flips exactly once on settle.
    assert!(task.state().loading);
    let settled = task.settled().await;

    assert!(!settled.loading);
    assert!(settled.error.is_none());
    assert_eq!(settled.data.unwrap()[0].name, "Cleaning");
}

#[tokio::test]
async fn fetch_failure_is_data_not_panic() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/get-categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": { "msg": "Service down for maintenance" }
        })))
        .mount(&server)
        .await;

    let mut task: FetchTask<Vec<CategoryRecord>> =
        FetchTask::spawn(&client, ApiRequest::get("get-categories"));
    let settled = task.settled().await;

    assert!(!settled.loading);
    assert!(settled.data.is_none());
    assert_eq!(settled.error.as_deref(), Some("Service down for maintenance"));
}

#[tokio::test]
async fn dropping_task_mid_flight_is_safe() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/get-categories"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": [] }))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let task: FetchTask<Vec<CategoryRecord>> =
        FetchTask::spawn(&client, ApiRequest::get("get-categories"));
    tokio::time::sleep(Duration::from_millis(50)).await;

    // The owner unmounts while the request is in flight. No panic, and
    // the late result has nowhere observable to land.
    drop(task);
    tokio::time::sleep(Duration::from_millis(300)).await;
}

#[tokio::test]
async fn spawn_with_runs_arbitrary_api_futures() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/booking/cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Booking cancelled"
        })))
        .mount(&server)
        .await;

    let owned = client.clone();
    let mut task = FetchTask::spawn_with(async move { owned.cancel_booking("bk-1").await });
    let settled = task.settled().await;

    assert!(settled.error.is_none());
    assert_eq!(
        settled.data.unwrap().message.as_deref(),
        Some("Booking cancelled")
    );
}
