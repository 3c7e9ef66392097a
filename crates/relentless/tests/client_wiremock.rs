//! End-to-end behaviour of the async client against a mock server

use pretty_assertions::assert_eq;
use relentless::{Client, ClientConfig, Error, RequestOptions, RetryPolicy};
use std::time::{Duration, Instant};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(policy: RetryPolicy) -> Client {
    Client::from_config(ClientConfig::with_policy(policy)).expect("client")
}

#[tokio::test]
async fn test_retries_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("done"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(
        RetryPolicy::builder()
            .max_retries(2)
            .backoff_factor(0.05)
            .retryable_statuses([503])
            .build(),
    );

    let started = Instant::now();
    let response = client
        .get(&format!("{}/flaky", server.uri()), RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.text().unwrap(), "done");
    // 0.05s + 0.1s of backoff
    assert!(started.elapsed() >= Duration::from_millis(150));
}

#[tokio::test]
async fn test_status_outside_set_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(
        RetryPolicy::builder()
            .max_retries(1)
            .retryable_statuses([500])
            .build(),
    );

    let err = client
        .get(&server.uri(), RequestOptions::new())
        .await
        .unwrap_err();

    assert!(err.is_terminal());
    assert_eq!(err.status_code(), Some(503));
    assert_eq!(err.attempts(), 1);
    assert_eq!(
        err.response().and_then(|r| r.text().ok()).as_deref(),
        Some("maintenance")
    );
}

#[tokio::test]
async fn test_exhaustion_keeps_last_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let client = client(
        RetryPolicy::builder()
            .max_retries(2)
            .backoff_factor(0.0)
            .build(),
    );
    let url = format!("{}/jobs", server.uri());

    let err = client.post(&url, RequestOptions::new()).await.unwrap_err();

    let failure = err.failure().expect("request failure");
    assert_eq!(failure.attempts(), 3);
    assert_eq!(failure.method(), "POST");
    assert_eq!(failure.url(), url);
    assert_eq!(
        err.to_string(),
        format!("POST request to {url} failed with status 429 after 3 attempts")
    );
}

#[tokio::test]
async fn test_retry_after_overrides_backoff() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    // Without the hint the wait would be 1ms.
    let client = client(RetryPolicy::builder().backoff_factor(0.001).build());

    let started = Instant::now();
    let response = client
        .get(&server.uri(), RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(response.status, 204);
    assert!(started.elapsed() >= Duration::from_secs(1));
}

#[tokio::test]
async fn test_listed_success_status_is_returned() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202).set_body_string("queued"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(
        RetryPolicy::builder()
            .max_retries(3)
            .retryable_statuses([202, 503])
            .build(),
    );

    let response = client
        .post(&server.uri(), RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(response.status, 202);
    assert_eq!(response.text().unwrap(), "queued");
}

#[tokio::test]
async fn test_pass_through_reaches_every_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/items/7"))
        .and(query_param("force", "1"))
        .and(header("x-request-id", "abc"))
        .and(body_json(serde_json::json!({"name": "widget"})))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/items/7"))
        .and(query_param("force", "1"))
        .and(header("x-request-id", "abc"))
        .and(body_json(serde_json::json!({"name": "widget"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(RetryPolicy::builder().backoff_factor(0.0).build());
    let options = RequestOptions::new()
        .header("x-request-id", "abc")
        .query("force", "1")
        .json(&serde_json::json!({"name": "widget"}))
        .unwrap();

    let response = client
        .put(&format!("{}/items/7", server.uri()), options)
        .await
        .unwrap();
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_invalid_policy_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(RetryPolicy::builder().max_retries(-1).build());

    let err = client
        .get(&server.uri(), RequestOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn test_timeout_per_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(
        RetryPolicy::builder()
            .max_retries(1)
            .backoff_factor(0.0)
            .timeout(Duration::from_millis(50))
            .build(),
    );

    let err = client
        .get(&server.uri(), RequestOptions::new())
        .await
        .unwrap_err();

    assert!(err.is_exhausted());
    assert_eq!(err.status_code(), None);
    assert_eq!(
        err.to_string(),
        format!("GET request to {} timed out (2 attempts)", server.uri())
    );
}

#[tokio::test]
async fn test_concurrent_calls_do_not_interfere() {
    let server = MockServer::start().await;
    Mock::given(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let client = client(
        RetryPolicy::builder()
            .max_retries(2)
            .backoff_factor(0.01)
            .build(),
    );
    let ok_url = format!("{}/ok", server.uri());
    let down_url = format!("{}/down", server.uri());

    let (ok, down) = tokio::join!(
        client.get(&ok_url, RequestOptions::new()),
        client.get(&down_url, RequestOptions::new()),
    );

    assert_eq!(ok.unwrap().status, 200);
    assert_eq!(down.unwrap_err().attempts(), 3);
}

#[tokio::test]
async fn test_one_off_entry_point() {
    let server = MockServer::start().await;
    Mock::given(method("OPTIONS"))
        .respond_with(ResponseTemplate::new(204).insert_header("allow", "GET, POST"))
        .expect(1)
        .mount(&server)
        .await;

    let response = relentless::options(&server.uri(), RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(response.status, 204);
    assert_eq!(response.get_header("Allow"), Some("GET, POST"));
}
