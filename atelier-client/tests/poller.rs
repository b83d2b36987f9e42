use atelier_client::{JobError, JobPoller, PollConfig, eachlabs};
use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "test-key";
const INTERVAL: Duration = Duration::from_millis(25);

fn poller(max_attempts: u32) -> JobPoller {
    JobPoller::new(PollConfig::new(INTERVAL, max_attempts))
}

fn provider(server: &MockServer) -> atelier_client::AsyncJobProvider {
    eachlabs::prediction_provider(&format!("{}/v1", server.uri()), KEY)
}

fn request() -> atelier_client::JobRequest {
    eachlabs::try_on_request("https://cdn/h.png", "https://cdn/g.png", "prompt")
}

async fn mount_create(server: &MockServer, id: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/prediction/"))
        .and(header("X-API-Key", KEY))
        .and(body_partial_json(json!({ "model": "nano-banana-edit" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": id })))
        .expect(1)
        .mount(server)
        .await;
}

async fn status_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == "GET")
        .count()
}

#[tokio::test]
async fn test_succeeds_on_second_poll() {
    let server = MockServer::start().await;
    mount_create(&server, "abc123").await;

    Mock::given(method("GET"))
        .and(path("/v1/prediction/abc123"))
        .and(header("X-API-Key", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "pending" })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/prediction/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "succeeded",
            "output": [{ "url": "https://x/y.jpg" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = poller(20)
        .submit_and_wait(&provider(&server), &request())
        .await
        .unwrap();

    assert_eq!(outcome.image_url, "https://x/y.jpg");
    assert_eq!(outcome.handle.as_str(), "abc123");
    assert_eq!(outcome.payload["status"], "succeeded");
    assert_eq!(status_requests(&server).await, 2);
}

#[tokio::test]
async fn test_create_failure_skips_polling() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/prediction/"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({ "message": "quota exceeded" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "succeeded" })))
        .expect(0)
        .mount(&server)
        .await;

    let err = poller(20)
        .submit_and_wait(&provider(&server), &request())
        .await
        .unwrap_err();

    match err {
        JobError::CreateFailed { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, json!({ "message": "quota exceeded" }));
        }
        other => panic!("expected CreateFailed, got {other:?}"),
    }
    assert_eq!(status_requests(&server).await, 0);
}

#[tokio::test]
async fn test_create_without_handle_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/prediction/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "queued" })))
        .mount(&server)
        .await;

    let err = poller(20)
        .submit_and_wait(&provider(&server), &request())
        .await
        .unwrap_err();

    assert!(matches!(err, JobError::CreateFailed { status: 200, .. }));
    assert_eq!(status_requests(&server).await, 0);
}

#[tokio::test]
async fn test_failed_status_stops_polling() {
    let server = MockServer::start().await;
    mount_create(&server, "job-1").await;

    Mock::given(method("GET"))
        .and(path("/v1/prediction/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "processing" })))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/prediction/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "failed",
            "error": "nsfw"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = poller(20)
        .submit_and_wait(&provider(&server), &request())
        .await
        .unwrap_err();

    match err {
        JobError::JobFailed { handle, payload } => {
            assert_eq!(handle.as_str(), "job-1");
            assert_eq!(payload["error"], "nsfw");
        }
        other => panic!("expected JobFailed, got {other:?}"),
    }
    assert_eq!(status_requests(&server).await, 3);
}

#[tokio::test]
async fn test_times_out_after_budget() {
    let server = MockServer::start().await;
    mount_create(&server, "slow").await;

    Mock::given(method("GET"))
        .and(path("/v1/prediction/slow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "starting" })))
        .expect(5)
        .mount(&server)
        .await;

    let started = Instant::now();
    let err = poller(5)
        .submit_and_wait(&provider(&server), &request())
        .await
        .unwrap_err();

    assert!(matches!(err, JobError::Timeout { attempts: 5, .. }));
    assert_eq!(status_requests(&server).await, 5);
    // Four pauses separate five status checks.
    assert!(started.elapsed() >= INTERVAL * 4);
}

#[tokio::test(start_paused = true)]
async fn test_default_budget_gives_up_after_twenty_checks() {
    let server = MockServer::start().await;
    mount_create(&server, "stuck").await;

    Mock::given(method("GET"))
        .and(path("/v1/prediction/stuck"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "processing" })))
        .expect(20)
        .mount(&server)
        .await;

    let started = tokio::time::Instant::now();
    let err = JobPoller::new(PollConfig::default())
        .submit_and_wait(&provider(&server), &request())
        .await
        .unwrap_err();

    assert!(matches!(err, JobError::Timeout { attempts: 20, .. }));
    assert_eq!(status_requests(&server).await, 20);
    // 19 pauses of 3000ms on the paused clock.
    assert!(started.elapsed() >= Duration::from_secs(57));
}

#[tokio::test]
async fn test_missing_status_is_pending() {
    let server = MockServer::start().await;
    mount_create(&server, "odd").await;

    Mock::given(method("GET"))
        .and(path("/v1/prediction/odd"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "progress": 0.5 })))
        .expect(3)
        .mount(&server)
        .await;

    let err = poller(3)
        .submit_and_wait(&provider(&server), &request())
        .await
        .unwrap_err();

    assert!(matches!(err, JobError::Timeout { attempts: 3, .. }));
}

#[tokio::test]
async fn test_success_without_output_reports_payload() {
    let server = MockServer::start().await;
    mount_create(&server, "empty").await;

    Mock::given(method("GET"))
        .and(path("/v1/prediction/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "succeeded",
            "output": []
        })))
        .mount(&server)
        .await;

    let err = poller(20)
        .submit_and_wait(&provider(&server), &request())
        .await
        .unwrap_err();

    match err {
        JobError::MissingOutput { payload, .. } => assert_eq!(payload["output"], json!([])),
        other => panic!("expected MissingOutput, got {other:?}"),
    }
}

#[tokio::test]
async fn test_top_level_output_wins() {
    let server = MockServer::start().await;
    mount_create(&server, "both").await;

    Mock::given(method("GET"))
        .and(path("/v1/prediction/both"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "succeeded",
            "output": [{ "url": "https://top/level.jpg" }],
            "data": { "output": [{ "url": "https://nested/one.jpg" }] }
        })))
        .mount(&server)
        .await;

    let outcome = poller(20)
        .submit_and_wait(&provider(&server), &request())
        .await
        .unwrap();

    assert_eq!(outcome.image_url, "https://top/level.jpg");
}

#[tokio::test]
async fn test_nested_output_used_when_top_level_absent() {
    let server = MockServer::start().await;
    mount_create(&server, "nested").await;

    Mock::given(method("GET"))
        .and(path("/v1/prediction/nested"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "succeeded",
            "data": { "output": [{ "url": "https://nested/one.jpg" }] }
        })))
        .mount(&server)
        .await;

    let outcome = poller(20)
        .submit_and_wait(&provider(&server), &request())
        .await
        .unwrap();

    assert_eq!(outcome.image_url, "https://nested/one.jpg");
}

#[tokio::test]
async fn test_unparseable_status_is_fatal() {
    let server = MockServer::start().await;
    mount_create(&server, "garbled").await;

    Mock::given(method("GET"))
        .and(path("/v1/prediction/garbled"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let err = poller(20)
        .submit_and_wait(&provider(&server), &request())
        .await
        .unwrap_err();

    assert!(matches!(err, JobError::InvalidResponse(_)));
}
