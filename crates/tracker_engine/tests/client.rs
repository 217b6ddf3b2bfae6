use std::time::Duration;

use pretty_assertions::assert_eq;
use tracker_engine::{ActiveJob, ClientSettings, PollError, ReqwestStatusClient, StatusSource};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ReqwestStatusClient {
    let settings = ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    };
    ReqwestStatusClient::new(settings).expect("client")
}

#[tokio::test]
async fn progress_payload_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/job/7/progress"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "active": true,
            "status": "running",
            "progress": 42,
            "current_url": "https://example.com/a",
            "pages_processed": 4,
            "total_pages": 10,
            "message": "Crawling",
            "started_at": "10:00:00",
            "updated_at": "10:00:05"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = client_for(&server).job_progress(7).await.expect("payload");
    assert!(payload.active);
    assert_eq!(payload.status.as_deref(), Some("running"));
    assert_eq!(payload.progress, Some(42.0));
    assert_eq!(payload.pages_processed, Some(4));
    assert_eq!(payload.updated_at.as_deref(), Some("10:00:05"));
    assert_eq!(payload.error, None);
}

#[tokio::test]
async fn not_found_body_still_carries_error_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/job/9/progress"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({ "error": "Job not found" })),
        )
        .mount(&server)
        .await;

    let payload = client_for(&server).job_progress(9).await.expect("payload");
    assert!(!payload.active);
    assert_eq!(payload.error.as_deref(), Some("Job not found"));
}

#[tokio::test]
async fn html_error_page_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/job/3/progress"))
        .respond_with(
            ResponseTemplate::new(500).set_body_raw("<html>oops</html>", "text/html"),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).job_progress(3).await.unwrap_err();
    assert!(err.is_decode());
}

#[tokio::test]
async fn unreachable_server_is_a_transport_failure() {
    let settings = ClientSettings {
        base_url: "http://127.0.0.1:9/".to_string(),
        connect_timeout: Duration::from_millis(200),
        ..ClientSettings::default()
    };
    let client = ReqwestStatusClient::new(settings).expect("client");

    let err = client.job_progress(1).await.unwrap_err();
    assert!(matches!(err, PollError::Transport(_) | PollError::Timeout(_)));
}

#[tokio::test]
async fn request_timeout_applies_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/job/2/progress"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(serde_json::json!({ "active": true })),
        )
        .mount(&server)
        .await;

    let settings = ClientSettings {
        base_url: server.uri(),
        request_timeout: Some(Duration::from_millis(50)),
        ..ClientSettings::default()
    };
    let client = ReqwestStatusClient::new(settings).expect("client");

    let err = client.job_progress(2).await.unwrap_err();
    assert!(matches!(err, PollError::Timeout(_)));
}

#[tokio::test]
async fn session_cookie_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/job/5/progress"))
        .and(header("cookie", "session=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "active": false })))
        .expect(1)
        .mount(&server)
        .await;

    let settings = ClientSettings {
        base_url: server.uri(),
        session_cookie: Some("session=abc".to_string()),
        ..ClientSettings::default()
    };
    let client = ReqwestStatusClient::new(settings).expect("client");
    client.job_progress(5).await.expect("payload");
}

#[tokio::test]
async fn preview_payload_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/job/4/export/preview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "job_info": {
                "name": "Docs",
                "status": "completed",
                "created_at": "2024-05-01T10:00:00",
                "total_pages": 2,
                "total_links": 7
            },
            "data_size_estimate": "12.5 KB",
            "sample_pages": [
                {
                    "url": "https://example.com/",
                    "title": "Home",
                    "status_code": 200,
                    "content": { "word_count": 321, "text": "..." },
                    "links": [{ "url": "https://example.com/a" }, { "url": "https://example.com/b" }],
                    "depth": 0
                }
            ]
        })))
        .mount(&server)
        .await;

    let preview = client_for(&server).export_preview(4).await.expect("preview");
    let info = preview.job_info.expect("job info");
    assert_eq!(info.name, "Docs");
    assert_eq!(info.total_links, 7);
    assert_eq!(preview.data_size_estimate.as_deref(), Some("12.5 KB"));
    let page = &preview.sample_pages[0];
    assert_eq!(page.links.len(), 2);
    assert_eq!(page.content.as_ref().and_then(|c| c.word_count), Some(321));
}

#[tokio::test]
async fn active_jobs_are_keyed_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "12": { "status": "running", "progress": 30 },
            "3": { "status": "starting", "progress": 0 }
        })))
        .mount(&server)
        .await;

    let jobs = client_for(&server).active_jobs().await.expect("jobs");
    assert_eq!(
        jobs,
        vec![
            ActiveJob {
                job_id: 3,
                status: Some("starting".to_string())
            },
            ActiveJob {
                job_id: 12,
                status: Some("running".to_string())
            },
        ]
    );
}

#[tokio::test]
async fn delete_posts_to_job_action() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/job/8/delete"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/job/9/delete"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.delete_job(8).await.expect("deleted");
    assert_eq!(client.delete_job(9).await, Err(PollError::HttpStatus(403)));
}
