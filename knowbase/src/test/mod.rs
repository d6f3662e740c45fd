//! End-to-end tests of [`ApiClient`](crate::ApiClient) against a mocked KnowBase backend.


use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::errors::ErrorKind;
use crate::models::{ChatResponse, HealthResponse, UploadResponse};
use crate::upload::UploadFile;
use crate::validation::{MAX_MESSAGE_CHARS, MAX_UPLOAD_BYTES};
use utils::{
    create_test_client, create_test_client_with_timeout, create_unreachable_client, progress_recorder, received_count,
};

// --- check_health ---

#[test_log::test(tokio::test)]
async fn test_health_returns_body_unchanged() {
    let mock_server = MockServer::start().await;
    let body = json!({ "status": "OK", "service": "KnowBase RAG System", "extra": [1, 2, 3] });
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client.check_health().await.unwrap();

    assert_eq!(result, body);
    let health = HealthResponse::try_from(result).unwrap();
    assert_eq!(health.status, "OK");
}

#[tokio::test]
async fn test_health_non_2xx_is_health_check_failed() {
    for status in [404u16, 500, 502, 503] {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let err = client.check_health().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::HealthCheckFailed, "status {status}");
        assert!(err.to_string().contains(&status.to_string()), "message should carry the status: {err}");
    }
}

#[tokio::test]
async fn test_health_connection_refused() {
    let client = create_unreachable_client();
    let err = client.check_health().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::HealthCheckFailed);
}

#[tokio::test]
async fn test_health_timeout_is_health_check_failed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let client = create_test_client_with_timeout(&mock_server, Duration::from_millis(100));
    let err = client.check_health().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::HealthCheckFailed);
    assert!(err.to_string().contains("timed out"));
}

// --- send_message ---

#[test_log::test(tokio::test)]
async fn test_send_message_posts_trimmed_message() {
    let mock_server = MockServer::start().await;
    let answer = json!({
        "answer": "Twenty days per year.",
        "references": ["handbook.pdf"],
        "timestamp": 1_700_000_000_000i64
    });
    Mock::given(method("POST"))
        .and(path("/api/chat/message"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "message": "How much leave do I get?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(answer.clone()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client.send_message("   How much leave do I get?\n").await.unwrap();

    assert_eq!(result, answer);
    let parsed = ChatResponse::try_from(result).unwrap();
    assert_eq!(parsed.references, vec!["handbook.pdf".to_string()]);
}

#[tokio::test]
async fn test_send_message_blank_never_reaches_network() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    for message in ["", "   ", "\t\n"] {
        let err = client.send_message(message).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    assert_eq!(received_count(&mock_server).await, 0);
}

#[tokio::test]
async fn test_send_message_length_boundary() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/message"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "ok" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let too_long = "x".repeat(MAX_MESSAGE_CHARS + 1);
    let err = client.send_message(&too_long).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(received_count(&mock_server).await, 0);

    let at_limit = "x".repeat(MAX_MESSAGE_CHARS);
    assert!(client.send_message(&at_limit).await.is_ok());
    assert_eq!(received_count(&mock_server).await, 1);
}

#[tokio::test]
async fn test_send_message_status_mapping() {
    let cases = [
        (400u16, ErrorKind::InvalidInput),
        (502, ErrorKind::UpstreamUnavailable),
        (500, ErrorKind::ServerError),
        (503, ErrorKind::ServerError),
        (404, ErrorKind::RequestFailed),
        (429, ErrorKind::RequestFailed),
    ];

    for (status, expected) in cases {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat/message"))
            .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let err = client.send_message("hello").await.unwrap_err();

        assert_eq!(err.kind(), expected, "status {status}");
        assert_eq!(err.status_code().map(|s| s.as_u16()).unwrap_or(status), status);
    }
}

#[tokio::test]
async fn test_send_message_request_failed_carries_underlying_message() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such route"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client.send_message("hello").await.unwrap_err();

    assert_eq!(err.to_string(), "Send message failed: HTTP 404 Not Found: no such route");
}

#[tokio::test]
async fn test_send_message_connection_refused() {
    let client = create_unreachable_client();
    let err = client.send_message("hello").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RequestFailed);
    assert_eq!(err.status_code(), None);
}

#[tokio::test]
async fn test_send_message_timeout() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let client = create_test_client_with_timeout(&mock_server, Duration::from_millis(100));
    let err = client.send_message("hello").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[tokio::test]
async fn test_send_message_non_json_body_passes_through_as_string() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain answer"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    assert_eq!(client.send_message("hello").await.unwrap(), json!("plain answer"));
}

#[tokio::test]
async fn test_concurrent_calls_are_independent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/message"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "ok" })))
        .expect(5)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let calls = (0..5).map(|i| {
        let client = client.clone();
        async move { client.send_message(&format!("question {i}")).await }
    });

    let results = futures::future::join_all(calls).await;
    assert!(results.iter().all(|r| r.is_ok()));
}

// --- upload_document ---

#[test_log::test(tokio::test)]
async fn test_upload_sends_multipart_file_field() {
    let mock_server = MockServer::start().await;
    let body = json!({ "message": "Document notes.MD uploaded and indexed" });
    Mock::given(method("POST"))
        .and(path("/api/documents/upload"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let file = UploadFile::new("notes.MD", "", b"# Team notes\n".to_vec());

    let result = client.upload_document(Some(file), None).await.unwrap();
    assert_eq!(result, body);
    assert_eq!(UploadResponse::try_from(result).unwrap().message, "Document notes.MD uploaded and indexed");

    let requests = mock_server.received_requests().await.unwrap();
    let sent = String::from_utf8_lossy(&requests[0].body);
    assert!(sent.contains(r#"name="file""#));
    assert!(sent.contains(r#"filename="notes.MD""#));
    assert!(sent.contains("# Team notes"));
}

#[tokio::test]
async fn test_upload_part_content_type_follows_declared_media_type() {
    let cases = [
        ("report.pdf", "application/pdf", Some("content-type: application/pdf")),
        ("notes.md", "not a mime type", None),
        ("notes.md", "", None),
    ];

    for (name, media_type, expected) in cases {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/documents/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let file = UploadFile::new(name, media_type, b"contents".to_vec());
        client.upload_document(Some(file), None).await.unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        let sent = String::from_utf8_lossy(&requests[0].body).to_ascii_lowercase();
        match expected {
            Some(line) => assert!(sent.contains(line), "media type {media_type:?}: {sent}"),
            None => assert!(!sent.contains("content-type:"), "media type {media_type:?}: {sent}"),
        }
    }
}

#[tokio::test]
async fn test_upload_reports_progress() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let file = UploadFile::new("report.pdf", "application/pdf", vec![7u8; 300 * 1024]);
    let (on_progress, seen) = progress_recorder();

    client.upload_document(Some(file), Some(on_progress)).await.unwrap();

    let seen = seen.lock().unwrap().clone();
    assert!(!seen.is_empty());
    assert!(seen.iter().all(|p| *p <= 100));
    assert_eq!(*seen.last().unwrap(), 100);
}

#[tokio::test]
async fn test_upload_empty_file_is_sent_without_progress() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let (on_progress, seen) = progress_recorder();

    let file = UploadFile::new("empty.txt", "text/plain", Vec::new());
    client.upload_document(Some(file), Some(on_progress)).await.unwrap();

    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_validation_never_reaches_network() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let err = client.upload_document(None, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let too_big = UploadFile::new("big.pdf", "application/pdf", vec![0u8; MAX_UPLOAD_BYTES as usize + 1]);
    let err = client.upload_document(Some(too_big), None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileTooLarge);

    let png = UploadFile::new("photo.png", "image/png", vec![0u8; 16]);
    let err = client.upload_document(Some(png), None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);

    assert_eq!(received_count(&mock_server).await, 0);
}

#[tokio::test]
async fn test_upload_at_size_limit_reaches_network() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let file = UploadFile::new("big.pdf", "application/pdf", vec![0u8; MAX_UPLOAD_BYTES as usize]);

    assert!(client.upload_document(Some(file), None).await.is_ok());
}

#[tokio::test]
async fn test_upload_status_mapping() {
    let cases = [
        (413u16, ErrorKind::FileTooLarge),
        (415, ErrorKind::UnsupportedFormat),
        (500, ErrorKind::ServerError),
        (502, ErrorKind::ServerError),
        (400, ErrorKind::RequestFailed),
        (404, ErrorKind::RequestFailed),
    ];

    for (status, expected) in cases {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/documents/upload"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let file = UploadFile::new("notes.txt", "text/plain", b"hello".to_vec());
        let err = client.upload_document(Some(file), None).await.unwrap_err();

        assert_eq!(err.kind(), expected, "status {status}");
    }
}

#[tokio::test]
async fn test_upload_connection_refused() {
    let client = create_unreachable_client();
    let file = UploadFile::new("notes.txt", "text/plain", b"hello".to_vec());

    let err = client.upload_document(Some(file), None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestFailed);
    assert!(err.to_string().starts_with("Upload failed:"));
}
