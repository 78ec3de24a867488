mod common;

use common::{client_for, image_body, received_bodies};
use reve::{
    CreateImageRequest, EditImageRequest, EditOptions, ImageSession, RequestOptions, ReveError,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{any, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_create_without_credential_skips_network() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let session = ImageSession::new(None);
    let result = session
        .create_image(&CreateImageRequest::new("a red door"), None)
        .await;

    assert!(result.is_none());
    let state = session.state();
    assert!(!state.is_loading);
    assert!(matches!(state.error.as_deref(), Some(ReveError::MissingApiKey)));
    assert!(state.result.is_none());
    assert_eq!(state.image_url(), None);
    server.verify().await;
}

#[tokio::test]
async fn test_success_replaces_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/image/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_body("aGVsbG8=", "req-1")))
        .expect(1)
        .mount(&server)
        .await;

    let session = ImageSession::with_client(client_for(&server));
    let result = session
        .create_image(&CreateImageRequest::new("a red door"), None)
        .await
        .expect("result");

    let state = session.state();
    assert!(!state.is_loading);
    assert!(state.error.is_none());
    assert_eq!(state.result.as_ref(), Some(&result));
    assert_eq!(
        session.image_url().as_deref(),
        Some("data:image/png;base64,aGVsbG8=")
    );
}

#[tokio::test]
async fn test_failure_keeps_previous_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/image/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_body("Zmlyc3Q=", "req-ok")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/image/edit"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "code": "RATE_LIMIT_EXCEEDED", "message": "slow down" }
        })))
        .mount(&server)
        .await;

    let session = ImageSession::with_client(client_for(&server));
    session
        .create_image(&CreateImageRequest::new("first"), None)
        .await
        .expect("first result");
    let failed = session
        .edit_image(&EditImageRequest::new("second", "Zmlyc3Q="), None)
        .await;

    assert!(failed.is_none());
    let state = session.state();
    assert!(!state.is_loading);
    let api = state
        .error
        .as_deref()
        .and_then(ReveError::as_api_error)
        .expect("api error kept");
    assert!(api.is_rate_limited());
    assert_eq!(state.result.map(|r| r.image).as_deref(), Some("Zmlyc3Q="));
    assert_eq!(
        session.image_url().as_deref(),
        Some("data:image/png;base64,Zmlyc3Q=")
    );
}

#[tokio::test]
async fn test_reset_after_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/image/create"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let session = ImageSession::with_client(client_for(&server));
    assert!(session
        .create_image(&CreateImageRequest::new("x"), None)
        .await
        .is_none());
    assert!(session.state().error.is_some());

    session.reset();

    let state = session.state();
    assert!(!state.is_loading);
    assert!(state.error.is_none());
    assert!(state.result.is_none());
    assert_eq!(state.image_url(), None);
}

#[tokio::test]
async fn test_overlapping_edits_last_resolved_wins() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/image/edit"))
        .and(body_partial_json(json!({ "edit_instruction": "slow" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(image_body("c2xvdw==", "req-slow"))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/image/edit"))
        .and(body_partial_json(json!({ "edit_instruction": "fast" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_body("ZmFzdA==", "req-fast")))
        .mount(&server)
        .await;

    let session = ImageSession::with_client(client_for(&server));
    let slow = EditImageRequest::new("slow", "aGVsbG8=");
    let fast = EditImageRequest::new("fast", "aGVsbG8=");

    let fast_then_check = async {
        let out = session.edit_image(&fast, None).await;
        // The fast call lands first; the slow one is still in flight.
        let mid = session.state();
        (out, mid)
    };
    let (slow_out, (fast_out, mid)) =
        tokio::join!(session.edit_image(&slow, None), fast_then_check);

    assert_eq!(fast_out.map(|r| r.image).as_deref(), Some("ZmFzdA=="));
    assert_eq!(mid.result.map(|r| r.image).as_deref(), Some("ZmFzdA=="));
    assert_eq!(slow_out.map(|r| r.image).as_deref(), Some("c2xvdw=="));

    // No sequencing: the response that resolved last overwrites the state.
    let state = session.state();
    assert_eq!(
        state.result.and_then(|r| r.metadata.request_id).as_deref(),
        Some("req-slow")
    );
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_file_wrappers_encode_before_dispatch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/image/edit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_body("ZWRpdA==", "req-e")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/image/remix"))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_body("cmVtaXg=", "req-r")))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("house.png");
    let second = dir.path().join("style.jpg");
    std::fs::write(&first, b"hello").unwrap();
    std::fs::write(&second, b"world").unwrap();

    let session = ImageSession::with_client(client_for(&server));
    let edited = session
        .edit_image_with_file(
            "open the window",
            &first,
            EditOptions {
                aspect_ratio: Some("1:1".into()),
                ..Default::default()
            },
            None,
        )
        .await;
    assert_eq!(edited.map(|r| r.image).as_deref(), Some("ZWRpdA=="));

    let remixed = session
        .remix_image_with_files(
            "combine",
            &[&first, &second],
            RequestOptions::default(),
            None,
        )
        .await;
    assert_eq!(remixed.map(|r| r.image).as_deref(), Some("cmVtaXg="));

    assert_eq!(
        received_bodies(&server).await,
        vec![
            json!({
                "edit_instruction": "open the window",
                "reference_image": "aGVsbG8=",
                "aspect_ratio": "1:1",
                "version": "latest"
            }),
            json!({
                "prompt": "combine",
                "images": ["aGVsbG8=", "d29ybGQ="]
            }),
        ]
    );
}
