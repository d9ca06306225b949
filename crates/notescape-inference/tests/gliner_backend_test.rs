//! Integration tests for the GLiNER sidecar client.

use notescape_core::{EntityExtractor, Error, Stage};
use notescape_inference::gliner::GlinerBackend;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_extract_maps_and_sorts_entities() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/extract"))
        .and(body_partial_json(serde_json::json!({
            "text": "Ada Lovelace met Charles Babbage in London",
            "threshold": 0.5
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "entities": [
                {"text": "London", "label": "location", "score": 0.91, "start": 36, "end": 42},
                {"text": "Ada Lovelace", "label": "person", "score": 0.97, "start": 0, "end": 12},
                {"text": "Charles Babbage", "label": "person", "score": 0.95, "start": 17, "end": 32}
            ],
            "model": "gliner-multi-v2.1",
            "text_length": 42
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = GlinerBackend::new(server.uri()).unwrap();
    let entities = backend
        .extract("Ada Lovelace met Charles Babbage in London")
        .await
        .unwrap();

    let texts: Vec<&str> = entities.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["Ada Lovelace", "Charles Babbage", "London"]);
    assert_eq!(entities[2].label, "location");
}

#[tokio::test]
async fn test_extract_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/extract"))
        .respond_with(ResponseTemplate::new(503).set_body_string("warming up"))
        .mount(&server)
        .await;

    let backend = GlinerBackend::new(server.uri()).unwrap();
    let err = backend.extract("Some Text").await.unwrap_err();
    match err {
        Error::Provider { stage, .. } => assert_eq!(stage, Stage::EntityExtraction),
        other => panic!("expected provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "healthy",
            "model": "gliner-multi-v2.1"
        })))
        .mount(&server)
        .await;

    let backend = GlinerBackend::new(server.uri()).unwrap();
    assert!(backend.health_check().await.unwrap());
}
