//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use notescape_api::{router, AppState};
use notescape_core::EmbeddingBackend;
use notescape_db::Database;
use notescape_graph::{ExtractorConfig, RelationshipExtractor, Strategy};
use notescape_inference::mock::{MockEmbeddingBackend, MockEmbeddingGenerator, MockEntityExtractor};
use notescape_inference::InferenceConfig;

const DIM: usize = 8;

// =============================================================================
// Helpers
// =============================================================================

fn keyword_app() -> Router {
    let extractor = RelationshipExtractor::new(ExtractorConfig::default()).unwrap();
    router(AppState::new(Database::in_memory(), extractor))
}

fn semantic_app(embedder: MockEmbeddingBackend) -> Router {
    let embedder: Arc<dyn EmbeddingBackend> = Arc::new(embedder);
    let extractor = RelationshipExtractor::new(ExtractorConfig::default())
        .unwrap()
        .with_embeddings(embedder.clone())
        .with_entity_extractor(Arc::new(MockEntityExtractor::new()));
    router(AppState::new(Database::in_memory(), extractor).with_search_embeddings(embedder, None))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create(app: &Router, id: &str, title: &str, content: &str) {
    let (status, _) = send(
        app,
        "POST",
        "/api/notes",
        Some(json!({ "id": id, "title": title, "content": content })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_root_and_health() {
    let app = keyword_app();

    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("NoteScape"));

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["strategy"], "keyword");
    assert!(body["embedding"].is_null());
}

#[tokio::test]
async fn test_state_from_config_without_provider_uses_keyword_strategy() {
    let inference = InferenceConfig::from_lookup(|key| match key {
        "NOTESCAPE_EMBEDDING_PROVIDER" => Some("none".to_string()),
        _ => None,
    })
    .unwrap();
    let state =
        AppState::from_config(Database::in_memory(), inference, ExtractorConfig::default(), None)
            .unwrap();

    assert!(state.embedder.is_none());
    assert!(state.selection.is_none());
    assert_eq!(state.extractor.strategy(), Strategy::Keyword);
}

#[tokio::test]
async fn test_state_from_config_rejects_bad_threshold() {
    let inference = InferenceConfig::from_lookup(|_| None).unwrap();
    let result = AppState::from_config(
        Database::in_memory(),
        inference,
        ExtractorConfig::with_threshold(2.0),
        None,
    );
    assert!(result.is_err());
}

// =============================================================================
// Notes
// =============================================================================

#[tokio::test]
async fn test_note_crud() {
    let app = keyword_app();
    create(&app, "n1", "First", "hello world").await;
    create(&app, "n2", "Second", "goodbye world").await;

    let (status, body) = send(&app, "GET", "/api/notes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["id"], "n1");

    let (status, body) = send(&app, "GET", "/api/notes/n2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Second");

    let (status, _) = send(&app, "DELETE", "/api/notes/n2", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", "/api/notes/n2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("n2"));

    let (status, _) = send(&app, "DELETE", "/api/notes/n2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_generates_id() {
    let app = keyword_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/notes",
        Some(json!({ "title": "Untitled", "content": "text" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(!body["id"].as_str().unwrap().is_empty());
    assert!(body["created_at"].is_string());
}

#[tokio::test]
async fn test_create_duplicate_id_conflicts() {
    let app = keyword_app();
    create(&app, "n1", "First", "hello").await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/notes",
        Some(json!({ "id": "n1", "title": "Again", "content": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_empty_note_rejected() {
    let app = keyword_app();
    let (status, _) = send(
        &app,
        "POST",
        "/api/notes",
        Some(json!({ "title": " ", "content": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Analyze + graph
// =============================================================================

#[tokio::test]
async fn test_analyze_empty_store() {
    let app = keyword_app();
    let (status, body) = send(&app, "POST", "/api/analyze", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "nothing_to_analyze" }));
}

#[tokio::test]
async fn test_analyze_keyword_persists_edges_and_graph() {
    let app = keyword_app();
    create(&app, "a", "Cats", "The cat sat on the mat").await;
    create(&app, "b", "More cats", "A cat and a mat").await;
    create(&app, "c", "Rockets", "Orbital launch vehicles").await;

    let (status, body) = send(&app, "POST", "/api/analyze", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "analyzed");
    assert_eq!(body["strategy"], "keyword");
    assert_eq!(body["pairs_examined"], 3);
    assert_eq!(body["edges"].as_array().unwrap().len(), 1);
    assert_eq!(body["stored_relationships"], 1);
    assert_eq!(body["indexed_vectors"], 0);

    let (_, edges) = send(&app, "GET", "/api/notes/a/relationships", None).await;
    assert_eq!(edges[0]["relationship_type"], "shared_topics");

    let (status, graph) = send(&app, "GET", "/api/graph", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(graph["nodes"].as_array().unwrap().len(), 3);
    let links = graph["links"].as_array().unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0]["source"], "a");
    assert_eq!(links[0]["target"], "b");
    assert_eq!(links[0]["type"], "shared_topics");
}

#[tokio::test]
async fn test_rerunning_analysis_does_not_duplicate_edges() {
    let app = keyword_app();
    create(&app, "a", "Cats", "The cat sat on the mat").await;
    create(&app, "b", "More cats", "A cat and a mat").await;

    send(&app, "POST", "/api/analyze", None).await;
    send(&app, "POST", "/api/analyze", None).await;

    let (_, edges) = send(&app, "GET", "/api/notes/b/relationships", None).await;
    assert_eq!(edges.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_removes_graph_links() {
    let app = keyword_app();
    create(&app, "a", "Cats", "The cat sat on the mat").await;
    create(&app, "b", "More cats", "A cat and a mat").await;
    send(&app, "POST", "/api/analyze", None).await;

    send(&app, "DELETE", "/api/notes/b", None).await;
    let (_, graph) = send(&app, "GET", "/api/graph", None).await;
    assert_eq!(graph["nodes"].as_array().unwrap().len(), 1);
    assert!(graph["links"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_analyze_provider_failure_is_bad_gateway() {
    let app = semantic_app(MockEmbeddingBackend::new().with_dimension(DIM).failing_on("boom"));
    create(&app, "a", "A", "boom").await;
    create(&app, "b", "B", "fine").await;

    let (status, body) = send(&app, "POST", "/api/analyze", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("embedding"));
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_falls_back_to_text_without_embedder() {
    let app = keyword_app();
    create(&app, "a", "Rust notes", "ownership and borrowing").await;
    create(&app, "b", "Cooking", "bread recipes").await;

    let (status, body) = send(&app, "POST", "/api/search", Some(json!({ "query": "BORROW" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "text");
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], "a");
    assert!(results[0].get("score").is_none());
}

#[tokio::test]
async fn test_search_empty_query_rejected() {
    let app = keyword_app();
    let (status, _) = send(&app, "POST", "/api/search", Some(json!({ "query": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_semantic_analysis_indexes_vectors_for_search() {
    let embedder = MockEmbeddingBackend::new()
        .with_dimension(DIM)
        .with_vector("alpha text", MockEmbeddingGenerator::axis(0, DIM))
        .with_vector("beta text", MockEmbeddingGenerator::at_similarity(0.9, DIM))
        .with_vector("gamma text", MockEmbeddingGenerator::axis(2, DIM))
        .with_vector("alpha query", MockEmbeddingGenerator::axis(0, DIM));
    let app = semantic_app(embedder);
    create(&app, "a", "Alpha", "alpha text").await;
    create(&app, "b", "Beta", "beta text").await;
    create(&app, "c", "Gamma", "gamma text").await;

    // Before analysis nothing is indexed, so search falls back to text.
    let (_, body) = send(&app, "POST", "/api/search", Some(json!({ "query": "alpha query" }))).await;
    assert_eq!(body["mode"], "text");

    let (status, body) = send(&app, "POST", "/api/analyze", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["strategy"], "semantic");
    assert_eq!(body["indexed_vectors"], 3);
    let edges = body["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["relationship_type"], "semantic_similarity");

    let (status, body) = send(
        &app,
        "POST",
        "/api/search",
        Some(json!({ "query": "alpha query", "limit": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "semantic");
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["id"], "a");
    assert_eq!(results[1]["id"], "b");
    assert!(results[0]["score"].as_f64().unwrap() > 0.99);
}
