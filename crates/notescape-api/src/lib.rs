//! # notescape-api
//!
//! HTTP adapter over the notescape stores and relationship extractor.
//!
//! | Route | Method | Purpose |
//! |-------|--------|---------|
//! | `/health` | GET | Liveness and provider selection |
//! | `/api/notes` | GET, POST | List and create notes |
//! | `/api/notes/:id` | GET, DELETE | Fetch or delete one note |
//! | `/api/notes/:id/relationships` | GET | Edges touching a note |
//! | `/api/analyze` | POST | Infer and persist relationships |
//! | `/api/graph` | GET | Node/link graph for visualization |
//! | `/api/search` | POST | Semantic search with text fallback |

pub mod error;
pub mod handlers;
pub mod services;
pub mod state;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use error::ApiError;
pub use state::AppState;

use handlers::{analysis, graph, health, notes, search};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        // Notes
        .route("/api/notes", get(notes::list_notes).post(notes::create_note))
        .route(
            "/api/notes/:id",
            get(notes::get_note).delete(notes::delete_note),
        )
        .route(
            "/api/notes/:id/relationships",
            get(notes::note_relationships),
        )
        // Inference
        .route("/api/analyze", post(analysis::analyze_notes))
        .route("/api/graph", get(graph::get_graph))
        .route("/api/search", post(search::search_notes))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT]),
        )
        .with_state(state)
}
