//! OpenAI-compatible embedding backend.
//!
//! Works with any endpoint that speaks the OpenAI `/embeddings` API, including
//! the OpenAI cloud API, Azure OpenAI, vLLM and Ollama in compatibility mode.
//!
//! # Example
//!
//! ```rust,no_run
//! use notescape_inference::config::OpenAIConfig;
//! use notescape_inference::openai::OpenAIBackend;
//! use notescape_core::EmbeddingBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = OpenAIConfig {
//!         api_key: std::env::var("OPENAI_API_KEY").ok(),
//!         ..Default::default()
//!     };
//!     let backend = OpenAIBackend::new(config).unwrap();
//!
//!     let texts = vec!["Hello, world!".to_string()];
//!     let vectors = backend.embed_texts(&texts).await.unwrap();
//! }
//! ```

mod backend;
mod error;
mod types;

pub use backend::{OpenAIBackend, DEFAULT_DIMENSION, DEFAULT_EMBED_MODEL, DEFAULT_OPENAI_URL};
pub use error::{response_error, FailureKind};
pub use types::*;
