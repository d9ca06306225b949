//! Shared HTTP plumbing for provider backends.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use notescape_core::{Error, Result, Stage};

/// Build a client with a per-request timeout.
pub(crate) fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Map a transport failure to the error taxonomy.
///
/// Refused connections mean nobody is listening, which retrying will not fix.
/// Timeouts and everything else are transient.
pub(crate) fn send_error(stage: Stage, provider: &str, base_url: &str, e: reqwest::Error) -> Error {
    if e.is_connect() {
        Error::ProviderUnavailable(format!("{} at {}: {}", provider, base_url, e))
    } else if e.is_timeout() {
        Error::provider(stage, format!("{} request timed out: {}", provider, e))
    } else {
        Error::provider(stage, format!("{} request failed: {}", provider, e))
    }
}

/// Map a non-2xx response to the error taxonomy.
///
/// Rejected credentials are an operator problem; everything else is transient.
pub(crate) fn status_error(stage: Stage, provider: &str, status: StatusCode, body: &str) -> Error {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::ProviderUnavailable(format!("{} rejected credentials ({}): {}", provider, status, body))
        }
        _ => Error::provider(stage, format!("{} returned {}: {}", provider, status, body)),
    }
}

/// GET `url` with a short timeout. Any 2xx counts as healthy.
pub(crate) async fn probe(client: &Client, url: &str, provider: &str) -> bool {
    match client.get(url).timeout(Duration::from_secs(5)).send().await {
        Ok(resp) if resp.status().is_success() => {
            debug!(provider, "Health probe passed");
            true
        }
        Ok(resp) => {
            warn!(provider, status = %resp.status(), "Health probe failed");
            false
        }
        Err(e) => {
            warn!(provider, error = %e, "Health probe unreachable");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_unauthorized_is_unavailable() {
        let err = status_error(Stage::Embedding, "openai", StatusCode::UNAUTHORIZED, "bad key");
        assert!(matches!(err, Error::ProviderUnavailable(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_status_error_server_error_is_retryable() {
        let err = status_error(
            Stage::Embedding,
            "ollama",
            StatusCode::INTERNAL_SERVER_ERROR,
            "boom",
        );
        assert!(err.is_retryable());
        assert!(err.to_string().contains("ollama returned 500"));
    }

    #[test]
    fn test_build_client() {
        assert!(build_client(5).is_ok());
    }
}
