//! HTTP presentation layer for PromptRelay
//!
//! Serves the relay endpoint: answers CORS preflights, accepts a JSON prompt
//! on `POST`, forwards it through a [`ContentGenerator`] and returns either a
//! JSON body or the provider's event stream.

use async_trait::async_trait;
use axum::{http::StatusCode, middleware::from_fn, response::Json, Router};
use promptrelay_core::prelude::*;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Notify;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

mod delivery;
mod handlers;
mod middleware;
mod models;

pub use delivery::{delivery_for, BufferedDelivery, DeliveryMode, OutputDelivery, StreamingDelivery};
pub use middleware::{cors_layer, REQUEST_ID_HEADER};
pub use models::*;

/// Relay server configuration
#[derive(Debug)]
pub struct RelayServerConfig {
    /// Server bind address
    pub bind_address: SocketAddr,
    /// Origins allowed to call the relay; `*` allows any
    pub allowed_origins: Vec<String>,
    /// Maximum prompt length in characters
    pub max_prompt_chars: usize,
    /// Buffered JSON or pass-through streaming
    pub delivery: DeliveryMode,
    /// Treatment of non-`STOP` finish reasons in buffered mode
    pub finish_reason_policy: FinishReasonPolicy,
    /// Provider credential; requests fail with a configuration error when absent
    pub api_key: Option<ApiKey>,
}

impl Default for RelayServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8080)),
            allowed_origins: vec!["*".to_string()],
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
            delivery: DeliveryMode::default(),
            finish_reason_policy: FinishReasonPolicy::default(),
            api_key: None,
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayServerConfig>,
    pub generator: Arc<dyn ContentGenerator>,
    pub delivery: Arc<dyn OutputDelivery>,
}

impl AppState {
    pub fn new(config: RelayServerConfig, generator: Arc<dyn ContentGenerator>) -> Self {
        Self::from_shared(Arc::new(config), generator)
    }

    fn from_shared(config: Arc<RelayServerConfig>, generator: Arc<dyn ContentGenerator>) -> Self {
        let delivery = delivery_for(config.delivery, config.finish_reason_policy);
        Self {
            config,
            generator,
            delivery,
        }
    }
}

/// Build the router. Every path is served by the relay handler.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .fallback(handlers::relay::relay)
        .layer(middleware::cors_layer(&state.config.allowed_origins))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(middleware::request_logging)),
        )
        .with_state(state)
}

/// Relay HTTP server
pub struct RelayServer {
    config: Arc<RelayServerConfig>,
    shutdown: Arc<Notify>,
}

impl RelayServer {
    pub fn new(config: RelayServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub fn config(&self) -> &RelayServerConfig {
        &self.config
    }
}

#[async_trait]
impl PresentationAdapter for RelayServer {
    async fn start(&self, generator: Arc<dyn ContentGenerator>) -> Result<(), PresentationError> {
        if self.config.api_key.is_none() {
            warn!("No provider API key configured; prompts will be rejected as a server misconfiguration");
        }

        info!(
            "Starting relay on {} ({} delivery, model {})",
            self.config.bind_address,
            self.config.delivery,
            generator.model()
        );

        let router = build_router(AppState::from_shared(self.config.clone(), generator));

        let listener = tokio::net::TcpListener::bind(&self.config.bind_address)
            .await
            .map_err(|e| PresentationError::StartupFailed(format!("Failed to bind to {}: {}", self.config.bind_address, e)))?;

        info!("Relay listening on {}", self.config.bind_address);

        let shutdown = self.shutdown.clone();
        axum::serve(listener, router)
            .with_graceful_shutdown(async move { shutdown.notified().await })
            .await
            .map_err(|e| PresentationError::StartupFailed(format!("Server error: {}", e)))?;

        info!("Relay stopped");
        Ok(())
    }

    async fn stop(&self) -> Result<(), PresentationError> {
        info!("Stopping relay server");
        self.shutdown.notify_one();
        Ok(())
    }
}

/// Caller-facing message for a provider HTTP status
pub fn provider_status_message(status: u16) -> String {
    match status {
        400 => "Invalid request sent to the language model API".to_string(),
        401 | 403 => "The API key is invalid or lacks permission".to_string(),
        404 => "The requested model is not available".to_string(),
        429 => "Rate limit exceeded; please try again later".to_string(),
        other => format!("The language model API returned an error (status {})", other),
    }
}

/// Convert relay errors to HTTP status codes and responses.
///
/// Provider statuses are never propagated; every non-client failure is a 500.
pub fn handle_relay_error(error: &RelayError) -> (StatusCode, Json<RelayBody>) {
    let (status, body) = match error {
        RelayError::MethodNotAllowed(_) => (StatusCode::METHOD_NOT_ALLOWED, RelayBody::error("Method not allowed")),
        RelayError::InvalidBody(reason) => (
            StatusCode::BAD_REQUEST,
            RelayBody::error("Invalid request body").with_details(Some(reason.clone())),
        ),
        RelayError::MissingPrompt
        | RelayError::PromptNotString(_)
        | RelayError::EmptyPrompt
        | RelayError::PromptTooLong { .. } => (StatusCode::BAD_REQUEST, RelayBody::error(error.to_string())),
        RelayError::MissingCredential => (
            StatusCode::INTERNAL_SERVER_ERROR,
            RelayBody::error("Server misconfigured: the language model API key is not set"),
        ),
        RelayError::Provider(provider) => (StatusCode::INTERNAL_SERVER_ERROR, provider_error_body(provider)),
    };

    match error.kind() {
        ErrorKind::Client | ErrorKind::Method => warn!("Rejected request: {} - {}", status, error),
        _ => error!("Relay error: {} - {}", status, error),
    }

    (status, Json(body))
}

fn provider_error_body(error: &ProviderError) -> RelayBody {
    match error {
        ProviderError::Http { status, body } => {
            RelayBody::error(provider_status_message(*status)).with_details(Some(body.clone()))
        }
        ProviderError::NoCandidates { block_reason } => {
            RelayBody::error("No content generated; the response may have been filtered")
                .with_details(block_reason.as_ref().map(|r| format!("Prompt blocked: {}", r)))
        }
        ProviderError::EmptyContent { finish_reason } => {
            RelayBody::error(format!("The model returned an empty response (finish reason {})", finish_reason))
                .with_finish_reason(finish_reason.clone())
        }
        ProviderError::StoppedEarly {
            finish_reason,
            partial_text,
        } => RelayBody::error(format!("Generation stopped early: {}", finish_reason))
            .with_details(Some(partial_text.clone()))
            .with_finish_reason(finish_reason.clone()),
        ProviderError::Timeout(after) => RelayBody::error("The language model API timed out")
            .with_details(Some(format!("No response within {}s", after.as_secs_f64()))),
        ProviderError::Network(reason) => {
            RelayBody::error("Could not reach the language model API").with_details(Some(reason.clone()))
        }
        ProviderError::InvalidResponse(_) | ProviderError::StreamingUnsupported | ProviderError::Internal(_) => {
            RelayBody::error("Internal server error").with_details(Some(error.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_config_default() {
        let config = RelayServerConfig::default();
        assert_eq!(config.bind_address.port(), 8080);
        assert_eq!(config.allowed_origins, vec!["*".to_string()]);
        assert_eq!(config.max_prompt_chars, 5000);
        assert_eq!(config.delivery, DeliveryMode::Buffered);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_provider_status_messages() {
        assert!(provider_status_message(400).contains("Invalid request"));
        assert_eq!(provider_status_message(401), provider_status_message(403));
        assert!(provider_status_message(404).contains("not available"));
        assert!(provider_status_message(429).contains("Rate limit"));
        assert!(provider_status_message(503).contains("503"));
    }

    #[test]
    fn test_client_errors_map_to_400() {
        let (status, Json(body)) = handle_relay_error(&RelayError::PromptTooLong { max: 2000, actual: 2500 });
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.unwrap().contains("2000"));

        let (status, Json(body)) = handle_relay_error(&RelayError::InvalidBody("eof".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.as_deref(), Some("Invalid request body"));
    }

    #[test]
    fn test_method_maps_to_405() {
        let (status, Json(body)) = handle_relay_error(&RelayError::MethodNotAllowed("GET".to_string()));
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert!(!body.success);
    }

    #[test]
    fn test_provider_failures_map_to_500() {
        let cases = vec![
            RelayError::MissingCredential,
            ProviderError::Http { status: 404, body: "nope".to_string() }.into(),
            ProviderError::Timeout(Duration::from_secs(60)).into(),
            ProviderError::Network("reset".to_string()).into(),
            ProviderError::Internal("boom".to_string()).into(),
        ];
        for error in cases {
            let (status, _) = handle_relay_error(&error);
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", error);
        }
    }

    #[test]
    fn test_timeout_has_distinct_message() {
        let (_, Json(timeout)) = handle_relay_error(&ProviderError::Timeout(Duration::from_secs(60)).into());
        let (_, Json(network)) = handle_relay_error(&ProviderError::Network("dns".to_string()).into());
        assert_eq!(timeout.error.as_deref(), Some("The language model API timed out"));
        assert_ne!(timeout.error, network.error);
    }
}
