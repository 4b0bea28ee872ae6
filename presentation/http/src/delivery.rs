//! Output delivery: buffered JSON or pass-through event stream

use crate::models::RelayBody;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use futures::TryStreamExt;
use promptrelay_core::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Which delivery implementation the relay uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    #[default]
    Buffered,
    Streaming,
}

impl std::fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryMode::Buffered => write!(f, "buffered"),
            DeliveryMode::Streaming => write!(f, "streaming"),
        }
    }
}

/// Turns a validated prompt into the caller's response
#[async_trait]
pub trait OutputDelivery: Send + Sync {
    fn mode(&self) -> DeliveryMode;

    async fn deliver(
        &self,
        generator: &dyn ContentGenerator,
        api_key: &ApiKey,
        request: PromptRequest,
    ) -> Result<Response, RelayError>;
}

/// Waits for the full generation and answers with a JSON body
pub struct BufferedDelivery {
    policy: FinishReasonPolicy,
}

impl BufferedDelivery {
    pub fn new(policy: FinishReasonPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl OutputDelivery for BufferedDelivery {
    fn mode(&self) -> DeliveryMode {
        DeliveryMode::Buffered
    }

    async fn deliver(
        &self,
        generator: &dyn ContentGenerator,
        api_key: &ApiKey,
        request: PromptRequest,
    ) -> Result<Response, RelayError> {
        let completion = generator.generate(api_key, &request).await?;
        let completion = self.policy.apply(completion)?;
        Ok((StatusCode::OK, Json(RelayBody::success(&completion))).into_response())
    }
}

/// Forwards the provider's event stream byte-for-byte.
///
/// Dropping the response body (caller disconnect) drops the upstream stream,
/// which closes the provider connection.
pub struct StreamingDelivery;

#[async_trait]
impl OutputDelivery for StreamingDelivery {
    fn mode(&self) -> DeliveryMode {
        DeliveryMode::Streaming
    }

    async fn deliver(
        &self,
        generator: &dyn ContentGenerator,
        api_key: &ApiKey,
        request: PromptRequest,
    ) -> Result<Response, RelayError> {
        let stream = generator.stream(api_key, &request).await?;
        debug!("Forwarding event stream from {}", generator.model());

        let stream = stream.inspect_err(|e| warn!("Upstream event stream failed: {}", e));

        Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/event-stream; charset=utf-8"),
                (header::CACHE_CONTROL, "no-cache"),
                (header::CONNECTION, "keep-alive"),
            ],
            Body::from_stream(stream),
        )
            .into_response())
    }
}

/// Select the delivery implementation for a mode
pub fn delivery_for(mode: DeliveryMode, policy: FinishReasonPolicy) -> Arc<dyn OutputDelivery> {
    match mode {
        DeliveryMode::Buffered => Arc::new(BufferedDelivery::new(policy)),
        DeliveryMode::Streaming => Arc::new(StreamingDelivery),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_selection() {
        let buffered = delivery_for(DeliveryMode::Buffered, FinishReasonPolicy::Strict);
        assert_eq!(buffered.mode(), DeliveryMode::Buffered);

        let streaming = delivery_for(DeliveryMode::Streaming, FinishReasonPolicy::Lenient);
        assert_eq!(streaming.mode(), DeliveryMode::Streaming);
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(DeliveryMode::default(), DeliveryMode::Buffered);
        assert_eq!(DeliveryMode::Streaming.to_string(), "streaming");
        let parsed: DeliveryMode = serde_json::from_str("\"streaming\"").unwrap();
        assert_eq!(parsed, DeliveryMode::Streaming);
    }
}
