//! Core traits defining the connector and presentation seams

use crate::errors::{PresentationError, ProviderError};
use crate::types::{ApiKey, Completion, PromptRequest};
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;

/// Raw provider bytes, forwarded to the caller untouched
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ProviderError>> + Send>>;

/// Trait for generative-language connectors
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Model identifier, used in logs
    fn model(&self) -> &str;

    /// Generate a complete response and extract the first candidate's text
    async fn generate(&self, api_key: &ApiKey, request: &PromptRequest) -> Result<Completion, ProviderError>;

    /// Open a server-sent-events stream from the provider.
    ///
    /// Returns once the provider has answered with a success status; the
    /// stream then yields the body exactly as received.
    async fn stream(&self, api_key: &ApiKey, request: &PromptRequest) -> Result<ByteStream, ProviderError> {
        let _ = (api_key, request);
        Err(ProviderError::StreamingUnsupported)
    }
}

/// Trait for presentation adapters (network transport layers)
#[async_trait]
pub trait PresentationAdapter: Send + Sync {
    /// Start serving requests backed by the given generator
    async fn start(&self, generator: Arc<dyn ContentGenerator>) -> Result<(), PresentationError>;

    /// Stop the presentation adapter gracefully
    async fn stop(&self) -> Result<(), PresentationError>;
}
