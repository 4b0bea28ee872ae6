//! Error types for PromptRelay

use crate::types::FinishReason;
use std::time::Duration;
use thiserror::Error;

/// Main error type for a single relay request
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Missing prompt: expected a `message` or `prompt` field")]
    MissingPrompt,

    #[error("Field `{0}` must be a string")]
    PromptNotString(&'static str),

    #[error("Prompt must not be empty")]
    EmptyPrompt,

    #[error("Prompt is too long ({actual} characters); the maximum is {max} characters")]
    PromptTooLong { max: usize, actual: usize },

    #[error("Provider API key is not configured")]
    MissingCredential,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Errors raised while talking to the generative-language provider
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Provider response contained no candidates")]
    NoCandidates { block_reason: Option<String> },

    #[error("Candidate contained no content (finish reason {finish_reason})")]
    EmptyContent { finish_reason: FinishReason },

    #[error("Generation stopped early: {finish_reason}")]
    StoppedEarly {
        finish_reason: FinishReason,
        partial_text: String,
    },

    #[error("Provider call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse provider response: {0}")]
    InvalidResponse(String),

    #[error("Streaming is not supported by this connector")]
    StreamingUnsupported,

    #[error("Internal connector error: {0}")]
    Internal(String),
}

/// Coarse classification used to pick the outer HTTP status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller can fix the request
    Client,
    /// Wrong HTTP verb
    Method,
    /// Operator must fix the deployment
    Config,
    /// Upstream rejected or produced nothing usable
    Provider,
    Timeout,
    Network,
    Internal,
}

impl RelayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::MethodNotAllowed(_) => ErrorKind::Method,
            RelayError::InvalidBody(_)
            | RelayError::MissingPrompt
            | RelayError::PromptNotString(_)
            | RelayError::EmptyPrompt
            | RelayError::PromptTooLong { .. } => ErrorKind::Client,
            RelayError::MissingCredential => ErrorKind::Config,
            RelayError::Provider(e) => e.kind(),
        }
    }
}

impl ProviderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProviderError::Http { .. }
            | ProviderError::NoCandidates { .. }
            | ProviderError::EmptyContent { .. }
            | ProviderError::StoppedEarly { .. } => ErrorKind::Provider,
            ProviderError::Timeout(_) => ErrorKind::Timeout,
            ProviderError::Network(_) => ErrorKind::Network,
            ProviderError::InvalidResponse(_)
            | ProviderError::StreamingUnsupported
            | ProviderError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Errors related to presentation adapters
#[derive(Error, Debug)]
pub enum PresentationError {
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

/// Result type alias for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

/// Result type alias for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;
