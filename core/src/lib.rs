//! # PromptRelay Core
//!
//! Core types, traits, and error taxonomy for the PromptRelay prompt relay.
//! Connectors implement [`ContentGenerator`]; presentation adapters turn the
//! outcome into HTTP responses.

pub mod types;
pub mod traits;
pub mod errors;
pub mod policy;

// Re-export commonly used types and traits
pub use types::{ApiKey, Completion, FinishReason, PromptField, PromptRequest, TokenUsage};
pub use traits::{ByteStream, ContentGenerator, PresentationAdapter};
pub use errors::{ErrorKind, PresentationError, ProviderError, RelayError};
pub use policy::FinishReasonPolicy;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::types::*;
    pub use crate::traits::*;
    pub use crate::errors::*;
    pub use crate::policy::*;
    pub use async_trait::async_trait;
    pub use secrecy::ExposeSecret;
}
