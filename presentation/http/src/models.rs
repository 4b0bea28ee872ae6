//! Response bodies returned by the relay

use promptrelay_core::prelude::*;
use serde::{Deserialize, Serialize};

/// JSON body of every non-streaming relay response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayBody {
    pub success: bool,
    /// Generated text (mirrors `text` for callers using either name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Diagnostic detail such as the raw provider error text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    /// Token counts, when the provider reported them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    pub timestamp: String,
}

impl RelayBody {
    pub fn success(completion: &Completion) -> Self {
        Self {
            success: true,
            response: Some(completion.text.clone()),
            text: Some(completion.text.clone()),
            error: None,
            details: None,
            finish_reason: Some(completion.finish_reason.clone()),
            usage: completion.usage,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            response: None,
            text: None,
            error: Some(message.into()),
            details: None,
            finish_reason: None,
            usage: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }

    pub fn with_finish_reason(mut self, finish_reason: FinishReason) -> Self {
        self.finish_reason = Some(finish_reason);
        self
    }

    /// The generated text under whichever name is present
    pub fn output(&self) -> Option<&str> {
        self.text.as_deref().or(self.response.as_deref())
    }
}
