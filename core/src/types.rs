//! Core data types for PromptRelay

use crate::errors::RelayError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default cap on prompt length, in characters
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 5000;

/// Provider credential. Never printed by `Debug`.
pub type ApiKey = secrecy::SecretString;

/// The inbound field a prompt was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptField {
    Message,
    Prompt,
}

impl PromptField {
    /// Fields in precedence order
    pub const ALL: [PromptField; 2] = [PromptField::Message, PromptField::Prompt];

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptField::Message => "message",
            PromptField::Prompt => "prompt",
        }
    }
}

impl std::fmt::Display for PromptField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated prompt, normalized from either inbound field name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    text: String,
    field: PromptField,
}

impl PromptRequest {
    /// Build a request from already-validated text
    pub fn new(text: impl Into<String>, max_chars: usize) -> Result<Self, RelayError> {
        let text = text.into();
        validate_text(&text, max_chars)?;
        Ok(Self {
            text,
            field: PromptField::Message,
        })
    }

    /// Parse and validate a raw JSON request body.
    ///
    /// `message` takes precedence over `prompt`. A field only wins if it holds
    /// a non-blank string; otherwise the first field present decides which
    /// client error is reported. An empty body is treated as `{}`.
    pub fn from_json_body(body: &[u8], max_chars: usize) -> Result<Self, RelayError> {
        let value: Value = if body.iter().all(u8::is_ascii_whitespace) {
            Value::Object(Default::default())
        } else {
            serde_json::from_slice(body).map_err(|e| RelayError::InvalidBody(e.to_string()))?
        };

        let object = value
            .as_object()
            .ok_or_else(|| RelayError::InvalidBody("expected a JSON object".to_string()))?;

        let present: Vec<(PromptField, &Value)> = PromptField::ALL
            .iter()
            .filter_map(|field| {
                object
                    .get(field.as_str())
                    .filter(|v| !v.is_null())
                    .map(|v| (*field, v))
            })
            .collect();

        let chosen = present
            .iter()
            .find(|(_, v)| v.as_str().map_or(false, |s| !s.trim().is_empty()))
            .or_else(|| present.first());

        let (field, raw) = chosen.ok_or(RelayError::MissingPrompt)?;
        let text = raw
            .as_str()
            .ok_or(RelayError::PromptNotString(field.as_str()))?;

        validate_text(text, max_chars)?;

        Ok(Self {
            text: text.to_string(),
            field: *field,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn field(&self) -> PromptField {
        self.field
    }

    /// Length in characters, as counted against the cap
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

fn validate_text(text: &str, max_chars: usize) -> Result<(), RelayError> {
    if text.trim().is_empty() {
        return Err(RelayError::EmptyPrompt);
    }
    let actual = text.chars().count();
    if actual > max_chars {
        return Err(RelayError::PromptTooLong {
            max: max_chars,
            actual,
        });
    }
    Ok(())
}

/// Why the provider stopped generating
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FinishReason {
    Stop,
    Safety,
    MaxTokens,
    Other(String),
}

impl FinishReason {
    pub fn as_str(&self) -> &str {
        match self {
            FinishReason::Stop => "STOP",
            FinishReason::Safety => "SAFETY",
            FinishReason::MaxTokens => "MAX_TOKENS",
            FinishReason::Other(code) => code.as_str(),
        }
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, FinishReason::Stop)
    }
}

impl Default for FinishReason {
    fn default() -> Self {
        FinishReason::Stop
    }
}

impl From<String> for FinishReason {
    fn from(code: String) -> Self {
        match code.as_str() {
            "STOP" => FinishReason::Stop,
            "SAFETY" => FinishReason::Safety,
            "MAX_TOKENS" => FinishReason::MaxTokens,
            _ => FinishReason::Other(code),
        }
    }
}

impl From<&str> for FinishReason {
    fn from(code: &str) -> Self {
        FinishReason::from(code.to_string())
    }
}

impl From<FinishReason> for String {
    fn from(reason: FinishReason) -> Self {
        reason.as_str().to_string()
    }
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token accounting reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

/// Text extracted from the first candidate of a buffered generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    pub finish_reason: FinishReason,
    pub usage: Option<TokenUsage>,
}

impl Completion {
    pub fn new(text: impl Into<String>, finish_reason: FinishReason) -> Self {
        Self {
            text: text.into(),
            finish_reason,
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}
