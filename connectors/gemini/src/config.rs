//! Configuration for the Gemini connector

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Safety threshold applied to every harm category
pub const DEFAULT_SAFETY_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";

/// Gemini API configuration. The API key is supplied per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Model to use (e.g., "gemini-2.5-flash")
    pub model: String,
    /// API base URL, up to and including the version segment
    pub api_base: String,
    /// Maximum tokens to generate
    pub max_output_tokens: u32,
    /// Sampling temperature (0.0 to 2.0)
    pub temperature: f32,
    /// Nucleus sampling probability mass
    pub top_p: f32,
    /// Top-k sampling cutoff
    pub top_k: u32,
    /// Threshold for the harassment, hate, sexual and dangerous categories
    pub safety_threshold: String,
    /// Deadline for one provider call in milliseconds
    pub timeout_ms: u64,
    /// TCP connect timeout in milliseconds
    pub connect_timeout_ms: u64,
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            max_output_tokens: 8192,
            temperature: 0.7,
            top_p: 0.8,
            top_k: 40,
            safety_threshold: DEFAULT_SAFETY_THRESHOLD.to_string(),
            timeout_ms: 60_000,
            connect_timeout_ms: 10_000,
        }
    }

    /// Set the model to use
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set maximum output tokens
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    /// Set nucleus sampling parameters
    pub fn with_sampling(mut self, top_p: f32, top_k: u32) -> Self {
        self.top_p = top_p.clamp(0.0, 1.0);
        self.top_k = top_k;
        self
    }

    /// Set the safety threshold
    pub fn with_safety_threshold(mut self, threshold: impl Into<String>) -> Self {
        self.safety_threshold = threshold.into();
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Pull sampling values back into the ranges the API accepts.
    /// Values loaded from files or the environment skip the builder clamps.
    pub fn normalized(mut self) -> Self {
        self.temperature = self.temperature.clamp(0.0, 2.0);
        self.top_p = self.top_p.clamp(0.0, 1.0);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self::new()
    }
}
