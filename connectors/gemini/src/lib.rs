//! Gemini connector for PromptRelay

use futures::{StreamExt, TryStreamExt};
use promptrelay_core::prelude::*;
use reqwest::{Client, Response};
use std::future::Future;
use std::time::Instant;
use tracing::{debug, error, info, warn};

mod config;
mod models;

pub use config::{GeminiConfig, DEFAULT_SAFETY_THRESHOLD};
use models::*;

/// Gemini implementation of ContentGenerator
pub struct GeminiConnector {
    client: Client,
    config: GeminiConfig,
}

impl GeminiConnector {
    /// Create a new Gemini connector.
    ///
    /// Only the connect timeout is set on the client; the call deadline is
    /// applied per request so that event streams are not cut off mid-flight.
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let config = config.normalized();
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| ProviderError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Build the provider payload for a prompt
    fn build_request(&self, request: &PromptRequest) -> ContentRequest {
        ContentRequest {
            contents: vec![Content::new_user(request.text())],
            generation_config: GenerationConfig {
                max_output_tokens: self.config.max_output_tokens,
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                top_k: self.config.top_k,
            },
            safety_settings: SafetySetting::uniform(&self.config.safety_threshold),
        }
    }

    /// Endpoint URL without the key; the key is appended as a query pair
    fn endpoint_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.model,
            method
        )
    }

    /// POST the payload and return the response once a success status arrives
    async fn send(
        &self,
        url: &str,
        extra_query: &[(&str, &str)],
        api_key: &ApiKey,
        body: &ContentRequest,
    ) -> Result<Response, ProviderError> {
        let response = self
            .client
            .post(url)
            .query(extra_query)
            .query(&[("key", api_key.expose_secret().as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let summary = GeminiError::message_from_body(&error_text).unwrap_or_else(|| error_text.clone());
        error!("Gemini API error {}: {}", status, summary);

        Err(ProviderError::Http {
            status: status.as_u16(),
            body: error_text,
        })
    }

    /// Run `fut` under the configured deadline. Expiry drops the in-flight call.
    async fn with_deadline<T>(
        &self,
        fut: impl Future<Output = Result<T, ProviderError>>,
    ) -> Result<T, ProviderError> {
        let deadline = self.config.timeout();
        match tokio::time::timeout(deadline, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Gemini call exceeded {:?}; abandoning request", deadline);
                Err(ProviderError::Timeout(deadline))
            }
        }
    }

    /// Map a transport error without ever exposing the request URL (it carries the key)
    fn classify(&self, e: reqwest::Error) -> ProviderError {
        let e = e.without_url();
        if e.is_timeout() {
            ProviderError::Timeout(self.config.timeout())
        } else if e.is_connect() || e.is_request() || e.is_body() {
            ProviderError::Network(e.to_string())
        } else if e.is_decode() {
            ProviderError::InvalidResponse(e.to_string())
        } else {
            ProviderError::Internal(e.to_string())
        }
    }

    /// Pull the first candidate's text out of a parsed response
    fn extract_completion(response: ContentResponse) -> Result<Completion, ProviderError> {
        let Some(candidate) = response.candidates.first() else {
            let feedback = response.prompt_feedback;
            let ratings = feedback.as_ref().map(PromptFeedback::ratings).unwrap_or_default();
            let block_reason = feedback.and_then(|f| f.block_reason);
            warn!(
                "Gemini returned no candidates (block reason: {:?}, ratings: {:?})",
                block_reason, ratings
            );
            return Err(ProviderError::NoCandidates { block_reason });
        };

        let finish_reason = candidate
            .finish_reason
            .as_deref()
            .map(FinishReason::from)
            .unwrap_or_default();

        let Some(text) = candidate.first_text() else {
            warn!(
                "Gemini candidate had no content (finish reason {}, blocked: {:?})",
                finish_reason,
                candidate.blocked_categories()
            );
            return Err(ProviderError::EmptyContent { finish_reason });
        };

        let mut completion = Completion::new(text, finish_reason);
        if let Some(usage) = response.usage_metadata {
            completion = completion.with_usage(TokenUsage {
                prompt_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
                total_tokens: usage.total_token_count,
            });
        }
        Ok(completion)
    }
}

#[async_trait]
impl ContentGenerator for GeminiConnector {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, api_key: &ApiKey, request: &PromptRequest) -> Result<Completion, ProviderError> {
        debug!(
            model = %self.config.model,
            prompt_chars = request.char_len(),
            "Sending generateContent request to Gemini"
        );
        let start_time = Instant::now();

        let payload = self.build_request(request);
        let url = self.endpoint_url("generateContent");

        let content_response: ContentResponse = self
            .with_deadline(async {
                let response = self.send(&url, &[], api_key, &payload).await?;
                let raw = response.bytes().await.map_err(|e| self.classify(e))?;
                serde_json::from_slice(&raw)
                    .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {}", e)))
            })
            .await?;

        let completion = Self::extract_completion(content_response)?;

        info!(
            prompt_tokens = completion.usage.map(|u| u.prompt_tokens),
            output_tokens = completion.usage.map(|u| u.output_tokens),
            total_tokens = completion.usage.map(|u| u.total_tokens),
            "Gemini completion finished in {}ms ({} characters, finish reason {})",
            start_time.elapsed().as_millis(),
            completion.text.chars().count(),
            completion.finish_reason
        );

        Ok(completion)
    }

    async fn stream(&self, api_key: &ApiKey, request: &PromptRequest) -> Result<ByteStream, ProviderError> {
        debug!(
            model = %self.config.model,
            prompt_chars = request.char_len(),
            "Opening streamGenerateContent request to Gemini"
        );

        let payload = self.build_request(request);
        let url = self.endpoint_url("streamGenerateContent");

        let response = self
            .with_deadline(self.send(&url, &[("alt", "sse")], api_key, &payload))
            .await?;

        info!("Gemini event stream opened ({})", response.status());

        let deadline = self.config.timeout();
        let stream = response
            .bytes_stream()
            .map_err(move |e| {
                let e = e.without_url();
                if e.is_timeout() {
                    ProviderError::Timeout(deadline)
                } else {
                    ProviderError::Network(e.to_string())
                }
            })
            .boxed();

        Ok(stream)
    }
}
