//! HTTP client for a running relay

use crate::error::CliError;
use futures::StreamExt;
use promptrelay_core::PromptField;
use promptrelay_http::RelayBody;
use reqwest::{header::CONTENT_TYPE, Client, Response};
use std::io::Write;
use std::time::Duration;
use tracing::{debug, error};

/// Outcome of a successful prompt
#[derive(Debug)]
pub enum RelayReply {
    /// JSON body from a buffered relay
    Buffered(RelayBody),
    /// Event stream copied to the writer
    Streamed { bytes: usize },
}

/// API client for the relay
pub struct RelayClient {
    client: Client,
    endpoint: String,
}

impl RelayClient {
    /// Create a new API client
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, CliError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CliError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Send a prompt. Event streams are copied to `out` as they arrive.
    pub async fn prompt<W: Write>(
        &self,
        field: PromptField,
        text: &str,
        out: &mut W,
    ) -> Result<RelayReply, CliError> {
        let mut body = serde_json::Map::new();
        body.insert(field.as_str().to_string(), serde_json::Value::String(text.to_string()));

        debug!("POST {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| CliError::Request(format!("HTTP POST failed: {}", e)))?;

        if response.status().is_success() && is_event_stream(&response) {
            return copy_stream(response, out).await;
        }

        self.handle_response(response).await.map(RelayReply::Buffered)
    }

    /// Check status and parse the relay's JSON body
    async fn handle_response(&self, response: Response) -> Result<RelayBody, CliError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CliError::Request(format!("Failed to read response: {}", e)))?;

        let parsed = serde_json::from_str::<RelayBody>(&text);

        if status.is_success() {
            return parsed.map_err(|e| CliError::Request(format!("Failed to parse JSON response: {}", e)));
        }

        error!("Relay error {}: {}", status, text);
        let message = match parsed {
            Ok(body) => match (body.error, body.details) {
                (Some(error), Some(details)) => format!("{} ({})", error, details),
                (Some(error), None) => error,
                (None, _) => text,
            },
            Err(_) => text,
        };

        Err(CliError::Relay {
            status: status.as_u16(),
            message,
        })
    }
}

fn is_event_stream(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v.starts_with("text/event-stream"))
}

async fn copy_stream<W: Write>(response: Response, out: &mut W) -> Result<RelayReply, CliError> {
    let mut stream = response.bytes_stream();
    let mut bytes = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| CliError::Request(format!("Stream interrupted: {}", e)))?;
        out.write_all(&chunk)?;
        out.flush()?;
        bytes += chunk.len();
    }
    Ok(RelayReply::Streamed { bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> RelayClient {
        RelayClient::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_buffered_reply_is_parsed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(serde_json::json!({"message": "hi"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "response": "hello",
                "text": "hello",
                "finishReason": "STOP",
                "timestamp": "2026-01-01T00:00:00Z"
            })))
            .mount(&server)
            .await;

        let mut out = Vec::new();
        let reply = client(&server)
            .prompt(PromptField::Message, "hi", &mut out)
            .await
            .unwrap();

        match reply {
            RelayReply::Buffered(body) => assert_eq!(body.output(), Some("hello")),
            other => panic!("unexpected reply: {:?}", other),
        }
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_prompt_field_is_honored() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(serde_json::json!({"prompt": "hi"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "text": "ok",
                "timestamp": "2026-01-01T00:00:00Z"
            })))
            .mount(&server)
            .await;

        let mut out = Vec::new();
        let reply = client(&server).prompt(PromptField::Prompt, "hi", &mut out).await;
        assert!(matches!(reply, Ok(RelayReply::Buffered(_))));
    }

    #[tokio::test]
    async fn test_event_stream_is_copied() {
        let server = MockServer::start().await;
        let events = "data: {\"a\":1}\n\ndata: {\"a\":2}\n\n";
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(events, "text/event-stream"))
            .mount(&server)
            .await;

        let mut out = Vec::new();
        let reply = client(&server)
            .prompt(PromptField::Message, "hi", &mut out)
            .await
            .unwrap();

        assert!(matches!(reply, RelayReply::Streamed { bytes } if bytes == events.len()));
        assert_eq!(String::from_utf8(out).unwrap(), events);
    }

    #[tokio::test]
    async fn test_error_body_becomes_relay_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "success": false,
                "error": "Rate limit exceeded; please try again later",
                "details": "quota",
                "timestamp": "2026-01-01T00:00:00Z"
            })))
            .mount(&server)
            .await;

        let mut out = Vec::new();
        let err = client(&server)
            .prompt(PromptField::Message, "hi", &mut out)
            .await
            .unwrap_err();

        match err {
            CliError::Relay { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("Rate limit"));
                assert!(message.contains("quota"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_relay() {
        let client = RelayClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let mut out = Vec::new();
        let err = client.prompt(PromptField::Message, "hi", &mut out).await.unwrap_err();
        assert!(matches!(err, CliError::Request(_)));
    }
}
