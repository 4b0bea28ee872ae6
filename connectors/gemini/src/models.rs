//! Gemini API data models

use serde::{Deserialize, Serialize};

/// Harm categories that receive an explicit threshold
pub const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Gemini generateContent request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
    pub safety_settings: Vec<SafetySetting>,
}

/// Content part of a request
#[derive(Debug, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
pub struct Part {
    pub text: String,
}

/// Generation configuration
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

#[derive(Debug, Serialize)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

/// Gemini generateContent response
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<ContentResult>,
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub safety_ratings: Vec<SafetyRating>,
}

#[derive(Debug, Deserialize)]
pub struct ContentResult {
    #[serde(default)]
    pub parts: Vec<PartResult>,
}

/// Non-text parts deserialize with `text: None`
#[derive(Debug, Deserialize)]
pub struct PartResult {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SafetyRating {
    pub category: String,
    #[serde(default)]
    pub probability: String,
    #[serde(default)]
    pub blocked: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
    #[serde(default)]
    pub safety_ratings: Vec<SafetyRating>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

/// Gemini error response
#[derive(Debug, Deserialize)]
pub struct GeminiError {
    pub error: ErrorDetails,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetails {
    pub code: u32,
    pub message: String,
    #[serde(default)]
    pub status: String,
}

impl Content {
    pub fn new_user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part { text: text.into() }],
        }
    }
}

impl SafetySetting {
    /// One setting per harm category, all at the same threshold
    pub fn uniform(threshold: &str) -> Vec<Self> {
        HARM_CATEGORIES
            .iter()
            .map(|category| SafetySetting {
                category: category.to_string(),
                threshold: threshold.to_string(),
            })
            .collect()
    }
}

impl Candidate {
    /// First non-empty text part, if any
    pub fn first_text(&self) -> Option<&str> {
        self.content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .find(|t| !t.is_empty())
    }

    /// Categories that the provider flagged as blocked
    pub fn blocked_categories(&self) -> Vec<&str> {
        self.safety_ratings
            .iter()
            .filter(|r| r.blocked)
            .map(|r| r.category.as_str())
            .collect()
    }
}

impl SafetyRating {
    pub fn describe(&self) -> String {
        format!("{}={}", self.category, self.probability)
    }
}

impl PromptFeedback {
    /// `CATEGORY=PROBABILITY` for each rating, for logs
    pub fn ratings(&self) -> Vec<String> {
        self.safety_ratings.iter().map(SafetyRating::describe).collect()
    }
}

impl GeminiError {
    /// Pull the provider's message out of an error body, if it is the standard shape
    pub fn message_from_body(body: &str) -> Option<String> {
        serde_json::from_str::<GeminiError>(body)
            .ok()
            .map(|e| format!("{} ({} {})", e.error.message, e.error.code, e.error.status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_in_camel_case() {
        let request = ContentRequest {
            contents: vec![Content::new_user("hi")],
            generation_config: GenerationConfig {
                max_output_tokens: 8192,
                temperature: 0.7,
                top_p: 0.8,
                top_k: 40,
            },
            safety_settings: SafetySetting::uniform("BLOCK_MEDIUM_AND_ABOVE"),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 8192);
        assert_eq!(json["generationConfig"]["topK"], 40);
        assert_eq!(json["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(json["safetySettings"][1]["category"], "HARM_CATEGORY_HATE_SPEECH");
    }

    #[test]
    fn test_response_tolerates_missing_fields() {
        let response: ContentResponse = serde_json::from_str(
            r#"{
                "candidates": [
                    {"finishReason": "SAFETY",
                     "safetyRatings": [{"category": "HARM_CATEGORY_HARASSMENT", "probability": "HIGH", "blocked": true}]}
                ]
            }"#,
        )
        .unwrap();

        let candidate = &response.candidates[0];
        assert!(candidate.first_text().is_none());
        assert_eq!(candidate.blocked_categories(), vec!["HARM_CATEGORY_HARASSMENT"]);
        assert!(response.usage_metadata.is_none());
    }

    #[test]
    fn test_first_text_skips_non_text_parts() {
        let candidate: Candidate = serde_json::from_str(
            r#"{"content": {"parts": [{"inlineData": {}}, {"text": "hello"}], "role": "model"}}"#,
        )
        .unwrap();
        assert_eq!(candidate.first_text(), Some("hello"));
    }

    #[test]
    fn test_prompt_feedback_ratings() {
        let feedback: PromptFeedback = serde_json::from_str(
            r#"{"blockReason": "SAFETY",
                "safetyRatings": [{"category": "HARM_CATEGORY_HATE_SPEECH", "probability": "HIGH"}]}"#,
        )
        .unwrap();
        assert_eq!(feedback.block_reason.as_deref(), Some("SAFETY"));
        assert_eq!(feedback.ratings(), vec!["HARM_CATEGORY_HATE_SPEECH=HIGH".to_string()]);
    }

    #[test]
    fn test_error_body_message() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(
            GeminiError::message_from_body(body).as_deref(),
            Some("Quota exceeded (429 RESOURCE_EXHAUSTED)")
        );
        assert!(GeminiError::message_from_body("<html>").is_none());
    }
}
