use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::{Completion, CompletionRequest, TextGenerator, TokenUsage};

// ============================================================================
// Wire types (chat-completions API)
// ============================================================================

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct UpstreamErrorBody {
    error: Option<UpstreamErrorDetail>,
}

#[derive(Deserialize)]
struct UpstreamErrorDetail {
    message: Option<String>,
}

// ============================================================================
// OpenAiClient
// ============================================================================

/// HTTP adapter for an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    /// Create a new client. The underlying `reqwest::Client` is configured
    /// with a 30-second per-request timeout.
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("failed to build reqwest client");

        Self {
            http,
            base_url,
            api_key,
            model,
        }
    }

    /// Map a non-success upstream status into the error taxonomy. The
    /// pipeline core never inspects transport status codes directly.
    fn classify_status(status: StatusCode, message: String) -> AppError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::UpstreamAuth(message),
            StatusCode::TOO_MANY_REQUESTS => AppError::UpstreamRateLimited(message),
            _ => AppError::Upstream(format!("{status}: {message}")),
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, request: CompletionRequest) -> Result<Completion, AppError> {
        let body = ChatCompletionBody {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<UpstreamErrorBody>(&text)
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message)
                .unwrap_or(text);
            return Err(Self::classify_status(status, message));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("invalid completion body: {e}")))?;

        // Missing content collapses to an empty string; structured callers
        // will reject it at parse time.
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(Completion {
            text,
            usage: parsed.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            OpenAiClient::classify_status(StatusCode::UNAUTHORIZED, "bad key".into()),
            AppError::UpstreamAuth(_)
        ));
        assert!(matches!(
            OpenAiClient::classify_status(StatusCode::FORBIDDEN, "no access".into()),
            AppError::UpstreamAuth(_)
        ));
        assert!(matches!(
            OpenAiClient::classify_status(StatusCode::TOO_MANY_REQUESTS, "slow down".into()),
            AppError::UpstreamRateLimited(_)
        ));
        assert!(matches!(
            OpenAiClient::classify_status(StatusCode::BAD_GATEWAY, "oops".into()),
            AppError::Upstream(_)
        ));
    }

    #[test]
    fn test_body_serialization_json_mode() {
        let body = ChatCompletionBody {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.7,
            max_tokens: 1500,
            response_format: Some(ResponseFormat {
                format_type: "json_object",
            }),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["max_tokens"], 1500);
    }

    #[test]
    fn test_body_serialization_omits_format_when_unset() {
        let body = ChatCompletionBody {
            model: "gpt-4o-mini",
            messages: vec![],
            temperature: 0.7,
            max_tokens: 2000,
            response_format: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("response_format").is_none());
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{
            "choices": [{"message": {"content": "Generated text"}}],
            "usage": {"prompt_tokens": 100, "completion_tokens": 50, "total_tokens": 150}
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);
        assert_eq!(content.as_deref(), Some("Generated text"));
        assert_eq!(parsed.usage.unwrap().total_tokens, 150);
    }

    #[test]
    fn test_missing_content_is_empty_string() {
        let raw = r#"{"choices": [{"message": {}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        assert_eq!(text, "");
    }
}
