//! OpenAI-compatible chat completions provider
//!
//! Works with any endpoint that speaks the `/chat/completions` protocol
//! (OpenAI, DeepSeek, proxies). Only the first choice is used.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::DomainError;
use crate::ports::{ChatMessage, CompletionOptions, CompletionResponse, LlmProvider, TokenUsage};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "deepseek-v3";

/// Chat completions client
#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    /// Creates a provider for the default endpoint and model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Points the provider at another OpenAI-compatible endpoint.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Bounds every request at the HTTP level.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, DomainError> {
        self.client = Client::builder().timeout(timeout).build().map_err(|e| {
            DomainError::ExternalService(format!("failed to build HTTP client: {}", e))
        })?;
        Ok(self)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

// ============================================
// Request/Response Types
// ============================================

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, DomainError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::ExternalService(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, &body));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| DomainError::ExternalService(format!("malformed completion: {}", e)))?;

        into_completion(body, &self.model)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// ============================================
// Helper Functions
// ============================================

fn into_completion(
    body: ChatCompletionResponse,
    requested_model: &str,
) -> Result<CompletionResponse, DomainError> {
    let choice = body
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| DomainError::ExternalService("completion has no choices".to_string()))?;

    Ok(CompletionResponse {
        // A missing content field is an empty answer, judged by the caller
        content: choice.message.content.unwrap_or_default(),
        model: if body.model.is_empty() {
            requested_model.to_string()
        } else {
            body.model
        },
        usage: body.usage.unwrap_or_default(),
        finish_reason: choice.finish_reason,
    })
}

fn map_http_error(status: StatusCode, body: &str) -> DomainError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|err| err.get("message"))
                .and_then(|msg| msg.as_str())
                .map(|msg| msg.to_string())
        })
        .unwrap_or_else(|| body.to_string());

    if status == StatusCode::TOO_MANY_REQUESTS {
        return DomainError::ExternalService(format!("rate limited: {}", message));
    }

    DomainError::ExternalService(format!("API error ({}): {}", status.as_u16(), message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let messages = [ChatMessage::user("hi")];
        let request = ChatCompletionRequest {
            model: "deepseek-v3",
            messages: &messages,
            max_tokens: None,
            temperature: Some(0.3),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "deepseek-v3");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_first_choice_is_used() {
        let body: ChatCompletionResponse = serde_json::from_str(
            r#"{"model":"deepseek-v3","choices":[
                {"message":{"role":"assistant","content":"{\"character\":\"我\"}"},"finish_reason":"stop"},
                {"message":{"role":"assistant","content":"second"},"finish_reason":"stop"}],
               "usage":{"prompt_tokens":10,"completion_tokens":5,"total_tokens":15}}"#,
        )
        .unwrap();
        let completion = into_completion(body, "fallback").unwrap();
        assert_eq!(completion.content, "{\"character\":\"我\"}");
        assert_eq!(completion.usage.total_tokens, 15);
        assert_eq!(completion.finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn test_missing_content_and_choices() {
        let body: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null},"finish_reason":null}]}"#)
                .unwrap();
        let completion = into_completion(body, "deepseek-v3").unwrap();
        assert_eq!(completion.content, "");
        assert_eq!(completion.model, "deepseek-v3");

        let empty: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            into_completion(empty, "m"),
            Err(DomainError::ExternalService(_))
        ));
    }

    #[test]
    fn test_http_error_message_extracted() {
        let err = map_http_error(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"Incorrect API key provided"}}"#,
        );
        assert_eq!(
            err.to_string(),
            "External service error: API error (401): Incorrect API key provided"
        );

        let err = map_http_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(err.to_string().ends_with("upstream down"));
    }

    #[test]
    fn test_with_timeout_keeps_settings() {
        let provider = OpenAiProvider::new("key")
            .with_model("deepseek-chat")
            .with_timeout(Duration::from_secs(5))
            .unwrap();
        assert_eq!(provider.model_id(), "deepseek-chat");
        assert_eq!(provider.provider_name(), "openai");
    }

    #[test]
    fn test_api_base_trailing_slash() {
        let provider = OpenAiProvider::new("key").with_api_base("https://example.com/v1/");
        assert_eq!(provider.endpoint(), "https://example.com/v1/chat/completions");
        assert_eq!(provider.model_id(), DEFAULT_MODEL);
    }
}
