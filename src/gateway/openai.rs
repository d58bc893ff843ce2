//! OpenAI-compatible chat completions gateway

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::{CompletionRequest, Gateway, GatewayError};
use crate::config::GatewayConfig;

const PROVIDER_NAME: &str = "openai";

/// Gateway backed by a `/chat/completions` endpoint
pub struct OpenAiGateway {
    api_key: Option<String>,
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

impl OpenAiGateway {
    /// Create a gateway; `api_key` is `None` when the key is missing from the
    /// environment, in which case every call fails with `NotConfigured`.
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("dashmigrate/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::network(PROVIDER_NAME, e.to_string()))?;

        Ok(Self {
            api_key,
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create the gateway from configuration, reading the key once
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let api_key = config.api_key();
        if api_key.is_none() {
            tracing::warn!(
                env = %config.api_key_env,
                "Model API key not set; extraction and analysis steps will fail"
            );
        }
        Self::new(
            api_key,
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_body(request: &CompletionRequest) -> ChatRequest {
        let content = if request.images.is_empty() {
            MessageContent::Text(request.prompt.clone())
        } else {
            let mut parts = vec![ContentPart::Text {
                text: request.prompt.clone(),
            }];
            parts.extend(request.images.iter().map(|image| ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: image.to_data_url(),
                },
            }));
            MessageContent::Parts(parts)
        };

        ChatRequest {
            model: request.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content,
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    /// Extract the first choice's text from a response body
    fn parse_completion(body: &str) -> Result<String, GatewayError> {
        let response: ChatResponse = serde_json::from_str(body)
            .map_err(|e| GatewayError::malformed(PROVIDER_NAME, e.to_string()))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::malformed(PROVIDER_NAME, "response has no choices"))?;

        if let Some(refusal) = choice.message.refusal.filter(|r| !r.is_empty()) {
            return Err(GatewayError::malformed(
                PROVIDER_NAME,
                format!("model refused: {}", refusal),
            ));
        }

        choice
            .message
            .content
            .ok_or_else(|| GatewayError::malformed(PROVIDER_NAME, "first choice has no content"))
    }
}

#[async_trait]
impl Gateway for OpenAiGateway {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, GatewayError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GatewayError::not_configured(PROVIDER_NAME))?;

        let body = Self::build_body(&request);
        let started = Instant::now();

        tracing::info!(
            model = %request.model,
            temperature = request.temperature,
            images = request.images.len(),
            "Calling model"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::network(PROVIDER_NAME, e.to_string()))?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::network(PROVIDER_NAME, e.to_string()))?;

        tracing::debug!(
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Model responded"
        );

        match status {
            200..=299 => Self::parse_completion(&text),
            401 => Err(GatewayError::unauthorized(PROVIDER_NAME)),
            403 => Err(GatewayError::forbidden(PROVIDER_NAME)),
            429 => Err(GatewayError::rate_limited(PROVIDER_NAME, retry_after)),
            status => Err(GatewayError::http(PROVIDER_NAME, status, text)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ImageAttachment;

    fn gateway(api_key: Option<&str>) -> OpenAiGateway {
        OpenAiGateway::new(
            api_key.map(str::to_string),
            "http://127.0.0.1:9/v1/",
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[test]
    fn test_provider_name_and_configuration() {
        assert_eq!(gateway(Some("k")).name(), "openai");
        assert!(gateway(Some("k")).is_configured());
        assert!(!gateway(None).is_configured());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        assert_eq!(
            gateway(None).endpoint(),
            "http://127.0.0.1:9/v1/chat/completions"
        );
    }

    #[test]
    fn test_text_only_body_uses_plain_content() {
        let request = CompletionRequest::text("gpt-4o", "olá", 0.2);
        let body = serde_json::to_value(OpenAiGateway::build_body(&request)).unwrap();

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "olá");
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_image_body_lists_text_then_images() {
        let request = CompletionRequest::text("gpt-4o", "compare", 0.3)
            .with_image(ImageAttachment::from_bytes(b"\x89PNG".to_vec()))
            .with_image(ImageAttachment::from_bytes(vec![0xFF, 0xD8, 0xFF]));
        let body = serde_json::to_value(OpenAiGateway::build_body(&request)).unwrap();

        let parts = body["messages"][0]["content"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[0]["text"], "compare");
        assert_eq!(parts[1]["type"], "image_url");
        assert!(parts[1]["image_url"]["url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,"));
        assert!(parts[2]["image_url"]["url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_parse_completion_returns_first_choice() {
        let body = r#"{"choices":[{"message":{"content":"primeiro"}},{"message":{"content":"segundo"}}]}"#;
        assert_eq!(OpenAiGateway::parse_completion(body).unwrap(), "primeiro");
    }

    #[test]
    fn test_parse_completion_rejects_malformed_bodies() {
        for body in [
            "not json",
            r#"{"choices":[]}"#,
            r#"{"choices":[{"message":{"content":null}}]}"#,
            r#"{"choices":[{"message":{"content":null,"refusal":"no"}}]}"#,
        ] {
            let err = OpenAiGateway::parse_completion(body).unwrap_err();
            assert!(
                matches!(err, GatewayError::MalformedResponse { .. }),
                "unexpected error for {}: {}",
                body,
                err
            );
        }
    }

    #[tokio::test]
    async fn test_missing_key_fails_at_call_time() {
        let err = gateway(None)
            .complete(CompletionRequest::text("gpt-4o", "hi", 0.2))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotConfigured { .. }));
    }
}
