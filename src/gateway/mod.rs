//! External model gateway.
//!
//! A thin call-and-parse wrapper around a multimodal completion API: one
//! request in, the first choice's text out. No streaming, caching or retries.

mod error;
mod mock;
mod openai;

pub use error::GatewayError;
pub use mock::MockGateway;
pub use openai::OpenAiGateway;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

/// Image sent alongside a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub media_type: String,
    pub data: Vec<u8>,
}

impl ImageAttachment {
    /// Wrap raw image bytes, sniffing the media type from the magic bytes
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            media_type: sniff_media_type(&data).to_string(),
            data,
        }
    }

    /// Encode as a `data:` URL
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, BASE64.encode(&self.data))
    }
}

/// Guess an image media type; unknown content is sent as PNG
pub fn sniff_media_type(data: &[u8]) -> &'static str {
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else {
        "image/png"
    }
}

/// A single completion call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub images: Vec<ImageAttachment>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn text(model: impl Into<String>, prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            images: Vec::new(),
            temperature,
            max_tokens: None,
        }
    }

    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.images.push(image);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Trait for multimodal completion providers
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Provider name (e.g., "openai")
    fn name(&self) -> &str;

    /// Whether an API key is available
    fn is_configured(&self) -> bool;

    /// Send one request and return the generated text
    async fn complete(&self, request: CompletionRequest) -> Result<String, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_media_type() {
        assert_eq!(sniff_media_type(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
        assert_eq!(sniff_media_type(b"\x89PNG\r\n"), "image/png");
        assert_eq!(sniff_media_type(b""), "image/png");
    }

    #[test]
    fn test_data_url_encoding() {
        let image = ImageAttachment::from_bytes(b"\x89PNG".to_vec());
        assert_eq!(image.to_data_url(), "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_request_builder() {
        let request = CompletionRequest::text("gpt-4o", "describe", 0.3)
            .with_image(ImageAttachment::from_bytes(vec![1, 2, 3]))
            .with_max_tokens(Some(512));
        assert_eq!(request.images.len(), 1);
        assert_eq!(request.max_tokens, Some(512));
        assert!((request.temperature - 0.3).abs() < f32::EPSILON);
    }
}
