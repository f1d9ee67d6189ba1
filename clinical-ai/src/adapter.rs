//! Model endpoint adapter: one chat-completion exchange per call, no retries.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attempt::AttemptResult;
use crate::config::{AiConfig, Credential};
use crate::error::{AiError, AiErrorKind, AiResult};
use crate::models::ImageAttachment;
use crate::prompts::{SYSTEM_PROMPT, VISION_SYSTEM_PROMPT};

pub const REFERER_HEADER: &str = "HTTP-Referer";
pub const REFERER: &str = "https://aiscribe.local";
pub const TITLE_HEADER: &str = "X-Title";
pub const TITLE: &str = "AIscribe Medical Transcription";

/// Longest slice of an error body kept in a failure reason
const MAX_REASON_BODY: usize = 300;

/// A language-model endpoint. Implementations turn every transport or
/// provider error into a failed [`AttemptResult`]; nothing propagates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelEndpoint: Send + Sync {
    async fn invoke(
        &self,
        prompt: &str,
        model_id: &str,
        credential: &Credential,
        max_output_tokens: Option<u32>,
    ) -> AttemptResult;

    /// Question about an attached image. Text-only endpoints fail the attempt.
    async fn invoke_vision(
        &self,
        message: &str,
        image: &ImageAttachment,
        model_id: &str,
        credential: &Credential,
        max_output_tokens: Option<u32>,
    ) -> AttemptResult {
        let _ = (message, image, max_output_tokens);
        AttemptResult::failure(
            AiErrorKind::InvalidRequest,
            "Endpoint does not accept images",
            model_id,
            credential.label(),
        )
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    // OpenRouter reports some upstream failures inside a 200 body
    #[serde(default)]
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// OpenAI-compatible chat completions client for OpenRouter
#[derive(Debug, Clone)]
pub struct OpenRouterEndpoint {
    client: Client,
    base_url: String,
    temperature: f32,
}

impl OpenRouterEndpoint {
    pub fn new(config: &AiConfig) -> AiResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AiError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
        })
    }

    async fn complete(
        &self,
        messages: Vec<ChatMessage<'_>>,
        model_id: &str,
        credential: &Credential,
        max_output_tokens: Option<u32>,
    ) -> Result<String, (AiErrorKind, String)> {
        let request = ChatCompletionRequest {
            model: model_id,
            messages,
            temperature: self.temperature,
            max_tokens: max_output_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(credential.api_key().expose_secret())
            .header(REFERER_HEADER, REFERER)
            .header(TITLE_HEADER, TITLE)
            .json(&request)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(classify_transport_error)?;

        if !status.is_success() {
            return Err((
                AiErrorKind::from_status(status.as_u16()),
                format!("HTTP {}: {}", status.as_u16(), excerpt(&body)),
            ));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| (AiErrorKind::Parse, format!("Malformed completion body: {e}")))?;

        if let Some(error) = parsed.error {
            let kind = error
                .code
                .as_ref()
                .and_then(serde_json::Value::as_u64)
                .and_then(|code| u16::try_from(code).ok())
                .map_or(AiErrorKind::Server, AiErrorKind::from_status);
            return Err((kind, format!("Provider error: {}", error.message)));
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| (AiErrorKind::Parse, "Completion contained no message content".to_string()))
    }
}

#[async_trait]
impl ModelEndpoint for OpenRouterEndpoint {
    async fn invoke(
        &self,
        prompt: &str,
        model_id: &str,
        credential: &Credential,
        max_output_tokens: Option<u32>,
    ) -> AttemptResult {
        debug!(
            model = %model_id,
            credential = %credential.label(),
            prompt_chars = prompt.len(),
            max_tokens = ?max_output_tokens,
            "Sending chat completion request"
        );

        let messages = vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(SYSTEM_PROMPT),
            },
            ChatMessage {
                role: "user",
                content: MessageContent::Text(prompt),
            },
        ];
        let completion = self.complete(messages, model_id, credential, max_output_tokens).await;
        attempt_from(completion, model_id, credential)
    }

    async fn invoke_vision(
        &self,
        message: &str,
        image: &ImageAttachment,
        model_id: &str,
        credential: &Credential,
        max_output_tokens: Option<u32>,
    ) -> AttemptResult {
        debug!(
            model = %model_id,
            credential = %credential.label(),
            mime_type = %image.mime_type,
            image_bytes = image.bytes.len(),
            "Sending vision request"
        );

        let messages = vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(VISION_SYSTEM_PROMPT),
            },
            ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text { text: message },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image.data_url(),
                        },
                    },
                ]),
            },
        ];
        let completion = self.complete(messages, model_id, credential, max_output_tokens).await;
        attempt_from(completion, model_id, credential)
    }
}

fn attempt_from(
    completion: Result<String, (AiErrorKind, String)>,
    model_id: &str,
    credential: &Credential,
) -> AttemptResult {
    match completion {
        Ok(text) => AttemptResult::success(text, model_id, credential.label()),
        Err((kind, reason)) => AttemptResult::failure(kind, reason, model_id, credential.label()),
    }
}

fn classify_transport_error(err: reqwest::Error) -> (AiErrorKind, String) {
    let kind = if err.is_timeout() {
        AiErrorKind::Timeout
    } else if err.is_decode() {
        AiErrorKind::Parse
    } else if err.is_builder() {
        AiErrorKind::InvalidRequest
    } else if err.is_connect() || err.is_request() {
        AiErrorKind::Network
    } else {
        AiErrorKind::Unknown
    };
    (kind, err.to_string())
}

fn excerpt(body: &str) -> &str {
    let body = body.trim();
    match body.char_indices().nth(MAX_REASON_BODY) {
        Some((idx, _)) => body.get(..idx).unwrap_or(body),
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_omits_absent_max_tokens() {
        let request = ChatCompletionRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Text("hi"),
            }],
            temperature: 0.3,
            max_tokens: None,
        };
        let json = serde_json::to_value(&request).unwrap();

        assert!(json.get("max_tokens").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_image_message_uses_content_parts() {
        let message = ChatMessage {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: "fracture?" },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: "data:image/png;base64,AAAA".to_string(),
                    },
                },
            ]),
        };
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][0]["text"], "fracture?");
        assert_eq!(json["content"][1]["type"], "image_url");
        assert_eq!(json["content"][1]["image_url"]["url"], "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let body = "é".repeat(400);
        assert_eq!(excerpt(&body).chars().count(), MAX_REASON_BODY);
        assert_eq!(excerpt("  short  "), "short");
    }

    #[tokio::test]
    async fn test_unreachable_base_url_is_failure() {
        let config = AiConfig::new("k", None).with_base_url("http://127.0.0.1:9");
        let endpoint = OpenRouterEndpoint::new(&config).unwrap();
        let credential = Credential::new("Primary API", "k");

        let result = endpoint.invoke("hello", "m", &credential, None).await;

        assert!(!result.is_success());
        assert_eq!(result.error_kind(), Some(AiErrorKind::Network));
        assert_eq!(result.credential_label, "Primary API");
    }
}
