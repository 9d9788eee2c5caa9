use crate::config::{EndpointConfig, GenerationConfig};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A chat message in the OpenAI-compatible wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Per-request sampling parameters.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f64,
    pub stop: Vec<String>,
}

/// Client for one OpenAI-compatible inference endpoint (HF TGI, vLLM,
/// or anything speaking `/chat/completions`).
pub struct LlmClient {
    label: String,
    base_url: String,
    model_id: Option<String>,
    api_key: String,
    defaults: GenerationParams,
    http: HttpClient,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    stop: &'a [String],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: String,
}

impl LlmClient {
    pub fn new(
        label: String,
        base_url: String,
        model_id: Option<String>,
        api_key: String,
        defaults: GenerationParams,
    ) -> Result<Self> {
        let http = HttpClient::new("matprobe/0.1.0")?;
        Ok(Self {
            label,
            base_url,
            model_id,
            api_key,
            defaults,
            http,
        })
    }

    /// Build a client for a configured endpoint, resolving the URL and
    /// reading the API token from the configured env var.
    pub fn from_endpoint(endpoint: &EndpointConfig, generation: &GenerationConfig) -> Result<Self> {
        let base_url = endpoint.resolve_url()?;
        let api_key = std::env::var(&generation.api_key_env).unwrap_or_default();
        Self::new(
            endpoint.label.clone(),
            base_url,
            endpoint.model_id.clone(),
            api_key,
            GenerationParams {
                max_tokens: generation.max_tokens,
                temperature: generation.temperature,
                stop: generation.stop.clone(),
            },
        )
    }

    pub fn default_params(&self) -> GenerationParams {
        self.defaults.clone()
    }

    /// Send a conversation with the endpoint's default sampling parameters.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let params = self.defaults.clone();
        self.chat_with(messages, &params).await
    }

    /// Send a conversation with explicit sampling parameters.
    pub async fn chat_with(
        &self,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<String> {
        debug!(
            endpoint = %self.label,
            max_tokens = params.max_tokens,
            "sending chat completion request"
        );

        let request = ChatRequest {
            model: self.model_id.as_deref(),
            messages,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            stop: &params.stop,
        };

        let body = serde_json::to_string(&request)
            .map_err(|e| Error::parse(format!("serialize request: {e}")))?;

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let auth = format!("Bearer {}", self.api_key);
        let headers: Vec<(&str, &str)> = if self.api_key.is_empty() {
            Vec::new()
        } else {
            vec![("Authorization", auth.as_str())]
        };

        let response_text = self
            .http
            .post_json_raw(&url, &body, &headers)
            .await
            .map_err(|e| {
                warn!(endpoint = %self.label, "inference API error: {e}");
                e
            })?;

        let resp: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| Error::parse(format!("parse chat response: {e}")))?;

        resp.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::parse("empty response from inference endpoint"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_omits_null_model_and_empty_stop() {
        let messages = vec![ChatMessage::user("hi")];
        let request = ChatRequest {
            model: None,
            messages: &messages,
            max_tokens: 100,
            temperature: 0.6,
            stop: &[],
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("\"model\""));
        assert!(!json.contains("\"stop\""));
        assert!(json.contains("\"role\":\"user\""));
    }

    #[test]
    fn request_includes_model_and_stop_when_set() {
        let messages = vec![ChatMessage::system("s"), ChatMessage::user("q")];
        let stop = vec!["Task".to_string()];
        let request = ChatRequest {
            model: Some("tgi"),
            messages: &messages,
            max_tokens: 1000,
            temperature: 0.6,
            stop: &stop,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"model\":\"tgi\""));
        assert!(json.contains("\"stop\":[\"Task\"]"));
    }

    #[test]
    fn response_takes_first_choice() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"8"}},{"message":{"role":"assistant","content":"9"}}]}"#;
        let resp: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.choices[0].message.content, "8");
    }
}
