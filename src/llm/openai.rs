//! Blocking HTTP client for OpenAI-compatible chat completion endpoints.

use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::models::ConversationTurn;

use super::{ChatClient, CompletionParams, TransportError};

/// One automatic retry on connection failures, timeouts, and 5xx responses.
const TRANSIENT_RETRIES: u32 = 1;

/// Chat completion client for any backend speaking the OpenAI protocol
/// (`POST {base_url}/chat/completions`).
pub struct OpenAiChatClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OpenAiChatClient {
    pub fn new(base_url: &str, api_key: Option<String>, model: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
            client,
            timeout_secs,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(
            &config.base_url,
            config.api_key.clone(),
            &config.model,
            config.timeout_secs,
        )
    }

    fn send_once(
        &self,
        turns: &[ConversationTurn],
        params: CompletionParams,
    ) -> Result<String, TransportError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: turns,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            stream: false,
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().map_err(|e| {
            if e.is_connect() {
                TransportError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                TransportError::Timeout(self.timeout_secs)
            } else {
                TransportError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TransportError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .map_err(|e| TransportError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| TransportError::MalformedResponse("empty choices array".to_owned()))
    }
}

impl ChatClient for OpenAiChatClient {
    fn complete(
        &self,
        turns: &[ConversationTurn],
        params: CompletionParams,
    ) -> Result<String, TransportError> {
        let mut attempt = 0;
        loop {
            match self.send_once(turns, params) {
                Ok(reply) => return Ok(reply),
                Err(err) if err.is_transient() && attempt < TRANSIENT_RETRIES => {
                    attempt += 1;
                    tracing::warn!(attempt, error = %err, "transient LLM error, retrying");
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Request body for `/chat/completions`.
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ConversationTurn],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_trims_trailing_slash() {
        let client = OpenAiChatClient::new("http://localhost:11434/v1/", None, "gpt-4o-mini", 60);
        assert_eq!(client.base_url, "http://localhost:11434/v1");
        assert_eq!(client.timeout_secs, 60);
    }

    #[test]
    fn from_config_carries_all_fields() {
        let config = LlmConfig {
            base_url: "https://api.openai.com/v1".into(),
            api_key: Some("sk-test".into()),
            model: "gpt-4o-mini".into(),
            timeout_secs: 90,
        };
        let client = OpenAiChatClient::from_config(&config);
        assert_eq!(client.model, "gpt-4o-mini");
        assert_eq!(client.api_key.as_deref(), Some("sk-test"));
        assert_eq!(client.timeout_secs, 90);
    }

    #[test]
    fn request_body_serializes_turns_inline() {
        let turns = vec![
            ConversationTurn::system("rubric"),
            ConversationTurn::user("document text"),
        ];
        let body = ChatCompletionRequest {
            model: "gpt-4o-mini",
            messages: &turns,
            temperature: 0.0,
            max_tokens: 4096,
            stream: false,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"role\":\"system\""));
        assert!(json.contains("\"content\":\"document text\""));
        assert!(json.contains("\"stream\":false"));
    }

    #[test]
    fn response_body_parses_first_choice() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"VALID EPD"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content, "VALID EPD");
    }
}
