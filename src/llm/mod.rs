//! LLM transport layer.
//!
//! A single trait, [`ChatClient`], is the seam between the pipeline and the
//! network. The production implementation speaks the OpenAI-compatible chat
//! completion protocol; tests use [`MockChatClient`] with scripted replies.

pub mod openai;

use std::collections::VecDeque;
use std::sync::Mutex;

use thiserror::Error;

use crate::models::ConversationTurn;

pub use openai::OpenAiChatClient;

/// Errors from the chat completion transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Cannot connect to LLM backend at {0}")]
    Connection(String),
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("LLM backend returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),
    #[error("HTTP error: {0}")]
    Http(String),
}

impl TransportError {
    /// Whether a retry has a reasonable chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::MalformedResponse(_) | Self::Http(_) => false,
        }
    }
}

/// Sampling parameters for a completion request.
#[derive(Debug, Clone, Copy)]
pub struct CompletionParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionParams {
    /// Temperature 0 for reproducible classification and extraction runs.
    pub fn deterministic() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: 4096,
        }
    }
}

/// Abstraction over a chat completion backend.
pub trait ChatClient {
    /// Sends `turns` as one conversation and returns the assistant reply text.
    fn complete(
        &self,
        turns: &[ConversationTurn],
        params: CompletionParams,
    ) -> Result<String, TransportError>;
}

/// Scripted client for tests: replies are served in FIFO order, one per call.
pub struct MockChatClient {
    replies: Mutex<VecDeque<String>>,
}

impl MockChatClient {
    pub fn new(reply: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([reply.to_owned()])),
        }
    }

    pub fn then(self, reply: &str) -> Self {
        if let Ok(mut queue) = self.replies.lock() {
            queue.push_back(reply.to_owned());
        }
        self
    }
}

impl ChatClient for MockChatClient {
    fn complete(
        &self,
        _turns: &[ConversationTurn],
        _params: CompletionParams,
    ) -> Result<String, TransportError> {
        self.replies
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .ok_or_else(|| {
                TransportError::MalformedResponse("mock reply queue exhausted".to_owned())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_serves_replies_in_order() {
        let client = MockChatClient::new("first").then("second");
        let params = CompletionParams::deterministic();
        assert_eq!(client.complete(&[], params).unwrap(), "first");
        assert_eq!(client.complete(&[], params).unwrap(), "second");
        assert!(client.complete(&[], params).is_err());
    }

    #[test]
    fn transient_classification() {
        assert!(TransportError::Connection("http://localhost".into()).is_transient());
        assert!(TransportError::Timeout(120).is_transient());
        assert!(TransportError::Api {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(!TransportError::Api {
            status: 401,
            body: String::new()
        }
        .is_transient());
        assert!(!TransportError::MalformedResponse("x".into()).is_transient());
    }

    #[test]
    fn deterministic_params_pin_temperature() {
        let params = CompletionParams::deterministic();
        assert_eq!(params.temperature, 0.0);
        assert!(params.max_tokens >= 1024);
    }
}
