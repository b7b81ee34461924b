//! Runtime configuration for the LLM backend.
//!
//! Everything comes from environment variables with sensible defaults, so the
//! library works out of the box against an OpenAI-compatible endpoint and can
//! be pointed at a local server (Ollama, vLLM) without code changes.

/// Application-level constants
pub const APP_NAME: &str = "parsEPD";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Connection settings for an OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL up to and excluding `/chat/completions`.
    pub base_url: String,
    /// Bearer token; omitted entirely when unset (local backends).
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Reads configuration from `PARSEPD_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        let base_url = std::env::var("PARSEPD_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_owned());
        let api_key = std::env::var("PARSEPD_API_KEY").ok().filter(|k| !k.is_empty());
        let model =
            std::env::var("PARSEPD_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_owned());
        let timeout_secs = std::env::var("PARSEPD_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);
        Self {
            base_url,
            api_key,
            model,
            timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-free assertions only; tests run in parallel and must not mutate
    // process environment.

    #[test]
    fn defaults_are_populated() {
        let config = LlmConfig::from_env();
        assert!(!config.base_url.is_empty());
        assert!(!config.model.is_empty());
        assert!(config.timeout_secs > 0);
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
        assert_eq!(APP_NAME, "parsEPD");
    }
}
