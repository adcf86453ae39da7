use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::AppError;

/// Runtime configuration, read once at startup from the environment
/// (after `dotenvy::dotenv()` has loaded any local `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Directory holding the SQLite database file.
    pub data_dir: PathBuf,
    /// LLM API key (bearer token for the chat-completions endpoint).
    pub llm_api_key: String,
    /// LLM API base URL, without trailing slash.
    pub llm_base_url: String,
    /// Model identifier sent with every completion request.
    pub llm_model: String,
    /// Hosted auth provider base URL, without trailing slash.
    pub auth_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let bind_addr = env_or("BIND_ADDR", "127.0.0.1:8080")
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Validation(format!("BIND_ADDR is not a valid address: {e}")))?;

        let data_dir = PathBuf::from(env_or("DATA_DIR", "./data"));

        let llm_api_key = require_env("LLM_API_KEY")?;
        let llm_base_url = trim_slash(env_or("LLM_BASE_URL", "https://api.openai.com"));
        let llm_model = env_or("LLM_MODEL", "gpt-4o-mini");
        let auth_base_url = trim_slash(require_env("AUTH_BASE_URL")?);

        Ok(Self {
            bind_addr,
            data_dir,
            llm_api_key,
            llm_base_url,
            llm_model,
            auth_base_url,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).ok().filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
}

fn require_env(key: &str) -> Result<String, AppError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{key} must be set")))
}

fn trim_slash(mut s: String) -> String {
    while s.ends_with('/') {
        s.pop();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_slash() {
        assert_eq!(trim_slash("https://api.openai.com/".into()), "https://api.openai.com");
        assert_eq!(trim_slash("https://api.openai.com".into()), "https://api.openai.com");
        assert_eq!(trim_slash("http://x//".into()), "http://x");
    }
}
