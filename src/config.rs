use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_MODEL_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Settings for the page fetch.
#[derive(Clone, Debug)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Model identifier and credential, injected once into the model client.
#[derive(Clone)]
pub struct ModelConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl ModelConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        ModelConfig {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_MODEL_ENDPOINT.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

// Keep the credential out of logs.
impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub fetch: FetchConfig,
    pub model: ModelConfig,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source, applying defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GROQ_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AppError::ConfigError("GROQ_API_KEY is not set".to_string()))?;

        let mut model = ModelConfig::new(api_key.trim());
        if let Some(name) = lookup("MODEL_NAME") {
            model.model = name;
        }
        if let Some(endpoint) = lookup("MODEL_ENDPOINT") {
            model.endpoint = endpoint;
        }
        if let Some(secs) = lookup("MODEL_TIMEOUT_SECS") {
            model.timeout = parse_secs("MODEL_TIMEOUT_SECS", &secs)?;
        }

        let mut fetch = FetchConfig::default();
        if let Some(secs) = lookup("FETCH_TIMEOUT_SECS") {
            fetch.timeout = parse_secs("FETCH_TIMEOUT_SECS", &secs)?;
        }
        if let Some(user_agent) = lookup("FETCH_USER_AGENT") {
            fetch.user_agent = user_agent;
        }

        // Load server configuration with defaults
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("PORT").unwrap_or_else(|| "3000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let server_addr = SocketAddr::new(ip, port);

        Ok(Config {
            server_addr,
            fetch,
            model,
        })
    }
}

fn parse_secs(name: &str, value: &str) -> Result<Duration> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(AppError::ConfigError(format!("{} must be greater than zero", name))),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(AppError::ConfigError(format!("Invalid {}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup_from(&[("GROQ_API_KEY", "gsk_test")])).unwrap();
        assert_eq!(config.server_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.model.api_key, "gsk_test");
        assert_eq!(config.model.model, DEFAULT_MODEL);
        assert_eq!(config.model.endpoint, DEFAULT_MODEL_ENDPOINT);
        assert_eq!(config.model.timeout, Duration::from_secs(120));
        assert_eq!(config.fetch.timeout, Duration::from_secs(10));
        assert_eq!(config.fetch.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("MODEL_NAME", "llama-3.1-8b-instant"),
            ("MODEL_TIMEOUT_SECS", "30"),
            ("FETCH_TIMEOUT_SECS", "5"),
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
        ]))
        .unwrap();
        assert_eq!(config.model.model, "llama-3.1-8b-instant");
        assert_eq!(config.model.timeout, Duration::from_secs(30));
        assert_eq!(config.fetch.timeout, Duration::from_secs(5));
        assert_eq!(config.server_addr.to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_missing_key_rejected() {
        let result = Config::from_lookup(lookup_from(&[("PORT", "8080")]));
        assert!(matches!(result, Err(AppError::ConfigError(_))));

        let result = Config::from_lookup(lookup_from(&[("GROQ_API_KEY", "   ")]));
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = Config::from_lookup(lookup_from(&[("GROQ_API_KEY", "k"), ("PORT", "http")]));
        assert!(matches!(result, Err(AppError::ConfigError(msg)) if msg.starts_with("Invalid port")));

        let result = Config::from_lookup(lookup_from(&[("GROQ_API_KEY", "k"), ("MODEL_TIMEOUT_SECS", "0")]));
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let model = ModelConfig::new("gsk_secret");
        let rendered = format!("{:?}", model);
        assert!(!rendered.contains("gsk_secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
