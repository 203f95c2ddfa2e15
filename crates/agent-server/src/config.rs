//! Server Settings

use std::time::Duration;

use agent_core::provider::DEFAULT_MODEL;
use agent_core::reasoning::DEFAULT_MAX_ROUNDS;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Settings the binary reads beyond the provider and backend configs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub model: String,
    pub max_rounds: usize,
    pub exchange_timeout: Option<Duration>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            model: non_empty("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            max_rounds: non_empty("AGENT_MAX_ROUNDS")
                .and_then(|v| v.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(DEFAULT_MAX_ROUNDS),
            exchange_timeout: non_empty("AGENT_EXCHANGE_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .filter(|&secs| secs > 0)
                .map(Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_rounds, 8);
        assert!(config.exchange_timeout.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(|key| {
            let value = match key {
                "BIND_ADDR" => Some("127.0.0.1:8080"),
                "ANTHROPIC_MODEL" => Some("claude-3-5-haiku-latest"),
                "AGENT_MAX_ROUNDS" => Some("4"),
                "AGENT_EXCHANGE_TIMEOUT_SECS" => Some("90"),
                _ => None,
            };
            value.map(String::from)
        });

        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.model, "claude-3-5-haiku-latest");
        assert_eq!(config.max_rounds, 4);
        assert_eq!(config.exchange_timeout, Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_zero_rounds_falls_back() {
        let config = ServerConfig::from_lookup(|key| (key == "AGENT_MAX_ROUNDS").then(|| "0".to_string()));
        assert_eq!(config.max_rounds, DEFAULT_MAX_ROUNDS);
    }
}
