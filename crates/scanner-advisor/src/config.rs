//! Backend Configuration
//!
//! Read once at startup and shared read-only afterwards.

use std::time::Duration;

use secrecy::SecretString;

/// HTTP Basic credentials for the backend
#[derive(Clone, Debug)]
pub struct BasicAuth {
    pub username: String,
    pub password: SecretString,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Scanner/validator backend settings
#[derive(Clone, Debug)]
pub struct BackendConfig {
    /// Base URL; `None` makes every call fail fast
    pub base_url: Option<String>,

    pub auth: Option<BasicAuth>,

    pub scanner_timeout: Duration,

    pub validator_timeout: Duration,

    /// Maximum cache age the scanner may serve, in minutes
    pub max_cache_age: u32,

    /// Minimum confluence filter passed to the scanner
    pub min_confluence: Option<f64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            auth: None,
            scanner_timeout: Duration::from_secs(120),
            validator_timeout: Duration::from_secs(60),
            max_cache_age: 5,
            min_confluence: None,
        }
    }
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into().trim_end_matches('/').to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_auth(mut self, auth: BasicAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from a variable lookup; unparsable values keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(url) = non_empty("BACKEND_URL") {
            config.base_url = Some(url.trim_end_matches('/').to_string());
        }
        if let (Some(user), Some(pass)) = (non_empty("BACKEND_USERNAME"), non_empty("BACKEND_PASSWORD")) {
            config.auth = Some(BasicAuth::new(user, pass));
        }
        if let Some(secs) = non_empty("SCANNER_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            config.scanner_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = non_empty("VALIDATOR_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            config.validator_timeout = Duration::from_secs(secs);
        }
        if let Some(minutes) = non_empty("SCANNER_MAX_CACHE_AGE").and_then(|v| v.parse().ok()) {
            config.max_cache_age = minutes;
        }
        config.min_confluence = non_empty("SCANNER_MIN_CONFLUENCE").and_then(|v| v.parse().ok());

        config
    }

    pub const fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }
}
