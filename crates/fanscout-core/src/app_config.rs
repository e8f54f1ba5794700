use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Google Custom Search credentials. Only constructed when both halves are set.
#[derive(Clone)]
pub struct SearchCredentials {
    pub api_key: String,
    pub engine_id: String,
}

impl std::fmt::Debug for SearchCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCredentials")
            .field("api_key", &"[redacted]")
            .field("engine_id", &self.engine_id)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub youtube_api_key: Option<String>,
    pub google_search_api_key: Option<String>,
    pub google_search_engine_id: Option<String>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub search_budget: usize,
    pub search_min_interval_ms: u64,
    pub search_results_per_query: u32,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub comments_per_video: usize,
}

impl AppConfig {
    /// Returns the search credentials if both the API key and engine id are set.
    ///
    /// `None` means the resolver runs in "not configured" mode: bio text is
    /// still consulted but no search requests are issued.
    #[must_use]
    pub fn search_credentials(&self) -> Option<SearchCredentials> {
        match (&self.google_search_api_key, &self.google_search_engine_id) {
            (Some(api_key), Some(engine_id)) if !api_key.is_empty() && !engine_id.is_empty() => {
                Some(SearchCredentials {
                    api_key: api_key.clone(),
                    engine_id: engine_id.clone(),
                })
            }
            _ => None,
        }
    }

    /// Returns the `YouTube` Data API key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `YOUTUBE_API_KEY` is unset or empty.
    pub fn require_youtube_api_key(&self) -> Result<&str, ConfigError> {
        self.youtube_api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("YOUTUBE_API_KEY".to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field(
                "youtube_api_key",
                &self.youtube_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "google_search_api_key",
                &self.google_search_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("google_search_engine_id", &self.google_search_engine_id)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("search_budget", &self.search_budget)
            .field("search_min_interval_ms", &self.search_min_interval_ms)
            .field("search_results_per_query", &self.search_results_per_query)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("comments_per_video", &self.comments_per_video)
            .finish()
    }
}
