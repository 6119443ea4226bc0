use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// `development` exposes error details in responses
    #[serde(default = "default_environment")]
    pub environment: String,

    /// PostgreSQL connection URL for profiles and analytics; in-memory store when unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// Redis connection URL for catalog caching; no caching when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// TMDB API key; the static fallback catalog is used when unset
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// OpenAI API key; AI scoring is disabled when unset
    #[serde(default)]
    pub openai_api_key: Option<String>,

    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,

    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Upper bound on a single AI scoring call
    #[serde(default = "default_ai_timeout_secs")]
    pub ai_timeout_secs: u64,

    #[serde(default = "default_rate_limit_max_requests")]
    pub rate_limit_max_requests: u32,

    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,

    /// Number of distinct clients tracked by the rate limiter
    #[serde(default = "default_rate_limit_capacity")]
    pub rate_limit_capacity: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_environment() -> String {
    "production".to_string()
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_openai_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_ai_timeout_secs() -> u64 {
    20
}

fn default_rate_limit_max_requests() -> u32 {
    10
}

fn default_rate_limit_window_secs() -> u64 {
    60
}

fn default_rate_limit_capacity() -> usize {
    10_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            database_url: None,
            redis_url: None,
            tmdb_api_key: None,
            tmdb_api_url: default_tmdb_api_url(),
            openai_api_key: None,
            openai_api_url: default_openai_api_url(),
            openai_model: default_openai_model(),
            ai_timeout_secs: default_ai_timeout_secs(),
            rate_limit_max_requests: default_rate_limit_max_requests(),
            rate_limit_window_secs: default_rate_limit_window_secs(),
            rate_limit_capacity: default_rate_limit_capacity(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}
