use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// MediaWiki action API endpoint
    #[serde(default = "default_wiki_api_url")]
    pub wiki_api_url: String,

    /// Gemini generative API base URL
    #[serde(default = "default_gemini_api_url")]
    pub gemini_api_url: String,

    /// Gemini API key; when empty the generative path is skipped and every
    /// recommendation request goes straight to the heuristic fallback
    #[serde(default)]
    pub gemini_api_key: String,

    /// Gemini model identifier
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Allowed CORS origin for the browser client
    #[serde(default = "default_client_url")]
    pub client_url: String,

    /// Per-upstream-call timeout in seconds
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,

    /// Maximum concurrent enrichment lookups per recommendation request
    #[serde(default = "default_enrich_concurrency")]
    pub enrich_concurrency: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_wiki_api_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_gemini_api_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_client_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_upstream_timeout_secs() -> u64 {
    15
}

fn default_enrich_concurrency() -> usize {
    4
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5500
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
