use std::env;

/// Process-wide settings, read once from the environment at startup.
///
/// Per-request tuning (chunk size/overlap, similarity K, pages to scan)
/// lives in the request body, not here.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    /// OpenAI-compatible chat completion endpoint.
    pub chat_base_url: String,
    pub chat_api_key: String,
    pub chat_model: String,
    /// OpenAI-compatible embeddings endpoint (may differ from chat).
    pub embedding_base_url: String,
    pub embedding_api_key: String,
    pub embedding_model: String,
    /// Message-composition service (system/user prompt text).
    pub composer_base_url: String,
    /// Web search provider.
    pub search_base_url: String,
    pub search_api_key: String,
    /// Places/shopping search provider.
    pub serper_base_url: String,
    pub serper_api_key: String,
    /// Applied to every outbound HTTP call.
    pub request_timeout_secs: u64,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            port: env_parsed("PORT", 3005),
            chat_base_url: env_or(
                "CHAT_BASE_URL",
                "https://api.groq.com/openai/v1",
            ),
            chat_api_key: env_or("CHAT_API_KEY", ""),
            chat_model: env_or("CHAT_MODEL", "mixtral-8x7b-32768"),
            embedding_base_url: env_or(
                "EMBEDDING_BASE_URL",
                "https://api.openai.com/v1",
            ),
            embedding_api_key: env_or("EMBEDDING_API_KEY", ""),
            embedding_model: env_or("EMBEDDING_MODEL", "text-embedding-3-small"),
            composer_base_url: env_or("COMPOSER_BASE_URL", "http://localhost:5000"),
            search_base_url: env_or(
                "SEARCH_BASE_URL",
                "https://api.search.brave.com/res/v1/web/search",
            ),
            search_api_key: env_or("SEARCH_API_KEY", ""),
            serper_base_url: env_or("SERPER_BASE_URL", "https://google.serper.dev"),
            serper_api_key: env_or("SERPER_API_KEY", ""),
            request_timeout_secs: env_parsed("REQUEST_TIMEOUT_SECS", 30),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|val| val.parse::<T>().ok())
        .unwrap_or(default)
}
