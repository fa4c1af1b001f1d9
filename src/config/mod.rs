use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000"). Unused by the worker binaries.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// PostgreSQL connection string
    pub database_url: String,

    /// Redis connection string for the generation queue
    pub redis_url: String,

    /// Google Gemini API key
    pub gemini_api_key: String,

    /// Gemini model name
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Gemini REST base URL (overridable for tests and proxies)
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    /// TheSportsDB API key ("3" is the public test key)
    #[serde(default = "default_sports_api_key")]
    pub sports_api_key: String,

    /// TheSportsDB base URL
    #[serde(default = "default_sports_api_base_url")]
    pub sports_api_base_url: String,

    /// Comma-separated league names shown in the live scores sidebar
    #[serde(default = "default_league_allow_list")]
    pub league_allow_list: String,

    /// Timeout for sports data requests, in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Prometheus scrape address served by the generation worker
    #[serde(default = "default_worker_metrics_addr")]
    pub worker_metrics_addr: String,

    /// File the sync binary writes its metrics to on exit, for the
    /// node_exporter textfile collector. Skipped when unset.
    #[serde(default)]
    pub sync_metrics_file: Option<String>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_sports_api_key() -> String {
    "3".to_string()
}

fn default_sports_api_base_url() -> String {
    "https://www.thesportsdb.com/api/v1/json".to_string()
}

fn default_league_allow_list() -> String {
    [
        "English Premier League",
        "Spanish La Liga",
        "Italian Serie A",
        "German Bundesliga",
        "French Ligue 1",
        "UEFA Champions League",
        "UEFA Europa League",
        "English League Championship",
        "FA WSL",
        "UEFA Womens Champions League",
        "FIFA World Cup",
        "UEFA European Championships",
    ]
    .join(",")
}

fn default_http_timeout_secs() -> u64 {
    8
}

fn default_worker_metrics_addr() -> String {
    "0.0.0.0:9091".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// League allow-list split into trimmed, non-empty names.
    pub fn leagues(&self) -> Vec<String> {
        self.league_allow_list
            .split(',')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }
}
