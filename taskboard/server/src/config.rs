use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub db_url: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Shortest trimmed query the search endpoint accepts.
    #[serde(default = "default_search_min_query_length")]
    pub search_min_query_length: usize,
    /// `tracing_subscriber::EnvFilter` directive, e.g. `info,sqlx=warn`.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }
}

fn default_port() -> u16 {
    8080
}

fn default_search_min_query_length() -> usize {
    3
}

fn default_log_filter() -> String {
    "info".to_string()
}
