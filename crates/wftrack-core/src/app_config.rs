use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
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

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Video platform credential. Collection for that platform fails without it.
    pub youtube_api_key: Option<String>,
    pub youtube_max_results: u32,
    /// Countries used by scheduled runs and as the CLI default.
    pub countries: Vec<String>,
    /// Six-field cron expression (seconds first) for the periodic refresh.
    pub collect_cron: String,
    pub collect_on_startup: bool,
    pub platform_delay_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Bearer tokens allowed to trigger collection over HTTP. Empty disables auth.
    pub api_keys: Vec<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "youtube_api_key",
                &self.youtube_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("youtube_max_results", &self.youtube_max_results)
            .field("countries", &self.countries)
            .field("collect_cron", &self.collect_cron)
            .field("collect_on_startup", &self.collect_on_startup)
            .field("platform_delay_secs", &self.platform_delay_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("api_keys", &format!("[{} redacted]", self.api_keys.len()))
            .finish()
    }
}
