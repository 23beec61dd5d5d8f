use std::net::SocketAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub comment_model: String,
    pub chart_model: String,
    pub request_timeout_secs: u64,
    /// Origins allowed by the HTTP surface's CORS layer.
    pub allowed_origins: Vec<String>,
    /// Fixed seed for comment sampling. `None` draws from the OS RNG.
    pub sampling_seed: Option<u64>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("openai_api_key", &"[redacted]")
            .field("openai_base_url", &self.openai_base_url)
            .field("comment_model", &self.comment_model)
            .field("chart_model", &self.chart_model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("allowed_origins", &self.allowed_origins)
            .field("sampling_seed", &self.sampling_seed)
            .finish()
    }
}
