use std::net::SocketAddr;

pub const DEFAULT_VOICE_ID: &str = "pqHfZKP75CvOlQylNhV4";
pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";
pub const DEFAULT_PLATFORM: &str = "Vercel";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("PORT must be a number, got '{0}'")]
    InvalidPort(String),

    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),
}

/// Server configuration, read once at startup and handed to whoever needs it.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Required for synthesis to succeed, but not for the server to start.
    pub api_key: Option<String>,
    pub voice_id: String,
    pub base_url: String,
    pub platform: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // .env is optional
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => 3000,
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            api_key: var("ELEVENLABS_API_KEY"),
            voice_id: var("ELEVENLABS_VOICE_ID").unwrap_or_else(|| DEFAULT_VOICE_ID.to_string()),
            base_url: var("ELEVENLABS_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            platform: var("PLATFORM").unwrap_or_else(|| DEFAULT_PLATFORM.to_string()),
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(format!("{}:{}", self.host, self.port)))
    }
}
