use kartochki_core::{ChunkerConfig, Provider, Result};

/// Server configuration, read from the environment once at startup.
pub struct Config {
    pub host: String,
    pub port: u16,
    pub provider: Provider,
    pub chunker: ChunkerConfig,
    pub default_group_count: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("KARTOCHKI_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("KARTOCHKI_PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(8000);

        let provider = match std::env::var("KARTOCHKI_PROVIDER") {
            Ok(name) => Provider::parse(&name)?,
            Err(_) => Provider::default(),
        };

        Ok(Self {
            host,
            port,
            provider,
            chunker: ChunkerConfig::default(),
            default_group_count: 2,
        })
    }
}
