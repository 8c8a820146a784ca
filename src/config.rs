use anyhow::{Context, Result};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Runtime configuration read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// In-memory stores are used when unset
    pub database_url: Option<String>,
    pub database_max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a number")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            database_max_connections,
        })
    }
}
