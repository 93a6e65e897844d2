//! Application configuration loaded from environment variables.

use crate::errors::{RegistryError, Result};

/// Which [`OpaqueStore`](crate::store::OpaqueStore) backs the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

impl StoreBackend {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(RegistryError::Config(format!(
                "Invalid STORE_BACKEND: {other} (expected sqlite or memory)"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite database file holding the key/value entries
    pub database_url: String,
    pub store_backend: StoreBackend,
    /// Port for the REST API server
    pub api_port: u16,
    /// Address of the store contract, quoted in every reveal challenge
    pub contract_address: String,
    /// Chain the store contract lives on, quoted in every reveal challenge
    pub chain_id: u64,
    /// Validity window advertised in the reveal challenge
    pub reveal_duration_days: u32,
    /// Pause between a successful signature and the decoded value
    pub reveal_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            database_url: env_var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./dao_registry.db".to_string()),
            store_backend: StoreBackend::parse(
                &env_var("STORE_BACKEND").unwrap_or_else(|_| "sqlite".to_string()),
            )?,
            api_port: env_var("API_PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .map_err(|_| RegistryError::Config("Invalid API_PORT".to_string()))?,
            contract_address: env_var("CONTRACT_ADDRESS").map_err(|_| {
                RegistryError::Config(
                    "CONTRACT_ADDRESS environment variable is required".to_string(),
                )
            })?,
            chain_id: env_var("CHAIN_ID")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .map_err(|_| RegistryError::Config("Invalid CHAIN_ID".to_string()))?,
            reveal_duration_days: env_var("REVEAL_DURATION_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| RegistryError::Config("Invalid REVEAL_DURATION_DAYS".to_string()))?,
            reveal_delay_ms: env_var("REVEAL_DELAY_MS")
                .unwrap_or_else(|_| "1500".to_string())
                .parse()
                .map_err(|_| RegistryError::Config("Invalid REVEAL_DELAY_MS".to_string()))?,
        })
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| RegistryError::Config(format!("Missing env var: {key}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_backend_parses_known_values() {
        assert_eq!(StoreBackend::parse("sqlite").unwrap(), StoreBackend::Sqlite);
        assert_eq!(StoreBackend::parse(" Memory ").unwrap(), StoreBackend::Memory);
    }

    #[test]
    fn store_backend_rejects_unknown_value() {
        let err = StoreBackend::parse("redis").unwrap_err();
        assert!(matches!(err, RegistryError::Config(msg) if msg.contains("redis")));
    }
}
