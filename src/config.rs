use std::env;
use std::fmt::Display;
use std::str::FromStr;

use dotenvy::dotenv;

// ============================================================================
// Application Configuration
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable '{0}'")]
    Missing(&'static str),

    #[error("Invalid value for '{var}': {message}")]
    Invalid { var: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub metrics_port: u16,
    pub backend: StoreBackend,
    /// Required when the backend is Postgres.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    /// Memory backend only: start with a sample user, SKU and order.
    pub seed_demo_data: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok(); // Load .env file if present

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let server_port = parsed("SERVER_PORT", 8080)?;
        let metrics_port = parsed("METRICS_PORT", 9090)?;
        let db_max_connections = parsed("DB_MAX_CONNECTIONS", 5)?;
        let seed_demo_data = parsed("SEED_DEMO_DATA", false)?;

        let backend = match env::var("STORE_BACKEND") {
            Err(_) => StoreBackend::Postgres,
            Ok(raw) => match raw.as_str() {
                "postgres" => StoreBackend::Postgres,
                "memory" => StoreBackend::Memory,
                other => {
                    return Err(ConfigError::Invalid {
                        var: "STORE_BACKEND".to_string(),
                        message: format!("unknown backend '{other}'"),
                    })
                }
            },
        };

        let database_url = env::var("DATABASE_URL").ok();
        if backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        tracing::info!("Application configuration loaded");

        Ok(Self {
            server_host,
            server_port,
            metrics_port,
            backend,
            database_url,
            db_max_connections,
            seed_demo_data,
        })
    }
}

fn parsed<T>(var: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(var) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var: var.to_string(),
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_falls_back_to_default_when_absent() {
        let port: u16 = parsed("MARKETPLACE_TEST_ABSENT_PORT", 8080).unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_parsed_rejects_garbage() {
        env::set_var("MARKETPLACE_TEST_BAD_PORT", "not-a-port");
        let err = parsed::<u16>("MARKETPLACE_TEST_BAD_PORT", 8080).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_parsed_reads_value() {
        env::set_var("MARKETPLACE_TEST_GOOD_PORT", "9100");
        let port: u16 = parsed("MARKETPLACE_TEST_GOOD_PORT", 8080).unwrap();
        assert_eq!(port, 9100);
    }
}
