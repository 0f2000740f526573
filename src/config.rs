use thiserror::Error;

pub const DEFAULT_PORT: &str = "3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/submit-survey";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Server settings, read from the environment after `.env` is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Without a database URL responses are kept in memory.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid {
                    name: "DATABASE_MAX_CONNECTIONS",
                    value: raw,
                })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let bind_addr = match lookup("BIND_ADDR") {
            Some(addr) => addr,
            None => {
                let port = lookup("PORT").unwrap_or_else(|| DEFAULT_PORT.to_string());
                if port.trim().parse::<u16>().is_err() {
                    return Err(ConfigError::Invalid {
                        name: "PORT",
                        value: port,
                    });
                }
                format!("0.0.0.0:{}", port.trim())
            }
        };

        Ok(Self {
            database_url,
            max_connections,
            bind_addr,
        })
    }
}

/// Settings for the terminal form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormConfig {
    pub endpoint: String,
}

impl FormConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            endpoint: lookup("SURVEY_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |name| map.get(name).map(|v| v.to_string())
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_explicit_values() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/survey"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
            ("PORT", "8080"),
        ]))
        .unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/survey"));
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.bind_addr, "0.0.0.0:8080");

        let config = Config::from_lookup(lookup(&[("BIND_ADDR", "127.0.0.1:9000"), ("PORT", "1")])).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
    }

    #[test]
    fn test_invalid_numbers() {
        let err = Config::from_lookup(lookup(&[("DATABASE_MAX_CONNECTIONS", "many")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "DATABASE_MAX_CONNECTIONS", .. }));

        let err = Config::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn test_form_endpoint() {
        assert_eq!(FormConfig::from_lookup(lookup(&[])).endpoint, DEFAULT_ENDPOINT);
        assert_eq!(
            FormConfig::from_lookup(lookup(&[("SURVEY_ENDPOINT", "http://survey.local/api/submit-survey")]))
                .endpoint,
            "http://survey.local/api/submit-survey"
        );
    }
}
