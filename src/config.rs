//! Environment-driven configuration. Every optional subsystem is gated
//! by its variable being present and non-empty.

#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the relational SQLite database. Unset: reads fall back
    /// to seed data, writes are rejected.
    pub database_url: Option<String>,
    /// Path to the tenant document-cache database.
    pub docstore_url: Option<String>,
    /// Base URL of the external collector.
    pub collector_base_url: Option<String>,
    /// HMAC secret for session tokens and the password vault key.
    pub jwt_secret: Option<String>,
    /// Base URL of the OAuth server for the callback exchange.
    pub oauth_server_url: Option<String>,
    /// Enables the fixed demo-credential login.
    pub standalone_mode: bool,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let opt = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let flag = |name: &str| {
            matches!(
                opt(name).as_deref().map(str::to_ascii_lowercase).as_deref(),
                Some("1") | Some("true") | Some("yes")
            )
        };

        Config {
            database_url: opt("DATABASE_URL"),
            docstore_url: opt("DOCSTORE_URL"),
            collector_base_url: opt("COLLECTOR_BASE_URL"),
            jwt_secret: opt("JWT_SECRET"),
            oauth_server_url: opt("OAUTH_SERVER_URL"),
            standalone_mode: flag("STANDALONE_MODE"),
            host: opt("COCKPIT_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: opt("COCKPIT_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(7420),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]);
        assert!(config.database_url.is_none());
        assert!(!config.standalone_mode);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 7420);
    }

    #[test]
    fn empty_values_count_as_unset() {
        let config = config_from(&[("DATABASE_URL", "  "), ("JWT_SECRET", "")]);
        assert!(config.database_url.is_none());
        assert!(config.jwt_secret.is_none());
    }

    #[test]
    fn standalone_flag_accepts_common_spellings() {
        for v in ["1", "true", "TRUE", "yes"] {
            assert!(config_from(&[("STANDALONE_MODE", v)]).standalone_mode);
        }
        assert!(!config_from(&[("STANDALONE_MODE", "0")]).standalone_mode);
    }

    #[test]
    fn port_parses_or_defaults() {
        assert_eq!(config_from(&[("COCKPIT_PORT", "8080")]).port, 8080);
        assert_eq!(config_from(&[("COCKPIT_PORT", "nope")]).port, 7420);
    }
}
