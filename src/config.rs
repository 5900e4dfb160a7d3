//! Server configuration from the environment.
//!
//! `HOST` and `PORT` pick the bind address (default 0.0.0.0:8080 so the app is
//! reachable on a VPS); `RUST_LOG` overrides the default `info` log filter.

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_filter: String,
    /// Problems found while reading the environment; logged once logging is up.
    pub warnings: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            warnings: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let set = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(host) = set("HOST") {
            config.host = host;
        }
        if let Some(port) = set("PORT") {
            match port.parse() {
                Ok(port) => config.port = port,
                Err(_) => config.warnings.push(format!(
                    "Ignoring invalid PORT {:?}; using {}",
                    port, DEFAULT_PORT
                )),
            }
        }
        if let Some(filter) = set("RUST_LOG") {
            config.log_filter = filter;
        }
        config
    }

    pub fn bind_address(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        assert_eq!(ServerConfig::from_lookup(lookup(&[])), ServerConfig::default());
    }

    #[test]
    fn reads_host_port_and_filter() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("RUST_LOG", "bracket_engine=debug"),
        ]));
        assert_eq!(config.bind_address(), ("127.0.0.1", 9000));
        assert_eq!(config.log_filter, "bracket_engine=debug");
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn invalid_port_falls_back_with_a_warning() {
        let config = ServerConfig::from_lookup(lookup(&[("PORT", "eighty")]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.warnings.len(), 1);
    }
}
