//! Typed service configuration and its environment loaders.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use ttldelta_core::StatusTokens;

use crate::defaults;
use crate::error::{ConfigError, ConfigResult};
use crate::validate::{
    parse_bind_addr, parse_http_url, parse_port, parse_share_prefix, parse_uri,
};

/// Requested log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormatSetting {
    /// Pick a format from the build profile.
    Inferred,
    /// Structured JSON lines.
    Json,
    /// Human-readable output.
    Pretty,
}

/// Complete service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Graph holding task metadata.
    pub task_graph: String,
    /// Graph holding file metadata.
    pub file_graph: String,
    /// SPARQL query and update endpoint.
    pub sparql_endpoint: String,
    /// Storage-scheme prefix of physical file URIs.
    pub share_uri_prefix: String,
    /// Directory the prefix maps to.
    pub share_mount: PathBuf,
    /// Base for minted logical file URIs.
    pub file_resource_base: String,
    /// Service URI recorded as creator of generated files.
    pub service_uri: Option<String>,
    /// HTTP bind address.
    pub bind_addr: IpAddr,
    /// HTTP port.
    pub port: u16,
    /// Log level directive used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Log output format.
    pub log_format: LogFormatSetting,
    /// External URIs of the task status values.
    pub status_tokens: StatusTokens,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] naming the first variable that fails validation.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    ///
    /// Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] naming the first variable that fails validation.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let or_default =
            |name: &str, fallback: &str| get(name).unwrap_or_else(|| fallback.to_string());

        let task_graph = parse_uri("TASK_GRAPH", &or_default("TASK_GRAPH", defaults::TASK_GRAPH))?;
        let file_graph = parse_uri("FILE_GRAPH", &or_default("FILE_GRAPH", defaults::FILE_GRAPH))?;
        let sparql_endpoint = parse_http_url(
            "MU_SPARQL_ENDPOINT",
            &or_default("MU_SPARQL_ENDPOINT", defaults::SPARQL_ENDPOINT),
        )?;
        let share_uri_prefix = parse_share_prefix(
            "SHARE_URI_PREFIX",
            &or_default("SHARE_URI_PREFIX", defaults::SHARE_URI_PREFIX),
        )?;
        let share_mount = PathBuf::from(or_default("SHARE_MOUNT", defaults::SHARE_MOUNT));
        if !share_mount.is_absolute() {
            return Err(ConfigError::InvalidField {
                field: "SHARE_MOUNT",
                reason: "not_absolute",
                value: Some(share_mount.display().to_string()),
            });
        }
        let file_resource_base = parse_uri(
            "FILE_RESOURCE_BASE",
            &or_default("FILE_RESOURCE_BASE", defaults::FILE_RESOURCE_BASE),
        )?;
        let service_uri = get("SERVICE_URI")
            .map(|value| parse_uri("SERVICE_URI", &value))
            .transpose()?;
        let bind_addr = parse_bind_addr("BIND_ADDR", &or_default("BIND_ADDR", defaults::BIND_ADDR))?;
        let port = get("PORT")
            .map_or(Ok(defaults::PORT), |value| parse_port("PORT", &value))?;
        let log_level = or_default("LOG_LEVEL", defaults::LOG_LEVEL);
        let log_format = match get("LOG_FORMAT").map(|value| value.to_ascii_lowercase()) {
            None => LogFormatSetting::Inferred,
            Some(value) if value == "json" => LogFormatSetting::Json,
            Some(value) if value == "pretty" || value == "text" => LogFormatSetting::Pretty,
            Some(value) => return Err(ConfigError::invalid("LOG_FORMAT", "unknown_format", &value)),
        };

        Ok(Self {
            task_graph,
            file_graph,
            sparql_endpoint,
            share_uri_prefix,
            share_mount,
            file_resource_base,
            service_uri,
            bind_addr,
            port,
            log_level,
            log_format,
            status_tokens: StatusTokens::default(),
        })
    }

    /// Socket address the HTTP listener binds to.
    #[must_use]
    pub const fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            task_graph: defaults::TASK_GRAPH.to_string(),
            file_graph: defaults::FILE_GRAPH.to_string(),
            sparql_endpoint: defaults::SPARQL_ENDPOINT.to_string(),
            share_uri_prefix: defaults::SHARE_URI_PREFIX.to_string(),
            share_mount: PathBuf::from(defaults::SHARE_MOUNT),
            file_resource_base: defaults::FILE_RESOURCE_BASE.to_string(),
            service_uri: None,
            bind_addr: IpAddr::from([0, 0, 0, 0]),
            port: defaults::PORT,
            log_level: defaults::LOG_LEVEL.to_string(),
            log_format: LogFormatSetting::Inferred,
            status_tokens: StatusTokens::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> ConfigResult<AppConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() -> ConfigResult<()> {
        assert_eq!(load(&[])?, AppConfig::default());
        Ok(())
    }

    #[test]
    fn graphs_are_read_from_the_environment() -> ConfigResult<()> {
        let config = load(&[
            ("TASK_GRAPH", "http://ex/graphs/tasks"),
            ("FILE_GRAPH", "http://ex/graphs/files"),
            ("SERVICE_URI", "http://ex/services/ttl-to-delta"),
            ("PORT", "8080"),
            ("BIND_ADDR", "127.0.0.1"),
        ])?;
        assert_eq!(config.task_graph, "http://ex/graphs/tasks");
        assert_eq!(config.file_graph, "http://ex/graphs/files");
        assert_eq!(
            config.service_uri.as_deref(),
            Some("http://ex/services/ttl-to-delta")
        );
        assert_eq!(config.listen_addr().to_string(), "127.0.0.1:8080");
        Ok(())
    }

    #[test]
    fn blank_values_fall_back_to_defaults() -> ConfigResult<()> {
        let config = load(&[("TASK_GRAPH", "   "), ("SERVICE_URI", "")])?;
        assert_eq!(config.task_graph, defaults::TASK_GRAPH);
        assert_eq!(config.service_uri, None);
        Ok(())
    }

    #[test]
    fn invalid_values_name_the_variable() {
        assert!(matches!(
            load(&[("PORT", "0")]),
            Err(ConfigError::InvalidField { field: "PORT", .. })
        ));
        assert!(matches!(
            load(&[("FILE_GRAPH", "not a uri")]),
            Err(ConfigError::InvalidField {
                field: "FILE_GRAPH",
                ..
            })
        ));
        assert!(matches!(
            load(&[("SHARE_MOUNT", "share")]),
            Err(ConfigError::InvalidField {
                field: "SHARE_MOUNT",
                reason: "not_absolute",
                ..
            })
        ));
        assert!(matches!(
            load(&[("LOG_FORMAT", "xml")]),
            Err(ConfigError::InvalidField {
                field: "LOG_FORMAT",
                ..
            })
        ));
    }

    #[test]
    fn log_format_is_case_insensitive() -> ConfigResult<()> {
        assert_eq!(load(&[("LOG_FORMAT", "JSON")])?.log_format, LogFormatSetting::Json);
        assert_eq!(
            load(&[("LOG_FORMAT", "pretty")])?.log_format,
            LogFormatSetting::Pretty
        );
        Ok(())
    }
}
