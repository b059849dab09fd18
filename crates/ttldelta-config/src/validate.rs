//! Validation helpers and parsing utilities for configuration values.

use std::net::IpAddr;

use url::Url;

use crate::error::{ConfigError, ConfigResult};

/// Require an absolute URI with a scheme.
pub(crate) fn parse_uri(field: &'static str, value: &str) -> ConfigResult<String> {
    match Url::parse(value) {
        Ok(url) if !url.cannot_be_a_base() || url.scheme() == "urn" => Ok(value.to_string()),
        Ok(_) => Err(ConfigError::invalid(field, "not_hierarchical", value)),
        Err(_) => Err(ConfigError::invalid(field, "not_a_uri", value)),
    }
}

/// Require an `http` or `https` URL.
pub(crate) fn parse_http_url(field: &'static str, value: &str) -> ConfigResult<String> {
    let url = Url::parse(value).map_err(|_| ConfigError::invalid(field, "not_a_url", value))?;
    match url.scheme() {
        "http" | "https" => Ok(value.to_string()),
        _ => Err(ConfigError::invalid(field, "unsupported_scheme", value)),
    }
}

pub(crate) fn parse_port(field: &'static str, value: &str) -> ConfigResult<u16> {
    let port: u16 = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(field, "not_a_port", value))?;
    if port == 0 {
        return Err(ConfigError::invalid(field, "zero", value));
    }
    Ok(port)
}

pub(crate) fn parse_bind_addr(field: &'static str, value: &str) -> ConfigResult<IpAddr> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(field, "not_an_ip_address", value))
}

/// Require a storage-scheme prefix of the form `scheme://`.
pub(crate) fn parse_share_prefix(field: &'static str, value: &str) -> ConfigResult<String> {
    let scheme = value
        .strip_suffix("://")
        .ok_or_else(|| ConfigError::invalid(field, "missing_scheme_separator", value))?;
    let valid = scheme
        .chars()
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if valid {
        Ok(value.to_string())
    } else {
        Err(ConfigError::invalid(field, "invalid_scheme", value))
    }
}
