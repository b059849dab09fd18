//! # Design
//!
//! - Centralize application-level errors for bootstrap.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: ttldelta_config::ConfigError,
    },
    /// API server operations failed.
    #[error("api server operation failed")]
    ApiServer {
        /// Operation identifier.
        operation: &'static str,
        /// Source API server error.
        source: ttldelta_api::ApiServerError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: ttldelta_telemetry::TelemetryError,
    },
    /// Metadata store setup failed.
    #[error("metadata store operation failed")]
    Store {
        /// Operation identifier.
        operation: &'static str,
        /// Source store error.
        source: ttldelta_core::StoreError,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: ttldelta_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn api_server(
        operation: &'static str,
        source: ttldelta_api::ApiServerError,
    ) -> Self {
        Self::ApiServer { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: ttldelta_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn store(operation: &'static str, source: ttldelta_core::StoreError) -> Self {
        Self::Store { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn app_errors_keep_constant_messages_and_sources() {
        let config = AppError::config(
            "config.from_env",
            ttldelta_config::ConfigError::InvalidField {
                field: "PORT",
                reason: "not_a_number",
                value: Some("eighty".into()),
            },
        );
        assert_eq!(config.to_string(), "configuration operation failed");
        assert!(config.source().is_some());

        let store = AppError::store(
            "sparql_store.new",
            ttldelta_core::StoreError::Injected { operation: "new" },
        );
        assert_eq!(store.to_string(), "metadata store operation failed");
        assert!(store.source().is_some());
    }
}
