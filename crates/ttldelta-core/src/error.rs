//! # Design
//!
//! - Keep error messages constant; carry the failing operation and inputs as fields.
//! - `StoreError` is backend-agnostic: transport errors are boxed so the core crate does not
//!   depend on an HTTP client.
//! - `TaskError` is everything that can abort one task; the lifecycle resolves it into a
//!   `FAILED` status write.

use std::error::Error;

use thiserror::Error;

use crate::model::TaskStatus;

/// Result alias for metadata store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result alias for task lifecycle operations.
pub type TaskResult<T> = Result<T, TaskError>;

/// Errors raised by metadata store gateways.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request could not be delivered to the store.
    #[error("store request failed")]
    Request {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying transport failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The store answered with a non-success status.
    #[error("store returned an error status")]
    Status {
        /// Operation identifier.
        operation: &'static str,
        /// HTTP status code returned by the store.
        status: u16,
        /// Response body, when one could be read.
        body: Option<String>,
    },
    /// The store response could not be decoded.
    #[error("store response could not be decoded")]
    Decode {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying decode failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A result binding was missing or held an unexpected value.
    #[error("store result binding invalid")]
    InvalidBinding {
        /// Operation identifier.
        operation: &'static str,
        /// Variable name that failed.
        variable: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// A failure injected by an in-process store.
    #[error("store operation failed")]
    Injected {
        /// Operation identifier.
        operation: &'static str,
    },
}

/// Errors that abort processing of a single task.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The requested status change is not allowed by the lifecycle.
    #[error("invalid task status transition")]
    InvalidTransition {
        /// Status the task was in.
        from: TaskStatus,
        /// Status that was requested.
        to: TaskStatus,
    },
    /// A metadata store operation failed.
    #[error("task store operation failed")]
    Store {
        /// Operation identifier.
        operation: &'static str,
        /// Source store error.
        #[source]
        source: StoreError,
    },
    /// Converting one of the task's input files failed.
    #[error("task file conversion failed")]
    Conversion {
        /// Input file that failed.
        file: String,
        /// Underlying conversion failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The worker running the task did not finish cleanly.
    #[error("task worker aborted")]
    Join {
        /// Join failure detail.
        detail: String,
    },
}

impl TaskError {
    /// Wrap a store failure with the operation that triggered it.
    #[must_use]
    pub const fn store(operation: &'static str, source: StoreError) -> Self {
        Self::Store { operation, source }
    }

    /// Wrap a conversion failure for the given input file.
    pub fn conversion(
        file: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self::Conversion {
            file: file.into(),
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn task_error_helpers_preserve_sources() {
        let store = TaskError::store("set_status", StoreError::Injected { operation: "update" });
        assert!(matches!(
            store,
            TaskError::Store {
                operation: "set_status",
                ..
            }
        ));
        assert!(store.source().is_some());

        let conversion = TaskError::conversion("/share/a.ttl", io::Error::other("boom"));
        assert_eq!(conversion.to_string(), "task file conversion failed");
        assert!(conversion.source().is_some());
    }

    #[test]
    fn store_error_messages_are_constant() {
        let status = StoreError::Status {
            operation: "query",
            status: 500,
            body: Some("virtuoso exploded".into()),
        };
        assert_eq!(status.to_string(), "store returned an error status");
        assert!(status.source().is_none());
    }
}
