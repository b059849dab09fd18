//! Domain models for conversion tasks.
//!
//! # Design
//! - Task status is a closed sum type; external URIs only appear through [`StatusTokens`].
//! - All status changes go through [`TaskStatus::transition`], the single place where the
//!   monotonic lifecycle is enforced.

mod file;
mod notification;
mod report;
mod status;

pub use file::{GeneratedFile, InputFile, RegisteredFile};
pub use notification::{ChangeSet, Notification, Statement, TermValue};
pub use report::{DispatchReport, NO_TASK_FOUND, TaskOutcome, TaskResolution};
pub use status::{StatusTokens, TaskStatus};

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Identity of a conversion task in the metadata store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskUri(String);

impl TaskUri {
    /// Wrap a task URI.
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Borrow the URI string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TaskUri {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<&str> for TaskUri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TaskUri {
    fn from(value: String) -> Self {
        Self(value)
    }
}
