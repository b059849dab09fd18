use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::TaskError;
use crate::vocab;

/// Lifecycle status of a conversion task.
///
/// Tasks move `NotStarted → Ongoing → {Successful | Failed}` and never go back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created externally, waiting to be picked up.
    NotStarted,
    /// Claimed by this service; files are being converted.
    Ongoing,
    /// Every input file was converted and registered.
    Successful,
    /// Processing stopped on an error.
    Failed,
}

impl TaskStatus {
    /// Stable machine-readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Ongoing => "ongoing",
            Self::Successful => "successful",
            Self::Failed => "failed",
        }
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Successful | Self::Failed)
    }

    /// Whether moving from `self` to `next` is a legal lifecycle step.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::NotStarted, Self::Ongoing)
                | (Self::Ongoing, Self::Successful)
                | (Self::Ongoing, Self::Failed)
        )
    }

    /// Validate a transition and return the new status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::InvalidTransition`] when the step is not part of the lifecycle.
    pub fn transition(self, next: Self) -> Result<Self, TaskError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TaskError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Mapping between [`TaskStatus`] values and the URIs the metadata store uses for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTokens {
    not_started: String,
    ongoing: String,
    successful: String,
    failed: String,
}

impl StatusTokens {
    /// Build a mapping from explicit URIs.
    pub fn new(
        not_started: impl Into<String>,
        ongoing: impl Into<String>,
        successful: impl Into<String>,
        failed: impl Into<String>,
    ) -> Self {
        Self {
            not_started: not_started.into(),
            ongoing: ongoing.into(),
            successful: successful.into(),
            failed: failed.into(),
        }
    }

    /// URI recorded in the store for `status`.
    #[must_use]
    pub fn token(&self, status: TaskStatus) -> &str {
        match status {
            TaskStatus::NotStarted => &self.not_started,
            TaskStatus::Ongoing => &self.ongoing,
            TaskStatus::Successful => &self.successful,
            TaskStatus::Failed => &self.failed,
        }
    }

    /// Status represented by `token`, if it is one of the four known URIs.
    #[must_use]
    pub fn status_of(&self, token: &str) -> Option<TaskStatus> {
        [
            TaskStatus::NotStarted,
            TaskStatus::Ongoing,
            TaskStatus::Successful,
            TaskStatus::Failed,
        ]
        .into_iter()
        .find(|status| self.token(*status) == token)
    }
}

impl Default for StatusTokens {
    fn default() -> Self {
        Self::new(
            vocab::STATUS_NOT_STARTED,
            vocab::STATUS_ONGOING,
            vocab::STATUS_SUCCESSFUL,
            vocab::STATUS_FAILED,
        )
    }
}
