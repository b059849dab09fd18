use serde::{Deserialize, Serialize};

use crate::model::{RegisteredFile, TaskUri};

/// Acknowledgement sent when a notification held no eligible task.
pub const NO_TASK_FOUND: &str = "No TTL to delta task found in delta message.";

/// How processing of one task ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "resolution", rename_all = "snake_case")]
pub enum TaskResolution {
    /// All input files were converted and registered.
    Successful {
        /// Files registered for the task, in conversion order.
        generated: Vec<RegisteredFile>,
    },
    /// Processing stopped on an error; files registered before it are kept.
    Failed {
        /// Files registered before the failure.
        generated: Vec<RegisteredFile>,
        /// Rendered error chain.
        reason: String,
    },
    /// Another worker in this process already owns the task.
    Skipped,
}

/// Result of one task within a dispatched notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutcome {
    /// Task that was processed.
    pub task: TaskUri,
    /// How it ended.
    #[serde(flatten)]
    pub resolution: TaskResolution,
}

/// Summary of every task triggered by one notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    /// Outcomes in the order the tasks appeared in the notification.
    pub outcomes: Vec<TaskOutcome>,
}

impl DispatchReport {
    /// Whether the notification contained no eligible task.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn count(&self, predicate: impl Fn(&TaskResolution) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| predicate(&outcome.resolution))
            .count()
    }

    /// Number of tasks that ended successfully.
    #[must_use]
    pub fn successful(&self) -> usize {
        self.count(|resolution| matches!(resolution, TaskResolution::Successful { .. }))
    }

    /// Number of tasks that ended in failure.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|resolution| matches!(resolution, TaskResolution::Failed { .. }))
    }

    /// Number of tasks left to another worker.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|resolution| matches!(resolution, TaskResolution::Skipped))
    }

    /// Plain-text acknowledgement returned to the notifier.
    #[must_use]
    pub fn acknowledgement(&self) -> String {
        if self.is_empty() {
            return NO_TASK_FOUND.to_string();
        }
        let mut message = format!(
            "Processed {} task(s): {} successful, {} failed",
            self.outcomes.len(),
            self.successful(),
            self.failed()
        );
        let skipped = self.skipped();
        if skipped > 0 {
            message.push_str(&format!(", {skipped} skipped"));
        }
        message
    }
}
