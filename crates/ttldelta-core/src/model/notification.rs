use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::{StatusTokens, TaskStatus, TaskUri};
use crate::vocab;

/// One RDF term as delivered by the change notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermValue {
    /// Lexical value of the term.
    pub value: String,
    /// Term kind (`uri`, `literal`, ...) when the notifier supplies it.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl TermValue {
    /// Build a URI term value.
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: Some("uri".to_string()),
        }
    }
}

/// A single statement inside a change set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Subject term.
    pub subject: TermValue,
    /// Predicate term.
    pub predicate: TermValue,
    /// Object term.
    pub object: TermValue,
}

/// Statements added and removed in one store transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Statements that were inserted.
    #[serde(default)]
    pub inserts: Vec<Statement>,
    /// Statements that were deleted.
    #[serde(default)]
    pub deletes: Vec<Statement>,
}

/// Ordered batch of change sets pushed to the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Notification(pub Vec<ChangeSet>);

impl Notification {
    /// Every inserted statement across the batch, in delivery order.
    pub fn inserts(&self) -> impl Iterator<Item = &Statement> {
        self.0.iter().flat_map(|change_set| change_set.inserts.iter())
    }

    /// Tasks whose status was set to not-started in this batch.
    ///
    /// Only inserts are inspected. Each task appears once, in first-seen order.
    #[must_use]
    pub fn eligible_tasks(&self, tokens: &StatusTokens) -> Vec<TaskUri> {
        let mut seen = HashSet::new();
        self.inserts()
            .filter(|statement| {
                statement.predicate.value == vocab::ADMS_STATUS
                    && tokens.status_of(&statement.object.value) == Some(TaskStatus::NotStarted)
            })
            .filter(|statement| seen.insert(statement.subject.value.as_str()))
            .map(|statement| TaskUri::new(statement.subject.value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_statement(task: &str, status: &str) -> Statement {
        Statement {
            subject: TermValue::uri(task),
            predicate: TermValue::uri(vocab::ADMS_STATUS),
            object: TermValue::uri(status),
        }
    }

    #[test]
    fn eligible_tasks_only_reads_not_started_inserts() {
        let notification = Notification(vec![
            ChangeSet {
                inserts: vec![
                    status_statement("http://ex/task/1", vocab::STATUS_NOT_STARTED),
                    status_statement("http://ex/task/2", vocab::STATUS_ONGOING),
                ],
                deletes: vec![status_statement("http://ex/task/3", vocab::STATUS_NOT_STARTED)],
            },
            ChangeSet {
                inserts: vec![
                    Statement {
                        subject: TermValue::uri("http://ex/task/4"),
                        predicate: TermValue::uri("http://ex/other"),
                        object: TermValue::uri(vocab::STATUS_NOT_STARTED),
                    },
                    status_statement("http://ex/task/5", vocab::STATUS_NOT_STARTED),
                    status_statement("http://ex/task/1", vocab::STATUS_NOT_STARTED),
                ],
                deletes: Vec::new(),
            },
        ]);

        let tasks = notification.eligible_tasks(&StatusTokens::default());
        assert_eq!(
            tasks,
            vec![TaskUri::from("http://ex/task/1"), TaskUri::from("http://ex/task/5")]
        );
    }

    #[test]
    fn notifier_payload_deserialises_with_extra_fields() -> anyhow::Result<()> {
        let payload = serde_json::json!([{
            "inserts": [{
                "subject": {"type": "uri", "value": "http://ex/task/9"},
                "predicate": {"type": "uri", "value": vocab::ADMS_STATUS},
                "object": {"type": "uri", "value": vocab::STATUS_NOT_STARTED},
                "graph": {"type": "uri", "value": vocab::DEFAULT_GRAPH}
            }],
            "deletes": []
        }, {
            "inserts": []
        }]);
        let notification: Notification = serde_json::from_value(payload)?;
        assert_eq!(notification.0.len(), 2);
        assert_eq!(
            notification.eligible_tasks(&StatusTokens::default()),
            vec![TaskUri::from("http://ex/task/9")]
        );
        Ok(())
    }

    #[test]
    fn empty_batch_has_no_eligible_tasks() {
        assert!(
            Notification::default()
                .eligible_tasks(&StatusTokens::default())
                .is_empty()
        );
    }
}
