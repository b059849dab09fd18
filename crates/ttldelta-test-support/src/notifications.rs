//! Builders for delta notifications as the notifier posts them.

use serde_json::{Value, json};
use ttldelta_core::{ChangeSet, Notification, Statement, StatusTokens, TaskStatus, TermValue, vocab};

/// Insert statement setting `task`'s status to `status_uri`.
#[must_use]
pub fn status_insert(task: &str, status_uri: &str) -> Statement {
    Statement {
        subject: TermValue::uri(task),
        predicate: TermValue::uri(vocab::ADMS_STATUS),
        object: TermValue::uri(status_uri),
    }
}

/// Notification with one change set that marks every task as not started.
#[must_use]
pub fn eligible_notification(tasks: &[&str]) -> Notification {
    let tokens = StatusTokens::default();
    let inserts = tasks
        .iter()
        .map(|task| status_insert(task, tokens.token(TaskStatus::NotStarted)))
        .collect();
    Notification(vec![ChangeSet {
        inserts,
        deletes: Vec::new(),
    }])
}

/// JSON body for [`eligible_notification`], in the wire shape of the notifier.
#[must_use]
pub fn notification_json(tasks: &[&str]) -> Value {
    let tokens = StatusTokens::default();
    let inserts: Vec<Value> = tasks
        .iter()
        .map(|task| {
            json!({
                "subject": { "type": "uri", "value": task },
                "predicate": { "type": "uri", "value": vocab::ADMS_STATUS },
                "object": { "type": "uri", "value": tokens.token(TaskStatus::NotStarted) },
                "graph": { "type": "uri", "value": vocab::DEFAULT_GRAPH },
            })
        })
        .collect();
    json!([{ "inserts": inserts, "deletes": [] }])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_agree_with_each_other() -> anyhow::Result<()> {
        let tasks = ["http://ex/task/1", "http://ex/task/2"];
        let parsed: Notification = serde_json::from_value(notification_json(&tasks))?;
        let tokens = StatusTokens::default();
        assert_eq!(
            parsed.eligible_tasks(&tokens),
            eligible_notification(&tasks).eligible_tasks(&tokens)
        );
        Ok(())
    }
}
