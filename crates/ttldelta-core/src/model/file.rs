use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Physical input file resolved for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFile {
    /// Physical file URI (storage-scheme form, e.g. `share://batch/a.ttl`).
    pub physical_uri: String,
    /// Creation time recorded for the physical file.
    pub created: DateTime<Utc>,
}

/// Description of a delta file written by the service, ready to be registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// Physical file URI the output is reachable under.
    pub physical_uri: String,
    /// File name without extension.
    pub name: String,
    /// File extension without the leading dot.
    pub extension: String,
    /// Media type of the content.
    pub format: String,
    /// Size in bytes.
    pub size: u64,
    /// Creation time of the output.
    pub created: DateTime<Utc>,
    /// Service that produced the file, when configured.
    pub creator: Option<String>,
}

/// Identities minted when a generated file is registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredFile {
    /// Logical file URI linked from the task via `prov:generated`.
    pub logical_uri: String,
    /// Physical file URI pointing back at the logical file via `nie:dataSource`.
    pub physical_uri: String,
}
