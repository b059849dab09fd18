//! Traits implemented by the metadata store gateway and the task dispatcher.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::model::{
    DispatchReport, GeneratedFile, InputFile, Notification, RegisteredFile, TaskStatus, TaskUri,
};

/// Query/update surface of the triple store holding task and file metadata.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Physical input files of `task`, oldest creation time first.
    async fn find_input_files(&self, task: &TaskUri) -> StoreResult<Vec<InputFile>>;

    /// Replace whatever status `task` has with `status`.
    async fn set_status(&self, task: &TaskUri, status: TaskStatus) -> StoreResult<()>;

    /// Mint logical and physical identities for `file` and link them to `task`.
    async fn register_generated_file(
        &self,
        task: &TaskUri,
        file: &GeneratedFile,
    ) -> StoreResult<RegisteredFile>;

    /// Tasks currently holding `status`.
    async fn tasks_in_status(&self, status: TaskStatus) -> StoreResult<Vec<TaskUri>>;
}

/// Entry point used by the HTTP surface to hand a notification to the lifecycle.
#[async_trait]
pub trait TaskDispatcher: Send + Sync {
    /// Process every eligible task in `notification` and report how each ended.
    async fn dispatch(&self, notification: Notification) -> DispatchReport;
}
