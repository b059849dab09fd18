//! In-process `MetadataStore` for tests and local runs.
//!
//! Keeps task status, input files and registrations in memory, records every mutation
//! in order, and can be told to fail chosen operations.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ttldelta_core::{
    GeneratedFile, InputFile, MetadataStore, RegisteredFile, StoreError, StoreResult, TaskStatus,
    TaskUri, vocab,
};

/// A store mutation, in the order it was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// A status write.
    SetStatus {
        /// Task whose status changed.
        task: TaskUri,
        /// New status.
        status: TaskStatus,
    },
    /// A generated-file registration.
    RegisterFile {
        /// Task the file was linked to.
        task: TaskUri,
        /// Description that was registered.
        file: GeneratedFile,
        /// Minted identities.
        registered: RegisteredFile,
    },
}

#[derive(Default)]
struct MemoryState {
    statuses: HashMap<TaskUri, TaskStatus>,
    inputs: HashMap<TaskUri, Vec<InputFile>>,
    mutations: Vec<Mutation>,
    failing: HashSet<&'static str>,
    failing_status: HashSet<TaskStatus>,
    next_file: u64,
}

/// Metadata store held entirely in memory.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Put `task` in `status` without recording a mutation.
    pub fn seed_task(&self, task: impl Into<TaskUri>, status: TaskStatus) {
        self.state().statuses.insert(task.into(), status);
    }

    /// Attach an input file to `task` without recording a mutation.
    pub fn seed_input_file(
        &self,
        task: impl Into<TaskUri>,
        physical_uri: impl Into<String>,
        created: DateTime<Utc>,
    ) {
        self.state()
            .inputs
            .entry(task.into())
            .or_default()
            .push(InputFile {
                physical_uri: physical_uri.into(),
                created,
            });
    }

    /// Make every later call of `operation` fail with [`StoreError::Injected`].
    ///
    /// Operation names match the trait methods (`find_input_files`, `set_status`, ...).
    pub fn fail_operation(&self, operation: &'static str) {
        self.state().failing.insert(operation);
    }

    /// Make status writes of `status` fail with [`StoreError::Injected`].
    pub fn fail_status_write(&self, status: TaskStatus) {
        self.state().failing_status.insert(status);
    }

    /// Current status of `task`.
    #[must_use]
    pub fn status(&self, task: &TaskUri) -> Option<TaskStatus> {
        self.state().statuses.get(task).copied()
    }

    /// Every mutation applied so far, oldest first.
    #[must_use]
    pub fn mutations(&self) -> Vec<Mutation> {
        self.state().mutations.clone()
    }

    /// Files registered for `task`, in registration order.
    #[must_use]
    pub fn registrations(&self, task: &TaskUri) -> Vec<GeneratedFile> {
        self.state()
            .mutations
            .iter()
            .filter_map(|mutation| match mutation {
                Mutation::RegisterFile {
                    task: owner, file, ..
                } if owner == task => Some(file.clone()),
                _ => None,
            })
            .collect()
    }

    /// Status writes applied to `task`, oldest first.
    #[must_use]
    pub fn status_history(&self, task: &TaskUri) -> Vec<TaskStatus> {
        self.state()
            .mutations
            .iter()
            .filter_map(|mutation| match mutation {
                Mutation::SetStatus {
                    task: owner,
                    status,
                } if owner == task => Some(*status),
                _ => None,
            })
            .collect()
    }

    fn check(state: &MemoryState, operation: &'static str) -> StoreResult<()> {
        if state.failing.contains(operation) {
            Err(StoreError::Injected { operation })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MetadataStore for MemoryStore {
    async fn find_input_files(&self, task: &TaskUri) -> StoreResult<Vec<InputFile>> {
        let state = self.state();
        Self::check(&state, "find_input_files")?;
        let mut files = state.inputs.get(task).cloned().unwrap_or_default();
        files.sort_by_key(|file| file.created);
        Ok(files)
    }

    async fn set_status(&self, task: &TaskUri, status: TaskStatus) -> StoreResult<()> {
        let mut state = self.state();
        Self::check(&state, "set_status")?;
        if state.failing_status.contains(&status) {
            return Err(StoreError::Injected {
                operation: "set_status",
            });
        }
        state.statuses.insert(task.clone(), status);
        state.mutations.push(Mutation::SetStatus {
            task: task.clone(),
            status,
        });
        Ok(())
    }

    async fn register_generated_file(
        &self,
        task: &TaskUri,
        file: &GeneratedFile,
    ) -> StoreResult<RegisteredFile> {
        let mut state = self.state();
        Self::check(&state, "register_generated_file")?;
        state.next_file += 1;
        let registered = RegisteredFile {
            logical_uri: format!("{}{}", vocab::DEFAULT_FILE_RESOURCE_BASE, state.next_file),
            physical_uri: file.physical_uri.clone(),
        };
        state.mutations.push(Mutation::RegisterFile {
            task: task.clone(),
            file: file.clone(),
            registered: registered.clone(),
        });
        Ok(registered)
    }

    async fn tasks_in_status(&self, status: TaskStatus) -> StoreResult<Vec<TaskUri>> {
        let state = self.state();
        Self::check(&state, "tasks_in_status")?;
        let mut tasks: Vec<TaskUri> = state
            .statuses
            .iter()
            .filter(|(_, current)| **current == status)
            .map(|(task, _)| task.clone())
            .collect();
        tasks.sort();
        Ok(tasks)
    }
}
