//! Task lifecycle: claims eligible tasks, converts their input files in creation order and
//! records the outcome in the metadata store.
//!
//! # Design
//! - Every eligible task runs as its own tokio task so a failure or panic in one cannot abort
//!   its siblings; the dispatcher waits for all of them before reporting.
//! - Status writes go through [`TaskStatus::transition`]; the lifecycle never writes a status
//!   the state machine does not allow.
//! - A task that is already being processed by this instance is skipped, not re-claimed.
//! - Failures are logged once, where they are resolved into a `FAILED` write. Files converted
//!   before the failure stay registered.
//! - `FAILED` is only written from `ONGOING`. A task whose claim never reached the store keeps
//!   whatever status the store holds.

use std::collections::HashSet;
use std::error::Error;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use ttldelta_core::{
    DispatchReport, InputFile, MetadataStore, Notification, RegisteredFile, StatusTokens,
    TaskDispatcher, TaskError, TaskOutcome, TaskResolution, TaskResult, TaskStatus, TaskUri,
};
use ttldelta_events::{Event, EventBus};
use ttldelta_fsops::{DeltaConverter, ShareMapping};
use ttldelta_telemetry::Metrics;

/// Drives conversion tasks from `NOT_STARTED` to `SUCCESSFUL` or `FAILED`.
#[derive(Clone)]
pub struct TaskLifecycle {
    inner: Arc<LifecycleInner>,
}

struct LifecycleInner {
    store: Arc<dyn MetadataStore>,
    converter: DeltaConverter,
    share: ShareMapping,
    events: EventBus,
    metrics: Metrics,
    status_tokens: StatusTokens,
    creator: Option<String>,
    in_flight: Arc<Mutex<HashSet<TaskUri>>>,
}

impl TaskLifecycle {
    /// Build a lifecycle over `store`, resolving physical URIs through `share`.
    #[must_use]
    pub fn new(
        store: Arc<dyn MetadataStore>,
        converter: DeltaConverter,
        share: ShareMapping,
        events: EventBus,
        metrics: Metrics,
    ) -> Self {
        Self {
            inner: Arc::new(LifecycleInner {
                store,
                converter,
                share,
                events,
                metrics,
                status_tokens: StatusTokens::default(),
                creator: None,
                in_flight: Arc::default(),
            }),
        }
    }

    /// Recognise task status through `tokens` instead of the default URIs.
    #[must_use]
    pub fn with_status_tokens(self, tokens: StatusTokens) -> Self {
        self.rebuild(|inner| inner.status_tokens = tokens)
    }

    /// Record `creator` as the producing service of every generated file.
    #[must_use]
    pub fn with_creator(self, creator: Option<String>) -> Self {
        self.rebuild(|inner| inner.creator = creator)
    }

    fn rebuild(self, apply: impl FnOnce(&mut LifecycleInner)) -> Self {
        let mut inner = Arc::try_unwrap(self.inner).unwrap_or_else(|shared| LifecycleInner {
            store: Arc::clone(&shared.store),
            converter: shared.converter.clone(),
            share: shared.share.clone(),
            events: shared.events.clone(),
            metrics: shared.metrics.clone(),
            status_tokens: shared.status_tokens.clone(),
            creator: shared.creator.clone(),
            in_flight: Arc::clone(&shared.in_flight),
        });
        apply(&mut inner);
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Tasks the store reports as ongoing that this instance is not working on.
    ///
    /// These are typically left behind by a crashed or restarted instance; nothing resumes
    /// them automatically.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Store`] when the store cannot be queried.
    pub async fn stale_ongoing_tasks(&self) -> TaskResult<Vec<TaskUri>> {
        let ongoing = self
            .inner
            .store
            .tasks_in_status(TaskStatus::Ongoing)
            .await
            .map_err(|source| TaskError::store("tasks_in_status", source))?;
        let in_flight = self.inner.in_flight();
        Ok(ongoing
            .into_iter()
            .filter(|task| !in_flight.contains(task))
            .collect())
    }
}

#[async_trait]
impl TaskDispatcher for TaskLifecycle {
    async fn dispatch(&self, notification: Notification) -> DispatchReport {
        let tasks = notification.eligible_tasks(&self.inner.status_tokens);
        if tasks.is_empty() {
            info!("no eligible task in delta notification");
            return DispatchReport::default();
        }

        let workers: Vec<(TaskUri, JoinHandle<TaskResolution>)> = tasks
            .into_iter()
            .map(|task| {
                let inner = Arc::clone(&self.inner);
                let worker_task = task.clone();
                (task, tokio::spawn(async move { inner.run(worker_task).await }))
            })
            .collect();

        let mut outcomes = Vec::with_capacity(workers.len());
        for (task, worker) in workers {
            let resolution = match worker.await {
                Ok(resolution) => resolution,
                Err(join) => {
                    let failure = TaskError::Join {
                        detail: join.to_string(),
                    };
                    let progress = Progress {
                        status: self.inner.recorded_status(&task).await,
                        generated: Vec::new(),
                    };
                    let resolution = self.inner.fail(&task, progress, &failure).await;
                    self.inner.metrics.inc_task("failed");
                    resolution
                }
            };
            outcomes.push(TaskOutcome { task, resolution });
        }
        DispatchReport { outcomes }
    }
}

/// How far a task got before it stopped.
struct Progress {
    /// Last status written to the store by this instance.
    status: TaskStatus,
    generated: Vec<RegisteredFile>,
}

/// Marks a task as owned by this instance until dropped.
struct InFlight<'a> {
    owner: &'a LifecycleInner,
    task: TaskUri,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.owner.in_flight().remove(&self.task);
        self.owner.metrics.task_finished();
    }
}

impl LifecycleInner {
    fn in_flight(&self) -> MutexGuard<'_, HashSet<TaskUri>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn claim(&self, task: &TaskUri) -> Option<InFlight<'_>> {
        if !self.in_flight().insert(task.clone()) {
            return None;
        }
        self.metrics.task_started();
        Some(InFlight {
            owner: self,
            task: task.clone(),
        })
    }

    fn publish(&self, event: Event) {
        self.metrics.inc_event(event.kind());
        self.events.publish(event);
    }

    async fn run(&self, task: TaskUri) -> TaskResolution {
        let Some(_claim) = self.claim(&task) else {
            info!(task = %task, "task already in progress, skipping");
            self.publish(Event::TaskSkipped {
                task: task.to_string(),
            });
            self.metrics.inc_task("skipped");
            return TaskResolution::Skipped;
        };

        let mut progress = Progress {
            status: TaskStatus::NotStarted,
            generated: Vec::new(),
        };
        let resolution = match self.process(&task, &mut progress).await {
            Ok(()) => {
                let generated = progress.generated;
                info!(task = %task, generated = generated.len(), "task successful");
                self.publish(Event::TaskCompleted {
                    task: task.to_string(),
                    generated: generated.len(),
                });
                TaskResolution::Successful { generated }
            }
            Err(failure) => self.fail(&task, progress, &failure).await,
        };
        self.metrics.inc_task(match resolution {
            TaskResolution::Successful { .. } => "successful",
            TaskResolution::Failed { .. } => "failed",
            TaskResolution::Skipped => "skipped",
        });
        resolution
    }

    async fn process(&self, task: &TaskUri, progress: &mut Progress) -> TaskResult<()> {
        progress.status = self
            .advance(task, progress.status, TaskStatus::Ongoing)
            .await?;
        info!(task = %task, "task claimed");
        self.publish(Event::TaskStarted {
            task: task.to_string(),
        });

        let inputs = self
            .store
            .find_input_files(task)
            .await
            .map_err(|source| TaskError::store("find_input_files", source))?;
        if inputs.is_empty() {
            warn!(task = %task, "task has no input files");
        }

        for input in &inputs {
            progress.generated.push(self.convert_file(task, input).await?);
        }

        progress.status = self
            .advance(task, progress.status, TaskStatus::Successful)
            .await?;
        Ok(())
    }

    async fn convert_file(&self, task: &TaskUri, input: &InputFile) -> TaskResult<RegisteredFile> {
        let physical_uri = input.physical_uri.as_str();
        let source = self
            .share
            .to_path(physical_uri)
            .map_err(|err| TaskError::conversion(physical_uri, err))?;

        let converter = self.converter.clone();
        let info = tokio::task::spawn_blocking(move || {
            let output = converter.convert(&source)?;
            converter.describe_output(&output)
        })
        .await
        .map_err(|join| TaskError::Join {
            detail: join.to_string(),
        })?
        .map_err(|err| TaskError::conversion(physical_uri, err))?;

        let output_uri = self
            .share
            .to_uri(&info.path)
            .map_err(|err| TaskError::conversion(physical_uri, err))?;
        let file = info.into_generated(output_uri, self.creator.clone());
        let registered = self
            .store
            .register_generated_file(task, &file)
            .await
            .map_err(|source| TaskError::store("register_generated_file", source))?;

        info!(
            task = %task,
            input = %physical_uri,
            output = %registered.physical_uri,
            logical = %registered.logical_uri,
            "file converted"
        );
        self.publish(Event::FileConverted {
            task: task.to_string(),
            input: physical_uri.to_string(),
            output: registered.physical_uri.clone(),
            logical: registered.logical_uri.clone(),
        });
        Ok(registered)
    }

    /// Validate `from -> to` and write `to` to the store.
    async fn advance(
        &self,
        task: &TaskUri,
        from: TaskStatus,
        to: TaskStatus,
    ) -> TaskResult<TaskStatus> {
        let next = from.transition(to)?;
        self.store
            .set_status(task, next)
            .await
            .map_err(|source| TaskError::store("set_status", source))?;
        Ok(next)
    }

    /// Status the store records for a task whose worker died, as far as it can tell.
    ///
    /// Only `ONGOING` matters to [`Self::fail`]; anything else, including an unreachable
    /// store, is reported as `NOT_STARTED` so no `FAILED` write is attempted.
    async fn recorded_status(&self, task: &TaskUri) -> TaskStatus {
        match self.store.tasks_in_status(TaskStatus::Ongoing).await {
            Ok(ongoing) if ongoing.contains(task) => TaskStatus::Ongoing,
            Ok(_) => TaskStatus::NotStarted,
            Err(err) => {
                warn!(task = %task, error = %err, "could not read status of crashed task");
                TaskStatus::NotStarted
            }
        }
    }

    /// Log `failure` and record `FAILED` for `task` when it was claimed; a failing status
    /// write is only logged.
    async fn fail(
        &self,
        task: &TaskUri,
        progress: Progress,
        failure: &TaskError,
    ) -> TaskResolution {
        let Progress { status, generated } = progress;
        let reason = error_chain(failure);
        error!(task = %task, error = %reason, generated = generated.len(), "task failed");
        if status.can_transition_to(TaskStatus::Failed) {
            if let Err(write) = self.advance(task, status, TaskStatus::Failed).await {
                error!(task = %task, error = %error_chain(&write), "failed to record task failure");
            }
        } else {
            warn!(task = %task, status = %status, "task was not claimed, status left unchanged");
        }
        self.publish(Event::TaskFailed {
            task: task.to_string(),
            message: reason.clone(),
        });
        TaskResolution::Failed { generated, reason }
    }
}

/// Render an error and its sources as `outer: inner: root`.
fn error_chain(err: &dyn Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
