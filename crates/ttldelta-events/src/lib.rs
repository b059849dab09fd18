#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, missing_docs)]
#![allow(clippy::module_name_repetitions)]

//! Task lifecycle event bus.
//!
//! The bus stamps typed events with sequential identifiers and fans them out to live
//! subscribers over `tokio::broadcast`. Subscribers only see events published after they
//! subscribed; a subscriber that falls more than the channel capacity behind loses the
//! oldest events.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll, ready};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, Sender};
use tokio_stream::Stream;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

/// Identifier assigned to each published event.
pub type EventId = u64;

/// Default broadcast channel capacity.
const DEFAULT_CAPACITY: usize = 1_024;

/// Typed lifecycle events surfaced by the task processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A task was claimed and moved to the ongoing state.
    TaskStarted {
        /// Task URI.
        task: String,
    },
    /// One input file was converted and its output registered.
    FileConverted {
        /// Task URI.
        task: String,
        /// Physical URI of the Turtle input.
        input: String,
        /// Physical URI of the written delta file.
        output: String,
        /// Logical URI minted for the output.
        logical: String,
    },
    /// Every input file of a task was converted.
    TaskCompleted {
        /// Task URI.
        task: String,
        /// Number of generated files registered.
        generated: usize,
    },
    /// Processing of a task stopped on an error.
    TaskFailed {
        /// Task URI.
        task: String,
        /// Rendered error chain.
        message: String,
    },
    /// A task was left alone because this process already works on it.
    TaskSkipped {
        /// Task URI.
        task: String,
    },
}

impl Event {
    /// Machine-friendly discriminator, also used as the metrics label.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::TaskStarted { .. } => "task_started",
            Self::FileConverted { .. } => "file_converted",
            Self::TaskCompleted { .. } => "task_completed",
            Self::TaskFailed { .. } => "task_failed",
            Self::TaskSkipped { .. } => "task_skipped",
        }
    }

    /// Task the event belongs to.
    #[must_use]
    pub fn task(&self) -> &str {
        match self {
            Self::TaskStarted { task }
            | Self::FileConverted { task, .. }
            | Self::TaskCompleted { task, .. }
            | Self::TaskFailed { task, .. }
            | Self::TaskSkipped { task } => task,
        }
    }
}

/// Metadata wrapper around events carrying the id and emission timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Sequential identifier.
    pub id: EventId,
    /// Emission time.
    pub timestamp: DateTime<Utc>,
    /// Wrapped event.
    pub event: Event,
}

/// Shared event bus built on top of `tokio::broadcast`.
#[derive(Clone)]
pub struct EventBus {
    sender: Sender<EventEnvelope>,
    next_id: Arc<AtomicU64>,
}

impl EventBus {
    /// Construct a new bus with the provided broadcast capacity. A zero capacity is raised
    /// to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Construct a bus with the default channel capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Publish a new event to the bus, assigning it a sequential identifier.
    ///
    /// Publishing without subscribers is not an error; the event is dropped.
    pub fn publish(&self, event: Event) -> EventId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let envelope = EventEnvelope {
            id,
            timestamp: Utc::now(),
            event,
        };
        let _ = self.sender.send(envelope);
        id
    }

    /// Subscribe to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> EventStream {
        EventStream {
            live: BroadcastStream::new(self.sender.subscribe()),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Stream of live events.
///
/// Events dropped because the subscriber lagged behind are skipped.
pub struct EventStream {
    live: BroadcastStream<EventEnvelope>,
}

impl Stream for EventStream {
    type Item = EventEnvelope;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match ready!(Pin::new(&mut self.live).poll_next(cx)) {
                Some(Ok(event)) => return Poll::Ready(Some(event)),
                Some(Err(BroadcastStreamRecvError::Lagged(_))) => {}
                None => return Poll::Ready(None),
            }
        }
    }
}
