#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, missing_docs)]
#![allow(clippy::module_name_repetitions)]

//! Core domain types for the Turtle-to-delta task service.
//!
//! Layout: `model/` (task status machine, notifications, file descriptions, dispatch reports),
//! `service/` (store and dispatcher traits), `error.rs` (store and task errors), `vocab.rs`
//! (RDF vocabulary shared with the metadata store).

pub mod error;
pub mod model;
pub mod service;
pub mod vocab;

pub use error::{StoreError, StoreResult, TaskError, TaskResult};
pub use model::{
    ChangeSet, DispatchReport, GeneratedFile, InputFile, NO_TASK_FOUND, Notification,
    RegisteredFile, Statement, StatusTokens, TaskOutcome, TaskResolution, TaskStatus, TaskUri,
    TermValue,
};
pub use service::{MetadataStore, TaskDispatcher};
