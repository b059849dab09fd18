#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, missing_docs)]
#![allow(clippy::module_name_repetitions)]

//! ttldelta application wiring.
//!
//! Layout: `bootstrap.rs` (service wiring), `lifecycle.rs` (task state machine and
//! multi-file conversion), `error.rs`.

/// Application bootstrap and environment loading.
pub mod bootstrap;
/// Application-level errors.
pub mod error;
/// Task lifecycle driven by delta notifications.
pub mod lifecycle;

pub use bootstrap::run_app;
pub use error::{AppError, AppResult};
pub use lifecycle::TaskLifecycle;
