#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, missing_docs)]
#![allow(clippy::module_name_repetitions)]

//! Environment-driven configuration for the ttldelta service.
//!
//! Layout: `defaults.rs` (fallback values), `validate.rs` (parsing helpers),
//! `model.rs` (`AppConfig` and its loaders), `error.rs`.

pub mod defaults;
pub mod error;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use model::{AppConfig, LogFormatSetting};
