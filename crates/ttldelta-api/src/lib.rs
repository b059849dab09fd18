#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, missing_docs)]
#![allow(clippy::module_name_repetitions)]

//! HTTP surface of the ttldelta service.
//!
//! Receives delta notifications on `POST /delta`, hands them to a [`TaskDispatcher`] and
//! answers with one plain-text acknowledgement. Liveness, health and Prometheus metrics are
//! served alongside.
//!
//! Layout: `error.rs` (server errors), `state.rs` (shared handler state), `http/` (router,
//! handlers, problem responses, metrics middleware).
//!
//! [`TaskDispatcher`]: ttldelta_core::TaskDispatcher

pub mod error;
mod http;
mod state;

pub use error::{ApiServerError, ApiServerResult};
pub use http::router::ApiServer;
