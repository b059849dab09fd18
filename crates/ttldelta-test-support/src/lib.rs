#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, missing_docs)]

//! Shared test helpers used across integration suites.
//! Layout: fixtures.rs (scratch share mount), samples.rs (Turtle documents),
//! notifications.rs (delta notification builders).

pub mod fixtures;
pub mod notifications;
pub mod samples;

pub use fixtures::ShareFixture;
pub use notifications::{eligible_notification, notification_json, status_insert};
