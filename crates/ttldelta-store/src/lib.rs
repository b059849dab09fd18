#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, missing_docs)]
#![allow(clippy::module_name_repetitions)]

//! Metadata store gateways.
//!
//! Layout: `sparql.rs` (escaping and query text), `results.rs` (SPARQL JSON results),
//! `client.rs` (`SparqlStore` over the SPARQL 1.1 protocol), `memory.rs` (`MemoryStore`).

pub mod client;
pub mod memory;
pub mod results;
pub mod sparql;

pub use client::{SparqlSettings, SparqlStore};
pub use memory::{MemoryStore, Mutation};
