#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, missing_docs)]
#![allow(clippy::module_name_repetitions)]

//! Turtle to delta conversion.
//!
//! Layout: `term.rs` (RDF terms and their delta wire form), `turtle.rs` (parser adapter),
//! `document.rs` (delta envelope and encoder), `error.rs`.
//!
//! ```
//! let ttl = r#"<http://ex/a> <http://ex/p> "hello" ."#;
//! let message = ttldelta_delta::convert_turtle(ttl)?;
//! assert_eq!(message.delta.inserts.len(), 1);
//! assert!(message.delta.deletes.is_empty());
//! # Ok::<(), ttldelta_delta::DeltaError>(())
//! ```

pub mod document;
pub mod error;
pub mod term;
pub mod turtle;

pub use document::{DeltaChangeSet, DeltaMessage, DeltaTriple, encode};
pub use error::{DeltaError, DeltaResult};
pub use term::{DeltaTerm, DeltaTermKind, RdfTerm, RdfTriple, TermPosition, map_term};
pub use turtle::parse_turtle;

/// Parse a Turtle document and encode all of its triples as one insert-only delta.
///
/// # Errors
///
/// Returns [`DeltaError::Parse`] for malformed Turtle and [`DeltaError::UnsupportedTermKind`]
/// when a triple holds a term the delta format cannot carry.
pub fn convert_turtle(input: &str) -> DeltaResult<DeltaMessage> {
    let triples = parse_turtle(input)?;
    encode(&triples)
}
