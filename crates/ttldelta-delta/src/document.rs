//! Delta envelope and the encoder that fills it.

use serde::{Deserialize, Serialize};

use crate::error::DeltaResult;
use crate::term::{DeltaTerm, RdfTriple, TermPosition, map_term};

/// One triple on the delta wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaTriple {
    /// Subject term.
    pub subject: DeltaTerm,
    /// Predicate term.
    pub predicate: DeltaTerm,
    /// Object term.
    pub object: DeltaTerm,
}

/// Insertions and deletions of one delta.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaChangeSet {
    /// Triples to insert, in document order.
    pub inserts: Vec<DeltaTriple>,
    /// Triples to delete; always empty for converted Turtle.
    pub deletes: Vec<DeltaTriple>,
}

/// The `{"delta": {...}}` envelope written to `.delta` files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaMessage {
    /// Wrapped change set.
    pub delta: DeltaChangeSet,
}

impl DeltaMessage {
    /// Render the envelope as compact JSON.
    ///
    /// # Errors
    ///
    /// Propagates `serde_json` failures.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Encode triples as an insert-only delta.
///
/// The first unsupported term aborts the whole encoding; no partial document is produced.
///
/// # Errors
///
/// Returns [`crate::DeltaError::UnsupportedTermKind`] for blank nodes and quoted triples.
pub fn encode(triples: &[RdfTriple]) -> DeltaResult<DeltaMessage> {
    let inserts = triples
        .iter()
        .enumerate()
        .map(|(index, triple)| {
            Ok(DeltaTriple {
                subject: map_term(&triple.subject, TermPosition::Subject, index)?,
                predicate: map_term(&triple.predicate, TermPosition::Predicate, index)?,
                object: map_term(&triple.object, TermPosition::Object, index)?,
            })
        })
        .collect::<DeltaResult<Vec<_>>>()?;
    Ok(DeltaMessage {
        delta: DeltaChangeSet {
            inserts,
            deletes: Vec::new(),
        },
    })
}
