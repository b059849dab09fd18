//! RDF terms and their delta wire representation.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::{DeltaError, DeltaResult};

/// An RDF term as produced by the Turtle adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RdfTerm {
    /// Named node.
    Iri(String),
    /// Literal with its datatype and optional language tag.
    Literal {
        /// Lexical form.
        value: String,
        /// Datatype IRI (`xsd:string` for plain literals, `rdf:langString` when tagged).
        datatype: String,
        /// Language tag of `rdf:langString` literals.
        language: Option<String>,
    },
    /// Blank node with its document-local label.
    BlankNode(String),
    /// Quoted triple (RDF-star).
    QuotedTriple,
}

impl RdfTerm {
    /// Name of the term kind, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Iri(_) => "NamedNode",
            Self::Literal { .. } => "Literal",
            Self::BlankNode(_) => "BlankNode",
            Self::QuotedTriple => "Triple",
        }
    }

    /// Build a literal term.
    pub fn literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            datatype: datatype.into(),
            language: None,
        }
    }
}

/// Subject, predicate and object in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdfTriple {
    /// Subject term.
    pub subject: RdfTerm,
    /// Predicate term.
    pub predicate: RdfTerm,
    /// Object term.
    pub object: RdfTerm,
}

/// Slot of a triple a term occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermPosition {
    /// Subject slot.
    Subject,
    /// Predicate slot.
    Predicate,
    /// Object slot.
    Object,
}

impl Display for TermPosition {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Subject => "subject",
            Self::Predicate => "predicate",
            Self::Object => "object",
        })
    }
}

/// Kind tag of a delta term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaTermKind {
    /// `{"type": "uri"}`
    Uri,
    /// `{"type": "literal"}`
    Literal,
}

/// A term as it appears on the delta wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaTerm {
    /// Kind tag.
    #[serde(rename = "type")]
    pub kind: DeltaTermKind,
    /// IRI or lexical form.
    pub value: String,
    /// Datatype IRI; literals only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    /// Language tag; language-tagged literals only.
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl DeltaTerm {
    /// Delta form of a URI.
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: DeltaTermKind::Uri,
            value: value.into(),
            datatype: None,
            language: None,
        }
    }
}

/// Map one RDF term onto its delta form.
///
/// `index` and `position` only feed the error, so callers can point at the offending triple.
///
/// # Errors
///
/// Returns [`DeltaError::UnsupportedTermKind`] for blank nodes and quoted triples.
pub fn map_term(term: &RdfTerm, position: TermPosition, index: usize) -> DeltaResult<DeltaTerm> {
    match term {
        RdfTerm::Iri(iri) => Ok(DeltaTerm::uri(iri.clone())),
        RdfTerm::Literal {
            value,
            datatype,
            language,
        } => Ok(DeltaTerm {
            kind: DeltaTermKind::Literal,
            value: value.clone(),
            datatype: Some(datatype.clone()),
            language: language.clone(),
        }),
        RdfTerm::BlankNode(_) | RdfTerm::QuotedTriple => Err(DeltaError::UnsupportedTermKind {
            kind: term.kind(),
            position,
            index,
        }),
    }
}
