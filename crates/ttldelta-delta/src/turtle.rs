//! Turtle parser adapter.
//!
//! Wraps `oxttl` so the rest of the workspace only sees [`RdfTriple`] values in document order.
//! Parsing fails fast: the first syntax error aborts the document and no triples are returned.

use oxrdf::{Subject, Term, Triple};
use oxttl::{TurtleParseError, TurtleParser};

use crate::error::{DeltaError, DeltaResult};
use crate::term::{RdfTerm, RdfTriple};

/// Parse a complete Turtle document into its triples, in document order.
///
/// # Errors
///
/// Returns [`DeltaError::Parse`] with the 1-based location of the first syntax error.
pub fn parse_turtle(input: &str) -> DeltaResult<Vec<RdfTriple>> {
    TurtleParser::new()
        .for_reader(input.as_bytes())
        .map(|item| item.map(RdfTriple::from).map_err(DeltaError::from))
        .collect()
}

impl From<TurtleParseError> for DeltaError {
    fn from(error: TurtleParseError) -> Self {
        match error {
            TurtleParseError::Syntax(syntax) => {
                let start = syntax.location().start;
                Self::Parse {
                    line: Some(start.line + 1),
                    column: Some(start.column + 1),
                    message: syntax.to_string(),
                }
            }
            TurtleParseError::Io(io) => Self::parse(io.to_string()),
        }
    }
}

impl From<Triple> for RdfTriple {
    fn from(triple: Triple) -> Self {
        Self {
            subject: subject_term(triple.subject),
            predicate: RdfTerm::Iri(triple.predicate.into_string()),
            object: object_term(triple.object),
        }
    }
}

fn subject_term(subject: Subject) -> RdfTerm {
    #[allow(unreachable_patterns)]
    match subject {
        Subject::NamedNode(node) => RdfTerm::Iri(node.into_string()),
        Subject::BlankNode(node) => RdfTerm::BlankNode(node.into_string()),
        _ => RdfTerm::QuotedTriple,
    }
}

fn object_term(object: Term) -> RdfTerm {
    #[allow(unreachable_patterns)]
    match object {
        Term::NamedNode(node) => RdfTerm::Iri(node.into_string()),
        Term::BlankNode(node) => RdfTerm::BlankNode(node.into_string()),
        Term::Literal(literal) => RdfTerm::Literal {
            value: literal.value().to_string(),
            datatype: literal.datatype().as_str().to_string(),
            language: literal.language().map(str::to_string),
        },
        _ => RdfTerm::QuotedTriple,
    }
}
