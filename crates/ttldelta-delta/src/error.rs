//! Error types for Turtle parsing and delta encoding.

use thiserror::Error;

use crate::term::TermPosition;

/// Result alias for delta conversion.
pub type DeltaResult<T> = Result<T, DeltaError>;

/// Errors produced while turning Turtle into a delta document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeltaError {
    /// The Turtle input was malformed.
    #[error("turtle parse failed")]
    Parse {
        /// 1-based line of the first error, when the parser reported one.
        line: Option<u64>,
        /// 1-based column of the first error, when the parser reported one.
        column: Option<u64>,
        /// Parser diagnostic.
        message: String,
    },
    /// A triple held a term that has no delta representation.
    #[error("unsupported term kind")]
    UnsupportedTermKind {
        /// Kind of the offending term (`BlankNode`, ...).
        kind: &'static str,
        /// Where in the triple the term appeared.
        position: TermPosition,
        /// 0-based index of the triple in document order.
        index: usize,
    },
}

impl DeltaError {
    /// Parser diagnostic without location information.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            line: None,
            column: None,
            message: message.into(),
        }
    }
}
