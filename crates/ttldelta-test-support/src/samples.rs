//! Turtle documents shared by conversion tests.

/// One triple with an explicitly typed string literal.
pub const SINGLE_LITERAL: &str =
    r#"<http://ex/a> <http://ex/p> "hello"^^<http://www.w3.org/2001/XMLSchema#string> ."#;

/// Exact delta envelope produced for [`SINGLE_LITERAL`].
pub const SINGLE_LITERAL_DELTA: &str = concat!(
    r#"{"delta":{"inserts":[{"subject":{"type":"uri","value":"http://ex/a"},"#,
    r#""predicate":{"type":"uri","value":"http://ex/p"},"#,
    r#""object":{"type":"literal","value":"hello","#,
    r#""datatype":"http://www.w3.org/2001/XMLSchema#string"}}],"deletes":[]}}"#
);

/// Three triples using prefixes, a typed integer and a language tag.
pub const PREFIXED: &str = r#"
@prefix ex: <http://ex/> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

ex:first ex:count "3"^^xsd:integer .
ex:second ex:label "tweede"@nl .
ex:third ex:next ex:first .
"#;

/// A statement that is cut off before its object.
pub const MALFORMED: &str = "<http://ex/a> <http://ex/p> .\n";

/// A document with a blank-node subject.
pub const BLANK_SUBJECT: &str = "_:b0 <http://ex/p> <http://ex/o> .\n";

/// A document whose only content is a single triple naming `subject`.
#[must_use]
pub fn marker(subject: &str) -> String {
    format!("<{subject}> <http://ex/p> <http://ex/o> .\n")
}
