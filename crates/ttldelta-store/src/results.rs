//! Decoding of `application/sparql-results+json` documents.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use ttldelta_core::{StoreError, StoreResult};

/// Top-level SELECT result document.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectResults {
    /// Solution sequence.
    pub results: Solutions,
}

/// Solution sequence of a SELECT result.
#[derive(Debug, Clone, Deserialize)]
pub struct Solutions {
    /// One map per solution, keyed by variable name.
    pub bindings: Vec<HashMap<String, Binding>>,
}

/// Value bound to one variable in one solution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Binding {
    /// `uri`, `literal`, `typed-literal` or `bnode`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Lexical value.
    pub value: String,
    /// Datatype IRI of typed literals.
    #[serde(default)]
    pub datatype: Option<String>,
}

/// Read variable `variable` from `solution` as a URI.
///
/// # Errors
///
/// Returns [`StoreError::InvalidBinding`] when the variable is unbound or not a URI.
pub fn uri(
    operation: &'static str,
    solution: &HashMap<String, Binding>,
    variable: &'static str,
) -> StoreResult<String> {
    let binding = bound(operation, solution, variable)?;
    if binding.kind == "uri" {
        Ok(binding.value.clone())
    } else {
        Err(StoreError::InvalidBinding {
            operation,
            variable,
            value: Some(binding.value.clone()),
        })
    }
}

/// Read variable `variable` from `solution` as a timestamp.
///
/// Values without an offset are taken as UTC.
///
/// # Errors
///
/// Returns [`StoreError::InvalidBinding`] when the variable is unbound or not a timestamp.
pub fn datetime(
    operation: &'static str,
    solution: &HashMap<String, Binding>,
    variable: &'static str,
) -> StoreResult<DateTime<Utc>> {
    let binding = bound(operation, solution, variable)?;
    parse_datetime(&binding.value).ok_or_else(|| StoreError::InvalidBinding {
        operation,
        variable,
        value: Some(binding.value.clone()),
    })
}

fn bound<'a>(
    operation: &'static str,
    solution: &'a HashMap<String, Binding>,
    variable: &'static str,
) -> StoreResult<&'a Binding> {
    solution
        .get(variable)
        .ok_or(StoreError::InvalidBinding {
            operation,
            variable,
            value: None,
        })
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn decode(body: &str) -> anyhow::Result<SelectResults> {
        Ok(serde_json::from_str(body)?)
    }

    const BODY: &str = r#"{
        "head": { "vars": ["physicalFile", "created"] },
        "results": { "bindings": [
            {
                "physicalFile": { "type": "uri", "value": "share://a.ttl" },
                "created": {
                    "type": "typed-literal",
                    "datatype": "http://www.w3.org/2001/XMLSchema#dateTime",
                    "value": "2024-05-01T12:00:00Z"
                }
            },
            {
                "physicalFile": { "type": "literal", "value": "share://b.ttl" },
                "created": { "type": "literal", "value": "2024-05-01T12:00:00.250" }
            }
        ] }
    }"#;

    #[test]
    fn uri_bindings_are_read() -> anyhow::Result<()> {
        let results = decode(BODY)?;
        let first = &results.results.bindings[0];
        assert_eq!(uri("find", first, "physicalFile")?, "share://a.ttl");
        assert_eq!(
            Some(datetime("find", first, "created")?),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single()
        );
        Ok(())
    }

    #[test]
    fn literal_in_uri_position_is_rejected() -> anyhow::Result<()> {
        let results = decode(BODY)?;
        let second = &results.results.bindings[1];
        assert!(matches!(
            uri("find", second, "physicalFile"),
            Err(StoreError::InvalidBinding {
                variable: "physicalFile",
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn naive_timestamps_are_taken_as_utc() -> anyhow::Result<()> {
        let results = decode(BODY)?;
        let created = datetime("find", &results.results.bindings[1], "created")?;
        assert_eq!(created.timestamp_millis() % 1_000, 250);
        Ok(())
    }

    #[test]
    fn missing_variables_are_reported() -> anyhow::Result<()> {
        let results = decode(BODY)?;
        assert!(matches!(
            uri("find", &results.results.bindings[0], "task"),
            Err(StoreError::InvalidBinding {
                variable: "task",
                value: None,
                ..
            })
        ));
        Ok(())
    }
}
