//! SPARQL escaping helpers and the query/update text the gateway sends.
//!
//! # Design
//! - Every value interpolated into query text goes through one of the `escape_*` helpers.
//! - Predicates are written as full IRIs taken from `ttldelta_core::vocab`; no prefixes.

use chrono::{DateTime, SecondsFormat, Utc};
use ttldelta_core::{GeneratedFile, vocab};

const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Render `uri` as an IRI reference.
#[must_use]
pub fn escape_uri(uri: &str) -> String {
    let mut escaped = String::with_capacity(uri.len() + 2);
    escaped.push('<');
    for c in uri.chars() {
        if matches!(c, '\\' | '"' | '\'') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('>');
    escaped
}

/// Render `value` as a long string literal.
#[must_use]
pub fn escape_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 6);
    escaped.push_str("\"\"\"");
    for c in value.chars() {
        if matches!(c, '\\' | '"') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push_str("\"\"\"");
    escaped
}

/// Render `value` as an `xsd:integer` literal.
#[must_use]
pub fn escape_int(value: u64) -> String {
    format!("\"{value}\"^^<{XSD_INTEGER}>")
}

/// Render `value` as an `xsd:dateTime` literal in UTC.
#[must_use]
pub fn escape_datetime(value: &DateTime<Utc>) -> String {
    format!(
        "\"{}\"^^<{XSD_DATE_TIME}>",
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

/// Physical input files of `task`, oldest first.
#[must_use]
pub fn find_input_files(task_graph: &str, file_graph: &str, task: &str) -> String {
    format!(
        "SELECT DISTINCT ?physicalFile ?created WHERE {{\n  \
         GRAPH {task_graph} {{ {task} {used} ?logicalFile . }}\n  \
         GRAPH {file_graph} {{\n    \
         ?physicalFile {data_source} ?logicalFile ;\n      \
         {created_p} ?created .\n  }}\n\
         }}\nORDER BY ASC(?created)\n",
        task_graph = escape_uri(task_graph),
        file_graph = escape_uri(file_graph),
        task = escape_uri(task),
        used = escape_uri(vocab::PROV_USED),
        data_source = escape_uri(vocab::NIE_DATA_SOURCE),
        created_p = escape_uri(vocab::DCT_CREATED),
    )
}

/// Replace every status of `task` with `status` in a single update.
#[must_use]
pub fn set_status(task_graph: &str, task: &str, status: &str) -> String {
    let graph = escape_uri(task_graph);
    let task = escape_uri(task);
    let predicate = escape_uri(vocab::ADMS_STATUS);
    format!(
        "DELETE {{ GRAPH {graph} {{ {task} {predicate} ?status . }} }}\n\
         INSERT {{ GRAPH {graph} {{ {task} {predicate} {status} . }} }}\n\
         WHERE {{ OPTIONAL {{ GRAPH {graph} {{ {task} {predicate} ?status . }} }} }}\n",
        status = escape_uri(status),
    )
}

/// Tasks whose status is `status`.
#[must_use]
pub fn tasks_in_status(task_graph: &str, status: &str) -> String {
    format!(
        "SELECT DISTINCT ?task WHERE {{\n  GRAPH {graph} {{ ?task {predicate} {status} . }}\n}}\n",
        graph = escape_uri(task_graph),
        predicate = escape_uri(vocab::ADMS_STATUS),
        status = escape_uri(status),
    )
}

/// Identities minted for one generated file.
#[derive(Debug, Clone, Copy)]
pub struct FileIdentities<'a> {
    /// Logical file URI.
    pub logical_uri: &'a str,
    /// `mu:uuid` of the logical file.
    pub logical_uuid: &'a str,
    /// `mu:uuid` of the physical file.
    pub physical_uuid: &'a str,
}

/// Describe both files in the file graph and link the logical one from `task`.
#[must_use]
pub fn register_generated_file(
    task_graph: &str,
    file_graph: &str,
    task: &str,
    file: &GeneratedFile,
    ids: FileIdentities<'_>,
) -> String {
    let logical = escape_uri(ids.logical_uri);
    let physical = escape_uri(&file.physical_uri);
    let logical_description = describe_file(&logical, ids.logical_uuid, file, None);
    let physical_description = describe_file(&physical, ids.physical_uuid, file, Some(&logical));
    format!(
        "INSERT DATA {{\n  GRAPH {file_graph} {{\n{logical_description}{physical_description}  }}\n  \
         GRAPH {task_graph} {{ {task} {generated} {logical} . }}\n}}\n",
        file_graph = escape_uri(file_graph),
        task_graph = escape_uri(task_graph),
        task = escape_uri(task),
        generated = escape_uri(vocab::PROV_GENERATED),
    )
}

fn describe_file(
    subject: &str,
    uuid: &str,
    file: &GeneratedFile,
    data_source: Option<&str>,
) -> String {
    let mut properties = vec![
        (escape_uri(RDF_TYPE), escape_uri(vocab::NFO_FILE_DATA_OBJECT)),
        (escape_uri(vocab::MU_UUID), escape_string(uuid)),
        (escape_uri(vocab::NFO_FILE_NAME), escape_string(&file.name)),
        (escape_uri(vocab::DCT_FORMAT), escape_string(&file.format)),
        (escape_uri(vocab::NFO_FILE_SIZE), escape_int(file.size)),
        (
            escape_uri(vocab::DBPEDIA_FILE_EXTENSION),
            escape_string(&file.extension),
        ),
        (escape_uri(vocab::DCT_CREATED), escape_datetime(&file.created)),
    ];
    if let Some(creator) = &file.creator {
        properties.push((escape_uri(vocab::DCT_CREATOR), escape_uri(creator)));
    }
    if let Some(source) = data_source {
        properties.push((escape_uri(vocab::NIE_DATA_SOURCE), source.to_string()));
    }
    let body = properties
        .iter()
        .map(|(predicate, object)| format!("      {predicate} {object}"))
        .collect::<Vec<_>>()
        .join(" ;\n");
    format!("    {subject}\n{body} .\n")
}
