//! Fallback values used when an environment variable is unset or blank.
//!
//! # Design
//! - Values match the stock deployment, so an unconfigured container needs no environment.

/// Graph holding task metadata.
pub const TASK_GRAPH: &str = ttldelta_core::vocab::DEFAULT_GRAPH;
/// Graph holding file metadata.
pub const FILE_GRAPH: &str = ttldelta_core::vocab::DEFAULT_GRAPH;
/// SPARQL endpoint of the metadata store.
pub const SPARQL_ENDPOINT: &str = "http://database:8890/sparql";
/// Storage-scheme prefix of physical file URIs.
pub const SHARE_URI_PREFIX: &str = "share://";
/// Directory the storage-scheme prefix maps to.
pub const SHARE_MOUNT: &str = "/share/";
/// Base URI for minted logical files.
pub const FILE_RESOURCE_BASE: &str = ttldelta_core::vocab::DEFAULT_FILE_RESOURCE_BASE;
/// HTTP bind address.
pub const BIND_ADDR: &str = "0.0.0.0";
/// HTTP port.
pub const PORT: u16 = 80;
/// Log level directive used when `RUST_LOG` is unset.
pub const LOG_LEVEL: &str = "info";
