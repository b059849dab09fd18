#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, missing_docs)]
#![allow(clippy::module_name_repetitions)]

//! File conversion pipeline: Turtle file in, `.delta` file next to it out.
//!
//! Layout: `lib.rs` (converter and output description), `share.rs` (storage-scheme mapping),
//! `error.rs`.

pub mod error;
pub mod share;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use ttldelta_core::{GeneratedFile, vocab};
use ttldelta_delta::{DeltaMessage, RdfTriple, encode, parse_turtle};
use ttldelta_telemetry::Metrics;

pub use error::{FsOpsError, FsOpsResult};
pub use share::{DEFAULT_SHARE_MOUNT, DEFAULT_SHARE_PREFIX, ShareMapping};

/// Extension given to converted files.
pub const DELTA_EXTENSION: &str = "delta";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StepKind {
    Read,
    Parse,
    Encode,
    Serialise,
    Write,
    Describe,
}

impl StepKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Parse => "parse",
            Self::Encode => "encode",
            Self::Serialise => "serialise",
            Self::Write => "write",
            Self::Describe => "describe",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StepStatus {
    Completed,
    Failed,
}

impl StepStatus {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// Derive the delta output path for a Turtle input.
///
/// The last extension segment is replaced with `.delta`; a path without extension gets
/// `.delta` appended. The parent directory and the rest of the file name are kept. An input
/// already named `*.delta` maps onto itself; [`DeltaConverter::convert`] refuses it.
#[must_use]
pub fn delta_output_path(input: &Path) -> PathBuf {
    input.with_extension(DELTA_EXTENSION)
}

/// Facts about a written delta file needed to register it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaFileInfo {
    /// Location of the file on disk.
    pub path: PathBuf,
    /// File name without its extension.
    pub name: String,
    /// Extension without the leading dot.
    pub extension: String,
    /// Size in bytes.
    pub size: u64,
    /// Creation time, falling back to modification time where the platform lacks it.
    pub created: DateTime<Utc>,
}

impl DeltaFileInfo {
    /// Turn the description into a registrable file under `physical_uri`.
    #[must_use]
    pub fn into_generated(self, physical_uri: String, creator: Option<String>) -> GeneratedFile {
        GeneratedFile {
            physical_uri,
            name: self.name,
            extension: self.extension,
            format: vocab::DELTA_MEDIA_TYPE.to_string(),
            size: self.size,
            created: self.created,
            creator,
        }
    }
}

/// Service converting Turtle files into delta files on disk.
///
/// Every pipeline step is counted in `fsops_steps_total`. Conversion is blocking and
/// buffers the whole document in memory.
#[derive(Clone)]
pub struct DeltaConverter {
    metrics: Metrics,
}

impl DeltaConverter {
    /// Construct a converter reporting into `metrics`.
    #[must_use]
    pub const fn new(metrics: Metrics) -> Self {
        Self { metrics }
    }

    /// Convert the Turtle file at `input` and write the delta next to it.
    ///
    /// An existing output file is overwritten. A failed write may leave a partial file behind.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::InvalidInput`] when the input already carries the delta extension,
    /// [`FsOpsError::Io`] when the input cannot be read or the output cannot be written, [`FsOpsError::Delta`] for malformed Turtle or unsupported terms, and
    /// [`FsOpsError::Json`] if the document cannot be serialised.
    pub fn convert(&self, input: &Path) -> FsOpsResult<PathBuf> {
        let output = delta_output_path(input);
        if output == input {
            return Err(FsOpsError::invalid_input(
                "path",
                "input is already a delta file",
                input.display().to_string(),
            ));
        }
        let ttl = self.execute_step(StepKind::Read, || {
            fs::read_to_string(input).map_err(|source| FsOpsError::io("read_turtle", input, source))
        })?;
        let triples: Vec<RdfTriple> = self.execute_step(StepKind::Parse, || {
            parse_turtle(&ttl).map_err(|source| FsOpsError::delta(input, source))
        })?;
        let message: DeltaMessage = self.execute_step(StepKind::Encode, || {
            encode(&triples).map_err(|source| FsOpsError::delta(input, source))
        })?;

        let body = self.execute_step(StepKind::Serialise, || {
            message
                .to_json()
                .map_err(|source| FsOpsError::json("serialise_delta", &output, source))
        })?;
        self.execute_step(StepKind::Write, || {
            fs::write(&output, body).map_err(|source| FsOpsError::io("write_delta", &output, source))
        })?;

        info!(
            input = %input.display(),
            output = %output.display(),
            triples = message.delta.inserts.len(),
            "converted turtle file"
        );
        Ok(output)
    }

    /// Describe a written delta file for registration.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::Io`] when the file metadata cannot be read and
    /// [`FsOpsError::InvalidInput`] when the path has no UTF-8 file name.
    pub fn describe_output(&self, path: &Path) -> FsOpsResult<DeltaFileInfo> {
        self.execute_step(StepKind::Describe, || describe(path))
    }

    fn execute_step<T, F>(&self, step: StepKind, op: F) -> FsOpsResult<T>
    where
        F: FnOnce() -> FsOpsResult<T>,
    {
        let result = op();
        let status = if result.is_ok() {
            StepStatus::Completed
        } else {
            StepStatus::Failed
        };
        debug!(step = step.as_str(), status = status.as_str(), "conversion step");
        self.metrics.inc_fsops_step(step.as_str(), status.as_str());
        result
    }
}

fn describe(path: &Path) -> FsOpsResult<DeltaFileInfo> {
    let metadata =
        fs::metadata(path).map_err(|source| FsOpsError::io("stat_delta", path, source))?;
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| {
            FsOpsError::invalid_input("path", "missing file name", path.display().to_string())
        })?
        .to_string();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_string();
    let created = metadata
        .created()
        .or_else(|_| metadata.modified())
        .map_or_else(|_| Utc::now(), DateTime::<Utc>::from);
    Ok(DeltaFileInfo {
        path: path.to_path_buf(),
        name,
        extension,
        size: metadata.len(),
        created,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use ttldelta_delta::DeltaError;
    use ttldelta_test_support::{ShareFixture, samples};

    fn step_recorded_once(metrics: &Metrics, step: &str, status: &str) -> Result<bool> {
        let step = format!("step=\"{step}\"");
        let status = format!("status=\"{status}\"");
        Ok(metrics.render()?.lines().any(|line| {
            line.starts_with("fsops_steps_total{")
                && line.contains(&step)
                && line.contains(&status)
                && line.ends_with(" 1")
        }))
    }

    fn converter() -> Result<(DeltaConverter, Metrics)> {
        let metrics = Metrics::new()?;
        Ok((DeltaConverter::new(metrics.clone()), metrics))
    }

    #[test]
    fn output_path_replaces_only_the_last_extension() {
        assert_eq!(
            delta_output_path(Path::new("/share/batch/a.ttl")),
            PathBuf::from("/share/batch/a.delta")
        );
        assert_eq!(
            delta_output_path(Path::new("/share/batch/export.2024.ttl")),
            PathBuf::from("/share/batch/export.2024.delta")
        );
        assert_eq!(
            delta_output_path(Path::new("/share/batch/data")),
            PathBuf::from("/share/batch/data.delta")
        );
    }

    #[test]
    fn convert_writes_the_delta_envelope() -> Result<()> {
        let share = ShareFixture::new()?;
        let input = share.write("a.ttl", samples::SINGLE_LITERAL)?;
        let (converter, metrics) = converter()?;

        let output = converter.convert(&input)?;

        assert_eq!(output, share.path("a.delta"));
        assert_eq!(share.read("a.delta")?, samples::SINGLE_LITERAL_DELTA);
        assert!(step_recorded_once(&metrics, "write", "completed")?);
        Ok(())
    }

    #[test]
    fn convert_overwrites_previous_output() -> Result<()> {
        let share = ShareFixture::new()?;
        let input = share.write("a.ttl", samples::SINGLE_LITERAL)?;
        share.write("a.delta", "stale content that is longer than the new document")?;
        let (converter, _) = converter()?;

        converter.convert(&input)?;

        assert_eq!(share.read("a.delta")?, samples::SINGLE_LITERAL_DELTA);
        Ok(())
    }

    #[test]
    fn delta_named_input_is_not_overwritten() -> Result<()> {
        let share = ShareFixture::new()?;
        let input = share.write("a.delta", samples::SINGLE_LITERAL)?;
        let (converter, _) = converter()?;

        let err = converter.convert(&input);

        assert!(matches!(
            err,
            Err(FsOpsError::InvalidInput { field: "path", .. })
        ));
        assert_eq!(share.read("a.delta")?, samples::SINGLE_LITERAL);
        Ok(())
    }

    #[test]
    fn missing_input_is_an_io_error() -> Result<()> {
        let share = ShareFixture::new()?;
        let (converter, _) = converter()?;
        let err = converter.convert(&share.path("missing.ttl"));
        assert!(matches!(
            err,
            Err(FsOpsError::Io {
                operation: "read_turtle",
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn malformed_turtle_leaves_no_output() -> Result<()> {
        let share = ShareFixture::new()?;
        let input = share.write("bad.ttl", samples::MALFORMED)?;
        let (converter, metrics) = converter()?;

        let err = converter.convert(&input);

        assert!(matches!(
            err,
            Err(FsOpsError::Delta {
                source: DeltaError::Parse { .. },
                ..
            })
        ));
        assert!(!share.exists("bad.delta"));
        assert!(step_recorded_once(&metrics, "parse", "failed")?);
        Ok(())
    }

    #[test]
    fn blank_nodes_leave_no_output() -> Result<()> {
        let share = ShareFixture::new()?;
        let input = share.write("blank.ttl", samples::BLANK_SUBJECT)?;
        let (converter, _) = converter()?;

        let err = converter.convert(&input);

        assert!(matches!(
            err,
            Err(FsOpsError::Delta {
                source: DeltaError::UnsupportedTermKind { .. },
                ..
            })
        ));
        assert!(!share.exists("blank.delta"));
        Ok(())
    }

    #[test]
    fn describe_output_reports_name_extension_and_size() -> Result<()> {
        let share = ShareFixture::new()?;
        let input = share.write("batch/export.ttl", samples::PREFIXED)?;
        let (converter, _) = converter()?;
        let output = converter.convert(&input)?;

        let info = converter.describe_output(&output)?;
        assert_eq!(info.name, "export");
        assert_eq!(info.extension, "delta");
        assert_eq!(info.size, share.read("batch/export.delta")?.len() as u64);

        let generated = info.into_generated(share.uri("batch/export.delta"), None);
        assert_eq!(generated.format, "application/json");
        assert_eq!(generated.physical_uri, "share://batch/export.delta");
        Ok(())
    }
}
