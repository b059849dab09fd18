//! Scratch share mount backed by a temporary directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;

/// Storage-scheme prefix used by fixtures.
pub const SHARE_PREFIX: &str = "share://";

/// Temporary directory standing in for the shared mount.
pub struct ShareFixture {
    dir: TempDir,
}

impl ShareFixture {
    /// Create an empty share mount.
    ///
    /// # Errors
    ///
    /// Returns an error when the temporary directory cannot be created.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("ttldelta-share-").tempdir()?;
        Ok(Self { dir })
    }

    /// Directory the fixture's share URIs resolve to.
    #[must_use]
    pub fn mount(&self) -> &Path {
        self.dir.path()
    }

    /// Storage-scheme prefix matching [`Self::mount`].
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        SHARE_PREFIX
    }

    /// Write `content` to `name` below the mount, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub fn write(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Read a file below the mount as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read.
    pub fn read(&self, name: &str) -> Result<String> {
        Ok(fs::read_to_string(self.path(name))?)
    }

    /// Whether `name` exists below the mount.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    /// Absolute path of `name` below the mount.
    #[must_use]
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Storage-scheme URI of `name`.
    #[must_use]
    pub fn uri(&self, name: &str) -> String {
        format!("{SHARE_PREFIX}{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_files_are_addressable_by_uri_and_path() -> Result<()> {
        let share = ShareFixture::new()?;
        let path = share.write("batch/a.ttl", "content")?;
        assert_eq!(path, share.mount().join("batch/a.ttl"));
        assert_eq!(share.uri("batch/a.ttl"), "share://batch/a.ttl");
        assert_eq!(share.read("batch/a.ttl")?, "content");
        assert!(share.exists("batch/a.ttl"));
        assert!(!share.exists("batch/b.ttl"));
        Ok(())
    }
}
