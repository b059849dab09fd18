//! Storage-scheme indirection between physical file URIs and the shared mount.

use std::path::{Component, Path, PathBuf};

use crate::error::{FsOpsError, FsOpsResult};

/// Default storage-scheme prefix of physical file URIs.
pub const DEFAULT_SHARE_PREFIX: &str = "share://";
/// Default directory the storage scheme resolves to.
pub const DEFAULT_SHARE_MOUNT: &str = "/share/";

/// Prefix substitution between `share://name` URIs and `/share/name` paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareMapping {
    prefix: String,
    mount: PathBuf,
}

impl ShareMapping {
    /// Build a mapping between a URI prefix and a mount directory.
    pub fn new(prefix: impl Into<String>, mount: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            mount: mount.into(),
        }
    }

    /// URI prefix handled by this mapping.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Directory the prefix maps to.
    #[must_use]
    pub fn mount(&self) -> &Path {
        &self.mount
    }

    /// Resolve a physical file URI to its path under the mount.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::InvalidInput`] when the URI does not use the storage scheme,
    /// names nothing after the prefix, or names anything but plain segments below the mount
    /// (`..`, `.`, or a leading `/`).
    pub fn to_path(&self, uri: &str) -> FsOpsResult<PathBuf> {
        let relative = uri.strip_prefix(&self.prefix).ok_or_else(|| {
            FsOpsError::invalid_input("physical_uri", "outside storage scheme", uri)
        })?;
        if relative.is_empty() {
            return Err(FsOpsError::invalid_input(
                "physical_uri",
                "empty file name",
                uri,
            ));
        }
        let relative = Path::new(relative);
        if !relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
        {
            return Err(FsOpsError::invalid_input(
                "physical_uri",
                "escapes share mount",
                uri,
            ));
        }
        Ok(self.mount.join(relative))
    }

    /// Map a path under the mount back to its storage-scheme URI.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::InvalidInput`] when the path lies outside the mount or is not UTF-8.
    pub fn to_uri(&self, path: &Path) -> FsOpsResult<String> {
        let relative = path.strip_prefix(&self.mount).map_err(|_| {
            FsOpsError::invalid_input("path", "outside share mount", path.display().to_string())
        })?;
        let relative = relative.to_str().ok_or_else(|| {
            FsOpsError::invalid_input("path", "not utf-8", path.display().to_string())
        })?;
        Ok(format!("{}{relative}", self.prefix))
    }
}

impl Default for ShareMapping {
    fn default() -> Self {
        Self::new(DEFAULT_SHARE_PREFIX, DEFAULT_SHARE_MOUNT)
    }
}
