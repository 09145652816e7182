//! Fixed on-disk layout under the migration base path

use std::path::{Path, PathBuf};

/// Name of the document transfer executable
pub const TRANSFER_TOOL_NAME: &str = "data-prepper";

/// Pipeline config location relative to the base path
pub const PIPELINE_CONFIG_RELATIVE: &str = "pipelines/pipeline.yaml";

/// Default metadata engine location relative to the base path
pub const METADATA_TOOL_RELATIVE: &str = "bin/metadata-migration";

/// Paths derived from a base path
///
/// Pure function of `base_path`; nothing here is configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPaths {
    base: PathBuf,
}

impl MigrationPaths {
    /// Derive paths from the base path
    #[inline]
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base: base_path.into(),
        }
    }

    /// Base path
    #[inline]
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// `<base>/pipelines/pipeline.yaml`
    #[must_use]
    pub fn pipeline_config(&self) -> PathBuf {
        self.base.join(PIPELINE_CONFIG_RELATIVE)
    }

    /// `<base>/bin/data-prepper`
    #[must_use]
    pub fn transfer_executable(&self) -> PathBuf {
        self.base.join("bin").join(TRANSFER_TOOL_NAME)
    }

    /// `<base>/bin/metadata-migration`
    #[must_use]
    pub fn metadata_executable(&self) -> PathBuf {
        self.base.join(METADATA_TOOL_RELATIVE)
    }
}
