//! Factory configuration.

use super::error::{Result, SequentialFileError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default buffer alignment in bytes.
pub const DEFAULT_ALIGNMENT: usize = 1;

fn default_alignment() -> usize {
    DEFAULT_ALIGNMENT
}

fn default_datasync() -> bool {
    true
}

/// Settings shared by every file a
/// [`SequentialFileFactory`](super::SequentialFileFactory) creates.
///
/// ```rust
/// use seqfile_rs::sequential::FactoryConfig;
///
/// let config = FactoryConfig::from_json_str(r#"{ "directory": "/var/lib/broker/journal" }"#);
/// assert!(config.is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryConfig {
    /// Base directory holding the files.
    pub directory: PathBuf,

    /// Buffer alignment in bytes. Affects buffer sizing only.
    #[serde(default = "default_alignment")]
    pub alignment: usize,

    /// Force writes with `sync_data` (`true`) or `sync_all` (`false`).
    #[serde(default = "default_datasync")]
    pub datasync: bool,
}

impl FactoryConfig {
    /// Configuration for `directory` with default alignment and datasync.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            alignment: DEFAULT_ALIGNMENT,
            datasync: true,
        }
    }

    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// [`SequentialFileError::InvalidConfig`] if the JSON is malformed or
    /// fails [`validate`](Self::validate).
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: FactoryConfig =
            serde_json::from_str(json).map_err(|e| SequentialFileError::InvalidConfig {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject an empty directory or a zero alignment.
    ///
    /// # Errors
    ///
    /// [`SequentialFileError::InvalidConfig`] describing the problem.
    pub fn validate(&self) -> Result<()> {
        if self.directory.as_os_str().is_empty() {
            return Err(SequentialFileError::InvalidConfig {
                message: "directory must not be empty".to_string(),
            });
        }
        if self.alignment == 0 {
            return Err(SequentialFileError::InvalidConfig {
                message: "alignment must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
