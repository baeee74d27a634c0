//! Course directory configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Where the in-memory directory gets its users and rosters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryConfig {
    /// YAML seed file. Without one the directory starts empty.
    pub seed_file: Option<PathBuf>,
}

impl DirectoryConfig {
    /// Validate directory configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.seed_file {
            Some(path) if !path.is_file() => Err(ValidationError::SeedFileMissing(
                path.display().to_string(),
            )),
            _ => Ok(()),
        }
    }
}
