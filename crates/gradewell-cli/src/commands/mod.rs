//! Subcommand implementations.

pub mod activities;
pub mod grade;
pub mod init;
pub mod list_models;
pub mod publish;
pub mod submissions;
pub mod submit;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result};

use gradewell_core::store::FileStore;
use gradewell_core::Portal;
use gradewell_providers::{load_config_from, GradewellConfig};

use crate::GlobalArgs;

impl GlobalArgs {
    pub fn load_config(&self) -> Result<GradewellConfig> {
        load_config_from(self.config.as_deref())
    }

    fn data_dir(&self, config: &GradewellConfig) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| config.data_dir.clone())
    }

    /// Open the portal backed by the data directory.
    pub fn open_portal(&self, config: &GradewellConfig) -> Result<Portal<FileStore>> {
        let dir = self.data_dir(config);
        let store = FileStore::open(dir.clone())
            .with_context(|| format!("failed to open data directory: {}", dir.display()))?;
        Ok(Portal::open(store))
    }
}
