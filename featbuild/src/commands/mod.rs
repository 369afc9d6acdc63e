//! Command implementations for the CLI.

mod cache;
mod discovery;
mod execution;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use featbuild_core::{FeatureRegistry, FileCacheStore, LoadedConfig};

pub use cache::cmd_clean;
pub use discovery::{cmd_affected, cmd_list, cmd_order};
pub use execution::{cmd_build, cmd_plan};

/// Build action used for stale features.
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum Executor {
    /// `docker build` with the primary input as context
    Docker,
    /// The feature's command through `sh -c`
    Shell,
}

/// Global options shared by every command.
pub struct Context {
    config_path: PathBuf,
    cache_dir: Option<PathBuf>,
}

impl Context {
    pub fn new(config_path: PathBuf, cache_dir: Option<PathBuf>) -> Self {
        Self {
            config_path,
            cache_dir,
        }
    }

    fn load(&self) -> Result<(LoadedConfig, FeatureRegistry)> {
        let loaded = LoadedConfig::load(&self.config_path)?;
        let registry = loaded.registry().with_context(|| {
            format!("invalid builder file {}", self.config_path.display())
        })?;
        Ok((loaded, registry))
    }

    fn cache_store(&self, loaded: &LoadedConfig) -> FileCacheStore {
        let dir = self
            .cache_dir
            .clone()
            .unwrap_or_else(|| loaded.cache_dir());
        FileCacheStore::new(dir)
    }
}
