//! Config facade: one entry point that assembles sources in precedence order.

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::PaperConfig;
use crate::error::ConfigError;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads [`PaperConfig`] from layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, global file, workspace files, then environment.
    pub fn load(workspace_root: &Path) -> Result<PaperConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        debug!(workspace = %workspace_root.display(), "Loading configuration");
        Self::finish(builder)
    }

    /// Defaults, the given file (required), then environment.
    pub fn load_from_file(path: &Path) -> Result<PaperConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).required(true));
        debug!(config_path = %path.display(), "Loading configuration file");
        Self::finish(builder)
    }

    /// Built-in defaults only.
    pub fn default() -> PaperConfig {
        PaperConfig::default()
    }

    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<PaperConfig, ConfigError> {
        let config = builder
            .add_source(
                Environment::with_prefix("PAPER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        config.try_deserialize::<PaperConfig>()?.validated()
    }
}
