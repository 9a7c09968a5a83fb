//! CLI route: run context and the single dispatch table.

use crate::cli::output::{format_history_json, format_history_text};
use crate::cli::parse::{Commands, OutputFormat};
use crate::command::Command;
use crate::config::{ConfigLoader, PaperConfig};
use crate::connection::{Connection, HistorySnapshot};
use crate::error::PaperError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Runtime context for CLI execution: workspace and the loaded configuration.
pub struct RunContext {
    workspace_root: PathBuf,
    config: PaperConfig,
}

/// A scripted command that was rejected under `--keep-going`.
#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    pub index: usize,
    pub command: &'static str,
    /// Router command, as opposed to a store update.
    pub navigation: bool,
    pub error: String,
}

/// Outcome of a replay: the final history plus every rejection.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub commands: usize,
    pub rejected: Vec<Rejection>,
    pub history: HistorySnapshot,
}

impl RunContext {
    /// Create run context from workspace root and optional config path.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, PaperError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Ok(Self {
            workspace_root,
            config,
        })
    }

    pub fn config(&self) -> &PaperConfig {
        &self.config
    }

    /// Execute a command and return its printable output.
    pub fn execute(&self, command: &Commands) -> Result<String, PaperError> {
        match command {
            Commands::Replay {
                script,
                format,
                keep_going,
            } => {
                let report = self.replay(&self.resolve(script), *keep_going)?;
                match format {
                    OutputFormat::Text => Ok(format_history_text(&report)),
                    OutputFormat::Json => format_history_json(&report),
                }
            }
            Commands::Config => Ok(self.config.to_toml()?),
        }
    }

    /// Parse a script and apply it to a fresh connection.
    pub fn replay(&self, script: &Path, keep_going: bool) -> Result<ReplayReport, PaperError> {
        let raw = std::fs::read_to_string(script)?;
        let commands: Vec<Command> = serde_json::from_str(&raw)?;
        info!(script = %script.display(), commands = commands.len(), "Replaying script");
        replay_commands(Connection::from_config(&self.config), commands, keep_going)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() || path.exists() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }
}

/// Apply commands in order. Without `keep_going` the first rejection aborts.
pub fn replay_commands(
    mut connection: Connection,
    commands: Vec<Command>,
    keep_going: bool,
) -> Result<ReplayReport, PaperError> {
    let total = commands.len();
    let mut rejected = Vec::new();
    for (index, command) in commands.into_iter().enumerate() {
        let name = command.name();
        let navigation = command.is_navigation();
        if let Err(err) = connection.dispatch(command) {
            if !keep_going {
                return Err(PaperError::Rejected {
                    index,
                    command: name,
                    source: Box::new(err),
                });
            }
            warn!(index, command = name, navigation, "Continuing after rejected command");
            rejected.push(Rejection {
                index,
                command: name,
                navigation,
                error: err.to_string(),
            });
        }
    }
    Ok(ReplayReport {
        commands: total,
        rejected,
        history: connection.snapshot(),
    })
}
