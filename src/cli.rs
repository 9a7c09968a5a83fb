//! CLI domain: parse, route and output only.
//! Replays command scripts through a [`crate::Connection`] and renders the result.

mod output;
mod parse;
mod route;

pub use output::{format_history_json, format_history_text, format_section_heading, map_error};
pub use parse::{Cli, Commands, OutputFormat};
pub use route::{replay_commands, Rejection, ReplayReport, RunContext};
