//! CLI output: error mapping and history rendering.

use crate::cli::route::ReplayReport;
use crate::error::PaperError;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &PaperError) -> String {
    match e {
        PaperError::Rejected {
            index,
            command,
            source,
        } => format!("Script command {} ({}) failed: {}", index, command, source),
        other => other.to_string(),
    }
}

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub fn format_history_json(report: &ReplayReport) -> Result<String, PaperError> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Human-readable history: one table per context, rejections last.
pub fn format_history_text(report: &ReplayReport) -> String {
    let history = &report.history;
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("History")));
    out.push_str(&format!("  Commands: {}\n", report.commands));
    out.push_str(&format!("  Contexts: {}\n", history.contexts.len()));
    match history.selected_context {
        Some(index) => out.push_str(&format!("  Selected context: {}\n", index)),
        None => out.push_str("  Selected context: none\n"),
    }
    if let Some(ref preview) = history.preview {
        out.push_str(&format!("  Preview: {}\n", preview));
    }
    out.push('\n');

    for context in &history.contexts {
        let marker = if context.selected { " (selected)" } else { "" };
        out.push_str(&format!(
            "{}\n\n",
            format_section_heading(&format!("Context {}{}", context.index, marker))
        ));
        if context.columns.is_empty() {
            out.push_str("  No visible columns\n\n");
            continue;
        }
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec![
            "Col", "", "Item", "Source", "Ready", "Visited", "Title",
        ]);
        for (column_index, column) in context.columns.iter().enumerate() {
            for snapshot in &column.items {
                let item = &snapshot.item;
                let source = match (item.page(), item.from_list()) {
                    (Some(page), _) => format!("page {}", page),
                    (None, Some(list)) => list.to_string(),
                    (None, None) => "-".to_string(),
                };
                table.add_row(vec![
                    column_index.to_string(),
                    if item.is_selected() { "▶" } else { "" }.to_string(),
                    format!("{}:{}", item.kind(), item.id()),
                    source,
                    yes_no(snapshot.ready).to_string(),
                    yes_no(item.is_visited()).to_string(),
                    snapshot.title.clone().unwrap_or_else(|| "-".to_string()),
                ]);
            }
        }
        out.push_str(&format!("{}\n\n", table));
    }

    if !report.rejected.is_empty() {
        out.push_str(&format!("{}\n\n", format_section_heading("Rejected commands")));
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["#", "Command", "Kind", "Error"]);
        for rejection in &report.rejected {
            let kind = if rejection.navigation { "navigation" } else { "store" };
            table.add_row(vec![
                rejection.index.to_string(),
                rejection.command.to_string(),
                kind.to_string(),
                rejection.error.clone(),
            ]);
        }
        out.push_str(&format!("{}\n", table));
    }
    out
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
