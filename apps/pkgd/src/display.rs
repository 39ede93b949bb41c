//! Output rendering and formatting

use chrono::{DateTime, Utc};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::Term;
use serde::Serialize;
use std::io;

/// Final result of one CLI command
#[derive(Debug, Clone, Serialize)]
pub struct ActivityReport {
    pub command: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Terminal install state, or `synced` / `failed` for a sync
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    pub status: u32,
    pub status_name: &'static str,
    pub finished_at: DateTime<Utc>,
}

impl ActivityReport {
    pub fn succeeded(&self) -> bool {
        self.status == pkgd_errors::codes::NONE
    }
}

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    term: Term,
}

impl OutputRenderer {
    pub fn new(json_output: bool) -> Self {
        Self {
            json_output,
            term: Term::stdout(),
        }
    }

    /// Render the final report of a command
    pub fn render_report(&self, report: &ActivityReport) -> io::Result<()> {
        if self.json_output {
            let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Command").add_attribute(Attribute::Bold),
                Cell::new("Package").add_attribute(Attribute::Bold),
                Cell::new("State").add_attribute(Attribute::Bold),
                Cell::new("Progress").add_attribute(Attribute::Bold),
                Cell::new("Status").add_attribute(Attribute::Bold),
            ]);

        let state_cell = if !self.supports_color() {
            Cell::new(&report.state)
        } else if report.succeeded() {
            Cell::new(&report.state).fg(Color::Green)
        } else {
            Cell::new(&report.state).fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(report.command),
            Cell::new(report.package.as_deref().unwrap_or("-")),
            state_cell,
            Cell::new(
                report
                    .progress
                    .map_or_else(|| "-".to_string(), |p| format!("{p}%")),
            ),
            Cell::new(format!("{} ({})", report.status, report.status_name)),
        ]);

        println!("{table}");
        Ok(())
    }

    /// Print the rendered toolchain configuration verbatim
    pub fn render_config(&self, rendered: &str) -> io::Result<()> {
        if self.json_output {
            let json = serde_json::json!({ "toolchain_config": rendered });
            println!("{json}");
        } else {
            print!("{rendered}");
        }
        Ok(())
    }

    fn supports_color(&self) -> bool {
        self.term.features().colors_supported()
    }
}
