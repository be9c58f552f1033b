//! Output Formatting
//!
//! Renders dispatcher reports either as grid tables for people or as JSON
//! for scripts. Both views carry the same fields.

mod json;
mod table;

use std::fmt;

use clap::ValueEnum;
use serde::Deserialize;

use crate::application::Report;

pub use table::TableRecord;

/// Output format selected with `--format`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Table => f.write_str("table"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

/// Render a report in the requested format
pub fn render(report: &Report, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Table => Ok(table::render(report)),
        OutputFormat::Json => json::render(report),
    }
}
