//! Report rendering: colored text, JSON, CSV and table output.

pub mod csv;
pub mod json;
pub mod palette;
pub mod table;
pub mod text;

pub use palette::Palette;
pub use text::TextOptions;

use crate::scan::ScanReport;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unknown `--format` value.
#[derive(Debug, Error)]
#[error("Unknown format '{0}'. Use text, json, csv, or table.")]
pub struct UnknownFormat(pub String);

/// Output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
    Table,
}

impl OutputFormat {
    /// Machine-readable formats never carry colour codes.
    pub fn is_plain(&self) -> bool {
        !matches!(self, Self::Text)
    }
}

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "table" => Ok(Self::Table),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Table => "table",
        };
        f.write_str(name)
    }
}

/// Render a report in the given format.
pub fn render(
    report: &ScanReport,
    format: OutputFormat,
    palette: &Palette,
    options: &TextOptions,
) -> String {
    match format {
        OutputFormat::Text => text::render(report, palette, options),
        OutputFormat::Json => json::render(report),
        OutputFormat::Csv => csv::render(report),
        OutputFormat::Table => table::render(report),
    }
}

/// Render a fatal error in the given format.
pub fn render_error(format: OutputFormat, message: &str, palette: &Palette) -> String {
    match format {
        OutputFormat::Json => json::render_error(message),
        OutputFormat::Csv => csv::render_error(message),
        OutputFormat::Text | OutputFormat::Table => {
            format!("{}\n", palette.bad(&format!("Error: {message}")))
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!(" Table ".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        let err = "xml".parse::<OutputFormat>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown format 'xml'. Use text, json, csv, or table.");
    }

    #[test]
    fn test_table_ignores_palette() {
        let report = fixtures::report();
        let options = TextOptions::default();
        let colored = render(&report, OutputFormat::Table, &Palette::new(true), &options);
        assert!(!colored.contains('\u{1b}'));
        assert_eq!(
            colored,
            render(&report, OutputFormat::Table, &Palette::plain(), &options)
        );
    }

    #[test]
    fn test_render_error() {
        let palette = Palette::plain();
        assert_eq!(
            render_error(OutputFormat::Text, "lspci missing", &palette),
            "Error: lspci missing\n"
        );
        assert!(render_error(OutputFormat::Json, "lspci missing", &palette).contains("\"error\""));
        assert!(
            render_error(OutputFormat::Csv, "lspci missing", &palette)
                .starts_with("error,message\n")
        );
    }
}
