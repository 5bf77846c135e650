//! Output formatting and reporting

use anyhow::Result;
use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use colored::*;
use razor_core::{RazorDiagnostic, Severity};
use serde::Serialize;

use crate::OutputFormat;

/// Summary statistics for a check run
#[derive(Debug, Clone, Default)]
pub struct CheckSummary {
    pub files_checked: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl CheckSummary {
    pub fn record(&mut self, diagnostics: &[RazorDiagnostic]) {
        self.files_checked += 1;
        for diagnostic in diagnostics {
            match diagnostic.severity {
                Severity::Error => self.errors += 1,
                Severity::Warning => self.warnings += 1,
            }
        }
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// Diagnostics of one checked file
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: String,
    #[serde(skip)]
    pub text: String,
    pub diagnostics: Vec<RazorDiagnostic>,
}

/// Output formatter for the check command
pub struct OutputFormatter {
    format: OutputFormat,
    use_colors: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, use_colors: bool) -> Self {
        Self { format, use_colors }
    }

    pub fn print_results(&self, reports: &[FileReport], summary: &CheckSummary) -> Result<()> {
        match self.format {
            OutputFormat::Human => self.print_human_format(reports, summary),
            OutputFormat::Json => print_json_format(reports),
        }
    }

    fn print_human_format(&self, reports: &[FileReport], summary: &CheckSummary) -> Result<()> {
        for report in reports {
            for diagnostic in &report.diagnostics {
                print!("{}", self.render(report, diagnostic)?);
            }
        }

        if summary.errors == 0 && summary.warnings == 0 {
            println!("{} No issues found", "✓".green());
        }
        println!("\n{}", "Summary:".bold());
        println!("  Files checked: {}", summary.files_checked);
        if summary.errors > 0 {
            println!("  Errors: {}", summary.errors.to_string().red());
        }
        if summary.warnings > 0 {
            println!("  Warnings: {}", summary.warnings.to_string().yellow());
        }
        Ok(())
    }

    /// Render one diagnostic with its source context
    fn render(&self, report: &FileReport, diagnostic: &RazorDiagnostic) -> Result<String> {
        let (kind, color) = match diagnostic.severity {
            Severity::Error => (ReportKind::Error, Color::Red),
            Severity::Warning => (ReportKind::Warning, Color::Yellow),
        };
        let start = diagnostic.span.absolute_index.min(report.text.len());
        let end = diagnostic.span.end().clamp(start, report.text.len());
        let name = report.path.as_str();

        let mut buffer = Vec::new();
        Report::build(kind, (name, start..end))
            .with_config(
                Config::default()
                    .with_index_type(IndexType::Byte)
                    .with_color(self.use_colors),
            )
            .with_code(&diagnostic.id)
            .with_message(&diagnostic.message)
            .with_label(
                Label::new((name, start..end))
                    .with_message(&diagnostic.message)
                    .with_color(color),
            )
            .finish()
            .write((name, Source::from(report.text.as_str())), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn print_json_format(reports: &[FileReport]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(reports)?);
    Ok(())
}
