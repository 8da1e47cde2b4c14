//! `tb check` command implementation.

use clap::{Args, ValueEnum};

use super::{BookArgs, print_report};
use crate::error::CliError;
use crate::output::Output;

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum ReportFormat {
    /// Colored report on stderr.
    Text,
    /// JSON array on stdout.
    Json,
}

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    pub(crate) book: BookArgs,

    /// Report format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,
}

impl CheckArgs {
    /// Validate the book. Nothing is written besides the report.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let loaded = self.book.load(output)?;
        let report = loaded.book.validate();

        match self.format {
            ReportFormat::Json => {
                output.data(&serde_json::to_string_pretty(&report)?)?;
                match report.first_fatal() {
                    Some(category) => Err(CliError::Validation {
                        category,
                        count: report
                            .in_category(category)
                            .filter(|issue| issue.is_fatal())
                            .count(),
                    }),
                    None => Ok(()),
                }
            }
            ReportFormat::Text => {
                print_report(&report, output)?;
                if report.is_empty() {
                    output.success("No problems found");
                } else {
                    output.success("No blocking problems found");
                }
                Ok(())
            }
        }
    }
}
