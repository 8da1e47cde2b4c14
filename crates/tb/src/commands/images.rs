//! `tb images` command implementation.

use tb_book::Category;

use super::{BookArgs, print_report};
use crate::error::CliError;
use crate::output::Output;

/// Report picture description problems. Only missing titles fail the run.
pub(crate) fn execute(args: &BookArgs, output: &Output) -> Result<(), CliError> {
    let loaded = args.load(output)?;
    let report = loaded.book.validate().only(Category::Picture);

    print_report(&report, output)?;
    if report.is_empty() {
        output.success("All pictures are described");
    }
    Ok(())
}
