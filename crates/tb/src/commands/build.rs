//! `tb docbook`, `tb single` and `tb multi` command implementations.
//!
//! Every output is rendered in memory first, so a failing run leaves no
//! partial file behind.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use tb_book::Book;

use super::{BookArgs, book_info, print_report};
use crate::error::CliError;
use crate::output::Output;

/// Manifest written next to the per-tiddler files.
const MANIFEST: &str = "manifest.txt";

/// Arguments for commands writing one file.
#[derive(Args)]
pub(crate) struct OutputArgs {
    #[command(flatten)]
    pub(crate) book: BookArgs,

    /// Output file.
    #[arg(short, long)]
    output: PathBuf,
}

/// Arguments for the multi command.
#[derive(Args)]
pub(crate) struct WikiDirArgs {
    #[command(flatten)]
    pub(crate) book: BookArgs,

    /// Output directory.
    #[arg(short, long)]
    output: PathBuf,
}

impl OutputArgs {
    pub(crate) fn execute_docbook(self, output: &Output) -> Result<(), CliError> {
        let loaded = self.book.load(output)?;
        validated(&loaded.book, output)?;

        let info = book_info(&loaded.config, &loaded.book);
        let xml = loaded.book.render_docbook(&info)?;
        write_file(&self.output, &xml)?;

        output.success(&format!("DocBook written to {}", self.output.display()));
        Ok(())
    }

    pub(crate) fn execute_single(self, output: &Output) -> Result<(), CliError> {
        let loaded = self.book.load(output)?;
        validated(&loaded.book, output)?;

        let wiki = loaded.book.render_wiki()?;
        write_file(&self.output, &wiki)?;

        output.success(&format!("Wiki markup written to {}", self.output.display()));
        Ok(())
    }
}

impl WikiDirArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let loaded = self.book.load(output)?;
        validated(&loaded.book, output)?;

        let bundle = loaded.book.render_wiki_files()?;
        fs::create_dir_all(&self.output)?;
        for file in &bundle.files {
            tracing::debug!(title = %file.title, file = %file.file_name, "Writing wiki file");
            fs::write(self.output.join(&file.file_name), &file.content)?;
        }
        fs::write(self.output.join(MANIFEST), &bundle.manifest)?;

        output.success(&format!(
            "{} wiki files written to {}",
            bundle.files.len(),
            self.output.display()
        ));
        Ok(())
    }
}

fn validated(book: &Book, output: &Output) -> Result<(), CliError> {
    print_report(&book.validate(), output)
}

fn write_file(path: &Path, content: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
