//! CLI command implementations.

mod build;
mod check;
pub(crate) mod images;

use std::path::PathBuf;

use clap::Args;
use tb_book::{Author, Book, BookInfo, BookOptions, Category, ValidationReport};
use tb_config::{CliSettings, Config, SourceConfig, SourceFormat};
use tb_markup::Locale;
use tb_store::{FragmentSource, JsonExport, TidDirectory};

use crate::error::CliError;
use crate::output::Output;

pub(crate) use build::{OutputArgs, WikiDirArgs};
pub(crate) use check::CheckArgs;

/// Arguments shared by every command: where the book comes from.
#[derive(Args)]
pub(crate) struct BookArgs {
    /// Path to configuration file (default: auto-discover tiddlybook.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tiddler directory or JSON export (overrides config).
    #[arg(short, long, env = "TB_SOURCE")]
    source: Option<PathBuf>,

    /// Two-letter language code: en, fr or es (overrides config).
    #[arg(short, long)]
    language: Option<String>,

    /// Title of the root tiddler (overrides config).
    #[arg(long)]
    root: Option<String>,

    /// Directory holding the picture files (overrides config).
    #[arg(long)]
    image_dir: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

/// A loaded book with the configuration it was built from.
pub(crate) struct Loaded {
    pub(crate) config: Config,
    pub(crate) book: Book,
}

impl BookArgs {
    /// Load configuration and compile the book.
    pub(crate) fn load(&self, output: &Output) -> Result<Loaded, CliError> {
        let cli_settings = CliSettings {
            language: self.language.clone(),
            source: self.source.clone(),
            root: self.root.clone(),
            image_dir: self.image_dir.clone(),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let source = open_source(&config.source_resolved);
        output.info(&format!("Source: {}", source.describe()));

        let book = Book::load(source.as_ref(), &book_options(&config)?)?;
        output.info(&format!("Loaded {} tiddlers", book.len()));

        Ok(Loaded { config, book })
    }
}

fn open_source(source: &SourceConfig) -> Box<dyn FragmentSource> {
    match source.format {
        SourceFormat::Tid => Box::new(TidDirectory::new(source.path.clone())),
        SourceFormat::Json => Box::new(JsonExport::new(source.path.clone())),
    }
}

fn book_options(config: &Config) -> Result<BookOptions, CliError> {
    let mut options = BookOptions::new(Locale::from_code(&config.book.language)?);
    if let Some(root) = &config.book.root {
        options = options.with_root_alias(root.clone());
    }
    if let Some(dir) = &config.image_dir {
        options = options.with_image_dir(dir.clone());
    }
    Ok(options)
}

/// Front matter from the configuration, completed from the book itself.
pub(crate) fn book_info(config: &Config, book: &Book) -> BookInfo {
    let book_config = &config.book;
    let title = if book_config.title.is_empty() {
        book_config.root.clone().unwrap_or_default()
    } else {
        book_config.title.clone()
    };

    let mut info = BookInfo::new(title);
    if let Some(subtitle) = &book_config.subtitle {
        info = info.with_subtitle(subtitle.clone());
    }
    if let Some(pubdate) = &book_config.pubdate {
        info = info.with_pubdate(pubdate.clone());
    }
    if let Some(notice) = &book_config.legal_notice {
        info = info.with_legal_notice(notice.clone());
    }
    for author in &book_config.authors {
        let mut entry = Author::new(author.firstname.clone(), author.surname.clone());
        if let Some(email) = author.email_address() {
            entry = entry.with_email(email);
        }
        info = info.with_author(entry);
    }
    info.or_harvested(book)
}

/// Print `report` category by category, stopping after the first category
/// holding a fatal issue.
///
/// # Errors
///
/// Returns `CliError::Validation` naming that category.
pub(crate) fn print_report(report: &ValidationReport, output: &Output) -> Result<(), CliError> {
    for category in Category::ALL {
        let issues: Vec<_> = report.in_category(category).collect();
        if issues.is_empty() {
            continue;
        }

        output.highlight(&format!("{category} ({})", issues.len()));
        for issue in &issues {
            output.issue(issue);
        }

        let fatal = issues.iter().filter(|issue| issue.is_fatal()).count();
        if fatal > 0 {
            return Err(CliError::Validation {
                category,
                count: fatal,
            });
        }
    }
    Ok(())
}
