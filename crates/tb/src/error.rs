//! CLI error types.

use tb_book::{BookError, Category};
use tb_config::ConfigError;
use tb_markup::MarkupError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Book(#[from] BookError),

    #[error("{0}")]
    Markup(#[from] MarkupError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{category}: {count} problem(s), nothing written")]
    Validation { category: Category, count: usize },
}
