use tb_markup::MarkupError;
use tb_store::StoreError;

/// Errors that stop a book from being assembled or rendered.
///
/// Inconsistencies in the document graph are not errors: they are collected
/// in a [`ValidationReport`](crate::ValidationReport).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BookError {
    /// A fragment carries two `:kind` tags.
    #[error("tiddler \"{title}\" has more than one format tag: {first} and {second}")]
    MultipleKindTags {
        title: String,
        first: String,
        second: String,
    },
    /// Two fragments share a title (after root aliasing).
    #[error("duplicate tiddler title \"{0}\"")]
    DuplicateTitle(String),
    /// Rendering was requested for a book without a root fragment.
    #[error("no initial tiddler")]
    NoRoot,
    #[error(transparent)]
    Markup(#[from] MarkupError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
