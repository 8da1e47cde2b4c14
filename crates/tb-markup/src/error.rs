//! Markup error types.

/// Errors raised while rewriting or structuring fragment text.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MarkupError {
    /// A table line matches no recognized row shape.
    #[error("tiddler \"{title}\": malformed table line: {line}")]
    MalformedTableRow { title: String, line: String },

    /// A vertical-merge marker has no cell above it to extend.
    #[error("tiddler \"{title}\": rowspan marker without a cell above: {line}")]
    DanglingRowspan { title: String, line: String },

    /// Language code outside the supported set.
    #[error("language {0} not supported")]
    UnsupportedLanguage(String),
}
