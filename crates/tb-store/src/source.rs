//! Source trait and error types.

use std::path::PathBuf;

/// A tiddler as read from a source, before any markup processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFragment {
    pub title: String,
    pub tags: Vec<String>,
    pub text: String,
}

impl RawFragment {
    #[must_use]
    pub fn new(title: impl Into<String>, tags: &[&str], text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            tags: tags.iter().map(|t| (*t).to_owned()).collect(),
            text: text.into(),
        }
    }
}

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreErrorKind {
    /// Source file or directory does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Content could not be parsed.
    InvalidFormat,
    /// Other/unknown error category.
    Other,
}

/// Source error with semantic kind and backend-specific cause.
#[derive(Debug)]
pub struct StoreError {
    pub kind: StoreErrorKind,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Tid", "Json").
    pub backend: Option<&'static str>,
    message: Option<String>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StoreError {
    #[must_use]
    pub fn new(kind: StoreErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            message: None,
            source: None,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a parse error with a message.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::InvalidFormat).with_message(message)
    }

    /// Create a store error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StoreErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StoreErrorKind::PermissionDenied,
            _ => StoreErrorKind::Other,
        };
        Self::new(kind).with_source(err).with_path(path)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }
        let kind_str = match self.kind {
            StoreErrorKind::NotFound => "Not found",
            StoreErrorKind::PermissionDenied => "Permission denied",
            StoreErrorKind::InvalidFormat => "Invalid format",
            StoreErrorKind::Other => "Error",
        };
        write!(f, "{kind_str}")?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        } else if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// A collection of tiddlers.
pub trait FragmentSource: Send + Sync {
    /// Load every book fragment, sorted by title.
    ///
    /// System tiddlers and drafts are skipped.
    fn load(&self) -> Result<Vec<RawFragment>, StoreError>;

    /// Human-readable description of the source, for logs.
    fn describe(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_full() {
        let err = StoreError::invalid("missing title")
            .with_backend("Tid")
            .with_path("wiki/a.tid");

        assert_eq!(
            err.to_string(),
            "[Tid] Invalid format: missing title (path: wiki/a.tid)"
        );
    }

    #[test]
    fn test_io_not_found() {
        let err = StoreError::io(
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            "x.json",
        );

        assert_eq!(err.kind, StoreErrorKind::NotFound);
        assert_eq!(err.to_string(), "Not found: gone (path: x.json)");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_raw_fragment_new() {
        let raw = RawFragment::new("Gaul", &["Rome", ":chapter"], "text");

        assert_eq!(raw.tags, vec!["Rome", ":chapter"]);
    }
}
