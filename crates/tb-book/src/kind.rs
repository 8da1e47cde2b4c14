//! Structural role of a fragment in the book.

use std::fmt;

use serde::Serialize;

use crate::BookError;

/// Tag prefix that selects a fragment kind.
pub(crate) const KIND_PREFIX: char = ':';

/// DocBook element a fragment becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Part,
    Chapter,
    #[default]
    Section,
    Simplesect,
    Appendix,
    Note,
    Tip,
    Caution,
    Important,
    Warning,
    Footnote,
}

impl Kind {
    /// Kind selected by a `:kind` tag, if the tag names a known kind.
    ///
    /// ```
    /// use tb_book::Kind;
    ///
    /// assert_eq!(Kind::from_tag(":chapter"), Some(Kind::Chapter));
    /// assert_eq!(Kind::from_tag(":chapitre"), None);
    /// assert_eq!(Kind::from_tag("chapter"), None);
    /// ```
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag.strip_prefix(KIND_PREFIX)? {
            "part" => Self::Part,
            "chapter" => Self::Chapter,
            "section" => Self::Section,
            "simplesect" => Self::Simplesect,
            "appendix" => Self::Appendix,
            "note" => Self::Note,
            "tip" => Self::Tip,
            "caution" => Self::Caution,
            "important" => Self::Important,
            "warning" => Self::Warning,
            "footnote" => Self::Footnote,
            _ => return None,
        };
        Some(kind)
    }

    /// Classify a fragment from its tags.
    ///
    /// At most one tag may start with `:`. Without one the fragment is a
    /// section, and so is a fragment whose only kind tag is unknown (that tag
    /// is reported separately during validation).
    pub fn classify<S: AsRef<str>>(title: &str, tags: &[S]) -> Result<Self, BookError> {
        let mut selected: Option<&str> = None;
        for tag in tags.iter().map(AsRef::as_ref) {
            if !tag.starts_with(KIND_PREFIX) {
                continue;
            }
            if let Some(first) = selected {
                return Err(BookError::MultipleKindTags {
                    title: title.to_owned(),
                    first: first.to_owned(),
                    second: tag.to_owned(),
                });
            }
            selected = Some(tag);
        }
        Ok(selected.and_then(Self::from_tag).unwrap_or_default())
    }

    /// Element name used in DocBook output.
    #[must_use]
    pub fn element_name(self) -> &'static str {
        match self {
            Self::Part => "part",
            Self::Chapter => "chapter",
            Self::Section => "section",
            Self::Simplesect => "simplesect",
            Self::Appendix => "appendix",
            Self::Note => "note",
            Self::Tip => "tip",
            Self::Caution => "caution",
            Self::Important => "important",
            Self::Warning => "warning",
            Self::Footnote => "footnote",
        }
    }

    /// Immediate fragments are inlined where they are linked instead of
    /// becoming sections of their own.
    #[must_use]
    pub fn is_immediate(self) -> bool {
        matches!(
            self,
            Self::Note | Self::Tip | Self::Caution | Self::Important | Self::Warning | Self::Footnote
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_name())
    }
}
