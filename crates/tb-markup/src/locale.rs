//! Output language selection.

use std::fmt;
use std::str::FromStr;

use crate::MarkupError;

/// A supported book language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Locale {
    #[default]
    En,
    Fr,
    Es,
}

impl Locale {
    /// Resolve a language code. An empty code selects English.
    pub fn from_code(code: &str) -> Result<Self, MarkupError> {
        match code.trim() {
            "" | "en" => Ok(Self::En),
            "fr" => Ok(Self::Fr),
            "es" => Ok(Self::Es),
            other => Err(MarkupError::UnsupportedLanguage(other.to_owned())),
        }
    }

    /// Two-letter code, used for `xml:lang`.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
            Self::Es => "es",
        }
    }

    /// Heading that introduces the ordering list of a fragment.
    #[must_use]
    pub fn sequential_reading(self) -> &'static str {
        match self {
            Self::En => "sequential reading",
            Self::Fr => "lecture séquentielle",
            Self::Es => "lectura secuencial",
        }
    }
}

impl FromStr for Locale {
    type Err = MarkupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
