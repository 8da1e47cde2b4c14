//! Per-run markup state.

use std::path::{Path, PathBuf};

use crate::{EntityRegistry, IdRegistry, Locale};

/// Settings and accumulated state shared by every fragment of one run.
///
/// The context is built once per run and passed by reference to each
/// rewrite so entity usage is collected across the whole book.
#[derive(Debug, Default, Clone)]
pub struct MarkupContext {
    locale: Locale,
    image_dir: Option<PathBuf>,
    entities: EntityRegistry,
    ids: IdRegistry,
}

impl MarkupContext {
    #[must_use]
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            ..Self::default()
        }
    }

    /// Check image references against files in `dir`.
    #[must_use]
    pub fn with_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn locale(&self) -> Locale {
        self.locale
    }

    #[must_use]
    pub fn image_dir(&self) -> Option<&Path> {
        self.image_dir.as_deref()
    }

    #[must_use]
    pub fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut EntityRegistry {
        &mut self.entities
    }

    /// `xml:id` values claimed so far, figures included.
    pub fn ids_mut(&mut self) -> &mut IdRegistry {
        &mut self.ids
    }
}
