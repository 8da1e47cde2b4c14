//! In-memory source for testing.

use std::sync::RwLock;

use crate::source::{FragmentSource, RawFragment, StoreError, StoreErrorKind};

/// Mock source for testing.
///
/// # Example
///
/// ```
/// use tb_store::{FragmentSource, MockSource};
///
/// let source = MockSource::new()
///     .with_fragment("Gaul", &[":chapter"], "Tribes.")
///     .with_fragment("Army", &["Gaul"], "Legions.");
///
/// let fragments = source.load().unwrap();
/// assert_eq!(fragments[0].title, "Army");
/// ```
#[derive(Debug, Default)]
pub struct MockSource {
    fragments: RwLock<Vec<RawFragment>>,
    fail: bool,
}

impl MockSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_fragment(self, title: &str, tags: &[&str], text: &str) -> Self {
        self.add_fragment(title, tags, text);
        self
    }

    /// Make every load fail.
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn add_fragment(&self, title: &str, tags: &[&str], text: &str) {
        self.fragments
            .write()
            .unwrap()
            .push(RawFragment::new(title, tags, text));
    }
}

impl FragmentSource for MockSource {
    fn load(&self) -> Result<Vec<RawFragment>, StoreError> {
        if self.fail {
            return Err(StoreError::new(StoreErrorKind::Other)
                .with_backend("Mock")
                .with_message("load failed"));
        }
        let mut fragments = self.fragments.read().unwrap().clone();
        fragments.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(fragments)
    }

    fn describe(&self) -> String {
        "mock source".to_owned()
    }
}
