//! One compiled tiddler.

use tb_markup::{ImageRef, MarkupContext, rewrite, split_ordering, wiki_to_docbook_in};
use tb_store::RawFragment;

use crate::{BookError, Kind};

/// A tiddler with its markup compiled once, at load time.
///
/// The body excludes the "sequential reading" section; the child titles it
/// listed are kept in [`Fragment::ordering`].
#[derive(Debug, Clone)]
pub struct Fragment {
    title: String,
    tags: Vec<String>,
    kind: Kind,
    body: String,
    ordering: Option<Vec<String>>,
    docbook: String,
    images: Vec<ImageRef>,
}

impl Fragment {
    /// Compile a raw tiddler.
    ///
    /// Entities found in the text are recorded in `ctx`.
    pub fn new(raw: RawFragment, ctx: &mut MarkupContext) -> Result<Self, BookError> {
        let RawFragment { title, tags, text } = raw;
        let kind = Kind::classify(&title, &tags)?;
        let rewritten = rewrite(&title, &text, ctx)?;
        let ordered = split_ordering(&rewritten.text, ctx.locale());
        let docbook = wiki_to_docbook_in(ctx, &title, ordered.body)?;
        tracing::trace!(title = %title, %kind, "compiled tiddler");

        Ok(Self {
            body: ordered.body.trim_end_matches(['\n', '\r']).to_owned(),
            ordering: ordered.children,
            title,
            tags,
            kind,
            docbook,
            images: rewritten.images,
        })
    }

    /// Title, empty for the root.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.title.is_empty()
    }

    /// Tags that name other fragments rather than a kind.
    pub fn parent_tags(&self) -> impl Iterator<Item = &str> {
        self.tags
            .iter()
            .map(String::as_str)
            .filter(|t| !t.starts_with(crate::kind::KIND_PREFIX))
    }

    /// Intermediate wiki markup of the body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Child titles from the "sequential reading" section, if there is one.
    #[must_use]
    pub fn ordering(&self) -> Option<&[String]> {
        self.ordering.as_deref()
    }

    /// DocBook body with internal links still in wiki form.
    #[must_use]
    pub fn docbook(&self) -> &str {
        &self.docbook
    }

    #[must_use]
    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    pub(crate) fn rename(&mut self, title: String) {
        self.title = title;
    }
}
