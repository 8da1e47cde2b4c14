//! The document graph.
//!
//! # Architecture
//!
//! Fragments are stored in a flat `Vec<Fragment>` with parent/children
//! relationships tracked by indices, filled in once by the ordering-list
//! traversal when the book is built:
//! - O(1) title lookups via `index` `HashMap`
//! - document order precomputed from the traversal
//! - validation is a pure function of the built state

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;

use quick_xml::escape::unescape;
use tb_markup::{EntityRegistry, IdRegistry, Locale, MarkupContext, normalized_id, wiki_links};
use tb_store::{FragmentSource, RawFragment};

use crate::report::{Issue, ValidationReport};
use crate::traversal::{Traversal, TraversalIssue, traverse};
use crate::{BookError, Fragment};

/// Title prefix of fragments that exist to hold one figure.
const FIGURE_PREFIX: &str = "fig:";

/// Options used when compiling a book.
#[derive(Debug, Clone, Default)]
pub struct BookOptions {
    locale: Locale,
    root_alias: Option<String>,
    image_dir: Option<PathBuf>,
}

impl BookOptions {
    #[must_use]
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            ..Self::default()
        }
    }

    /// Title of the root fragment in the source. That fragment is re-titled
    /// to the empty string and tags equal to `alias` refer to it.
    #[must_use]
    pub fn with_root_alias(mut self, alias: impl Into<String>) -> Self {
        self.root_alias = Some(alias.into());
        self
    }

    /// Directory image files are checked against.
    #[must_use]
    pub fn with_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_dir = Some(dir.into());
        self
    }
}

/// A compiled collection of fragments with its reading order.
pub struct Book {
    fragments: Vec<Fragment>,
    index: HashMap<String, usize>,
    anchors: Vec<String>,
    root: Option<usize>,
    root_alias: Option<String>,
    walk: Traversal,
    entities: EntityRegistry,
    locale: Locale,
}

impl Book {
    /// Load every fragment of `source` and build the book.
    pub fn load(source: &dyn FragmentSource, options: &BookOptions) -> Result<Self, BookError> {
        let raw = source.load()?;
        tracing::info!(source = %source.describe(), count = raw.len(), "loaded tiddlers");
        Self::from_fragments(raw, options)
    }

    /// Compile `raw` fragments and walk their ordering lists.
    ///
    /// Fails on the first fragment that cannot be compiled (conflicting kind
    /// tags, malformed tables) or on a duplicate title. Graph inconsistencies
    /// do not fail here; see [`Book::validate`].
    pub fn from_fragments(raw: Vec<RawFragment>, options: &BookOptions) -> Result<Self, BookError> {
        let mut ctx = MarkupContext::new(options.locale);
        if let Some(dir) = &options.image_dir {
            ctx = ctx.with_image_dir(dir);
        }

        let mut fragments = Vec::with_capacity(raw.len());
        let mut index = HashMap::with_capacity(raw.len());
        for raw in raw {
            let mut fragment = Fragment::new(raw, &mut ctx)?;
            if options.root_alias.as_deref() == Some(fragment.title()) {
                fragment.rename(String::new());
            }
            if index
                .insert(fragment.title().to_owned(), fragments.len())
                .is_some()
            {
                return Err(BookError::DuplicateTitle(fragment.title().to_owned()));
            }
            fragments.push(fragment);
        }

        let root = index.get("").copied();
        let anchors = claim_anchors(
            &fragments,
            root,
            options.root_alias.as_deref(),
            ctx.ids_mut(),
        );
        let mut book = Self {
            fragments,
            index,
            anchors,
            root,
            root_alias: options.root_alias.clone(),
            walk: Traversal::default(),
            entities: ctx.entities().clone(),
            locale: options.locale,
        };
        if let Some(root) = root {
            book.walk = traverse(&book.fragments, root, |title| book.resolve(title));
        }
        tracing::debug!(
            fragments = book.fragments.len(),
            reached = book.walk.order.len(),
            "built book"
        );
        Ok(book)
    }

    /// Index of the fragment a title, tag or link target refers to.
    ///
    /// Targets taken from fragment text are XML-escaped (`Q&amp;A`) while
    /// titles and tags are not, so an escaped target is also tried unescaped.
    fn resolve(&self, title: &str) -> Option<usize> {
        self.lookup(title).or_else(|| match unescape(title) {
            Ok(Cow::Owned(raw)) => self.lookup(&raw),
            _ => None,
        })
    }

    fn lookup(&self, title: &str) -> Option<usize> {
        if self.root_alias.as_deref() == Some(title) {
            return self.root;
        }
        self.index.get(title).copied()
    }

    /// Look up a fragment by title or by the root alias.
    #[must_use]
    pub fn get(&self, title: &str) -> Option<&Fragment> {
        self.resolve(title).map(|i| &self.fragments[i])
    }

    #[must_use]
    pub fn root(&self) -> Option<&Fragment> {
        self.root.map(|i| &self.fragments[i])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    #[must_use]
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Entities used and unsupported across the whole book.
    #[must_use]
    pub fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    /// Title shown to readers: the root appears under its alias.
    #[must_use]
    pub fn display_title<'a>(&'a self, fragment: &'a Fragment) -> &'a str {
        match (fragment.is_root(), self.root_alias.as_deref()) {
            (true, Some(alias)) => alias,
            _ => fragment.title(),
        }
    }

    /// `xml:id` of a fragment, unique within the book.
    #[must_use]
    pub fn anchor(&self, fragment: &Fragment) -> &str {
        self.index
            .get(fragment.title())
            .map_or("", |&i| self.anchors[i].as_str())
    }

    /// Fragments reached from the root, in reading order.
    pub fn document_order(&self) -> impl Iterator<Item = &Fragment> {
        self.walk.order.iter().map(|&i| &self.fragments[i])
    }

    /// Children of `title` in reading order.
    pub fn children(&self, title: &str) -> impl Iterator<Item = &Fragment> {
        self.resolve(title)
            .and_then(|i| self.walk.children.get(i))
            .into_iter()
            .flatten()
            .map(|&c| &self.fragments[c])
    }

    /// Fragment that includes `title`, if it was reached.
    #[must_use]
    pub fn parent(&self, title: &str) -> Option<&Fragment> {
        let i = self.resolve(title)?;
        self.walk.parents.get(i).copied().flatten().map(|p| &self.fragments[p])
    }

    pub(crate) fn fragment_at(&self, index: usize) -> &Fragment {
        &self.fragments[index]
    }

    pub(crate) fn anchor_at(&self, index: usize) -> &str {
        &self.anchors[index]
    }

    pub(crate) fn index_of(&self, title: &str) -> Option<usize> {
        self.resolve(title)
    }

    pub(crate) fn root_index(&self) -> Option<usize> {
        self.root
    }

    pub(crate) fn child_indices(&self, index: usize) -> &[usize] {
        &self.walk.children[index]
    }

    /// Check the whole graph.
    ///
    /// Only reads the built book, so calling it twice gives the same report.
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        let mut issues = Vec::new();
        self.check_tags(&mut issues);
        self.check_reading(&mut issues);
        self.check_links(&mut issues);
        issues.extend(
            self.entities
                .unsupported()
                .into_iter()
                .map(|name| Issue::UnsupportedEntity { name }),
        );
        self.check_pictures(&mut issues);
        ValidationReport::new(issues)
    }

    fn check_tags(&self, issues: &mut Vec<Issue>) {
        let mut bad_format: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        let mut nonexistent: BTreeMap<&str, Vec<String>> = BTreeMap::new();

        for (i, fragment) in self.fragments.iter().enumerate() {
            let display = self.display_title(fragment).to_owned();
            for tag in fragment.tags() {
                if tag.starts_with(crate::kind::KIND_PREFIX) {
                    if crate::Kind::from_tag(tag).is_none() {
                        bad_format.entry(tag).or_default().push(display.clone());
                    }
                } else if self.resolve(tag).is_none() {
                    nonexistent.entry(tag).or_default().push(display.clone());
                }
            }

            let exempt = fragment.is_root()
                || fragment.kind().is_immediate()
                || self.walk.reached.get(i).copied().unwrap_or(false);
            if !exempt && fragment.parent_tags().next().is_none() {
                issues.push(Issue::Untagged { title: display });
            }
        }

        issues.extend(bad_format.into_iter().map(|(tag, titles)| Issue::BadFormatTag {
            tag: tag.to_owned(),
            titles,
        }));
        issues.extend(nonexistent.into_iter().map(|(tag, titles)| Issue::NonexistentTag {
            tag: tag.to_owned(),
            titles,
        }));
    }

    fn check_reading(&self, issues: &mut Vec<Issue>) {
        if self.root.is_none() {
            issues.push(Issue::NoRoot);
            return;
        }

        issues.extend(self.walk.issues.iter().map(|issue| match issue {
            TraversalIssue::Repeated {
                title,
                first,
                second,
            } => Issue::RepeatedInclusion {
                title: source_text(title),
                first: first.as_deref().map(|t| self.alias_or(t).to_owned()),
                second: self.alias_or(second).to_owned(),
            },
            TraversalIssue::Unknown { title, parent } => Issue::UnknownReference {
                title: source_text(title),
                parent: self.alias_or(parent).to_owned(),
            },
            TraversalIssue::LinkingImmediate { title, parent } => Issue::LinkingImmediate {
                title: source_text(title),
                parent: self.alias_or(parent).to_owned(),
            },
        }));

        for (i, fragment) in self.fragments.iter().enumerate() {
            let display = self.display_title(fragment);
            if fragment.tags().iter().any(|t| self.resolve(t) == Some(i)) {
                issues.push(Issue::SelfTag {
                    title: display.to_owned(),
                });
            }
            if fragment.is_root() || fragment.kind().is_immediate() {
                continue;
            }
            match self.walk.parents.get(i).copied().flatten() {
                None => issues.push(Issue::NotIncluded {
                    title: display.to_owned(),
                }),
                Some(parent) if !fragment.tags().iter().any(|t| self.resolve(t) == Some(parent)) => {
                    issues.push(Issue::MissingParentTag {
                        title: display.to_owned(),
                        parent: self.display_title(&self.fragments[parent]).to_owned(),
                    });
                }
                Some(_) => {}
            }
        }
    }

    fn alias_or<'a>(&'a self, title: &'a str) -> &'a str {
        if title.is_empty() {
            self.root_alias.as_deref().unwrap_or(title)
        } else {
            title
        }
    }

    fn check_links(&self, issues: &mut Vec<Issue>) {
        let mut orphans: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for fragment in &self.fragments {
            let mut seen = HashSet::new();
            for link in wiki_links(fragment.body()) {
                if self.resolve(link.target).is_none() && seen.insert(link.target) {
                    orphans
                        .entry(link.target)
                        .or_default()
                        .push(self.display_title(fragment).to_owned());
                }
            }
        }
        issues.extend(orphans.into_iter().map(|(target, titles)| Issue::OrphanLink {
            target: source_text(target),
            titles,
        }));
    }

    fn check_pictures(&self, issues: &mut Vec<Issue>) {
        for fragment in &self.fragments {
            let title = self.display_title(fragment);
            if fragment.images().is_empty() && title.starts_with(FIGURE_PREFIX) {
                issues.push(Issue::MissingFigure {
                    title: title.to_owned(),
                });
            }
            for image in fragment.images() {
                if image.title.as_deref().is_none_or(str::is_empty) {
                    issues.push(Issue::MissingImageTitle {
                        title: title.to_owned(),
                        file: image.file.clone(),
                    });
                }
                if image.missing {
                    issues.push(Issue::MissingImageFile {
                        title: title.to_owned(),
                        file: image.file.clone(),
                    });
                }
            }
        }
    }
}

/// Claim an `xml:id` for every fragment, the root first.
fn claim_anchors(
    fragments: &[Fragment],
    root: Option<usize>,
    root_alias: Option<&str>,
    ids: &mut IdRegistry,
) -> Vec<String> {
    let mut anchors = vec![String::new(); fragments.len()];
    let others = (0..fragments.len()).filter(|&i| Some(i) != root);
    for i in root.into_iter().chain(others) {
        let base = if fragments[i].is_root() {
            root_alias.map_or_else(|| "root".to_owned(), normalized_id)
        } else {
            normalized_id(fragments[i].title())
        };
        anchors[i] = ids.claim(base);
    }
    anchors
}

/// Undo the XML escaping of text taken from a fragment body.
fn source_text(text: &str) -> String {
    unescape(text).map_or_else(|_| text.to_owned(), Cow::into_owned)
}
