//! Output assembly: DocBook, single wiki file, one wiki file per fragment.
//!
//! All three walk the reading tree with an explicit stack of open/close
//! steps, so output order is the traversal order.

use quick_xml::escape::escape;
use serde::Serialize;
use tb_markup::{IdRegistry, WikiLink, replace_links};

use crate::{Book, BookError, BookInfo, Kind};

const DOCBOOK_NAMESPACES: &str = concat!(
    "xmlns=\"http://docbook.org/ns/docbook\" version=\"5.0\"\n",
    "     xmlns:xlink=\"http://www.w3.org/1999/xlink\"\n",
    "     xmlns:svg=\"http://www.w3.org/2000/svg\"\n",
    "     xmlns:html=\"http://www.w3.org/1999/xhtml\"\n",
    "     xmlns:db=\"http://docbook.org/ns/docbook\"",
);

/// File stem of the root fragment in a multi-file rendering.
const ROOT_FILE: &str = "index";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Open(usize),
    Close(usize),
}

/// One fragment of a multi-file wiki rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WikiFile {
    /// Display title.
    pub title: String,
    pub file_name: String,
    pub content: String,
}

/// Multi-file wiki rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WikiBundle {
    /// Files in reading order.
    pub files: Vec<WikiFile>,
    /// Display titles in reading order, one per line.
    pub manifest: String,
}

impl Book {
    fn steps(&self) -> Result<Vec<Step>, BookError> {
        let root = self.root_index().ok_or(BookError::NoRoot)?;
        let mut steps = Vec::with_capacity(self.len() * 2);
        let mut stack = vec![Step::Open(root)];
        while let Some(step) = stack.pop() {
            steps.push(step);
            if let Step::Open(index) = step {
                stack.push(Step::Close(index));
                stack.extend(self.child_indices(index).iter().rev().map(|&c| Step::Open(c)));
            }
        }
        Ok(steps)
    }

    /// Render the whole book as a DocBook 5 document.
    ///
    /// Internal links become cross-references and immediate fragments are
    /// inlined where they are linked.
    pub fn render_docbook(&self, info: &BookInfo) -> Result<String, BookError> {
        let steps = self.steps()?;

        let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        if let Some(declarations) = self.entities().declarations() {
            out.push_str("<!DOCTYPE book [\n");
            out.push_str(&declarations);
            out.push_str("]>\n");
        }
        out.push_str(&format!(
            "<book xml:lang=\"{}\" {DOCBOOK_NAMESPACES}>\n",
            self.locale().code()
        ));
        info.write_docbook(&mut out);

        for step in steps {
            match step {
                Step::Open(index) => self.open_docbook(index, info, &mut out),
                Step::Close(index) => {
                    let fragment = self.fragment_at(index);
                    if !fragment.is_root() {
                        out.push_str(&format!("</{}>\n", fragment.kind().element_name()));
                    }
                }
            }
        }
        out.push_str("</book>\n");

        tracing::info!(bytes = out.len(), "rendered docbook");
        Ok(out)
    }

    fn open_docbook(&self, index: usize, info: &BookInfo, out: &mut String) {
        let fragment = self.fragment_at(index);
        let body = self.resolved_docbook(index, &mut vec![index]);
        let id = self.anchor_at(index);

        if fragment.is_root() {
            if fragment.body().trim().is_empty() {
                return;
            }
            out.push_str(&format!("<preface xml:id=\"{id}\">\n"));
            if !info.title.trim().is_empty() {
                out.push_str(&format!("<title>{}</title>\n", escape(info.title.as_str())));
            }
            out.push_str(&body);
            out.push_str("</preface>\n");
            return;
        }

        let kind = fragment.kind();
        out.push_str(&format!(
            "<{} xml:id=\"{id}\">\n<title>{}</title>\n",
            kind.element_name(),
            escape(fragment.title())
        ));
        if kind == Kind::Part {
            out.push_str("<partintro>\n");
            out.push_str(&body);
            out.push_str("</partintro>\n");
        } else {
            out.push_str(&body);
        }
    }

    /// DocBook body of a fragment with its links resolved.
    ///
    /// `inlining` holds the fragments being expanded, outermost first.
    fn resolved_docbook(&self, index: usize, inlining: &mut Vec<usize>) -> String {
        let fragment = self.fragment_at(index);
        replace_links(fragment.docbook(), |link| {
            self.resolve_link(fragment.title(), link, inlining)
        })
    }

    fn resolve_link(&self, from: &str, link: WikiLink<'_>, inlining: &mut Vec<usize>) -> String {
        let Some(target) = self.index_of(link.target) else {
            tracing::warn!(from, target = link.target, "link to unknown tiddler");
            return format!(
                "<emphasis role=\"strong\">[unknown tiddler: {}]</emphasis>",
                link.target
            );
        };

        let fragment = self.fragment_at(target);
        let kind = fragment.kind();
        if !kind.is_immediate() {
            return format!(
                "<link linkend=\"{}\">{}</link>",
                self.anchor_at(target),
                link.label
            );
        }

        if inlining.contains(&target) {
            tracing::warn!(from, target = link.target, "recursive inclusion of immediate tiddler");
            return format!(
                "<emphasis role=\"strong\">[recursive inclusion: {}]</emphasis>",
                link.target
            );
        }
        inlining.push(target);
        let body = self.resolved_docbook(target, inlining);
        inlining.pop();

        match kind {
            Kind::Footnote => format!("<footnote>\n{body}</footnote>"),
            _ => format!(
                "\n</para>\n<{element}>\n<title>{}</title>\n{body}</{element}>\n<para>\n",
                escape(fragment.title()),
                element = kind.element_name(),
            ),
        }
    }

    /// Render the book as one wiki file. The root gets no heading.
    pub fn render_wiki(&self) -> Result<String, BookError> {
        let mut out = String::new();
        for step in self.steps()? {
            if let Step::Open(index) = step {
                out.push_str(&self.wiki_page(index));
            }
        }
        Ok(out)
    }

    /// Render one wiki file per fragment, plus a manifest of titles.
    ///
    /// File names are unique: the root is `index.wiki` and every other
    /// fragment is named after its anchor, suffixed when that name is taken.
    pub fn render_wiki_files(&self) -> Result<WikiBundle, BookError> {
        let mut bundle = WikiBundle::default();
        let mut stems = IdRegistry::default();
        stems.reserve(ROOT_FILE);
        for step in self.steps()? {
            let Step::Open(index) = step else { continue };
            let fragment = self.fragment_at(index);
            let title = self.display_title(fragment).to_owned();
            let stem = if fragment.is_root() {
                ROOT_FILE.to_owned()
            } else {
                stems.claim(self.anchor_at(index).to_owned())
            };
            let file_name = format!("{stem}.wiki");
            bundle.manifest.push_str(&title);
            bundle.manifest.push('\n');
            bundle.files.push(WikiFile {
                title,
                file_name,
                content: self.wiki_page(index),
            });
        }
        tracing::info!(files = bundle.files.len(), "rendered wiki files");
        Ok(bundle)
    }

    fn wiki_page(&self, index: usize) -> String {
        let fragment = self.fragment_at(index);
        let mut page = String::with_capacity(fragment.body().len() + 32);
        if !fragment.is_root() {
            page.push_str(&format!("== {} ==\n", fragment.title()));
        }
        page.push_str(fragment.body());
        page.push('\n');
        page
    }
}
