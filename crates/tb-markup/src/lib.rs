//! TiddlyWiki markup rewriting and DocBook structuring.
//!
//! Fragment text goes through two stages:
//!
//! 1. [`rewrite`] turns TiddlyWiki source into an intermediate wiki markup
//!    (MediaWiki-like emphasis, headings, links, images and tables).
//! 2. [`wiki_to_docbook`] turns that wiki markup into DocBook block markup,
//!    leaving internal links for the caller to resolve with [`replace_links`].
//!
//! Everything that must be collected across a whole book, such as the named
//! entities in use, lives in a [`MarkupContext`] passed to every call.
//!
//! # Example
//!
//! ```
//! use tb_markup::{MarkupContext, Locale, rewrite, wiki_to_docbook};
//!
//! let mut ctx = MarkupContext::new(Locale::En);
//! let wiki = rewrite("Intro", "a ''big'' cat&nbsp;!", &mut ctx).unwrap();
//! assert_eq!(wiki.text, "a '''big''' cat&nbsp;!");
//!
//! let xml = wiki_to_docbook("Intro", &wiki.text).unwrap();
//! assert!(xml.contains("<emphasis role=\"strong\">big</emphasis>"));
//! assert_eq!(ctx.entities().used().get("nbsp"), Some(&160));
//! ```

pub mod blocks;
mod context;
mod docbook;
pub mod entities;
mod error;
mod inline;
mod links;
mod locale;
mod ordering;
pub mod table;
mod util;

pub use context::MarkupContext;
pub use docbook::{wiki_to_docbook, wiki_to_docbook_in};
pub use entities::EntityRegistry;
pub use error::MarkupError;
pub use inline::{ImageRef, Rewritten, balance_quotes, rewrite};
pub use links::{WikiLink, replace_links, wiki_links};
pub use locale::Locale;
pub use ordering::{Ordered, split_ordering};
pub use util::{IdRegistry, escape_source, escape_text, normalized_id};
