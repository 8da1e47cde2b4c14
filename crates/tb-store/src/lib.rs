//! Tiddler sources for TiddlyBook.
//!
//! A book is compiled from a flat collection of tiddlers, each with a title,
//! a tag list and a body. This crate provides a [`FragmentSource`] trait that
//! hides where that collection comes from:
//!
//! - [`TidDirectory`] reads a TiddlyWiki folder of `.tid` files
//! - [`JsonExport`] reads a TiddlyWiki JSON export
//! - [`MockSource`] serves fragments from memory (behind the `mock` feature)
//!
//! # Example
//!
//! ```no_run
//! use tb_store::{FragmentSource, TidDirectory};
//!
//! let source = TidDirectory::new("wiki/tiddlers");
//! for fragment in source.load()? {
//!     println!("{}: {:?}", fragment.title, fragment.tags);
//! }
//! # Ok::<(), tb_store::StoreError>(())
//! ```

mod json;
#[cfg(feature = "mock")]
mod mock;
mod source;
mod tags;
mod tid;

pub use json::JsonExport;
#[cfg(feature = "mock")]
pub use mock::MockSource;
pub use source::{FragmentSource, RawFragment, StoreError, StoreErrorKind};
pub use tags::{format_tag_list, parse_tag_list};
pub use tid::TidDirectory;

/// Title prefix of TiddlyWiki system tiddlers, which never belong to a book.
pub(crate) const SYSTEM_PREFIX: &str = "$:/";
