//! Document graph, validation and rendering for TiddlyBook.
//!
//! This crate provides:
//! - [`Book`]: compiled tiddlers with the reading order built from their
//!   "sequential reading" lists
//! - [`ValidationReport`]: every tagging, ordering, link, entity and picture
//!   problem, grouped by [`Category`]
//! - DocBook and wiki renderings of a validated book
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use tb_book::{Book, BookInfo, BookOptions};
//! use tb_markup::Locale;
//! use tb_store::TidDirectory;
//!
//! let source = TidDirectory::new("tiddlers");
//! let options = BookOptions::new(Locale::En).with_root_alias("Home");
//! let book = Book::load(&source, &options)?;
//!
//! let report = book.validate();
//! if !report.has_fatal() {
//!     let info = BookInfo::new("Field Manual").or_harvested(&book);
//!     let xml = book.render_docbook(&info)?;
//! }
//! # Ok(())
//! # }
//! ```

mod book;
mod error;
mod fragment;
mod info;
mod kind;
mod render;
mod report;
mod traversal;

pub use book::{Book, BookOptions};
pub use error::BookError;
pub use fragment::Fragment;
pub use info::{Author, BookInfo};
pub use kind::Kind;
pub use render::{WikiBundle, WikiFile};
pub use report::{Category, Issue, Severity, ValidationReport};

#[cfg(test)]
mod tests {
    static_assertions::assert_impl_all!(super::Book: Send, Sync);
}
