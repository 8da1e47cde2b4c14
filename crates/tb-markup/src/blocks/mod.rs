//! Line-oriented structuring of wiki block markup into DocBook.
//!
//! Each processor is a small state machine fed one line at a time. They
//! run in sequence over the same text: headings, then definitions, then
//! lists. Every processor leaves the lines it does not own untouched.

mod definitions;
mod headings;
mod lists;

pub use definitions::DefinitionsProcessor;
pub use headings::HeadingsProcessor;
pub use lists::ListsProcessor;

/// Make sure `out` ends on a line boundary before emitting markup.
fn ensure_newline(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}
