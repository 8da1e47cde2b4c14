//! The "sequential reading" section that orders a fragment's children.

use std::sync::LazyLock;

use regex::Regex;

use crate::Locale;
use crate::blocks::HeadingsProcessor;

static ENTRY_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[*#]+\s*").expect("invalid entry marker regex"));

static ENTRY_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\[([^\]|]*)(?:\|[^\]]*)?\]\]$").expect("invalid entry regex"));

/// Wiki text split into its body and its ordering list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordered<'a> {
    /// Text before the ordering heading.
    pub body: &'a str,
    /// Child titles in reading order, when the section is present.
    pub children: Option<Vec<String>>,
}

/// Split the ordering section off `wiki`.
///
/// The section starts at the first heading whose title is the localized
/// "sequential reading" string and runs to the next heading or the end of
/// the text. Each non-blank line names one child: list markers are dropped
/// and a `[[target]]` or `[[target|label]]` link yields its target.
///
/// # Examples
///
/// ```
/// use tb_markup::{Locale, split_ordering};
///
/// let ordered = split_ordering("intro\n== sequential reading ==\n*[[Gaul]]\n*Rome", Locale::En);
/// assert_eq!(ordered.body, "intro");
/// assert_eq!(ordered.children, Some(vec!["Gaul".to_owned(), "Rome".to_owned()]));
/// ```
pub fn split_ordering(wiki: &str, locale: Locale) -> Ordered<'_> {
    let heading = locale.sequential_reading();
    let mut offset = 0;
    let mut section: Option<(usize, Vec<String>)> = None;

    for line in wiki.split_inclusive('\n') {
        let bare = line.trim_end_matches(['\n', '\r']);
        let analyzed = HeadingsProcessor::analyze(bare);
        match section.as_mut() {
            None => {
                if analyzed.is_some_and(|(_, title)| title.trim() == heading) {
                    section = Some((offset, Vec::new()));
                }
            }
            Some(_) if analyzed.is_some() => break,
            Some((_, children)) => {
                if let Some(title) = entry_title(bare) {
                    children.push(title);
                }
            }
        }
        offset += line.len();
    }

    match section {
        Some((start, children)) => Ordered {
            body: wiki[..start].trim_end_matches(['\n', '\r']),
            children: Some(children),
        },
        None => Ordered {
            body: wiki,
            children: None,
        },
    }
}

fn entry_title(line: &str) -> Option<String> {
    let entry = ENTRY_MARKER.replace(line.trim(), "");
    let entry = entry.trim();
    if entry.is_empty() {
        return None;
    }
    let title = ENTRY_LINK
        .captures(entry)
        .and_then(|caps| caps.get(1))
        .map_or(entry, |m| m.as_str());
    Some(title.trim().to_owned())
}
