//! Internal wiki links.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^\]|]+)(?:\|([^\]]+))?\]\]").expect("invalid internal link regex")
});

/// Prefix of image references, which are not fragment links.
const FILE_PREFIX: &str = "File:";

/// An internal `[[target]]` or `[[target|label]]` link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WikiLink<'a> {
    pub target: &'a str,
    pub label: &'a str,
}

impl<'a> WikiLink<'a> {
    fn from_captures(caps: &Captures<'a>) -> Option<Self> {
        let target = caps.get(1)?.as_str();
        if target.starts_with(FILE_PREFIX) {
            return None;
        }
        let label = caps.get(2).map_or(target, |m| m.as_str());
        Some(Self {
            target: target.trim(),
            label,
        })
    }
}

/// Iterate the fragment links in `text`, skipping image references.
pub fn wiki_links(text: &str) -> impl Iterator<Item = WikiLink<'_>> {
    LINK.captures_iter(text)
        .filter_map(|caps| WikiLink::from_captures(&caps))
}

/// Replace every fragment link in `text` with the output of `resolve`.
pub fn replace_links<F>(text: &str, mut resolve: F) -> String
where
    F: FnMut(WikiLink<'_>) -> String,
{
    LINK.replace_all(text, |caps: &Captures<'_>| match WikiLink::from_captures(caps) {
        Some(link) => resolve(link),
        None => caps[0].to_owned(),
    })
    .into_owned()
}
