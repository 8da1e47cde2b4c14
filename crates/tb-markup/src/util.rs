//! Shared helpers for identifiers and escaping.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static NON_ID_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]+").expect("invalid id regex"));

static ENTITY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^&(?:#[0-9]+|#x[0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").expect("invalid entity regex")
});

/// Turn a fragment title into an XML identifier.
///
/// Every run of characters outside `[a-zA-Z0-9]` becomes a single `_`. A
/// leading digit gets a `_` prefix so the result stays a valid `xml:id`.
///
/// # Examples
///
/// ```
/// use tb_markup::normalized_id;
///
/// assert_eq!(normalized_id("Ancient Rome: the army"), "Ancient_Rome_the_army");
/// assert_eq!(normalized_id("1914"), "_1914");
/// ```
#[must_use]
pub fn normalized_id(title: &str) -> String {
    let id = NON_ID_CHARS.replace_all(title, "_");
    match id.chars().next() {
        None => "_".to_owned(),
        Some(c) if c.is_ascii_digit() => format!("_{id}"),
        Some(_) => id.into_owned(),
    }
}

/// Identifiers already handed out in one document.
#[derive(Debug, Default, Clone)]
pub struct IdRegistry {
    used: HashSet<String>,
}

impl IdRegistry {
    /// Claim `base`, or the first free `base_2`, `base_3`, ... when taken.
    ///
    /// ```
    /// use tb_markup::IdRegistry;
    ///
    /// let mut ids = IdRegistry::default();
    /// assert_eq!(ids.claim("A_b".to_owned()), "A_b");
    /// assert_eq!(ids.claim("A_b".to_owned()), "A_b_2");
    /// ```
    pub fn claim(&mut self, base: String) -> String {
        if !self.used.contains(&base) {
            self.used.insert(base.clone());
            return base;
        }
        let id = (2..)
            .map(|n| format!("{base}_{n}"))
            .find(|candidate| !self.used.contains(candidate))
            .unwrap_or_default();
        self.used.insert(id.clone());
        id
    }

    /// Mark `id` as taken without handing it out.
    pub fn reserve(&mut self, id: impl Into<String>) {
        self.used.insert(id.into());
    }
}

/// Escape raw source text for XML while keeping entity references intact.
///
/// `<` and `>` always become `&lt;` and `&gt;`. An `&` is kept only when it
/// starts a named, decimal or hexadecimal reference.
#[must_use]
pub fn escape_source(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for (idx, c) in text.char_indices() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' if !ENTITY_PREFIX.is_match(&text[idx..]) => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape plain text for XML content and attribute values.
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_id_collapses_runs() {
        assert_eq!(normalized_id("a -- b"), "a_b");
        assert_eq!(normalized_id("Caesar's army"), "Caesar_s_army");
    }

    #[test]
    fn test_normalized_id_non_ascii() {
        assert_eq!(normalized_id("Légion"), "L_gion");
    }

    #[test]
    fn test_normalized_id_empty() {
        assert_eq!(normalized_id(""), "_");
    }

    #[test]
    fn test_id_registry_suffixes_taken_ids() {
        let mut ids = IdRegistry::default();
        ids.reserve("index");

        assert_eq!(ids.claim("index".to_owned()), "index_2");
        assert_eq!(ids.claim("index".to_owned()), "index_3");
        assert_eq!(ids.claim("index_2".to_owned()), "index_2_2");
        assert_eq!(ids.claim("other".to_owned()), "other");
    }

    #[test]
    fn test_escape_source_angle_brackets() {
        assert_eq!(escape_source("a <b> c"), "a &lt;b&gt; c");
    }

    #[test]
    fn test_escape_source_keeps_references() {
        assert_eq!(
            escape_source("&nbsp; &#160; &#xA0; & AT&T"),
            "&nbsp; &#160; &#xA0; &amp; AT&amp;T"
        );
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a \"b\" & <c>"), "a &quot;b&quot; &amp; &lt;c&gt;");
    }
}
