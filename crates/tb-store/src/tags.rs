//! TiddlyWiki tag list syntax.
//!
//! Tags are separated by whitespace. A tag containing spaces is wrapped in
//! double brackets: `[[Ancient Rome]] army :chapter`.

/// Parse a tag list field.
///
/// # Examples
///
/// ```
/// use tb_store::parse_tag_list;
///
/// assert_eq!(
///     parse_tag_list("[[Ancient Rome]] army :chapter"),
///     vec!["Ancient Rome", "army", ":chapter"]
/// );
/// ```
#[must_use]
pub fn parse_tag_list(field: &str) -> Vec<String> {
    let mut tags = Vec::new();
    let mut rest = field.trim_start();
    while !rest.is_empty() {
        if let Some(inner) = rest.strip_prefix("[[") {
            let (tag, after) = inner.split_once("]]").unwrap_or((inner, ""));
            push_tag(&mut tags, tag);
            rest = after;
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            push_tag(&mut tags, &rest[..end]);
            rest = &rest[end..];
        }
        rest = rest.trim_start();
    }
    tags
}

fn push_tag(tags: &mut Vec<String>, tag: &str) {
    let tag = tag.trim();
    if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
        tags.push(tag.to_owned());
    }
}

/// Format tags back into a tag list field.
#[must_use]
pub fn format_tag_list<S: AsRef<str>>(tags: &[S]) -> String {
    tags.iter()
        .map(|t| {
            let t = t.as_ref();
            if t.contains(char::is_whitespace) {
                format!("[[{t}]]")
            } else {
                t.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_empty() {
        assert!(parse_tag_list("  ").is_empty());
    }

    #[test]
    fn test_parse_deduplicates() {
        assert_eq!(parse_tag_list("a b a [[a]]"), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_unterminated_brackets() {
        assert_eq!(parse_tag_list("x [[open tag"), vec!["x", "open tag"]);
    }

    #[test]
    fn test_format() {
        assert_eq!(
            format_tag_list(&["Ancient Rome", ":note"]),
            "[[Ancient Rome]] :note"
        );
    }
}
