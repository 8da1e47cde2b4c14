//! TiddlyWiki to wiki markup rewriting.
//!
//! The rewrite is an ordered pipeline of pattern passes over the whole
//! fragment text. Order matters: emphasis is rewritten before links so that
//! `//` inside link targets is not confused with italics, and camel-case
//! linking runs last so it can skip spans produced by earlier passes.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::table::translate_tiddly_tables;
use crate::util::escape_source;
use crate::{MarkupContext, MarkupError};

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"''((?:[^']+'?)*)''").expect("invalid bold regex"));

// `//` directly after `:` belongs to a URL scheme
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|[^:])//([^/]*[^/:])//").expect("invalid italic regex"));

static LABELLED_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^|\]]+)\|([^\]]+)\]\]").expect("invalid labelled link regex")
});

static EXTERNAL_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[((?:https?|ftp|mailto):[^|\]]+)\|([^\]]+)\]\]")
        .expect("invalid external link regex")
});

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(!{1,4}) *(.*?) *$").expect("invalid heading regex"));

static NOWIKI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&lt;/?nowiki&gt;").expect("invalid nowiki regex"));

static CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\{(.*?)\}\}\}|`([^`\n]*)`").expect("invalid inline code regex")
});

static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&([A-Za-z][A-Za-z0-9]*);").expect("invalid entity regex"));

static IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(&lt;|&gt;)?img\[([^\]]*)\]\]").expect("invalid image regex")
});

/// Spans camel-case linking must leave alone.
static PROTECTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\[\[[^\]]*\]\]|\[(?:https?|ftp|mailto):[^\]]*\]|<code>.*?</code>|&[A-Za-z][A-Za-z0-9]*;",
    )
    .expect("invalid protected span regex")
});

static CAMEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(^|[^A-Za-z0-9])(~?)([A-Z][0-9_-]*[a-z][a-z0-9_-]*[A-Z][A-Za-z0-9_-]*|[A-Z][0-9_-]*[A-Z]+[A-Z0-9_-]*[a-z][A-Za-z0-9_-]*)",
    )
    .expect("invalid camel case regex")
});

/// Repairs for links nested by overlapping rewrites.
static CORRECTIONS: LazyLock<[(Regex, &'static str); 4]> = LazyLock::new(|| {
    [
        (
            Regex::new(r"\[\[(\[\[[A-Z][^\]]*)\]\]").expect("invalid correction regex"),
            "$1",
        ),
        (
            Regex::new(r"\[\[([^\]|]+)\|\[\[([A-Z][^\]]*)\]{4}").expect("invalid correction regex"),
            "[[$1|$2]]",
        ),
        (
            Regex::new(r"\[((?:https?|ftp|mailto):[^\[]+)\[\[([^\]]+)\]\]([^\]]*)\]")
                .expect("invalid correction regex"),
            "[$1$2$3]",
        ),
        (
            Regex::new(r"(\[(?:https?|ftp|mailto):)''").expect("invalid correction regex"),
            "$1//",
        ),
    ]
});

/// An image reference found in a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ImageRef {
    /// Path of the image, relative to the image directory.
    pub file: String,
    /// Caption, when one was given.
    pub title: Option<String>,
    /// Set when an image directory is configured and the file is not in it.
    pub missing: bool,
}

/// Result of rewriting one fragment.
#[derive(Debug, Clone, Default)]
pub struct Rewritten {
    /// Intermediate wiki markup.
    pub text: String,
    /// Images referenced by the fragment, in order.
    pub images: Vec<ImageRef>,
}

/// Rewrite TiddlyWiki source into intermediate wiki markup.
///
/// Entity references are recorded in the context's registry. Unknown
/// entities are passed through unchanged and reported later.
pub fn rewrite(
    fragment: &str,
    source: &str,
    ctx: &mut MarkupContext,
) -> Result<Rewritten, MarkupError> {
    let text = escape_source(source);
    let text = balance_quotes(&text);
    let text = BOLD.replace_all(&text, "'''$1'''");
    let text = ITALIC.replace_all(&text, "$1''$2''");
    let text = LABELLED_LINK.replace_all(&text, "[[$2|$1]]");
    let text = EXTERNAL_LINK.replace_all(&text, "[$1 $2]");
    let text = HEADING.replace_all(&text, |caps: &Captures<'_>| {
        let marks = "=".repeat(caps[1].len());
        format!("{marks} {} {marks}", &caps[2])
    });
    let text = NOWIKI.replace_all(&text, "");
    let text = CODE.replace_all(&text, |caps: &Captures<'_>| {
        let code = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        format!("<code>{code}</code>")
    });

    for caps in ENTITY.captures_iter(&text) {
        if !ctx.entities_mut().register(&caps[1]) {
            tracing::debug!(fragment, entity = &caps[1], "unsupported entity");
        }
    }

    let mut images = Vec::new();
    let text = IMAGE.replace_all(&text, |caps: &Captures<'_>| {
        let image = image_ref(&caps[2], ctx);
        let align = match caps.get(1).map(|m| m.as_str()) {
            Some("&gt;") => "|right",
            Some(_) => "|left",
            None => "",
        };
        let out = format!(
            "[[File:{}|{}{align}|thumb|300px]]",
            image.file,
            image.title.as_deref().unwrap_or_default()
        );
        images.push(image);
        out
    });

    let text = link_camel_case(&text);
    let text = apply_corrections(text);
    let text = translate_tiddly_tables(fragment, &text)?;

    Ok(Rewritten { text, images })
}

fn image_ref(inner: &str, ctx: &MarkupContext) -> ImageRef {
    let (title, file) = match inner.split_once('|') {
        Some((title, file)) => (Some(title.trim().to_owned()), file.trim().to_owned()),
        None => (None, inner.trim().to_owned()),
    };
    let missing = ctx
        .image_dir()
        .is_some_and(|dir| !dir.join(&file).is_file());
    ImageRef {
        file,
        title,
        missing,
    }
}

/// Close an unmatched `''` so emphasis cannot run to the end of the text.
///
/// With an odd number of `''` delimiters, a closing `''` is inserted before
/// the newline that follows the last delimiter, or appended at the end.
pub fn balance_quotes(text: &str) -> String {
    let mut count = 0;
    let mut last_end = 0;
    let mut search = 0;
    while let Some(pos) = text[search..].find("''") {
        count += 1;
        last_end = search + pos + 2;
        search = last_end;
    }
    if count % 2 == 0 {
        return text.to_owned();
    }
    let insert_at = text[last_end..]
        .find('\n')
        .map_or(text.len(), |pos| last_end + pos);
    let mut out = String::with_capacity(text.len() + 2);
    out.push_str(&text[..insert_at]);
    out.push_str("''");
    out.push_str(&text[insert_at..]);
    out
}

/// Link camel-case words outside links, code and entity references.
///
/// A `~` prefix suppresses the link and is dropped.
fn link_camel_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    let mut last = 0;
    for span in PROTECTED.find_iter(text) {
        out.push_str(&link_camel_gap(&text[last..span.start()]));
        out.push_str(span.as_str());
        last = span.end();
    }
    out.push_str(&link_camel_gap(&text[last..]));
    out
}

fn link_camel_gap(gap: &str) -> String {
    CAMEL
        .replace_all(gap, |caps: &Captures<'_>| {
            if caps[2].is_empty() {
                format!("{}[[{}]]", &caps[1], &caps[3])
            } else {
                format!("{}{}", &caps[1], &caps[3])
            }
        })
        .into_owned()
}

/// Apply the link repairs until nothing changes.
///
/// Every repair shortens the text or removes a `''`, so the number of
/// rounds is bounded by the text length.
fn apply_corrections(mut text: String) -> String {
    for _ in 0..=text.len() {
        let mut changed = false;
        for (regex, replacement) in CORRECTIONS.iter() {
            let next = regex.replace_all(&text, *replacement);
            if next != text {
                text = next.into_owned();
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    fn wiki(source: &str) -> String {
        let mut ctx = MarkupContext::default();
        rewrite("test", source, &mut ctx).unwrap().text
    }

    #[test]
    fn test_emphasis() {
        assert_eq!(
            wiki("a ''big'' cat and a //small// dog in a //''basket''// of ''//yellow//'' straw"),
            "a '''big''' cat and a ''small'' dog in a '''''basket''''' of '''''yellow''''' straw"
        );
    }

    #[test]
    fn test_bold_before_apostrophe() {
        assert_eq!(
            wiki("''A'''s front edge is next to ''B'''s side."),
            "'''A''''s front edge is next to '''B''''s side."
        );
    }

    #[test]
    fn test_emphasis_in_list() {
        assert_eq!(
            wiki("two pets:\n*a very ''smart'' cat;\n*a '''Rex''' dog, //the cat's dog// actually."),
            "two pets:\n*a very '''smart''' cat;\n*a ''''Rex'''' dog, ''the cat's dog'' actually."
        );
    }

    #[test]
    fn test_italic_ignores_urls() {
        assert_eq!(
            wiki("see http://a.org and http://b.org"),
            "see http://a.org and http://b.org"
        );
    }

    #[test]
    fn test_balance_quotes_closes_before_newline() {
        assert_eq!(balance_quotes("a ''b\nc"), "a ''b''\nc");
    }

    #[test]
    fn test_balance_quotes_appends_at_end() {
        assert_eq!(balance_quotes("x ''y"), "x ''y''");
    }

    #[test]
    fn test_balance_quotes_even_is_untouched() {
        assert_eq!(balance_quotes("''a'' b"), "''a'' b");
    }

    #[test]
    fn test_balance_quotes_long_input() {
        let text = format!("''{}", "ab".repeat(50_000));

        let balanced = balance_quotes(&text);

        assert!(balanced.ends_with("''"));
        assert_eq!(balanced.len(), text.len() + 2);
    }

    #[test]
    fn test_labelled_link_swapped() {
        assert_eq!(wiki("[[the army|Roman army]]"), "[[Roman army|the army]]");
    }

    #[test]
    fn test_external_link() {
        assert_eq!(
            wiki("[[the site|http://example.org/a]]"),
            "[http://example.org/a the site]"
        );
    }

    #[test]
    fn test_headings() {
        assert_eq!(
            wiki("!Top\n!!Second\n!!!Third\n!!!! Fourth"),
            "= Top =\n== Second ==\n=== Third ===\n==== Fourth ===="
        );
    }

    #[test]
    fn test_escapes_markup_and_removes_nowiki() {
        assert_eq!(wiki("a <b> -- <nowiki>--</nowiki>"), "a &lt;b&gt; -- --");
    }

    #[test]
    fn test_inline_code() {
        assert_eq!(
            wiki("run {{{make all}}} or `cargo build`"),
            "run <code>make all</code> or <code>cargo build</code>"
        );
    }

    #[test]
    fn test_camel_case_links() {
        assert_eq!(
            wiki("the HeavyChariot and HCh against PIGs"),
            "the [[HeavyChariot]] and [[HCh]] against [[PIGs]]"
        );
    }

    #[test]
    fn test_camel_case_escaped() {
        assert_eq!(wiki("a ~JavaScript engine"), "a JavaScript engine");
    }

    #[test]
    fn test_camel_case_skips_protected_spans() {
        assert_eq!(
            wiki("[[HeavyChariot|Heavy Chariot]] and [[PIGs]] in {{{FooBar}}} &OElig;"),
            "[[Heavy Chariot|HeavyChariot]] and [[PIGs]] in <code>FooBar</code> &OElig;"
        );
    }

    #[test]
    fn test_camel_case_inside_word_is_not_linked() {
        assert_eq!(wiki("an iPhoneX"), "an iPhoneX");
    }

    #[test]
    fn test_corrections_unnest_links() {
        assert_eq!(
            apply_corrections("[[[[HCh]]|Heavy Chariot]]".to_owned()),
            "[[HCh|Heavy Chariot]]"
        );
        assert_eq!(
            apply_corrections("[[PIG|[[PIGs]]]]".to_owned()),
            "[[PIG|PIGs]]"
        );
        assert_eq!(
            apply_corrections("[http://x.org/[[FooBar]]/y label]".to_owned()),
            "[http://x.org/FooBar/y label]"
        );
        assert_eq!(
            apply_corrections("[http:''example.org'' x]".to_owned()),
            "[http://example.org'' x]"
        );
    }

    #[test]
    fn test_entities_recorded() {
        let mut ctx = MarkupContext::default();

        let out = rewrite("test", "caf&eacute; &bogus; &amp;", &mut ctx).unwrap();

        assert_eq!(out.text, "caf&eacute; &bogus; &amp;");
        assert_eq!(ctx.entities().used().get("eacute"), Some(&233));
        assert_eq!(ctx.entities().unsupported(), vec!["bogus"]);
    }

    #[test]
    fn test_images() {
        let mut ctx = MarkupContext::default();

        let out = rewrite(
            "test",
            "[img[a map|map.svg]] [>img[plan.png]] [<img[x|y.svg]]",
            &mut ctx,
        )
        .unwrap();

        assert_eq!(
            out.text,
            "[[File:map.svg|a map|thumb|300px]] [[File:plan.png||right|thumb|300px]] [[File:y.svg|x|left|thumb|300px]]"
        );
        assert_eq!(out.images.len(), 3);
        assert_eq!(out.images[1].title, None);
        assert!(out.images.iter().all(|i| !i.missing));
    }

    #[test]
    fn test_images_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("here.svg"), "<svg/>").unwrap();
        let mut ctx = MarkupContext::default().with_image_dir(dir.path());

        let out = rewrite("test", "[img[a|here.svg]] [img[b|gone.svg]]", &mut ctx).unwrap();

        assert!(!out.images[0].missing);
        assert!(out.images[1].missing);
    }

    #[test]
    fn test_tables_translated_last() {
        assert_eq!(
            wiki("|''a''|HeavyChariot|"),
            "{| class=\"wikitable\"\n|'''a'''\n|[[HeavyChariot]]\n|}\n"
        );
    }

    #[test]
    fn test_table_error_propagates() {
        let mut ctx = MarkupContext::default();

        let err = rewrite("Armies", "|a|\n|oops", &mut ctx).unwrap_err();

        assert!(err.to_string().contains("Armies"));
    }
}
