//! Wiki markup to DocBook body markup.
//!
//! Internal `[[target|label]]` links are left in place. They can only be
//! resolved once every fragment of the book is known.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::blocks::{DefinitionsProcessor, HeadingsProcessor, ListsProcessor};
use crate::table::wiki_tables_to_docbook;
use crate::util::normalized_id;
use crate::{IdRegistry, MarkupContext, MarkupError};

/// Bold text may hold single or double quotes, but never a run of three.
static STRONG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'''([^'](?:[^']|'[^']|''[^'])*)'''").expect("invalid strong regex")
});

static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"''((?:[^']+'?)*)''").expect("invalid emphasis regex"));

static CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<code>(.*?)</code>").expect("invalid code regex"));

static FIGURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[File:([^|\]]+)\|([^|\]]*)(?:\|(right|left))?\|thumb\|\d*px\]\]")
        .expect("invalid figure regex")
});

static EXTERNAL_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[((?:https?|ftp)://[^\s\]]+|mailto:[^\s\]]+) ([^\]]+)\]")
        .expect("invalid external link regex")
});

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\n+").expect("invalid paragraph break regex"));

/// Convert the body of one fragment from wiki markup to DocBook.
///
/// The result is a sequence of block elements: it starts with `<para>` and
/// every paragraph it opens is closed.
///
/// # Examples
///
/// ```
/// use tb_markup::wiki_to_docbook;
///
/// let xml = wiki_to_docbook("Intro", "a '''big''' cat").unwrap();
/// assert_eq!(xml, "<para>\na <emphasis role=\"strong\">big</emphasis> cat\n</para>\n");
/// ```
pub fn wiki_to_docbook(fragment: &str, wiki: &str) -> Result<String, MarkupError> {
    structure(fragment, wiki, &mut IdRegistry::default())
}

/// [`wiki_to_docbook`] with figure ids kept unique across every fragment
/// converted with `ctx`.
pub fn wiki_to_docbook_in(
    ctx: &mut MarkupContext,
    fragment: &str,
    wiki: &str,
) -> Result<String, MarkupError> {
    structure(fragment, wiki, ctx.ids_mut())
}

fn structure(fragment: &str, wiki: &str, ids: &mut IdRegistry) -> Result<String, MarkupError> {
    let text = STRONG.replace_all(wiki, "<emphasis role=\"strong\">$1</emphasis>");
    let text = EMPHASIS.replace_all(&text, "<emphasis>$1</emphasis>");
    let text = CODE.replace_all(&text, "<literal>$1</literal>");
    let text = FIGURE.replace_all(&text, |caps: &Captures<'_>| {
        figure(&caps[1], &caps[2], caps.get(3).map(|m| m.as_str()), ids)
    });
    let text = EXTERNAL_LINK.replace_all(&text, "<link xlink:href=\"$1\">$2</link>");
    let text = PARAGRAPH_BREAK.replace_all(text.trim_matches('\n'), "\n</para>\n<para>\n");

    let text = HeadingsProcessor::new().process(&text);
    let text = DefinitionsProcessor::new().process(&text);
    let text = ListsProcessor::new().process(&text);
    let text = wiki_tables_to_docbook(fragment, &text)?;

    let mut out = String::with_capacity(text.len() + 16);
    out.push_str("<para>\n");
    out.push_str(&text);
    if !text.ends_with("</section>\n") {
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("</para>\n");
    }
    Ok(out)
}

/// The figure id is the file name without `.svg`, with separators such as
/// `/` and `.` collapsed to `_`.
fn figure(file: &str, title: &str, align: Option<&str>, ids: &mut IdRegistry) -> String {
    let ext = file.rsplit_once('.').map_or("", |(_, ext)| ext);
    let id = ids.claim(normalized_id(file.strip_suffix(".svg").unwrap_or(file)));
    let format = match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "JPEG".to_owned(),
        "" => "SVG".to_owned(),
        other => other.to_ascii_uppercase(),
    };
    let align = align.map(|a| format!("align=\"{a}\" ")).unwrap_or_default();
    format!(
        "<figure xml:id=\"{id}\">\n<title>{title}</title>\n<mediaobject>\n<alt>{title}</alt>\n\
         <imageobject>\n<imagedata {align}format=\"{format}\" fileref=\"{file}\"/>\n\
         </imageobject>\n</mediaobject>\n</figure>\n"
    )
}
