//! Wiki headings to nested `<section>` elements.

use std::sync::LazyLock;

use regex::Regex;

use super::ensure_newline;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(=+) +(.*[^= ]) +=+$").expect("invalid heading regex"));

/// Deepest heading level. Deeper headings are folded into it.
const MAX_DEPTH: usize = 4;

/// Turns heading lines into sections.
///
/// The text is assumed to sit inside an open `<para>`. Every heading closes
/// the current paragraph, closes sections at the same depth or deeper, and
/// opens a new section with a fresh paragraph. Input that ends inside a
/// section is closed completely, so the output ends with `</section>\n`
/// exactly when it contained a heading.
#[derive(Debug, Default)]
pub struct HeadingsProcessor {
    stack: Vec<usize>,
}

impl HeadingsProcessor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a heading line into its depth and title.
    ///
    /// Returns `None` for lines that are not headings, including headings with
    /// no space between the markers and the title.
    ///
    /// # Examples
    ///
    /// ```
    /// use tb_markup::blocks::HeadingsProcessor;
    ///
    /// assert_eq!(HeadingsProcessor::analyze("=== foo  ==="), Some((3, "foo")));
    /// assert_eq!(HeadingsProcessor::analyze("====pay attention===="), None);
    /// ```
    #[must_use]
    pub fn analyze(line: &str) -> Option<(usize, &str)> {
        let caps = HEADING.captures(line)?;
        let depth = caps.get(1)?.as_str().len().min(MAX_DEPTH);
        Some((depth, caps.get(2)?.as_str()))
    }

    #[must_use]
    pub fn process(mut self, input: &str) -> String {
        let mut out = String::with_capacity(input.len() + 64);
        for line in input.split_inclusive('\n') {
            match Self::analyze(line.trim_end_matches('\n')) {
                Some((depth, title)) => self.open(&mut out, depth, title),
                None => out.push_str(line),
            }
        }
        if !self.stack.is_empty() {
            ensure_newline(&mut out);
            out.push_str("</para>\n");
            for _ in self.stack.drain(..) {
                out.push_str("</section>\n");
            }
        }
        out
    }

    fn open(&mut self, out: &mut String, depth: usize, title: &str) {
        ensure_newline(out);
        out.push_str("</para>\n");
        while self.stack.last().is_some_and(|top| *top >= depth) {
            self.stack.pop();
            out.push_str("</section>\n");
        }
        self.stack.push(depth);
        out.push_str("<section>\n<title>");
        out.push_str(title);
        out.push_str("</title>\n<para>\n");
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_analyze() {
        assert_eq!(HeadingsProcessor::analyze("=  foo bar ="), Some((1, "foo bar")));
        assert_eq!(
            HeadingsProcessor::analyze("== got a bike =="),
            Some((2, "got a bike"))
        );
        assert_eq!(HeadingsProcessor::analyze("plain text"), None);
    }

    #[test]
    fn test_analyze_caps_depth() {
        assert_eq!(HeadingsProcessor::analyze("====== deep ======"), Some((4, "deep")));
    }

    #[test]
    fn test_single_heading() {
        assert_eq!(
            HeadingsProcessor::new().process("= very easy =\nmuch simple"),
            "</para>\n<section>\n<title>very easy</title>\n<para>\nmuch simple\n</para>\n</section>\n"
        );
    }

    #[test]
    fn test_sibling_headings() {
        assert_eq!(
            HeadingsProcessor::new().process("== two things ==\nto be done\n== two mysteries ==\nand some fun"),
            "</para>\n<section>\n<title>two things</title>\n<para>\nto be done\n</para>\n</section>\n\
             <section>\n<title>two mysteries</title>\n<para>\nand some fun\n</para>\n</section>\n"
        );
    }

    #[test]
    fn test_nested_then_shallower() {
        let out = HeadingsProcessor::new().process(
            "== members ==\n=== by right ===\n==== for life ====\nAlbert\n== guests ==\nRobert",
        );

        assert_eq!(
            out,
            "</para>\n<section>\n<title>members</title>\n<para>\n\
             </para>\n<section>\n<title>by right</title>\n<para>\n\
             </para>\n<section>\n<title>for life</title>\n<para>\nAlbert\n\
             </para>\n</section>\n</section>\n</section>\n\
             <section>\n<title>guests</title>\n<para>\nRobert\n</para>\n</section>\n"
        );
    }

    #[test]
    fn test_sections_balanced() {
        let out = HeadingsProcessor::new()
            .process("intro\n= a =\n=== b ===\n== c ==\nx\n==== d ====\n= e =\n");

        assert_eq!(out.matches("<section>").count(), 5);
        assert_eq!(out.matches("</section>").count(), 5);
        assert!(out.starts_with("intro\n</para>\n"));
        assert!(out.ends_with("</section>\n"));
    }

    #[test]
    fn test_no_headings_is_untouched() {
        assert_eq!(HeadingsProcessor::new().process("a\nb"), "a\nb");
    }
}
