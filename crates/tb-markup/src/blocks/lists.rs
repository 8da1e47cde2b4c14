//! Wiki `*` and `#` lists to DocBook lists.

use std::sync::LazyLock;

use regex::Regex;

use super::ensure_newline;

static ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([#*]+) *(.*)$").expect("invalid list item regex"));

/// Turns list item lines into nested `<itemizedlist>`/`<orderedlist>`.
///
/// The marker length gives the depth and its last character the list type
/// (`#` ordered, `*` itemized). A nested list opens inside the paragraph of
/// the enclosing item. Any line that is not an item closes every open list.
#[derive(Debug, Default)]
pub struct ListsProcessor {
    stack: Vec<String>,
}

impl ListsProcessor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Split an item line into its marker and trimmed text.
    ///
    /// # Examples
    ///
    /// ```
    /// use tb_markup::blocks::ListsProcessor;
    ///
    /// assert_eq!(ListsProcessor::analyze("##* three or more "), Some(("##*", "three or more")));
    /// assert_eq!(ListsProcessor::analyze("no item"), None);
    /// ```
    #[must_use]
    pub fn analyze(line: &str) -> Option<(&str, &str)> {
        let caps = ITEM.captures(line)?;
        Some((caps.get(1)?.as_str(), caps.get(2)?.as_str().trim()))
    }

    #[must_use]
    pub fn process(mut self, input: &str) -> String {
        let mut out = String::with_capacity(input.len() + 64);
        for line in input.split_inclusive('\n') {
            if let Some((marker, item)) = Self::analyze(line.trim_end_matches('\n')) {
                self.item(&mut out, marker, item);
            } else {
                if !self.stack.is_empty() {
                    self.close_all(&mut out);
                }
                out.push_str(line);
            }
        }
        if !self.stack.is_empty() {
            self.close_all(&mut out);
        }
        out
    }

    fn item(&mut self, out: &mut String, marker: &str, text: &str) {
        ensure_newline(out);
        while let Some(top) = self.stack.last() {
            let deeper = top.len() > marker.len();
            let other_type = top.len() == marker.len() && list_tag(top) != list_tag(marker);
            if !(deeper || other_type) {
                break;
            }
            self.close_top(out);
        }
        if self.stack.last().is_some_and(|top| top.len() == marker.len()) {
            out.push_str("</para>\n</listitem>\n");
        } else {
            out.push('<');
            out.push_str(list_tag(marker));
            out.push_str(">\n");
            self.stack.push(marker.to_owned());
        }
        out.push_str("<listitem>\n<para>\n");
        out.push_str(text);
        out.push('\n');
    }

    fn close_top(&mut self, out: &mut String) {
        if let Some(marker) = self.stack.pop() {
            out.push_str("</para>\n</listitem>\n</");
            out.push_str(list_tag(&marker));
            out.push_str(">\n");
        }
    }

    fn close_all(&mut self, out: &mut String) {
        ensure_newline(out);
        while !self.stack.is_empty() {
            self.close_top(out);
        }
    }
}

fn list_tag(marker: &str) -> &'static str {
    if marker.ends_with('#') {
        "orderedlist"
    } else {
        "itemizedlist"
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_analyze() {
        assert_eq!(ListsProcessor::analyze("*one"), Some(("*", "one")));
        assert_eq!(ListsProcessor::analyze("## two"), Some(("##", "two")));
        assert_eq!(ListsProcessor::analyze("*### last"), Some(("*###", "last")));
    }

    #[test]
    fn test_ordered_list() {
        assert_eq!(
            ListsProcessor::new().process("there are three choices:\n#one\n#two\n#three"),
            "there are three choices:\n<orderedlist>\n<listitem>\n<para>\none\n</para>\n</listitem>\n\
             <listitem>\n<para>\ntwo\n</para>\n</listitem>\n\
             <listitem>\n<para>\nthree\n</para>\n</listitem>\n</orderedlist>\n"
        );
    }

    #[test]
    fn test_nested_list_then_sibling() {
        assert_eq!(
            ListsProcessor::new().process("contents :\n*flour\n*dyes:\n*#E101\n*#E104\n*preservative\nafter\n"),
            "contents :\n<itemizedlist>\n<listitem>\n<para>\nflour\n</para>\n</listitem>\n\
             <listitem>\n<para>\ndyes:\n<orderedlist>\n<listitem>\n<para>\nE101\n</para>\n</listitem>\n\
             <listitem>\n<para>\nE104\n</para>\n</listitem>\n</orderedlist>\n</para>\n</listitem>\n\
             <listitem>\n<para>\npreservative\n</para>\n</listitem>\n</itemizedlist>\nafter\n"
        );
    }

    #[test]
    fn test_type_change_at_same_depth() {
        let out = ListsProcessor::new().process("*a\n#b\n");

        assert_eq!(
            out,
            "<itemizedlist>\n<listitem>\n<para>\na\n</para>\n</listitem>\n</itemizedlist>\n\
             <orderedlist>\n<listitem>\n<para>\nb\n</para>\n</listitem>\n</orderedlist>\n"
        );
    }

    #[test]
    fn test_lists_balanced() {
        let out = ListsProcessor::new()
            .process("*ingrédients&nbsp;:\n*#a\n*#*b\n*#*c\n***d\n*e\n#f\ntext");

        let opens = out.matches("<itemizedlist>").count() + out.matches("<orderedlist>").count();
        let closes = out.matches("</itemizedlist>").count() + out.matches("</orderedlist>").count();
        assert_eq!(opens, closes);
        assert_eq!(
            out.matches("<listitem>").count(),
            out.matches("</listitem>").count()
        );
        assert!(out.ends_with("</orderedlist>\ntext"));
    }
}
