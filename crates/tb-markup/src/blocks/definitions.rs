//! Wiki `;term` / `:definition` lines to `<variablelist>`.

use super::ensure_newline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Outside,
    InTerm,
    InDefinition,
}

/// Turns definition lines into variable lists.
///
/// Consecutive terms share one entry. A `:` line outside a list is left
/// alone. A term with no definition gets an empty list item.
#[derive(Debug)]
pub struct DefinitionsProcessor {
    state: State,
}

impl Default for DefinitionsProcessor {
    fn default() -> Self {
        Self {
            state: State::Outside,
        }
    }
}

impl DefinitionsProcessor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn process(mut self, input: &str) -> String {
        let mut out = String::with_capacity(input.len() + 64);
        for line in input.split_inclusive('\n') {
            let bare = line.trim_end_matches('\n');
            if let Some(term) = bare.strip_prefix(';') {
                self.term(&mut out, term.trim());
            } else if let Some(def) = bare
                .strip_prefix(':')
                .filter(|_| self.state != State::Outside)
            {
                self.definition(&mut out, def.trim());
            } else {
                self.close(&mut out);
                out.push_str(line);
            }
        }
        self.close(&mut out);
        out
    }

    fn term(&mut self, out: &mut String, term: &str) {
        ensure_newline(out);
        match self.state {
            State::Outside => out.push_str("<variablelist>\n<varlistentry>\n"),
            State::InDefinition => {
                out.push_str("</listitem>\n</varlistentry>\n<varlistentry>\n");
            }
            State::InTerm => {}
        }
        self.state = State::InTerm;
        out.push_str("<term>");
        out.push_str(term);
        out.push_str("</term>\n");
    }

    fn definition(&mut self, out: &mut String, def: &str) {
        if self.state == State::InTerm {
            out.push_str("<listitem>\n");
        }
        self.state = State::InDefinition;
        out.push_str("<para>");
        out.push_str(def);
        out.push_str("</para>\n");
    }

    fn close(&mut self, out: &mut String) {
        match self.state {
            State::Outside => return,
            State::InTerm => out.push_str("<listitem>\n<para/>\n</listitem>\n"),
            State::InDefinition => out.push_str("</listitem>\n"),
        }
        out.push_str("</varlistentry>\n</variablelist>\n");
        self.state = State::Outside;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_term_and_definitions() {
        assert_eq!(
            DefinitionsProcessor::new().process(";Authors\n:Jean '''Valjean'''\n:Javert\nend\n"),
            "<variablelist>\n<varlistentry>\n<term>Authors</term>\n<listitem>\n\
             <para>Jean '''Valjean'''</para>\n<para>Javert</para>\n</listitem>\n\
             </varlistentry>\n</variablelist>\nend\n"
        );
    }

    #[test]
    fn test_consecutive_terms_share_entry() {
        assert_eq!(
            DefinitionsProcessor::new().process(";a\n;b\n:both\n;c\n:third"),
            "<variablelist>\n<varlistentry>\n<term>a</term>\n<term>b</term>\n<listitem>\n\
             <para>both</para>\n</listitem>\n</varlistentry>\n<varlistentry>\n<term>c</term>\n\
             <listitem>\n<para>third</para>\n</listitem>\n</varlistentry>\n</variablelist>\n"
        );
    }

    #[test]
    fn test_dangling_term() {
        assert_eq!(
            DefinitionsProcessor::new().process(";alone\n"),
            "<variablelist>\n<varlistentry>\n<term>alone</term>\n\
             <listitem>\n<para/>\n</listitem>\n</varlistentry>\n</variablelist>\n"
        );
    }

    #[test]
    fn test_colon_outside_list_untouched() {
        assert_eq!(DefinitionsProcessor::new().process(":indent\n"), ":indent\n");
    }
}
