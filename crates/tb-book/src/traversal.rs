//! Depth-first walk of the ordering lists, starting at the root.

use crate::Fragment;

/// Problem found while walking the ordering lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TraversalIssue {
    /// `title` was already claimed by `first` (`None` for the root itself).
    Repeated {
        title: String,
        first: Option<String>,
        second: String,
    },
    Unknown {
        title: String,
        parent: String,
    },
    LinkingImmediate {
        title: String,
        parent: String,
    },
}

/// Outcome of a traversal, indexed like the fragment list.
#[derive(Debug, Clone, Default)]
pub(crate) struct Traversal {
    pub(crate) parents: Vec<Option<usize>>,
    pub(crate) children: Vec<Vec<usize>>,
    pub(crate) reached: Vec<bool>,
    /// Reached fragments in document order.
    pub(crate) order: Vec<usize>,
    pub(crate) issues: Vec<TraversalIssue>,
}

/// Walk the ordering lists from `root`.
///
/// A fragment claims all of its listed children before any of them is
/// visited, so the first parent in document order wins a repeated
/// inclusion. `resolve` maps a listed title to a fragment index.
pub(crate) fn traverse<F>(fragments: &[Fragment], root: usize, resolve: F) -> Traversal
where
    F: Fn(&str) -> Option<usize>,
{
    let n = fragments.len();
    let mut walk = Traversal {
        parents: vec![None; n],
        children: vec![Vec::new(); n],
        reached: vec![false; n],
        order: Vec::with_capacity(n),
        issues: Vec::new(),
    };
    walk.reached[root] = true;

    let mut stack = vec![root];
    while let Some(current) = stack.pop() {
        walk.order.push(current);
        let fragment = &fragments[current];
        for entry in fragment.ordering().unwrap_or_default() {
            let Some(child) = resolve(entry) else {
                walk.issues.push(TraversalIssue::Unknown {
                    title: entry.clone(),
                    parent: fragment.title().to_owned(),
                });
                continue;
            };
            if fragments[child].kind().is_immediate() {
                walk.issues.push(TraversalIssue::LinkingImmediate {
                    title: entry.clone(),
                    parent: fragment.title().to_owned(),
                });
                continue;
            }
            if walk.reached[child] {
                walk.issues.push(TraversalIssue::Repeated {
                    title: entry.clone(),
                    first: walk.parents[child].map(|p| fragments[p].title().to_owned()),
                    second: fragment.title().to_owned(),
                });
                continue;
            }
            tracing::debug!(parent = fragment.title(), child = entry.as_str(), "claimed");
            walk.reached[child] = true;
            walk.parents[child] = Some(current);
            walk.children[current].push(child);
        }
        stack.extend(walk.children[current].iter().rev());
    }

    walk
}
