use dirsync_common::{FileSet, RelativePath};
use std::borrow::Cow;
use tracing::debug;

/// Set classification of two file sets: unique-to-A, common, unique-to-B.
#[derive(Debug, Default)]
pub struct Reconciliation {
    pub unique_a: Vec<RelativePath>,
    pub common: Vec<RelativePath>,
    pub unique_b: Vec<RelativePath>,
}

/// Classify every path in `a` and `b` by presence on the other side.
///
/// When a filter is given, both sets are first restricted to paths that
/// overlap it (equal, lie under it, or are an ancestor of it). Equality is
/// exact normalized-path string match, no content or timestamp comparison,
/// and output order follows each input set's discovery order.
pub fn reconcile(a: &FileSet, b: &FileSet, filter: Option<&RelativePath>) -> Reconciliation {
    let (a, b) = match filter {
        Some(filter) => (Cow::Owned(a.filtered(filter)), Cow::Owned(b.filtered(filter))),
        None => (Cow::Borrowed(a), Cow::Borrowed(b)),
    };

    let mut reconciliation = Reconciliation::default();

    for path in a.iter() {
        if b.contains(path) {
            reconciliation.common.push(path.clone());
        } else {
            reconciliation.unique_a.push(path.clone());
        }
    }

    for path in b.iter() {
        if !a.contains(path) {
            reconciliation.unique_b.push(path.clone());
        }
    }

    debug!(
        "Reconciled: {} unique to A, {} common, {} unique to B",
        reconciliation.unique_a.len(),
        reconciliation.common.len(),
        reconciliation.unique_b.len()
    );
    reconciliation
}
