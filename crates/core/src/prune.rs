// ABOUTME: Detaches excluded subtrees from a parsed document before text extraction.
// ABOUTME: Applies global exclusions first, then the active selector set's own.

use dom_query::{Document, NodeRef, Selection};
use tracing::debug;

use crate::config::{Config, SelectorSet};
use crate::error::{Result, ScraperError};
use crate::selector::{select, QueryMatch, SelectorCache};

/// Removes every element matched by any of `exclusions` from `doc`.
///
/// Matches are collected per selector before anything is removed, so a
/// selector matching both a node and its descendant removes the outer
/// subtree once and skips the inner one.
pub fn prune<'d, S: AsRef<str>>(
    doc: &'d Document,
    exclusions: &[S],
    cache: &SelectorCache,
) -> Result<&'d Document> {
    let mut removed = 0usize;

    for exclusion in exclusions {
        let selector = exclusion.as_ref();
        let query = cache.get_or_compile(selector)?;
        if query.text_nodes() {
            return Err(ScraperError::configuration(
                selector,
                "prune",
                Some(anyhow::anyhow!("exclusions must select elements, not text")),
            ));
        }

        for hit in select(doc, &query) {
            let QueryMatch::Element(node) = hit else {
                continue;
            };
            if !is_attached(&node) {
                continue;
            }
            Selection::from(node).remove();
            removed += 1;
        }
    }

    debug!(removed, exclusions = exclusions.len(), "pruned document");
    Ok(doc)
}

/// Applies the global exclusions, then those of `set`.
pub fn prune_for<'d>(
    doc: &'d Document,
    config: &Config,
    set: &SelectorSet,
    cache: &SelectorCache,
) -> Result<&'d Document> {
    prune(doc, config.selectors_exclude.as_slice(), cache)?;
    prune(doc, set.exclude.as_slice(), cache)
}

/// Returns true while the node is still reachable from the document root.
fn is_attached(node: &NodeRef<'_>) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.is_document() {
            return true;
        }
        current = parent.parent();
    }
    false
}
