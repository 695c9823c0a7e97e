// ABOUTME: Per-page extraction pipeline: resolve the selector set, prune, then collect text per level.
// ABOUTME: Produces a serializable PageExtraction with each level's text and relevance weight.

//! Page extraction.
//!
//! [`PageExtractor`] wires the primitives together in the order a strategy
//! would: resolve the selector set for the URL, prune excluded subtrees,
//! then select and clean the text of every level. Levels are reported from
//! most to least relevant.
//!
//! Content matches that are also matched by a `lvlN` selector are dropped
//! so a heading's text is not repeated as body text.

use std::collections::HashSet;

use dom_query::Document;
use serde::Serialize;
use tracing::debug;

use crate::config::{Config, SelectorEntry, CONTENT_LEVEL};
use crate::error::Result;
use crate::identity::node_path;
use crate::prune::prune_for;
use crate::resolver::SelectorSetResolver;
use crate::selector::{select, QueryMatch, SelectorCache};
use crate::text::extract_text_multi;
use crate::weight::{level_number, level_weight};

/// Text extracted for one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelText {
    pub level: String,
    pub text: Option<String>,
    pub weight: i64,
}

/// Everything extracted from one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageExtraction {
    pub selectors_key: String,
    pub min_indexed_level: String,
    /// Ordered by weight, highest first; ties by level name.
    pub levels: Vec<LevelText>,
}

impl PageExtraction {
    /// Looks up the text of a level by name.
    pub fn text(&self, level: &str) -> Option<&str> {
        self.levels
            .iter()
            .find(|l| l.level == level)
            .and_then(|l| l.text.as_deref())
    }
}

/// Runs the extraction pipeline against pages of one configuration.
#[derive(Debug, Clone, Copy)]
pub struct PageExtractor<'c> {
    config: &'c Config,
    cache: &'c SelectorCache,
}

impl<'c> PageExtractor<'c> {
    pub fn new(config: &'c Config, cache: &'c SelectorCache) -> Self {
        Self { config, cache }
    }

    /// Uses the process-wide selector cache.
    pub fn with_global_cache(config: &'c Config) -> Self {
        Self::new(config, SelectorCache::global())
    }

    /// Extracts every configured level from `doc`. The document is pruned in place.
    pub fn extract(&self, url: Option<&str>, doc: &Document) -> Result<PageExtraction> {
        let resolver = SelectorSetResolver::new(self.config);
        let selectors_key = resolver.resolve_key(url);
        let set = resolver.resolve_set(url)?;
        let min_indexed_level = resolver.resolve_min_level(url);

        prune_for(doc, self.config, set, self.cache)?;

        let mut ordered: Vec<(&String, &SelectorEntry)> = set.levels.iter().collect();
        ordered.sort_by(|(a, _), (b, _)| {
            level_weight(b)
                .cmp(&level_weight(a))
                .then_with(|| a.cmp(b))
        });

        let mut selected = Vec::with_capacity(ordered.len());
        for (_, entry) in &ordered {
            let query = self.cache.get_or_compile(&entry.selector)?;
            selected.push(select(doc, &query));
        }

        let headings: HashSet<String> = ordered
            .iter()
            .zip(&selected)
            .filter(|((level, _), _)| level_number(level).is_some())
            .flat_map(|(_, matches)| matches.iter())
            .filter_map(QueryMatch::as_element)
            .map(node_path)
            .collect();

        let mut levels = Vec::with_capacity(ordered.len());
        for ((level, entry), matches) in ordered.iter().zip(&selected) {
            let strip_chars = resolver.strip_chars_for(set, level);
            let text = if level.as_str() == CONTENT_LEVEL {
                let body = without_headings(matches, &headings);
                extract_text_multi(&body, strip_chars)
            } else {
                extract_text_multi(matches, strip_chars)
            };

            levels.push(LevelText {
                level: level.to_string(),
                text: text.or_else(|| entry.default_value.clone()),
                weight: level_weight(level),
            });
        }

        debug!(
            url,
            selectors_key,
            levels = levels.len(),
            "extracted page"
        );

        Ok(PageExtraction {
            selectors_key: selectors_key.to_string(),
            min_indexed_level: min_indexed_level.to_string(),
            levels,
        })
    }

    /// Parses `body` and extracts from it.
    pub fn extract_html(&self, url: Option<&str>, body: &str) -> Result<PageExtraction> {
        let doc = Document::from(body);
        self.extract(url, &doc)
    }
}

/// Drops element matches whose node path is one of `headings`.
fn without_headings<'a>(
    matches: &[QueryMatch<'a>],
    headings: &HashSet<String>,
) -> Vec<QueryMatch<'a>> {
    matches
        .iter()
        .filter(|m| match m.as_element() {
            Some(node) => headings.is_empty() || !headings.contains(&node_path(node)),
            None => true,
        })
        .cloned()
        .collect()
}
