// ABOUTME: Compiled selector queries and the thread-safe cache that memoizes them by selector text.
// ABOUTME: Compilation parses once, renders XPath, and builds a dom_query Matcher for execution.

//! Selector compilation and caching.
//!
//! Parsing a selector is expensive relative to matching it, and a site
//! configuration reuses the same handful of selectors on every page. A
//! `CompiledQuery` is a pure function of the selector string, so the cache
//! never needs invalidating: it only grows.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use dom_query::Matcher;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::error::{Result, ScraperError};
use crate::selector::{parser, xpath};

/// An executable selector.
///
/// The empty query (from an empty selector string) has no matcher and
/// selects nothing on any document.
#[derive(Clone)]
pub struct CompiledQuery {
    source: String,
    xpath: String,
    matcher: Option<Matcher>,
    text_nodes: bool,
}

impl CompiledQuery {
    /// The query that matches nothing.
    pub fn empty() -> Self {
        Self {
            source: String::new(),
            xpath: String::new(),
            matcher: None,
            text_nodes: false,
        }
    }

    /// Compiles a selector string.
    ///
    /// Fails with a selector syntax error when the string does not parse,
    /// uses an unsupported construct, or is rejected by the matcher.
    pub fn compile(selector: &str) -> Result<Self> {
        if selector.trim().is_empty() {
            return Ok(Self::empty());
        }

        let list = parser::parse(selector)
            .map_err(|e| ScraperError::selector_syntax(selector, "compile", Some(e.into())))?;
        let xpath = xpath::render(&list)
            .map_err(|e| ScraperError::selector_syntax(selector, "compile", Some(e.into())))?;

        let css = list.to_string();
        let matcher = Matcher::new(&css).map_err(|e| {
            ScraperError::selector_syntax(
                selector,
                "compile",
                Some(anyhow::anyhow!("matcher rejected {:?}: {:?}", css, e)),
            )
        })?;

        Ok(Self {
            source: selector.to_string(),
            xpath,
            matcher: Some(matcher),
            text_nodes: list.text_nodes,
        })
    }

    /// The selector text this query was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The equivalent XPath expression (empty for the empty query).
    pub fn xpath(&self) -> &str {
        &self.xpath
    }

    /// Returns true for the query that matches nothing.
    pub fn is_empty(&self) -> bool {
        self.matcher.is_none()
    }

    /// Returns true when the query yields text nodes rather than elements.
    pub fn text_nodes(&self) -> bool {
        self.text_nodes
    }

    pub(crate) fn matcher(&self) -> Option<&Matcher> {
        self.matcher.as_ref()
    }
}

impl fmt::Debug for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledQuery")
            .field("source", &self.source)
            .field("xpath", &self.xpath)
            .field("text_nodes", &self.text_nodes)
            .finish()
    }
}

static GLOBAL_CACHE: Lazy<SelectorCache> = Lazy::new(SelectorCache::new);

/// Thread-safe cache of compiled selectors keyed by the raw selector string.
///
/// Uses a RwLock for read-heavy workloads: after warm-up nearly every access
/// is a cache hit. Failed compilations are returned to the caller and not
/// stored.
#[derive(Default)]
pub struct SelectorCache {
    entries: RwLock<HashMap<String, Arc<CompiledQuery>>>,
}

impl SelectorCache {
    /// Creates a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The lazily created process-wide cache.
    pub fn global() -> &'static SelectorCache {
        &GLOBAL_CACHE
    }

    /// Gets or compiles a selector, caching the result.
    pub fn get_or_compile(&self, selector: &str) -> Result<Arc<CompiledQuery>> {
        // Fast path: shared lock
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(cached) = entries.get(selector) {
                return Ok(Arc::clone(cached));
            }
        }

        let compiled = Arc::new(CompiledQuery::compile(selector)?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have inserted while we compiled.
        let entry = entries
            .entry(selector.to_string())
            .or_insert_with(|| {
                debug!(selector, xpath = compiled.xpath(), "compiled selector");
                Arc::clone(&compiled)
            });
        Ok(Arc::clone(entry))
    }

    /// Compiles a batch of selectors into the cache.
    ///
    /// Call this after loading configuration so malformed selectors surface
    /// before any page is processed.
    pub fn precompile<I, S>(&self, selectors: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for selector in selectors {
            self.get_or_compile(selector.as_ref())?;
        }
        Ok(())
    }

    /// Returns the number of cached selectors.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing has been compiled yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for SelectorCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectorCache")
            .field("len", &self.len())
            .finish()
    }
}
