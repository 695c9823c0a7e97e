// ABOUTME: Resolves which named selector set and minimum indexed level apply to a page URL.
// ABOUTME: First matching start URL pattern wins; unmatched or missing URLs use the default set.

use tracing::{debug, warn};

use crate::config::{Config, SelectorSet, DEFAULT_MIN_LEVEL_KEY, DEFAULT_SELECTORS_KEY};
use crate::error::{Result, ScraperError};

/// Looks up per-URL selector configuration.
///
/// Two independent fallbacks exist: an unmatched URL resolves to the
/// `"default"` selectors key, and a selectors key without its own
/// `min_indexed_level` entry uses the `"default"` level entry.
#[derive(Debug, Clone, Copy)]
pub struct SelectorSetResolver<'c> {
    config: &'c Config,
}

impl<'c> SelectorSetResolver<'c> {
    pub fn new(config: &'c Config) -> Self {
        Self { config }
    }

    /// Returns the selectors key of the first start URL whose pattern occurs in `url`.
    pub fn resolve_key(&self, url: Option<&str>) -> &'c str {
        let Some(url) = url else {
            return DEFAULT_SELECTORS_KEY;
        };

        let key = self
            .config
            .start_urls
            .iter()
            .find(|start| start.pattern.is_match(url))
            .map(|start| start.selectors_key.as_str())
            .unwrap_or(DEFAULT_SELECTORS_KEY);
        debug!(url, selectors_key = key, "resolved selectors key");
        key
    }

    /// Returns the selector set for `url`.
    pub fn resolve_set(&self, url: Option<&str>) -> Result<&'c SelectorSet> {
        let key = self.resolve_key(url);
        self.config.selectors.get(key).ok_or_else(|| {
            warn!(selectors_key = key, url, "no selector set for resolved key");
            ScraperError::configuration(
                key,
                "resolve_set",
                Some(anyhow::anyhow!(
                    "no set of selectors found for {}",
                    url.unwrap_or("<no url>")
                )),
            )
        })
    }

    /// Returns the minimum indexed level for `url`.
    pub fn resolve_min_level(&self, url: Option<&str>) -> &'c str {
        let key = self.resolve_key(url);
        let levels = &self.config.min_indexed_level;
        levels
            .get(key)
            .or_else(|| levels.get(DEFAULT_MIN_LEVEL_KEY))
            .unwrap_or_else(|| levels.default_level())
    }

    /// Returns the strip set for a level: its own override, else the global one.
    pub fn strip_chars_for(&self, set: &'c SelectorSet, level: &str) -> Option<&'c str> {
        set.get(level)
            .and_then(|entry| entry.strip_chars.as_deref())
            .or(self.config.strip_chars.as_deref())
    }
}
