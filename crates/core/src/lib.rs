// ABOUTME: Main library entry point for the docsearch content extraction engine.
// ABOUTME: Re-exports the public API: Config, PageExtractor, SelectorCache, Strategy, and the text primitives.

//! docsearch-core - leveled text extraction for documentation search indexes.
//!
//! Given a site configuration and a parsed page, the engine picks the
//! selector set for the page URL, removes excluded subtrees, and collects
//! the text of each hierarchy level (`lvl0`..`lvlN`) and of the `content`
//! level, each with a relevance weight. Deciding which records to emit is
//! left to a [`Strategy`] implementation.
//!
//! # Example
//!
//! ```
//! use docsearch_core::{Config, PageExtractor, SelectorCache};
//!
//! let config = Config::from_json_str(
//!     r#"{ "selectors": { "lvl0": ".title", "content": "p" } }"#,
//! )?;
//! let cache = SelectorCache::new();
//! let page = PageExtractor::new(&config, &cache)
//!     .extract_html(None, r#"<div class="title">Intro</div><p>Hello</p>"#)?;
//! assert_eq!(page.text("lvl0"), Some("Intro"));
//! assert_eq!(page.text("content"), Some("Hello"));
//! # Ok::<(), docsearch_core::ScraperError>(())
//! ```

pub mod config;
pub mod error;
pub mod identity;
pub mod page;
pub mod prune;
pub mod resolver;
pub mod selector;
pub mod strategy;
pub mod text;
pub mod weight;

pub use crate::config::{
    Config, MinIndexedLevels, SelectorEntry, SelectorSet, StartUrl, CONTENT_LEVEL,
    DEFAULT_MIN_LEVEL_KEY, DEFAULT_SELECTORS_KEY,
};
pub use crate::error::{ErrorCode, Result, ScraperError};
pub use crate::identity::{node_path, same_node};
pub use crate::page::{LevelText, PageExtraction, PageExtractor};
pub use crate::prune::{prune, prune_for};
pub use crate::resolver::SelectorSetResolver;
pub use crate::selector::{css_to_xpath, select, CompiledQuery, QueryMatch, SelectorCache};
pub use crate::strategy::{get_dom, PageResponse, Record, Strategy};
pub use crate::text::{clean_text, extract_text, extract_text_multi};
pub use crate::weight::level_weight;
