// ABOUTME: Selector compilation, XPath translation, caching, and query execution.
// ABOUTME: Compiled queries are pure functions of selector text and safe to share across threads.

//! Selector handling.
//!
//! Submodules:
//! - `parser`: CSS selector dialect parser.
//! - `xpath`: CSS to XPath translation.
//! - `compiled`: compiled queries and the selector cache.
//! - `query`: running compiled queries against a document.

pub mod compiled;
pub mod parser;
pub mod query;
pub mod xpath;

pub use compiled::{CompiledQuery, SelectorCache};
pub use query::{select, QueryMatch};
pub use xpath::css_to_xpath;
