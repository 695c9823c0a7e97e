// ABOUTME: The Strategy trait that turns fetched pages into index records, plus shared page types.
// ABOUTME: Implementors choose record policy; the engine only supplies extraction primitives.

use dom_query::Document;
use serde_json::Value;

use crate::error::Result;

/// One record destined for the search index.
pub type Record = serde_json::Map<String, Value>;

/// A fetched page whose body has already been decoded to text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResponse {
    pub url: Option<String>,
    pub body: String,
}

impl PageResponse {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            body: body.into(),
        }
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

/// Converts pages into records.
///
/// Implementors usually hold a [`Config`](crate::Config) and build on
/// [`PageExtractor`](crate::PageExtractor) or the lower-level primitives.
pub trait Strategy {
    /// Settings the index needs for the records this strategy emits.
    fn get_index_settings(&self) -> Value;

    /// Builds the records for one page.
    fn get_records_from_response(&self, response: &PageResponse) -> Result<Vec<Record>>;
}

/// Parses a decoded page body.
pub fn get_dom(body: &str) -> Document {
    Document::from(body)
}
