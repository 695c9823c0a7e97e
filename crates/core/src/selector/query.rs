// ABOUTME: Runs compiled selector queries against a dom_query Document.
// ABOUTME: Resolves each hit once into a tagged QueryMatch: a text node value or an element handle.

use dom_query::{Document, NodeRef};

use crate::selector::compiled::CompiledQuery;

/// A single query hit.
///
/// Text-valued queries (`::text`) yield the string content of text nodes;
/// element queries yield the element itself.
#[derive(Clone)]
pub enum QueryMatch<'a> {
    Text(String),
    Element(NodeRef<'a>),
}

impl<'a> QueryMatch<'a> {
    /// Returns the element handle, if this is an element match.
    pub fn as_element(&self) -> Option<&NodeRef<'a>> {
        match self {
            QueryMatch::Element(node) => Some(node),
            QueryMatch::Text(_) => None,
        }
    }
}

impl std::fmt::Debug for QueryMatch<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryMatch::Text(text) => f.debug_tuple("Text").field(text).finish(),
            QueryMatch::Element(node) => f
                .debug_tuple("Element")
                .field(&node.node_name().map(|n| n.to_string()))
                .finish(),
        }
    }
}

/// Runs a compiled query over the whole document, in document order.
///
/// The empty query returns no matches.
pub fn select<'a>(doc: &'a Document, query: &CompiledQuery) -> Vec<QueryMatch<'a>> {
    let Some(matcher) = query.matcher() else {
        return Vec::new();
    };

    let selection = doc.select_matcher(matcher);
    let elements = selection.nodes().iter().cloned();

    if !query.text_nodes() {
        return elements.map(QueryMatch::Element).collect();
    }

    elements
        .flat_map(|element| element.children())
        .filter(|child| child.is_text())
        .map(|child| QueryMatch::Text(child.text().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(css: &str) -> CompiledQuery {
        CompiledQuery::compile(css).unwrap()
    }

    #[test]
    fn element_query_returns_elements_in_order() {
        let doc = Document::from("<ul><li>One</li><li>Two</li></ul><li>Three</li>");
        let matches = select(&doc, &compile("li"));
        assert_eq!(matches.len(), 3);
        assert!(matches.iter().all(|m| m.as_element().is_some()));
        let texts: Vec<String> = matches
            .iter()
            .filter_map(|m| m.as_element().map(|n| n.text().to_string()))
            .collect();
        assert_eq!(texts, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn text_query_returns_direct_text_children() {
        let doc = Document::from("<h1>Intro <small>v2</small> guide</h1>");
        let matches = select(&doc, &compile("h1::text"));
        let texts: Vec<&str> = matches
            .iter()
            .map(|m| match m {
                QueryMatch::Text(t) => t.as_str(),
                QueryMatch::Element(_) => panic!("expected text match"),
            })
            .collect();
        assert_eq!(texts, vec!["Intro ", " guide"]);
    }

    #[test]
    fn empty_query_selects_nothing() {
        let doc = Document::from("<div><p>Anything</p></div>");
        assert!(select(&doc, &CompiledQuery::empty()).is_empty());
        assert!(select(&doc, &compile("")).is_empty());
    }

    #[test]
    fn query_with_no_hits_is_empty() {
        let doc = Document::from("<p>Only paragraphs</p>");
        assert!(select(&doc, &compile("table td")).is_empty());
    }
}
