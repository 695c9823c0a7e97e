// ABOUTME: Text extraction from query matches with whitespace trimming and configurable strip characters.
// ABOUTME: Collapses empty results to None so callers never see an empty string.

//! Text extraction.
//!
//! Trimming happens in two passes: Unicode whitespace first (so `&nbsp;` and
//! em spaces count as blank), then the configured strip set. Only the ends of
//! the text are touched; inner whitespace is preserved.

use crate::selector::QueryMatch;

/// Trims raw text and returns `None` when nothing meaningful remains.
pub fn clean_text(raw: &str, strip_chars: Option<&str>) -> Option<String> {
    let mut text = raw.trim();
    if let Some(chars) = strip_chars {
        text = text.trim_matches(|c: char| chars.contains(c));
    }
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Extracts the text of a single match.
///
/// Text matches are used as-is; element matches contribute the concatenated
/// text of their whole subtree.
pub fn extract_text(node: &QueryMatch<'_>, strip_chars: Option<&str>) -> Option<String> {
    match node {
        QueryMatch::Text(text) => clean_text(text, strip_chars),
        QueryMatch::Element(element) => clean_text(&element.text(), strip_chars),
    }
}

/// Extracts the text of every match and joins the non-empty fragments with a space.
pub fn extract_text_multi(nodes: &[QueryMatch<'_>], strip_chars: Option<&str>) -> Option<String> {
    if nodes.is_empty() {
        return None;
    }

    let fragments: Vec<String> = nodes
        .iter()
        .filter_map(|node| extract_text(node, strip_chars))
        .collect();

    let joined = fragments.join(" ");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::{select, CompiledQuery};
    use dom_query::Document;

    fn text(s: &str) -> QueryMatch<'static> {
        QueryMatch::Text(s.to_string())
    }

    #[test]
    fn trims_layout_whitespace() {
        assert_eq!(clean_text("  Hello \n", None), Some("Hello".to_string()));
        assert_eq!(clean_text("\t\r\x0cHi\x0c", None), Some("Hi".to_string()));
        assert_eq!(clean_text("a  b", None), Some("a  b".to_string()));
    }

    #[test]
    fn blank_text_is_none() {
        assert_eq!(clean_text("", None), None);
        assert_eq!(clean_text(" \t\n\r\x0c ", None), None);
        assert_eq!(extract_text(&text("   "), None), None);
    }

    #[test]
    fn trims_unicode_whitespace() {
        assert_eq!(clean_text("\u{a0}", None), None);
        assert_eq!(extract_text(&text("\u{a0} \u{2003}"), None), None);
        assert_eq!(
            clean_text("\x0b\u{a0}Intro\u{2003}", None),
            Some("Intro".to_string())
        );
        assert_eq!(
            clean_text("a\u{a0}b", None),
            Some("a\u{a0}b".to_string())
        );
    }

    #[test]
    fn nbsp_only_heading_has_no_text() {
        let doc = Document::from("<h1>&nbsp;</h1><h2>\u{2003}Setup\u{a0}</h2>");
        let h1 = select(&doc, &CompiledQuery::compile("h1").unwrap());
        assert_eq!(extract_text_multi(&h1, None), None);
        let h2 = select(&doc, &CompiledQuery::compile("h2").unwrap());
        assert_eq!(extract_text_multi(&h2, None), Some("Setup".to_string()));
    }

    #[test]
    fn strip_chars_apply_after_whitespace() {
        assert_eq!(
            clean_text("  ¶ Installation #", Some("¶#")),
            Some(" Installation ".to_string())
        );
        assert_eq!(clean_text("##", Some("#")), None);
        assert_eq!(clean_text("# x #", Some("")), Some("# x #".to_string()));
    }

    #[test]
    fn strip_pass_is_idempotent() {
        let strip = Some("-*");
        let once = clean_text("  --*Title*--  ", strip).unwrap();
        let twice = once.trim_matches(|c: char| "-*".contains(c));
        assert_eq!(once, twice);
        assert_eq!(once, "Title");
    }

    #[test]
    fn multi_on_empty_input_is_none() {
        assert_eq!(extract_text_multi(&[], None), None);
        assert_eq!(extract_text_multi(&[], Some("#")), None);
    }

    #[test]
    fn multi_drops_blank_fragments() {
        let nodes = vec![text(" Hello "), text("  "), text("world")];
        assert_eq!(
            extract_text_multi(&nodes, None),
            Some("Hello world".to_string())
        );

        let blanks = vec![text(""), text(" \n ")];
        assert_eq!(extract_text_multi(&blanks, None), None);
    }

    #[test]
    fn element_text_includes_subtree() {
        let doc = Document::from("<div class=\"x\"> Read <b>the</b> docs </div>");
        let query = CompiledQuery::compile(".x").unwrap();
        let matches = select(&doc, &query);
        assert_eq!(
            extract_text(&matches[0], None),
            Some("Read the docs".to_string())
        );
    }
}
