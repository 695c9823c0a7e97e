// ABOUTME: Translates parsed CSS selectors into equivalent XPath 1.0 expressions.
// ABOUTME: Follows the cssselect HTML translator conventions (descendant-or-self prefix, class tests).

//! CSS to XPath translation.
//!
//! Expressions are assembled the way `cssselect` does it: each compound
//! becomes `path + element + [condition]`, and combinators join expressions
//! with an axis step. Tag and attribute names are lowercased; class and id
//! values keep their case.

use crate::error::{Result, ScraperError};
use crate::selector::parser::{
    self, AttrOp, Combinator, ComplexSelector, Compound, Filter, Nth, Pseudo, SelectorList,
    SyntaxError,
};

const PREFIX: &str = "descendant-or-self::";

/// Translates a CSS selector string into an XPath expression.
///
/// Empty (or whitespace-only) input yields an empty expression.
pub fn css_to_xpath(css: &str) -> Result<String> {
    if css.trim().is_empty() {
        return Ok(String::new());
    }
    let list = parser::parse(css)
        .map_err(|e| ScraperError::selector_syntax(css, "css_to_xpath", Some(e.into())))?;
    render(&list).map_err(|e| ScraperError::selector_syntax(css, "css_to_xpath", Some(e.into())))
}

/// Renders a parsed selector list. Groups are joined with ` | `.
pub(crate) fn render(list: &SelectorList) -> std::result::Result<String, SyntaxError> {
    let mut parts = Vec::with_capacity(list.selectors.len());
    for selector in &list.selectors {
        let mut xpath = format!("{}{}", PREFIX, complex_expr(selector)?);
        if list.text_nodes {
            xpath.push_str("/text()");
        }
        parts.push(xpath);
    }
    Ok(parts.join(" | "))
}

#[derive(Debug, Clone)]
struct XPathExpr {
    path: String,
    element: String,
    condition: String,
}

impl XPathExpr {
    fn add_condition(&mut self, condition: &str) {
        if self.condition.is_empty() {
            self.condition = condition.to_string();
        } else {
            self.condition = format!("({}) and ({})", self.condition, condition);
        }
    }

    /// Moves the element name into the condition so positional tests apply
    /// to the whole sibling axis.
    fn add_name_test(&mut self) {
        if self.element == "*" {
            return;
        }
        let test = format!("name() = {}", literal(&self.element));
        self.add_condition(&test);
        self.element = "*".to_string();
    }

    fn join(self, combiner: &str, other: XPathExpr) -> XPathExpr {
        XPathExpr {
            path: format!("{}{}{}", self, combiner, other.path),
            element: other.element,
            condition: other.condition,
        }
    }
}

impl std::fmt::Display for XPathExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.path, self.element)?;
        if !self.condition.is_empty() {
            write!(f, "[{}]", self.condition)?;
        }
        Ok(())
    }
}

fn complex_expr(selector: &ComplexSelector) -> std::result::Result<XPathExpr, SyntaxError> {
    let mut left = compound_expr(&selector.head)?;
    for (combinator, compound) in &selector.tail {
        let mut right = compound_expr(compound)?;
        left = match combinator {
            Combinator::Descendant => left.join("/descendant-or-self::*/", right),
            Combinator::Child => left.join("/", right),
            Combinator::NextSibling => {
                right.add_name_test();
                right.add_condition("position() = 1");
                left.join("/following-sibling::", right)
            }
            Combinator::SubsequentSibling => left.join("/following-sibling::", right),
        };
    }
    Ok(left)
}

fn compound_expr(compound: &Compound) -> std::result::Result<XPathExpr, SyntaxError> {
    let mut expr = XPathExpr {
        path: String::new(),
        element: compound.tag.clone().unwrap_or_else(|| "*".to_string()),
        condition: String::new(),
    };
    for filter in &compound.filters {
        let condition = filter_condition(filter, compound.tag.as_deref())?;
        expr.add_condition(&condition);
    }
    Ok(expr)
}

fn filter_condition(filter: &Filter, tag: Option<&str>) -> std::result::Result<String, SyntaxError> {
    let condition = match filter {
        Filter::Id(id) => format!("@id = {}", literal(id)),
        Filter::Class(class) => includes("@class", class),
        Filter::Attribute { name, matcher } => attribute_condition(name, matcher.as_ref()),
        Filter::Pseudo(pseudo) => pseudo_condition(pseudo, tag)?,
    };
    Ok(condition)
}

fn includes(attr: &str, value: &str) -> String {
    format!(
        "{attr} and contains(concat(' ', normalize-space({attr}), ' '), {})",
        literal(&format!(" {} ", value))
    )
}

fn attribute_condition(name: &str, matcher: Option<&(AttrOp, String)>) -> String {
    let attr = format!("@{}", name);
    let Some((op, value)) = matcher else {
        return attr;
    };
    match op {
        AttrOp::Equals => format!("{} = {}", attr, literal(value)),
        AttrOp::Includes => {
            if value.is_empty() || value.chars().any(char::is_whitespace) {
                "0".to_string()
            } else {
                includes(&attr, value)
            }
        }
        AttrOp::DashMatch => format!(
            "{attr} and ({attr} = {} or starts-with({attr}, {}))",
            literal(value),
            literal(&format!("{}-", value))
        ),
        AttrOp::Prefix if value.is_empty() => "0".to_string(),
        AttrOp::Prefix => format!("{attr} and starts-with({attr}, {})", literal(value)),
        AttrOp::Suffix if value.is_empty() => "0".to_string(),
        AttrOp::Suffix => format!(
            "{attr} and substring({attr}, string-length({attr})-{}) = {}",
            value.chars().count() - 1,
            literal(value)
        ),
        AttrOp::Substring if value.is_empty() => "0".to_string(),
        AttrOp::Substring => format!("{attr} and contains({attr}, {})", literal(value)),
    }
}

fn pseudo_condition(pseudo: &Pseudo, tag: Option<&str>) -> std::result::Result<String, SyntaxError> {
    let typed = |name: &str| -> std::result::Result<String, SyntaxError> {
        tag.map(str::to_string)
            .ok_or_else(|| SyntaxError::Unsupported(format!("*:{}", name)))
    };

    let condition = match pseudo {
        Pseudo::FirstChild => "count(preceding-sibling::*) = 0".to_string(),
        Pseudo::LastChild => "count(following-sibling::*) = 0".to_string(),
        Pseudo::OnlyChild => "count(parent::*/child::*) = 1".to_string(),
        Pseudo::FirstOfType => {
            format!("count(preceding-sibling::{}) = 0", typed("first-of-type")?)
        }
        Pseudo::LastOfType => {
            format!("count(following-sibling::{}) = 0", typed("last-of-type")?)
        }
        Pseudo::OnlyOfType => {
            format!("count(parent::*/child::{}) = 1", typed("only-of-type")?)
        }
        Pseudo::Empty => "not(*) and not(string-length())".to_string(),
        Pseudo::Root => "not(parent::*)".to_string(),
        Pseudo::NthChild(nth) => nth_condition("count(preceding-sibling::*) + 1", *nth),
        Pseudo::NthLastChild(nth) => nth_condition("count(following-sibling::*) + 1", *nth),
        Pseudo::NthOfType(nth) => {
            let axis = format!("count(preceding-sibling::{}) + 1", typed("nth-of-type")?);
            nth_condition(&axis, *nth)
        }
        Pseudo::NthLastOfType(nth) => {
            let axis = format!("count(following-sibling::{}) + 1", typed("nth-last-of-type")?);
            nth_condition(&axis, *nth)
        }
        Pseudo::Not(inner) => negation(inner)?,
    };
    Ok(condition)
}

/// Builds the test for "position `pos` is `a*n + b` for some n >= 0".
fn nth_condition(pos: &str, nth: Nth) -> String {
    let Nth { a, b } = nth;
    let offset = |lhs: &str, rhs: i64| {
        if rhs >= 0 {
            format!("{} - {}", lhs, rhs)
        } else {
            format!("{} + {}", lhs, -rhs)
        }
    };

    if a == 0 {
        return format!("{} = {}", pos, b);
    }

    let mut conditions = Vec::new();
    if a > 0 {
        if b > 1 {
            conditions.push(format!("{} >= {}", pos, b));
        }
        if a > 1 {
            conditions.push(format!("({}) mod {} = 0", offset(pos, b), a));
        }
    } else {
        if b < 1 {
            return "0".to_string();
        }
        conditions.push(format!("{} <= {}", pos, b));
        if a < -1 {
            conditions.push(format!("({} - ({})) mod {} = 0", b, pos, -a));
        }
    }

    if conditions.is_empty() {
        "true()".to_string()
    } else {
        conditions.join(" and ")
    }
}

fn negation(inner: &Compound) -> std::result::Result<String, SyntaxError> {
    let mut expr = XPathExpr {
        path: String::new(),
        element: "*".to_string(),
        condition: String::new(),
    };
    if let Some(tag) = &inner.tag {
        expr.add_condition(&format!("name() = {}", literal(tag)));
    }
    for filter in &inner.filters {
        expr.add_condition(&filter_condition(filter, inner.tag.as_deref())?);
    }
    if expr.condition.is_empty() {
        // :not(*) excludes every element.
        return Ok("0".to_string());
    }
    Ok(format!("not({})", expr.condition))
}

/// Quotes a string as an XPath literal.
fn literal(s: &str) -> String {
    if !s.contains('\'') {
        return format!("'{}'", s);
    }
    if !s.contains('"') {
        return format!("\"{}\"", s);
    }
    let parts: Vec<String> = s
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn xpath(css: &str) -> String {
        css_to_xpath(css).unwrap()
    }

    #[test]
    fn translates_type_and_universal() {
        assert_eq!(xpath("p"), "descendant-or-self::p");
        assert_eq!(xpath("*"), "descendant-or-self::*");
        assert_eq!(xpath("H1"), "descendant-or-self::h1");
    }

    #[test]
    fn translates_class_and_id() {
        assert_eq!(
            xpath(".title"),
            "descendant-or-self::*[@class and contains(concat(' ', normalize-space(@class), ' '), ' title ')]"
        );
        assert_eq!(
            xpath("div#main.doc"),
            "descendant-or-self::div[(@id = 'main') and (@class and contains(concat(' ', normalize-space(@class), ' '), ' doc '))]"
        );
    }

    #[test]
    fn translates_escaped_identifiers() {
        assert_eq!(xpath(r"#\31 23"), "descendant-or-self::*[@id = '123']");
        assert_eq!(
            xpath(r".md\:flex"),
            "descendant-or-self::*[@class and contains(concat(' ', normalize-space(@class), ' '), ' md:flex ')]"
        );
    }

    #[test]
    fn translates_extreme_nth_coefficients() {
        assert_eq!(
            xpath("li:nth-child(2147483647n-2147483648)"),
            "descendant-or-self::li[(count(preceding-sibling::*) + 1 + 2147483648) mod 2147483647 = 0]"
        );
        assert!(xpath("li:nth-child(-2147483648n+1)").contains("mod 2147483648 = 0"));
        assert!(css_to_xpath("li:nth-child(2n-9223372036854775808)")
            .unwrap_err()
            .is_selector_syntax());
    }

    #[test]
    fn translates_combinators() {
        assert_eq!(
            xpath("article h2"),
            "descendant-or-self::article/descendant-or-self::*/h2"
        );
        assert_eq!(xpath("ul > li"), "descendant-or-self::ul/li");
        assert_eq!(
            xpath("h1 + p"),
            "descendant-or-self::h1/following-sibling::*[(name() = 'p') and (position() = 1)]"
        );
        assert_eq!(xpath("h1 ~ p"), "descendant-or-self::h1/following-sibling::p");
    }

    #[test]
    fn translates_groups_and_text() {
        assert_eq!(
            xpath("h1, h2"),
            "descendant-or-self::h1 | descendant-or-self::h2"
        );
        assert_eq!(xpath("h1::text"), "descendant-or-self::h1/text()");
    }

    #[test]
    fn translates_attribute_operators() {
        assert_eq!(xpath("[href]"), "descendant-or-self::*[@href]");
        assert_eq!(
            xpath("a[href^='http']"),
            "descendant-or-self::a[@href and starts-with(@href, 'http')]"
        );
        assert_eq!(
            xpath("a[href$='.pdf']"),
            "descendant-or-self::a[@href and substring(@href, string-length(@href)-3) = '.pdf']"
        );
        assert_eq!(
            xpath("a[href*='']"),
            "descendant-or-self::a[0]"
        );
        assert_eq!(
            xpath("div[lang|=en]"),
            "descendant-or-self::div[@lang and (@lang = 'en' or starts-with(@lang, 'en-'))]"
        );
    }

    #[test]
    fn translates_structural_pseudo_classes() {
        assert_eq!(
            xpath("li:first-child"),
            "descendant-or-self::li[count(preceding-sibling::*) = 0]"
        );
        assert_eq!(
            xpath("li:nth-child(3)"),
            "descendant-or-self::li[count(preceding-sibling::*) + 1 = 3]"
        );
        assert_eq!(
            xpath("li:nth-child(2n+1)"),
            "descendant-or-self::li[(count(preceding-sibling::*) + 1 - 1) mod 2 = 0]"
        );
        assert_eq!(
            xpath("li:nth-child(-n+3)"),
            "descendant-or-self::li[count(preceding-sibling::*) + 1 <= 3]"
        );
        assert_eq!(
            xpath("p:not(.note)"),
            "descendant-or-self::p[not(@class and contains(concat(' ', normalize-space(@class), ' '), ' note '))]"
        );
    }

    #[test]
    fn typed_pseudo_classes_need_a_tag() {
        let err = css_to_xpath("*:first-of-type").unwrap_err();
        assert!(err.is_selector_syntax());
        assert_eq!(
            xpath("p:first-of-type"),
            "descendant-or-self::p[count(preceding-sibling::p) = 0]"
        );
    }

    #[test]
    fn empty_input_yields_empty_expression() {
        assert_eq!(xpath(""), "");
        assert_eq!(xpath("   "), "");
    }

    #[test]
    fn quotes_literals_containing_quotes() {
        assert_eq!(literal("plain"), "'plain'");
        assert_eq!(literal("it's"), "\"it's\"");
        assert_eq!(literal(r#"it's "x""#), r#"concat('it', "'", 's "x"')"#);
    }

    #[test]
    fn malformed_selector_is_syntax_error() {
        let err = css_to_xpath("div[").unwrap_err();
        assert!(err.is_selector_syntax());
        assert!(err.is_configuration());
    }
}
