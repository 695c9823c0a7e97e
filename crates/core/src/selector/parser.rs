// ABOUTME: Hand-written parser for the CSS selector dialect used in site configurations.
// ABOUTME: Produces a small AST that renders both to XPath and back to CSS for dom_query matching.

//! CSS selector parsing.
//!
//! The dialect covers what documentation-site configs use in practice:
//! type/universal selectors, ids, classes, attribute selectors, the four
//! combinators, structural pseudo-classes, `:not()`, and a trailing `::text`
//! pseudo-element selecting the direct text children of each match.

use std::fmt;

/// A parse failure with the character offset at which it was detected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("unexpected character {ch:?} at offset {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("unexpected end of selector")]
    UnexpectedEnd,
    #[error("expected selector at offset {0}")]
    ExpectedSelector(usize),
    #[error("unsupported selector construct: {0}")]
    Unsupported(String),
    #[error("invalid nth expression {0:?}")]
    InvalidNth(String),
    #[error("::text must be the last part of a selector")]
    MisplacedText,
    #[error("cannot mix ::text and element selectors in one selector list")]
    MixedText,
}

/// A comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
    /// True when every selector in the list ends in `::text`.
    pub text_nodes: bool,
}

/// Compound selectors chained by combinators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    pub head: Compound,
    pub tail: Vec<(Combinator, Compound)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

/// A type selector plus filters. `tag: None` is the universal selector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compound {
    pub tag: Option<String>,
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Id(String),
    Class(String),
    Attribute {
        name: String,
        matcher: Option<(AttrOp, String)>,
    },
    Pseudo(Pseudo),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    Equals,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

impl AttrOp {
    fn as_str(self) -> &'static str {
        match self {
            AttrOp::Equals => "=",
            AttrOp::Includes => "~=",
            AttrOp::DashMatch => "|=",
            AttrOp::Prefix => "^=",
            AttrOp::Suffix => "$=",
            AttrOp::Substring => "*=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pseudo {
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    Empty,
    Root,
    NthChild(Nth),
    NthLastChild(Nth),
    NthOfType(Nth),
    NthLastOfType(Nth),
    Not(Box<Compound>),
}

/// An `an+b` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nth {
    pub a: i64,
    pub b: i64,
}

impl Nth {
    /// Coefficients are bounded to `i32`, as browsers' CSS parsers do.
    fn parse(raw: &str) -> Result<Self, SyntaxError> {
        let invalid = || SyntaxError::InvalidNth(raw.to_string());
        let compact: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        match compact.as_str() {
            "" => return Err(invalid()),
            "odd" => return Ok(Nth { a: 2, b: 1 }),
            "even" => return Ok(Nth { a: 2, b: 0 }),
            _ => {}
        }

        let Some((a_part, b_part)) = compact.split_once('n') else {
            let b = compact.parse::<i32>().map(i64::from).map_err(|_| invalid())?;
            return Ok(Nth { a: 0, b });
        };

        let a = match a_part {
            "" | "+" => 1,
            "-" => -1,
            other => other.parse::<i32>().map(i64::from).map_err(|_| invalid())?,
        };
        let b = match b_part {
            "" => 0,
            other if other.starts_with('+') || other.starts_with('-') => {
                other.parse::<i32>().map(i64::from).map_err(|_| invalid())?
            }
            _ => return Err(invalid()),
        };
        Ok(Nth { a, b })
    }
}

impl fmt::Display for Nth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 0 {
            write!(f, "{}", self.b)
        } else {
            write!(f, "{}n{:+}", self.a, self.b)
        }
    }
}

/// Parses a selector list. The input must not be empty.
pub fn parse(input: &str) -> Result<SelectorList, SyntaxError> {
    let mut parser = Parser {
        chars: input.chars().collect(),
        pos: 0,
    };
    parser.selector_list()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn expect(&mut self, want: char) -> Result<(), SyntaxError> {
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(ch) => Err(SyntaxError::UnexpectedChar {
                ch,
                pos: self.pos - 1,
            }),
            None => Err(SyntaxError::UnexpectedEnd),
        }
    }

    /// Skips whitespace and reports whether any was consumed.
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn unexpected(&self) -> SyntaxError {
        match self.peek() {
            Some(ch) => SyntaxError::UnexpectedChar { ch, pos: self.pos },
            None => SyntaxError::UnexpectedEnd,
        }
    }

    fn selector_list(&mut self) -> Result<SelectorList, SyntaxError> {
        let mut selectors = Vec::new();
        let mut text_flags = Vec::new();

        loop {
            self.skip_ws();
            let (selector, text_nodes) = self.complex()?;
            selectors.push(selector);
            text_flags.push(text_nodes);
            self.skip_ws();
            match self.peek() {
                None => break,
                Some(',') => {
                    self.pos += 1;
                }
                Some(_) => return Err(self.unexpected()),
            }
        }

        let text_nodes = text_flags.iter().all(|t| *t);
        if !text_nodes && text_flags.iter().any(|t| *t) {
            return Err(SyntaxError::MixedText);
        }
        Ok(SelectorList {
            selectors,
            text_nodes,
        })
    }

    fn complex(&mut self) -> Result<(ComplexSelector, bool), SyntaxError> {
        let (head, mut text_nodes) = self.compound()?;
        let mut tail = Vec::new();

        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(_) if had_ws => Combinator::Descendant,
                Some(_) => return Err(self.unexpected()),
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                self.skip_ws();
            }
            if text_nodes {
                return Err(SyntaxError::MisplacedText);
            }
            let (compound, text) = self.compound()?;
            text_nodes = text;
            tail.push((combinator, compound));
        }

        Ok((ComplexSelector { head, tail }, text_nodes))
    }

    /// Parses one compound selector and reports whether it ended in `::text`.
    fn compound(&mut self) -> Result<(Compound, bool), SyntaxError> {
        let start = self.pos;
        let mut compound = Compound::default();
        let mut text_nodes = false;

        match self.peek() {
            Some('*') => {
                self.pos += 1;
            }
            Some(c) if is_ident_start(c) => {
                compound.tag = Some(self.ident()?.to_ascii_lowercase());
            }
            _ => {}
        }

        while let Some(c) = self.peek() {
            match c {
                '#' | '.' | '[' | ':' if text_nodes => {
                    return Err(SyntaxError::MisplacedText);
                }
                '#' => {
                    self.pos += 1;
                    compound.filters.push(Filter::Id(self.ident()?));
                }
                '.' => {
                    self.pos += 1;
                    compound.filters.push(Filter::Class(self.ident()?));
                }
                '[' => {
                    self.pos += 1;
                    compound.filters.push(self.attribute()?);
                }
                ':' if self.peek_at(1) == Some(':') => {
                    self.pos += 2;
                    let name = self.ident()?;
                    if !name.eq_ignore_ascii_case("text") {
                        return Err(SyntaxError::Unsupported(format!("::{}", name)));
                    }
                    text_nodes = true;
                }
                ':' => {
                    self.pos += 1;
                    let pseudo = self.pseudo()?;
                    compound.filters.push(Filter::Pseudo(pseudo));
                }
                _ => break,
            }
        }

        if self.pos == start {
            return Err(match self.peek() {
                Some(_) => SyntaxError::ExpectedSelector(self.pos),
                None => SyntaxError::UnexpectedEnd,
            });
        }
        Ok((compound, text_nodes))
    }

    fn attribute(&mut self) -> Result<Filter, SyntaxError> {
        self.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_ws();

        let op = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(Filter::Attribute {
                    name,
                    matcher: None,
                });
            }
            Some('=') => {
                self.pos += 1;
                AttrOp::Equals
            }
            Some(c) => {
                let op = match c {
                    '~' => AttrOp::Includes,
                    '|' => AttrOp::DashMatch,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    '*' => AttrOp::Substring,
                    _ => return Err(self.unexpected()),
                };
                self.pos += 1;
                self.expect('=')?;
                op
            }
            None => return Err(SyntaxError::UnexpectedEnd),
        };

        self.skip_ws();
        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                self.string(q)?
            }
            Some(_) => self.ident()?,
            None => return Err(SyntaxError::UnexpectedEnd),
        };
        self.skip_ws();
        if self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            return Err(SyntaxError::Unsupported(
                "attribute selector flags".to_string(),
            ));
        }
        self.expect(']')?;

        Ok(Filter::Attribute {
            name,
            matcher: Some((op, value)),
        })
    }

    fn pseudo(&mut self) -> Result<Pseudo, SyntaxError> {
        let name = self.ident()?.to_ascii_lowercase();

        if self.peek() != Some('(') {
            return match name.as_str() {
                "first-child" => Ok(Pseudo::FirstChild),
                "last-child" => Ok(Pseudo::LastChild),
                "only-child" => Ok(Pseudo::OnlyChild),
                "first-of-type" => Ok(Pseudo::FirstOfType),
                "last-of-type" => Ok(Pseudo::LastOfType),
                "only-of-type" => Ok(Pseudo::OnlyOfType),
                "empty" => Ok(Pseudo::Empty),
                "root" => Ok(Pseudo::Root),
                _ => Err(SyntaxError::Unsupported(format!(":{}", name))),
            };
        }
        self.pos += 1;

        if name == "not" {
            self.skip_ws();
            let (inner, text_nodes) = self.compound()?;
            if text_nodes {
                return Err(SyntaxError::MisplacedText);
            }
            if inner
                .filters
                .iter()
                .any(|f| matches!(f, Filter::Pseudo(Pseudo::Not(_))))
            {
                return Err(SyntaxError::Unsupported("nested :not()".to_string()));
            }
            self.skip_ws();
            self.expect(')')?;
            return Ok(Pseudo::Not(Box::new(inner)));
        }

        let mut raw = String::new();
        loop {
            match self.bump() {
                Some(')') => break,
                Some(c) => raw.push(c),
                None => return Err(SyntaxError::UnexpectedEnd),
            }
        }
        let nth = Nth::parse(&raw)?;
        match name.as_str() {
            "nth-child" => Ok(Pseudo::NthChild(nth)),
            "nth-last-child" => Ok(Pseudo::NthLastChild(nth)),
            "nth-of-type" => Ok(Pseudo::NthOfType(nth)),
            "nth-last-of-type" => Ok(Pseudo::NthLastOfType(nth)),
            _ => Err(SyntaxError::Unsupported(format!(":{}()", name))),
        }
    }

    fn ident(&mut self) -> Result<String, SyntaxError> {
        let mut out = String::new();
        match self.peek() {
            Some('\\') => {}
            Some(c) if is_ident_start(c) => {}
            Some(_) => return Err(self.unexpected()),
            None => return Err(SyntaxError::UnexpectedEnd),
        }
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                out.push(self.escape()?);
            } else if is_ident_char(c) {
                self.pos += 1;
                out.push(c);
            } else {
                break;
            }
        }
        Ok(out)
    }

    /// Decodes the escape following a consumed backslash: 1 to 6 hex digits
    /// plus one optional whitespace character, or any other single character.
    fn escape(&mut self) -> Result<char, SyntaxError> {
        let start = self.pos;
        while self.pos - start < 6 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            self.pos += 1;
        }

        if self.pos == start {
            return match self.bump() {
                Some(ch @ ('\n' | '\r' | '\x0c')) => Err(SyntaxError::UnexpectedChar {
                    ch,
                    pos: self.pos - 1,
                }),
                Some(ch) => Ok(ch),
                None => Err(SyntaxError::UnexpectedEnd),
            };
        }

        let hex: String = self.chars[start..self.pos].iter().collect();
        match self.peek() {
            Some('\r') => {
                self.pos += 1;
                if self.peek() == Some('\n') {
                    self.pos += 1;
                }
            }
            Some(' ' | '\t' | '\n' | '\x0c') => self.pos += 1,
            _ => {}
        }

        let code = u32::from_str_radix(&hex, 16).unwrap_or(0);
        Ok(match char::from_u32(code) {
            Some('\0') | None => char::REPLACEMENT_CHARACTER,
            Some(ch) => ch,
        })
    }

    fn string(&mut self, quote: char) -> Result<String, SyntaxError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('\\') if matches!(self.peek(), Some('\n' | '\r' | '\x0c')) => {
                    // Escaped newline is a line continuation inside strings.
                    if self.bump() == Some('\r') && self.peek() == Some('\n') {
                        self.pos += 1;
                    }
                }
                Some('\\') => out.push(self.escape()?),
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
                None => return Err(SyntaxError::UnexpectedEnd),
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}

fn write_ident(f: &mut fmt::Formatter<'_>, ident: &str) -> fmt::Result {
    for (i, c) in ident.chars().enumerate() {
        if (i == 0 && c.is_ascii_digit()) || c.is_control() {
            write!(f, "\\{:x} ", c as u32)?;
        } else if is_ident_char(c) {
            write!(f, "{}", c)?;
        } else {
            write!(f, "\\{}", c)?;
        }
    }
    Ok(())
}

// Display renders CSS without any `::text` suffix; that part is carried by
// `SelectorList::text_nodes` and applied at query time.

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write_ident(f, tag)?,
            None if self.filters.is_empty() => write!(f, "*")?,
            None => {}
        }
        for filter in &self.filters {
            match filter {
                Filter::Id(id) => {
                    write!(f, "#")?;
                    write_ident(f, id)?;
                }
                Filter::Class(class) => {
                    write!(f, ".")?;
                    write_ident(f, class)?;
                }
                Filter::Attribute { name, matcher } => {
                    write!(f, "[")?;
                    write_ident(f, name)?;
                    if let Some((op, value)) = matcher {
                        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
                        write!(f, "{}\"{}\"", op.as_str(), escaped)?;
                    }
                    write!(f, "]")?;
                }
                Filter::Pseudo(pseudo) => match pseudo {
                    Pseudo::FirstChild => write!(f, ":first-child")?,
                    Pseudo::LastChild => write!(f, ":last-child")?,
                    Pseudo::OnlyChild => write!(f, ":only-child")?,
                    Pseudo::FirstOfType => write!(f, ":first-of-type")?,
                    Pseudo::LastOfType => write!(f, ":last-of-type")?,
                    Pseudo::OnlyOfType => write!(f, ":only-of-type")?,
                    Pseudo::Empty => write!(f, ":empty")?,
                    Pseudo::Root => write!(f, ":root")?,
                    Pseudo::NthChild(nth) => write!(f, ":nth-child({})", nth)?,
                    Pseudo::NthLastChild(nth) => write!(f, ":nth-last-child({})", nth)?,
                    Pseudo::NthOfType(nth) => write!(f, ":nth-of-type({})", nth)?,
                    Pseudo::NthLastOfType(nth) => write!(f, ":nth-last-of-type({})", nth)?,
                    Pseudo::Not(inner) => write!(f, ":not({})", inner)?,
                },
            }
        }
        Ok(())
    }
}

impl fmt::Display for ComplexSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head)?;
        for (combinator, compound) in &self.tail {
            let sep = match combinator {
                Combinator::Descendant => " ",
                Combinator::Child => " > ",
                Combinator::NextSibling => " + ",
                Combinator::SubsequentSibling => " ~ ",
            };
            write!(f, "{}{}", sep, compound)?;
        }
        Ok(())
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, selector) in self.selectors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", selector)?;
        }
        Ok(())
    }
}
