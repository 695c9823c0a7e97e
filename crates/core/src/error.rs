// ABOUTME: Error types for the extraction engine including ErrorCode enum and ScraperError struct.
// ABOUTME: Provides categorized configuration errors with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing the categories of engine failures.
///
/// Both codes describe a setup problem: they are fatal to the offending
/// selector or page and are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Configuration,
    SelectorSyntax,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::Configuration => "configuration error",
            ErrorCode::SelectorSyntax => "selector syntax error",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for engine operations.
///
/// `subject` names what was being processed: a selectors key, a selector
/// string, or a URL pattern.
#[derive(Debug, thiserror::Error)]
pub struct ScraperError {
    pub code: ErrorCode,
    pub subject: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ScraperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "docsearch: {} {:?}: {}", self.op, self.subject, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ScraperError {
    /// Create a Configuration error.
    pub fn configuration(
        subject: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::Configuration,
            subject: subject.into(),
            op: op.into(),
            source,
        }
    }

    /// Create a SelectorSyntax error.
    pub fn selector_syntax(
        selector: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::SelectorSyntax,
            subject: selector.into(),
            op: op.into(),
            source,
        }
    }

    /// Returns true for any configuration-shaped error, selector syntax included.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::Configuration | ErrorCode::SelectorSyntax
        )
    }

    /// Returns true if this is a SelectorSyntax error.
    pub fn is_selector_syntax(&self) -> bool {
        self.code == ErrorCode::SelectorSyntax
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ScraperError>;
