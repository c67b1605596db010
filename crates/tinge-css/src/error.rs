//! Error types for document queries.

use thiserror::Error;

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, CssError>;

/// Errors raised while querying a page document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CssError {
    /// A selector could not be parsed.
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// A relative URL could not be resolved against the page.
    #[error("cannot resolve `{href}` against the page URL")]
    UnresolvableUrl { href: String },
}
