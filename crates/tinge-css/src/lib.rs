//! Host-page documents with the slice of `getComputedStyle` that theme
//! inference needs: author stylesheets, selector cascade, inheritance of
//! `color`/`font-family`, custom properties and color-scheme media blocks.

mod cascade;
mod color;
mod diagnostics;
mod document;
mod element;
mod error;
mod properties;
mod selector;
mod types;

pub use cascade::StyleSheet;
pub use color::Rgba;
pub use diagnostics::diagnostics_enabled;
pub use document::{PageDocument, PageOptions};
pub use error::{CssError, Result};
pub use types::{BORDER_SIDES, ComputedStyle, CssBudgets, MediaEnvironment, budgets_from_env};

// Element handles returned by `PageDocument` queries.
pub use scraper::ElementRef;
