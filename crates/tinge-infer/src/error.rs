use std::fmt;

use thiserror::Error;
use tinge_css::CssError;

pub type Result<T> = std::result::Result<T, InferError>;

/// The inference step an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    DarkMode,
    Palette,
    Icons,
    Branding,
    Assembly,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::DarkMode => "dark-mode",
            Stage::Palette => "palette",
            Stage::Icons => "icons",
            Stage::Branding => "branding",
            Stage::Assembly => "assembly",
        })
    }
}

#[derive(Error, Debug)]
pub enum InferError {
    #[error("{stage}: {source}")]
    Query {
        stage: Stage,
        #[source]
        source: CssError,
    },

    #[error("default asset url `{url}` is invalid: {source}")]
    DefaultAsset {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl InferError {
    pub(crate) fn query(stage: Stage) -> impl FnOnce(CssError) -> InferError {
        move |source| InferError::Query { stage, source }
    }

    pub fn stage(&self) -> Stage {
        match self {
            InferError::Query { stage, .. } => *stage,
            InferError::DefaultAsset { .. } => Stage::Assembly,
        }
    }
}
