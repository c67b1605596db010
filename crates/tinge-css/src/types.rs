use std::sync::OnceLock;

use crate::color::Rgba;

/// Limits for stylesheet processing. Count-based only, so the cascade
/// result never depends on how fast the machine is.
#[derive(Debug, Clone, Copy)]
pub struct CssBudgets {
    /// Selector rules kept per page; later rules are dropped with a warning.
    pub max_rules: usize,
}

impl Default for CssBudgets {
    fn default() -> Self {
        Self { max_rules: 250_000 }
    }
}

/// Read budgets from `TINGE_CSS_MAX_RULES`.
pub fn budgets_from_env() -> &'static CssBudgets {
    static BUDGETS: OnceLock<CssBudgets> = OnceLock::new();
    BUDGETS.get_or_init(|| CssBudgets {
        max_rules: read_env("TINGE_CSS_MAX_RULES").unwrap_or(CssBudgets::default().max_rules),
    })
}

fn read_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.trim().parse().ok()
}

/// The user-agent environment media queries are evaluated against.
/// Only the color-scheme preference is modelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MediaEnvironment {
    pub prefers_dark: bool,
}

impl MediaEnvironment {
    /// Whether an `@media` prelude applies. Preludes that name
    /// `prefers-color-scheme` match on the scheme alone; any other
    /// condition is treated as not matching.
    pub fn matches_prelude(&self, prelude: &str) -> bool {
        let compact: String = prelude
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        if compact.contains("prefers-color-scheme:dark") {
            self.prefers_dark
        } else if compact.contains("prefers-color-scheme:light") {
            !self.prefers_dark
        } else {
            false
        }
    }
}

/// Side order used by `border_colors`.
pub const BORDER_SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

/// The subset of computed style the theme heuristics read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedStyle {
    /// `None` when transparent (the initial value).
    pub background_color: Option<Rgba>,
    /// Inherited. `None` when nothing in the ancestor chain declares it.
    pub color: Option<Rgba>,
    /// Declared border colors in [`BORDER_SIDES`] order.
    pub border_colors: [Option<Rgba>; 4],
    /// Inherited. `None` corresponds to `inherit` all the way up.
    pub font_family: Option<String>,
}

impl ComputedStyle {
    /// Text color as painted: the declared color or the UA default black.
    pub fn text_color(&self) -> Rgba {
        self.color.unwrap_or(Rgba::BLACK)
    }
}
