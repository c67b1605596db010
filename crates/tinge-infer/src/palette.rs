//! Color palette sampling.

use serde::Serialize;
use tinge_css::{PageDocument, Rgba, diagnostics_enabled};
use tracing::{debug, warn};

use crate::color::is_vibrant;
use crate::error::{InferError, Result, Stage};
use crate::tables::{BRAND_CUSTOM_PROPERTIES, PALETTE_MATCH_LIMIT, PALETTE_SAMPLES};

/// Colors sampled from a page, each list deduplicated in first-seen order.
///
/// Values are browser serializations (`rgb(r, g, b)`), except design-token
/// custom properties which are kept as written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorScheme {
    pub backgrounds: Vec<String>,
    pub text_colors: Vec<String>,
    pub accent_colors: Vec<String>,
    pub theme_colors: Vec<String>,
    pub border_colors: Vec<String>,
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

impl ColorScheme {
    fn record(&mut self, color: Rgba, accent: bool, bucket: fn(&mut Self) -> &mut Vec<String>) {
        let css = color.to_css();
        if is_vibrant(&color) {
            push_unique(&mut self.theme_colors, css.clone());
        }
        if accent {
            push_unique(&mut self.accent_colors, css.clone());
        }
        push_unique(bucket(self), css);
    }

    /// Put design tokens ahead of everything sampled.
    fn prepend_tokens(&mut self, tokens: Vec<String>) {
        for list in [&mut self.theme_colors, &mut self.accent_colors] {
            let mut merged = Vec::with_capacity(tokens.len() + list.len());
            for value in tokens.iter().cloned().chain(list.drain(..)) {
                push_unique(&mut merged, value);
            }
            *list = merged;
        }
    }
}

/// Sample the page's palette. Never fails; selector errors are logged and
/// an empty scheme is returned.
pub fn extract_color_scheme(page: &PageDocument) -> ColorScheme {
    try_extract_color_scheme(page).unwrap_or_else(|err| {
        warn!(stage = %err.stage(), error = %err, "palette extraction failed");
        ColorScheme::default()
    })
}

pub(crate) fn try_extract_color_scheme(page: &PageDocument) -> Result<ColorScheme> {
    let mut scheme = ColorScheme::default();

    for target in PALETTE_SAMPLES {
        let matches = page
            .select_all(target.selector, PALETTE_MATCH_LIMIT)
            .map_err(InferError::query(Stage::Palette))?;
        if diagnostics_enabled("infer") {
            debug!(selector = target.selector, matches = matches.len(), "palette sample");
        }
        for el in matches {
            let style = page.computed_style(&el);
            if let Some(bg) = style.background_color {
                scheme.record(bg, target.accent, |s| &mut s.backgrounds);
            }
            if let Some(text) = style.color.filter(|c| !c.is_transparent()) {
                scheme.record(text, target.accent, |s| &mut s.text_colors);
            }
            for border in style.border_colors.into_iter().flatten() {
                scheme.record(border, false, |s| &mut s.border_colors);
            }
        }
    }

    let tokens: Vec<String> = BRAND_CUSTOM_PROPERTIES
        .iter()
        .filter_map(|name| page.root_custom_property(name))
        .collect();
    if !tokens.is_empty() {
        debug!(?tokens, "design tokens found");
        scheme.prepend_tokens(tokens);
    }

    Ok(scheme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinge_css::PageOptions;

    fn page(html: &str) -> PageDocument {
        PageDocument::parse(html, PageOptions::default())
    }

    #[test]
    fn empty_page_has_no_colors() {
        let scheme = extract_color_scheme(&page("<html><body></body></html>"));
        assert_eq!(scheme, ColorScheme::default());
    }

    #[test]
    fn buttons_feed_accents_and_vibrant_feeds_theme() {
        let scheme = extract_color_scheme(&page(
            r#"<html><head><style>
                 .btn { background-color: #0066cc; color: #ffffff; }
                 header { background: #f8f8f8; border-bottom: 1px solid #e63946; }
               </style></head><body>
                 <header>Site</header>
                 <button class="btn">Go</button>
               </body></html>"#,
        ));
        assert_eq!(scheme.backgrounds, vec!["rgb(248, 248, 248)", "rgb(0, 102, 204)"]);
        assert_eq!(scheme.accent_colors, vec!["rgb(0, 102, 204)", "rgb(255, 255, 255)"]);
        assert_eq!(scheme.theme_colors, vec!["rgb(230, 57, 70)", "rgb(0, 102, 204)"]);
        assert_eq!(scheme.border_colors, vec!["rgb(230, 57, 70)"]);
        assert_eq!(scheme.text_colors, vec!["rgb(255, 255, 255)"]);
    }

    #[test]
    fn transparent_colors_are_skipped() {
        let scheme = extract_color_scheme(&page(
            r#"<html><body><nav style="background-color: rgba(0, 0, 0, 0); border-color: transparent">x</nav></body></html>"#,
        ));
        assert!(scheme.backgrounds.is_empty());
        assert!(scheme.border_colors.is_empty());
    }

    #[test]
    fn design_tokens_lead_theme_and_accent() {
        let scheme = extract_color_scheme(&page(
            r#"<html><head><style>
                 :root { --brand-color: #ff6600; --primary: #123456; }
                 a { color: #2a9d8f; }
               </style></head><body><a href="/">home</a></body></html>"#,
        ));
        assert_eq!(scheme.theme_colors[..2], ["#123456", "#ff6600"]);
        assert_eq!(scheme.accent_colors[..2], ["#123456", "#ff6600"]);
        assert!(scheme.theme_colors.contains(&"rgb(42, 157, 143)".to_string()));
    }

    #[test]
    fn duplicates_collapse() {
        let scheme = extract_color_scheme(&page(
            r#"<html><body>
                 <h1 style="color:#c0392b">a</h1><h2 style="color:#c0392b">b</h2>
               </body></html>"#,
        ));
        assert_eq!(scheme.text_colors, vec!["rgb(192, 57, 43)"]);
        assert_eq!(scheme.theme_colors, vec!["rgb(192, 57, 43)"]);
    }
}
