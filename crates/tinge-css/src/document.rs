//! A parsed host page with stylesheet-backed computed styles.

use std::fs;
use std::path::PathBuf;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::cascade::StyleSheet;
use crate::diagnostics::diagnostics_enabled;
use crate::error::{CssError, Result};
use crate::properties::compute_style;
use crate::types::{ComputedStyle, MediaEnvironment};

/// Where a page came from and the environment it is evaluated in.
#[derive(Debug, Clone, Default)]
pub struct PageOptions {
    /// Directory used to resolve relative `<link rel="stylesheet">` hrefs.
    pub base_path: Option<PathBuf>,
    /// The page location (`window.location`).
    pub base_url: Option<Url>,
    pub media: MediaEnvironment,
}

pub struct PageDocument {
    html: Html,
    sheet: StyleSheet,
    options: PageOptions,
}

impl PageDocument {
    pub fn parse(source: &str, options: PageOptions) -> Self {
        let html = Html::parse_document(source);
        let sheet = build_stylesheet(&html, &options);
        Self {
            html,
            sheet,
            options,
        }
    }

    pub fn media(&self) -> MediaEnvironment {
        self.options.media
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.options.base_url.as_ref()
    }

    /// `location.hostname`; `None` for file URLs or pages without a location.
    pub fn hostname(&self) -> Option<&str> {
        self.base_url()
            .and_then(|u| u.host_str())
            .filter(|h| !h.is_empty())
    }

    /// Resolve an attribute URL against the page location.
    pub fn resolve_url(&self, href: &str) -> Result<Url> {
        let href = href.trim();
        let unresolvable = || CssError::UnresolvableUrl {
            href: href.to_string(),
        };
        if href.is_empty() {
            return Err(unresolvable());
        }
        match Url::parse(href) {
            Ok(url) => Ok(url),
            Err(_) => self
                .base_url()
                .and_then(|base| base.join(href).ok())
                .ok_or_else(unresolvable),
        }
    }

    /// The document element (`<html>`).
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    pub fn body(&self) -> Option<ElementRef<'_>> {
        self.select_first("body").ok().flatten()
    }

    pub fn title(&self) -> Option<String> {
        let el = self.select_first("title").ok().flatten()?;
        let text = el.text().collect::<String>();
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        (!text.is_empty()).then_some(text)
    }

    /// `querySelector`.
    pub fn select_first(&self, selector: &str) -> Result<Option<ElementRef<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).next())
    }

    /// `querySelectorAll`, capped at `limit` matches in document order.
    pub fn select_all(&self, selector: &str, limit: usize) -> Result<Vec<ElementRef<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).take(limit).collect())
    }

    /// `getComputedStyle` restricted to the properties in [`ComputedStyle`].
    ///
    /// Styles are computed from the root down the ancestor chain, so
    /// nesting depth costs time but not stack.
    pub fn computed_style(&self, el: &ElementRef) -> ComputedStyle {
        let mut chain: Vec<ElementRef> = el.ancestors().filter_map(ElementRef::wrap).collect();
        chain.reverse();
        chain.push(el.clone());

        let mut style: Option<ComputedStyle> = None;
        for node in &chain {
            let declared = self.sheet.declared_for(node, node.value().attr("style"));
            style = Some(compute_style(&declared, style.as_ref()));
        }
        style.unwrap_or_default()
    }

    /// `getComputedStyle(documentElement).getPropertyValue(name)`, trimmed.
    /// Inline custom properties on `<html>` take precedence over stylesheets.
    pub fn root_custom_property(&self, name: &str) -> Option<String> {
        let root = self.root();
        self.sheet
            .declared_for(&root, root.value().attr("style"))
            .get(name)
            .cloned()
            .or_else(|| self.sheet.root_var(name))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|err| CssError::InvalidSelector {
        selector: selector.to_string(),
        reason: format!("{err:?}"),
    })
}

/// Build a stylesheet from `<style>` blocks and local `<link rel="stylesheet">` files.
fn build_stylesheet(document: &Html, options: &PageOptions) -> StyleSheet {
    let mut sources: Vec<String> = Vec::new();

    if let Ok(sel) = Selector::parse("style, link") {
        for node in document.select(&sel) {
            let el = node.value();
            if el.name().eq_ignore_ascii_case("style") {
                let css = node.text().collect::<String>();
                if !css.trim().is_empty() {
                    sources.push(css);
                }
                continue;
            }
            let rel = el.attr("rel").unwrap_or("").to_ascii_lowercase();
            if !rel.split_whitespace().any(|r| r == "stylesheet") {
                continue;
            }
            if let Some(css) = el.attr("href").and_then(|href| read_stylesheet_link(href, options)) {
                sources.push(css);
            }
        }
    }

    StyleSheet::from_sources(&sources, options.media)
}

fn read_stylesheet_link(href: &str, options: &PageOptions) -> Option<String> {
    let trimmed = href.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        if url.scheme() == "file" {
            return url.to_file_path().ok().and_then(|p| fs::read_to_string(p).ok());
        }
        if diagnostics_enabled("css") {
            tracing::debug!(href = %href, "diagnostics: skipped remote stylesheet link");
        }
        return None;
    }
    let base = options.base_path.as_ref()?;
    let path = base.join(trimmed.trim_start_matches('/'));
    fs::read_to_string(path).ok()
}
