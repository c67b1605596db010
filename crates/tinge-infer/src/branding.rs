//! Site name and brand font resolution.
//!
//! Tiers are tried in order (branding elements, meta tags, the document
//! title, the hostname) and the first valid name wins. A tier that errors
//! is logged and skipped.

use std::sync::OnceLock;

use regex::{Regex, RegexSet};
use tinge_css::{ElementRef, PageDocument, diagnostics_enabled};
use tracing::{debug, warn};
use url::Url;

use crate::error::{InferError, Result, Stage};
use crate::icons::declared_favicons;
use crate::profile::{BrandingMethod, SiteBranding};
use crate::tables::{
    BRANDING_SELECTORS, DOMAIN_PREFIXES, FALLBACK_SITE_NAME, FONT_FALLBACK_SELECTORS,
    GENERIC_TITLE_PATTERNS, INHERIT_FONT, META_TAGS, MetaValue, NOISE_NAME_PATTERNS,
    SITE_NAME_MAX_CHARS, SPECIAL_DOMAINS, TITLE_SEPARATORS,
};

fn case_insensitive(patterns: &[&str]) -> RegexSet {
    RegexSet::new(patterns.iter().map(|p| format!("(?i){p}"))).expect("valid pattern table")
}

fn noise_patterns() -> &'static RegexSet {
    static SET: OnceLock<RegexSet> = OnceLock::new();
    SET.get_or_init(|| case_insensitive(NOISE_NAME_PATTERNS))
}

fn generic_patterns() -> &'static RegexSet {
    static SET: OnceLock<RegexSet> = OnceLock::new();
    SET.get_or_init(|| case_insensitive(GENERIC_TITLE_PATTERNS))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether `name` could be a site name: 1 to 50 characters and not a
/// number, bare punctuation, a navigation word or a placeholder.
pub fn is_valid_site_name(name: &str) -> bool {
    let name = name.trim();
    let len = name.chars().count();
    (1..=SITE_NAME_MAX_CHARS).contains(&len) && !noise_patterns().is_match(name)
}

/// Normalize candidate text: collapse whitespace, drop a leading "The " and
/// a trailing "logo"/"brand"/"site".
pub fn clean_site_name(raw: &str) -> String {
    static SUFFIX: OnceLock<Regex> = OnceLock::new();
    let mut name = collapse_whitespace(raw);
    if name.len() > 4 && name.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("the ")) {
        name = name[4..].trim_start().to_string();
    }
    let suffix = SUFFIX.get_or_init(|| Regex::new(r"(?i)\s+(logo|brand|site)$").expect("valid suffix regex"));
    suffix.replace(&name, "").trim().to_string()
}

fn is_generic(part: &str) -> bool {
    generic_patterns().is_match(part.trim())
}

/// Pick the site name out of a `<title>`.
///
/// The title is split on the first separator it contains. Of several
/// segments, non-generic ones are preferred, capitalized ones among those,
/// then the shortest; when every segment is generic the shortest wins.
pub fn parse_document_title(title: &str) -> Option<String> {
    let title = collapse_whitespace(title);
    let parts: Vec<&str> = match TITLE_SEPARATORS.iter().find(|sep| title.contains(**sep)) {
        Some(sep) => title.split(*sep).map(str::trim).filter(|p| !p.is_empty()).collect(),
        None => vec![title.trim()],
    };

    let chosen = match parts.as_slice() {
        [] => return None,
        [only] => *only,
        _ => {
            let specific: Vec<&str> = parts.iter().copied().filter(|p| !is_generic(p)).collect();
            let capitalized: Vec<&str> = specific
                .iter()
                .copied()
                .filter(|p| p.chars().next().is_some_and(char::is_uppercase))
                .collect();
            let pool = if !capitalized.is_empty() {
                capitalized
            } else if !specific.is_empty() {
                specific
            } else {
                parts.clone()
            };
            shortest(&pool)?
        }
    };

    let cleaned = clean_site_name(chosen);
    is_valid_site_name(&cleaned).then_some(cleaned)
}

fn shortest<'a>(parts: &[&'a str]) -> Option<&'a str> {
    parts.iter().copied().min_by_key(|p| p.chars().count())
}

/// Display name derived from a hostname.
pub fn site_name_from_hostname(host: &str) -> Option<String> {
    let mut host = host.trim().trim_end_matches('.').to_ascii_lowercase();
    if let Some(prefix) = DOMAIN_PREFIXES.iter().find(|p| host.starts_with(**p)) {
        host = host[prefix.len()..].to_string();
    }
    let label = host.split('.').next().filter(|l| !l.is_empty())?;

    if let Some((_, name)) = SPECIAL_DOMAINS.iter().find(|(domain, _)| *domain == label) {
        return Some((*name).to_string());
    }

    let base = if label.contains('-') {
        let parts: Vec<&str> = label.split('-').filter(|p| !p.is_empty()).collect();
        if parts.iter().all(|p| p.len() <= 3) {
            parts.join(" ")
        } else {
            parts
                .iter()
                .copied()
                .fold("", |best, p| if p.len() > best.len() { p } else { best })
                .to_string()
        }
    } else {
        label.to_string()
    };
    capitalize(&base)
}

fn capitalize(text: &str) -> Option<String> {
    let mut chars = text.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

/// Text an element offers as a name, best source first.
fn element_texts(el: &ElementRef) -> Vec<String> {
    let mut texts = Vec::new();
    let value = el.value();
    if value.name() == "img" {
        texts.extend(value.attr("alt").map(str::to_string));
    } else if let Some(img) = el
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|d| d.value().name() == "img")
    {
        texts.extend(img.value().attr("alt").map(str::to_string));
    }
    texts.extend(value.attr("aria-label").map(str::to_string));
    texts.extend(value.attr("title").map(str::to_string));
    texts.push(el.text().collect::<String>());
    texts
}

struct Found {
    name: String,
    font: Option<String>,
}

fn from_branding_elements(page: &PageDocument) -> Result<Option<Found>> {
    for selector in BRANDING_SELECTORS {
        let matches = page
            .select_all(selector, usize::MAX)
            .map_err(InferError::query(Stage::Branding))?;
        for el in matches {
            let name = element_texts(&el)
                .iter()
                .map(|t| clean_site_name(t))
                .find(|t| is_valid_site_name(t));
            if let Some(name) = name {
                let font = page.computed_style(&el).font_family;
                debug!(selector, %name, "site name from branding element");
                return Ok(Some(Found { name, font }));
            }
            if diagnostics_enabled("infer") {
                debug!(selector, "branding element has no usable text");
            }
        }
    }
    Ok(None)
}

fn from_meta_tags(page: &PageDocument) -> Result<Option<String>> {
    for (selector, kind) in META_TAGS {
        let Some(el) = page
            .select_first(selector)
            .map_err(InferError::query(Stage::Branding))?
        else {
            continue;
        };
        let content = el.value().attr("content").unwrap_or("").trim();
        let name = match kind {
            MetaValue::Text => Some(clean_site_name(content)),
            MetaValue::Handle => Some(clean_site_name(content.trim_start_matches('@'))),
            MetaValue::Url => Url::parse(content)
                .ok()
                .and_then(|u| u.host_str().and_then(site_name_from_hostname)),
        };
        if let Some(name) = name.filter(|n| is_valid_site_name(n)) {
            debug!(selector, %name, "site name from meta tag");
            return Ok(Some(name));
        }
    }
    Ok(None)
}

fn fallback_font(page: &PageDocument) -> Result<Option<String>> {
    for selector in FONT_FALLBACK_SELECTORS {
        let Some(el) = page
            .select_first(selector)
            .map_err(InferError::query(Stage::Branding))?
        else {
            continue;
        };
        if let Some(font) = page
            .computed_style(&el)
            .font_family
            .filter(|f| !f.eq_ignore_ascii_case(INHERIT_FONT))
        {
            return Ok(Some(font));
        }
    }
    Ok(None)
}

fn recover<T>(tier: &str, result: Result<Option<T>>) -> Option<T> {
    result.unwrap_or_else(|err| {
        warn!(tier, stage = %err.stage(), error = %err, "branding tier failed");
        None
    })
}

/// Resolve the site's display name, brand font and declared favicon.
/// Never fails and never returns an empty name.
pub fn extract_website_branding(page: &PageDocument) -> SiteBranding {
    let mut font = None;

    let resolved = if let Some(found) = recover("elements", from_branding_elements(page)) {
        font = found.font;
        Some((found.name, BrandingMethod::LogoElement))
    } else if let Some(name) = recover("meta", from_meta_tags(page)) {
        Some((name, BrandingMethod::MetaTag))
    } else if let Some(name) = page.title().as_deref().and_then(parse_document_title) {
        debug!(%name, "site name from title");
        Some((name, BrandingMethod::DocumentTitle))
    } else {
        page.hostname()
            .and_then(site_name_from_hostname)
            .map(|name| (name, BrandingMethod::Domain))
    };
    let (name, method) =
        resolved.unwrap_or_else(|| (FALLBACK_SITE_NAME.to_string(), BrandingMethod::Fallback));

    if font.is_none() {
        font = recover("font", fallback_font(page));
    }
    let favicon_url = recover(
        "favicon",
        declared_favicons(page).map(|c| c.into_iter().next().map(|c| c.url)),
    );

    SiteBranding {
        name,
        font: font.unwrap_or_else(|| INHERIT_FONT.to_string()),
        favicon_url,
        method,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinge_css::PageOptions;

    fn page_at(html: &str, location: &str) -> PageDocument {
        PageDocument::parse(
            html,
            PageOptions {
                base_url: Url::parse(location).ok(),
                ..PageOptions::default()
            },
        )
    }

    #[test]
    fn name_validity() {
        for bad in ["Menu", "123", "!!!", "", "   ", "logo", "Sign In", "navigation"] {
            assert!(!is_valid_site_name(bad), "{bad:?}");
        }
        for good in ["TechCrunch", "Acme Corp", "3M", "Ars Technica"] {
            assert!(is_valid_site_name(good), "{good:?}");
        }
        assert!(!is_valid_site_name(&"x".repeat(51)));
    }

    #[test]
    fn cleaning() {
        assert_eq!(clean_site_name("  The   Verge "), "Verge");
        assert_eq!(clean_site_name("Acme logo"), "Acme");
        assert_eq!(clean_site_name("Theory Site"), "Theory");
        assert_eq!(clean_site_name("The"), "The");
    }

    #[test]
    fn title_parsing() {
        assert_eq!(parse_document_title("Breaking News | Acme Corp").as_deref(), Some("Acme Corp"));
        assert_eq!(parse_document_title("Dashboard - Acme").as_deref(), Some("Acme"));
        assert_eq!(parse_document_title("Widgets").as_deref(), Some("Widgets"));
        // every segment generic: shortest wins
        assert_eq!(parse_document_title("Latest News | Today").as_deref(), Some("Today"));
        assert_eq!(
            parse_document_title("how to bake bread \u{2014} Bakery Weekly").as_deref(),
            Some("Bakery Weekly")
        );
        assert_eq!(parse_document_title("Menu"), None);
        assert_eq!(parse_document_title("   "), None);
    }

    #[test]
    fn hostnames() {
        assert_eq!(site_name_from_hostname("www.nytimes.com").as_deref(), Some("The New York Times"));
        assert_eq!(site_name_from_hostname("app.acme.io").as_deref(), Some("Acme"));
        assert_eq!(site_name_from_hostname("m.abc-xyz.com").as_deref(), Some("Abc xyz"));
        assert_eq!(site_name_from_hostname("my-awesome-shop.net").as_deref(), Some("Awesome"));
        assert_eq!(site_name_from_hostname("GitHub.com").as_deref(), Some("GitHub"));
        assert_eq!(site_name_from_hostname(""), None);
    }

    #[test]
    fn branding_element_wins_and_captures_font() {
        let doc = page_at(
            r#"<html><head><title>Home | Other</title>
                 <style>.navbar-brand { font-family: "Playfair Display", serif; }</style>
               </head><body>
                 <a class="navbar-brand" href="/"><img src="/l.svg" alt="Northwind"></a>
               </body></html>"#,
            "https://northwind.test/",
        );
        let branding = extract_website_branding(&doc);
        assert_eq!(branding.name, "Northwind");
        assert_eq!(branding.method, BrandingMethod::LogoElement);
        assert_eq!(branding.font, r#""Playfair Display", serif"#);
    }

    #[test]
    fn noise_elements_fall_through_to_meta() {
        let doc = page_at(
            r#"<html><head>
                 <meta name="twitter:site" content="@acmehq">
                 <meta property="og:site_name" content="Acme Store">
               </head><body><div class="logo">Menu</div></body></html>"#,
            "https://acme.test/",
        );
        let branding = extract_website_branding(&doc);
        assert_eq!(branding.name, "Acme Store");
        assert_eq!(branding.method, BrandingMethod::MetaTag);
    }

    #[test]
    fn meta_handles_and_urls() {
        let handle = page_at(
            r#"<html><head><meta name="twitter:site" content="@Contoso"></head></html>"#,
            "https://x.test/",
        );
        assert_eq!(extract_website_branding(&handle).name, "Contoso");

        let url = page_at(
            r#"<html><head><meta property="al:web:url" content="https://www.fabrikam.com/p/1"></head></html>"#,
            "https://x.test/",
        );
        assert_eq!(extract_website_branding(&url).name, "Fabrikam");
    }

    #[test]
    fn domain_then_fallback() {
        let doc = page_at("<html><body></body></html>", "https://www.nytimes.com/section/world");
        let branding = extract_website_branding(&doc);
        assert_eq!(branding.name, "The New York Times");
        assert_eq!(branding.method, BrandingMethod::Domain);
        assert_eq!(branding.font, "inherit");
        assert_eq!(branding.favicon_url, None);

        let local = PageDocument::parse("<html><body></body></html>", PageOptions::default());
        let branding = extract_website_branding(&local);
        assert_eq!(branding.name, "this site");
        assert_eq!(branding.method, BrandingMethod::Fallback);
    }

    #[test]
    fn font_fallback_and_declared_favicon() {
        let doc = page_at(
            r#"<html><head>
                 <link rel="icon" href="/favicon-32.png">
                 <link rel="apple-touch-icon" href="/touch.png">
                 <style>h1 { font-family: Georgia, serif; }</style>
               </head><body><h1>Hello world</h1></body></html>"#,
            "https://blog.example.org/post",
        );
        let branding = extract_website_branding(&doc);
        assert_eq!(branding.font, "Georgia, serif");
        assert_eq!(
            branding.favicon_url.map(|u| u.to_string()).as_deref(),
            Some("https://blog.example.org/touch.png")
        );
        assert_eq!(branding.name, "Blog");
    }
}
