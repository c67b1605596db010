//! Favicon and logo discovery.

use std::sync::OnceLock;

use regex::Regex;
use tinge_css::{PageDocument, diagnostics_enabled};
use tinge_io::{ImageProbe, ProbeOutcome};
use tracing::{debug, warn};
use url::Url;

use crate::error::{InferError, Result, Stage};
use crate::tables::{FAVICON_FALLBACK_PATHS, FAVICON_LINKS, IMAGE_EXTENSIONS, LOGO_IMAGE_SELECTORS};

/// A favicon location and how strongly the page vouches for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconCandidate {
    pub url: Url,
    pub priority: u32,
}

/// Icons that loaded. `logo` falls back to the favicon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedIcons {
    pub favicon: Option<Url>,
    pub logo: Option<Url>,
}

/// Loose check that a URL names an image: a known extension on the path,
/// or a logo/brand/icon/favicon naming pattern anywhere in it.
pub fn is_valid_image_url(url: &str) -> bool {
    static NAMING: OnceLock<Regex> = OnceLock::new();
    let path = url.split(['?', '#']).next().unwrap_or("").to_ascii_lowercase();
    let has_extension = path
        .rsplit_once('.')
        .is_some_and(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext));
    has_extension
        || NAMING
            .get_or_init(|| Regex::new(r"(?i)(logo|brand|icon|favicon)").expect("valid naming regex"))
            .is_match(url)
}

/// Local files are candidates only on pages that are local themselves.
fn reachable_from(page: &PageDocument, url: &Url) -> bool {
    url.scheme() != "file" || page.base_url().is_some_and(|base| base.scheme() == "file")
}

/// Favicons declared with `<link>`, best first. Duplicate URLs keep their
/// highest priority.
pub fn declared_favicons(page: &PageDocument) -> Result<Vec<IconCandidate>> {
    let mut found = Vec::new();
    for link in FAVICON_LINKS {
        let matches = page
            .select_all(link.selector, usize::MAX)
            .map_err(InferError::query(Stage::Icons))?;
        for el in matches {
            let Some(href) = el.value().attr("href") else {
                continue;
            };
            match page.resolve_url(href) {
                Ok(url) if reachable_from(page, &url) => found.push(IconCandidate {
                    url,
                    priority: link.priority,
                }),
                Ok(url) => debug!(url = %url, "skipping local favicon on a remote page"),
                Err(err) => debug!(error = %err, "skipping favicon link"),
            }
        }
    }
    Ok(rank(found))
}

/// Declared favicons followed by the conventional paths on the page origin.
pub fn favicon_candidates(page: &PageDocument) -> Result<Vec<IconCandidate>> {
    let mut candidates = declared_favicons(page)?;
    if let Some(base) = page
        .base_url()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
    {
        for (path, priority) in FAVICON_FALLBACK_PATHS {
            if let Ok(url) = base.join(path) {
                candidates.push(IconCandidate {
                    url,
                    priority: *priority,
                });
            }
        }
    }
    Ok(rank(candidates))
}

fn rank(candidates: Vec<IconCandidate>) -> Vec<IconCandidate> {
    let mut unique: Vec<IconCandidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match unique.iter_mut().find(|c| c.url == candidate.url) {
            Some(existing) => existing.priority = existing.priority.max(candidate.priority),
            None => unique.push(candidate),
        }
    }
    unique.sort_by(|a, b| b.priority.cmp(&a.priority));
    unique
}

/// Logo image URLs in selector-table order, filtered by
/// [`is_valid_image_url`].
pub fn logo_candidates(page: &PageDocument) -> Result<Vec<Url>> {
    let mut urls: Vec<Url> = Vec::new();
    for selector in LOGO_IMAGE_SELECTORS {
        let matches = page
            .select_all(selector, usize::MAX)
            .map_err(InferError::query(Stage::Icons))?;
        for el in matches {
            let Some(src) = el.value().attr("src") else {
                continue;
            };
            if !is_valid_image_url(src) {
                continue;
            }
            if let Ok(url) = page.resolve_url(src) {
                if reachable_from(page, &url) && !urls.contains(&url) {
                    urls.push(url);
                }
            }
        }
    }
    Ok(urls)
}

fn first_loading<'a, P, I>(probe: &P, kind: &str, urls: I) -> Option<Url>
where
    P: ImageProbe + ?Sized,
    I: IntoIterator<Item = &'a Url>,
{
    for url in urls {
        let outcome = probe.probe(url);
        if diagnostics_enabled("probe") {
            debug!(kind, url = %url, outcome = ?outcome, "probe");
        }
        if outcome.is_usable() {
            return Some(url.clone());
        }
        if let ProbeOutcome::TimedOut = outcome {
            debug!(kind, url = %url, "probe timed out");
        }
    }
    None
}

/// Probe favicon then logo candidates in priority order. Never fails;
/// selector errors are logged and nothing resolves.
pub fn extract_logos_and_icons<P: ImageProbe + ?Sized>(page: &PageDocument, probe: &P) -> ResolvedIcons {
    try_extract_logos_and_icons(page, probe).unwrap_or_else(|err| {
        warn!(stage = %err.stage(), error = %err, "icon discovery failed");
        ResolvedIcons::default()
    })
}

pub(crate) fn try_extract_logos_and_icons<P: ImageProbe + ?Sized>(
    page: &PageDocument,
    probe: &P,
) -> Result<ResolvedIcons> {
    let favicons = favicon_candidates(page)?;
    let favicon = first_loading(probe, "favicon", favicons.iter().map(|c| &c.url));

    let logos = logo_candidates(page)?;
    let logo = first_loading(probe, "logo", logos.iter()).or_else(|| favicon.clone());

    debug!(
        favicon = favicon.as_ref().map(Url::as_str),
        logo = logo.as_ref().map(Url::as_str),
        "icons resolved"
    );
    Ok(ResolvedIcons { favicon, logo })
}
