//! Light/dark classification of a host page.

use tinge_css::{ElementRef, PageDocument, diagnostics_enabled};
use tracing::{debug, warn};

use crate::color::luminance;
use crate::error::{InferError, Result, Stage};
use crate::tables::{DARK_CLASSES, DARK_MODE_SAMPLES, LIGHT_CLASSES, luminance as cutoff};

/// Whether the page renders dark. Never fails; selector errors are logged
/// and the page is treated as light.
pub fn detect_dark_mode(page: &PageDocument) -> bool {
    try_detect_dark_mode(page).unwrap_or_else(|err| {
        warn!(stage = %err.stage(), error = %err, "dark-mode detection failed");
        false
    })
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Score {
    dark: f64,
    light: f64,
}

pub(crate) fn try_detect_dark_mode(page: &PageDocument) -> Result<bool> {
    let marked = [Some(page.root()), page.body()];
    let has_class = |classes: &[&str]| {
        marked
            .iter()
            .flatten()
            .any(|el| el.value().classes().any(|c| classes.contains(&c)))
    };
    if has_class(LIGHT_CLASSES) {
        debug!("light theme class present");
        return Ok(false);
    }
    if has_class(DARK_CLASSES) {
        debug!("dark theme class present");
        return Ok(true);
    }

    let mut score = Score::default();
    for target in DARK_MODE_SAMPLES {
        let Some(el) = page
            .select_first(target.selector)
            .map_err(InferError::query(Stage::DarkMode))?
        else {
            continue;
        };
        if let Some(decided) = score_element(page, &el, target.weight, target.primary, &mut score) {
            debug!(selector = target.selector, dark = decided, "primary container decides");
            return Ok(decided);
        }
        if diagnostics_enabled("infer") {
            debug!(
                selector = target.selector,
                dark = score.dark,
                light = score.light,
                "dark-mode sample"
            );
        }
    }

    Ok(decide(score, page))
}

/// Add one container's votes. Returns a verdict when a primary container is
/// unambiguous.
fn score_element(
    page: &PageDocument,
    el: &ElementRef,
    weight: f64,
    primary: bool,
    score: &mut Score,
) -> Option<bool> {
    let style = page.computed_style(el);

    if let Some(background) = style.background_color {
        let l = luminance(&background);
        if primary && l < cutoff::DEFINITELY_DARK {
            return Some(true);
        }
        if primary && l > cutoff::DEFINITELY_LIGHT {
            return Some(false);
        }
        if l < cutoff::DARK {
            score.dark += weight;
        } else if l > cutoff::LIGHT {
            score.light += weight;
        } else if l < cutoff::MID {
            score.dark += weight / 2.0;
        } else {
            score.light += weight / 2.0;
        }
    }

    let text = luminance(&style.text_color());
    if text > cutoff::LIGHT_TEXT {
        score.dark += weight * cutoff::TEXT_WEIGHT;
    } else if text < cutoff::DARK_TEXT {
        score.light += weight * cutoff::TEXT_WEIGHT;
    }
    None
}

fn decide(score: Score, page: &PageDocument) -> bool {
    let Score { dark, light } = score;
    if dark > light * cutoff::MARGIN {
        true
    } else if light > dark * cutoff::MARGIN {
        false
    } else if dark != light {
        dark > light
    } else {
        debug!(
            prefers_dark = page.media().prefers_dark,
            "dark-mode score tied; assuming light"
        );
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinge_css::{MediaEnvironment, PageOptions};

    fn page(html: &str) -> PageDocument {
        PageDocument::parse(html, PageOptions::default())
    }

    #[test]
    fn empty_document_is_light() {
        assert!(!detect_dark_mode(&page("<html><body></body></html>")));
    }

    #[test]
    fn light_class_beats_dark_background() {
        let doc = page(
            r#"<html><body class="light-mode" style="background:#000;color:#fff">
               <main style="background-color:#111">x</main></body></html>"#,
        );
        assert!(!detect_dark_mode(&doc));
    }

    #[test]
    fn light_class_beats_dark_class() {
        let doc = page(r#"<html class="dark"><body class="theme-light"></body></html>"#);
        assert!(!detect_dark_mode(&doc));
    }

    #[test]
    fn dark_class_on_html() {
        assert!(detect_dark_mode(&page(r#"<html class="night-mode"><body></body></html>"#)));
    }

    #[test]
    fn main_overrides_header() {
        // main luminance ~0.05, header ~0.95
        let doc = page(
            r#"<html><body>
                 <header style="background-color: rgb(242, 242, 242)">h</header>
                 <main style="background-color: rgb(13, 13, 13)">m</main>
               </body></html>"#,
        );
        assert!(detect_dark_mode(&doc));
    }

    #[test]
    fn light_primary_decides_light() {
        let doc = page(
            r#"<html><body style="background:#000;color:#eee">
                 <article style="background:#fff">a</article>
               </body></html>"#,
        );
        assert!(!detect_dark_mode(&doc));
    }

    #[test]
    fn weighted_body_background() {
        let doc = page(
            r#"<html><head><style>
                 body { background-color: #121212; color: #e0e0e0; }
               </style></head><body><div id="app"></div></body></html>"#,
        );
        assert!(detect_dark_mode(&doc));
    }

    #[test]
    fn mid_tones_split_weight() {
        // body l ~0.3 (dark half weight) with light text votes dark
        let doc = page(
            r#"<html><body style="background-color: rgb(77, 77, 77); color: rgb(230, 230, 230)"></body></html>"#,
        );
        assert!(detect_dark_mode(&doc));
    }

    #[test]
    fn mid_light_body_votes_light_at_half_weight() {
        // body l ~0.67 (light +1.0) outweighs its white text (dark +0.6)
        let doc = page(
            r#"<html><body style="background-color: rgb(170, 170, 170); color: #ffffff"></body></html>"#,
        );
        assert!(!detect_dark_mode(&doc));
    }

    #[test]
    fn narrow_scores_fall_back_to_the_larger_side() {
        // html dark +1.0, text light +0.3; body l ~0.67 light +1.0;
        // header l ~0.39 dark +0.5. Neither side clears the 1.2x margin.
        let narrow_light = page(
            r#"<html style="background-color: #000000"><body style="background-color: rgb(170, 170, 170); color: #888888">
                 <header style="background-color: rgb(100, 100, 100); color: #000000">h</header>
               </body></html>"#,
        );
        assert!(!detect_dark_mode(&narrow_light));

        let narrow_dark = page(
            r#"<html style="background-color: #000000"><body style="background-color: rgb(170, 170, 170); color: #888888">
                 <header style="background-color: rgb(100, 100, 100)">h</header>
               </body></html>"#,
        );
        assert!(detect_dark_mode(&narrow_dark));
    }

    #[test]
    fn stylesheet_media_preference_applies() {
        let html = r#"<html><head><style>
             body { background: #fafafa; color: #111; }
             @media (prefers-color-scheme: dark) { body { background: #0d0d0d; color: #f0f0f0; } }
           </style></head><body></body></html>"#;
        let light = PageDocument::parse(html, PageOptions::default());
        let dark = PageDocument::parse(
            html,
            PageOptions {
                media: MediaEnvironment { prefers_dark: true },
                ..PageOptions::default()
            },
        );
        assert!(!detect_dark_mode(&light));
        assert!(detect_dark_mode(&dark));
    }

    #[test]
    fn repeated_detection_is_stable() {
        let doc = page(r#"<html><body style="background:#222"><main>x</main></body></html>"#);
        assert_eq!(detect_dark_mode(&doc), detect_dark_mode(&doc));
    }

    #[test]
    fn exact_tie_is_light() {
        let score = Score {
            dark: 1.0,
            light: 1.0,
        };
        assert!(!decide(score, &page("<html></html>")));
        let narrow = Score {
            dark: 1.1,
            light: 1.0,
        };
        assert!(decide(narrow, &page("<html></html>")));
    }
}
