//! Profile assembly.

use tinge_config::TingeConfig;
use tinge_css::PageDocument;
use tinge_io::ImageProbe;
use tracing::{debug, info, warn};
use url::Url;

use crate::branding::extract_website_branding;
use crate::color::is_vibrant;
use crate::dark_mode::try_detect_dark_mode;
use crate::error::{InferError, Result};
use crate::icons::{ResolvedIcons, try_extract_logos_and_icons};
use crate::palette::{ColorScheme, try_extract_color_scheme};
use crate::profile::{ColorHex, SiteAnalysis, StyleProfile, mode_colors, remember_profile};

const MAX_BRAND_COLORS: usize = 3;

/// Runs every resolver over a page and assembles the results.
pub struct InferenceEngine<P> {
    config: TingeConfig,
    probe: P,
}

fn hex_list(values: &[String]) -> Vec<ColorHex> {
    let mut out: Vec<ColorHex> = Vec::new();
    for hex in values.iter().filter_map(|v| ColorHex::parse(v)) {
        if !out.contains(&hex) {
            out.push(hex);
        }
    }
    out
}

impl<P: ImageProbe> InferenceEngine<P> {
    pub fn new(config: TingeConfig, probe: P) -> Self {
        Self { config, probe }
    }

    /// Style profile plus branding. The branding favicon is the resolved
    /// one, so both agree.
    pub fn analyze(&self, page: &PageDocument) -> SiteAnalysis {
        let profile = self.analyze_website_styling(page);
        let mut branding = extract_website_branding(page);
        branding.favicon_url = profile.favicon_url.clone();
        info!(
            site = %branding.name,
            method = ?branding.method,
            dark = profile.is_dark_mode,
            "page analyzed"
        );
        SiteAnalysis { profile, branding }
    }

    /// Infer the style profile. Never fails: any error is logged with the
    /// stage it came from and the default profile is returned.
    pub fn analyze_website_styling(&self, page: &PageDocument) -> StyleProfile {
        match self.try_analyze_website_styling(page) {
            Ok(profile) => {
                remember_profile(&profile);
                profile
            }
            Err(err) => {
                warn!(stage = %err.stage(), error = %err, "style inference failed; using defaults");
                StyleProfile::from_defaults(&self.config.defaults)
            }
        }
    }

    pub fn try_analyze_website_styling(&self, page: &PageDocument) -> Result<StyleProfile> {
        let is_dark_mode = try_detect_dark_mode(page)?;
        let scheme = try_extract_color_scheme(page)?;
        let icons = try_extract_logos_and_icons(page, &self.probe)?;
        self.assemble(page, is_dark_mode, &scheme, icons)
    }

    fn assemble(
        &self,
        page: &PageDocument,
        is_dark_mode: bool,
        scheme: &ColorScheme,
        icons: ResolvedIcons,
    ) -> Result<StyleProfile> {
        let theme_colors = hex_list(&scheme.theme_colors);
        let accent_colors = hex_list(&scheme.accent_colors);
        let border_colors = hex_list(&scheme.border_colors);
        let vibrant_borders: Vec<ColorHex> = scheme
            .border_colors
            .iter()
            .filter_map(|v| tinge_css::Rgba::parse(v))
            .filter(is_vibrant)
            .map(|c| ColorHex::from_rgba(&c))
            .collect();

        let primary_color = theme_colors.first().or(accent_colors.first()).cloned();
        let secondary_color = theme_colors
            .get(1)
            .or(accent_colors.get(1))
            .or(vibrant_borders.first())
            .cloned();

        let mut brand_colors: Vec<ColorHex> = Vec::new();
        for color in theme_colors.iter().chain(&vibrant_borders) {
            if brand_colors.len() == MAX_BRAND_COLORS {
                break;
            }
            if !brand_colors.contains(color) {
                brand_colors.push(color.clone());
            }
        }

        let (default_bg, default_text) = mode_colors(&self.config.defaults, is_dark_mode);
        let body = page.body().map(|el| page.computed_style(&el));
        let html = page.computed_style(&page.root());
        let background_color = body
            .as_ref()
            .and_then(|s| s.background_color)
            .or(html.background_color)
            .map(|c| ColorHex::from_rgba(&c))
            .unwrap_or(default_bg);
        let text_color = body
            .as_ref()
            .and_then(|s| s.color)
            .map(|c| ColorHex::from_rgba(&c))
            .unwrap_or(default_text);
        let font_family = body
            .and_then(|s| s.font_family)
            .unwrap_or_else(|| self.config.defaults.font_stack.clone());

        let (logo_url, favicon_url) = match (icons.logo, icons.favicon) {
            (None, None) => {
                let asset = self.default_asset()?;
                debug!(asset = %asset, "no icons loaded; using default asset");
                (Some(asset.clone()), Some(asset))
            }
            (Some(logo), None) => (Some(logo.clone()), Some(logo)),
            (logo, favicon) => (logo, favicon),
        };

        Ok(StyleProfile {
            is_dark_mode,
            primary_color,
            secondary_color,
            background_color,
            text_color,
            brand_colors,
            theme_colors,
            border_colors,
            logo_url,
            favicon_url,
            font_family,
        })
    }

    fn default_asset(&self) -> Result<Url> {
        let raw = &self.config.defaults.asset_url;
        Url::parse(raw).map_err(|source| InferError::DefaultAsset {
            url: raw.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinge_css::PageOptions;
    use tinge_io::NullProbe;

    fn engine() -> InferenceEngine<NullProbe> {
        InferenceEngine::new(TingeConfig::default(), NullProbe)
    }

    fn page(html: &str) -> PageDocument {
        PageDocument::parse(html, PageOptions::default())
    }

    #[test]
    fn empty_page_gets_defaults_and_asset() {
        let profile = engine().analyze_website_styling(&page("<html><body></body></html>"));
        let asset = Url::parse(tinge_config::DEFAULT_ASSET_URL).unwrap();
        assert_eq!(
            profile,
            StyleProfile {
                logo_url: Some(asset.clone()),
                favicon_url: Some(asset),
                ..StyleProfile::default()
            }
        );
    }

    #[test]
    fn primary_and_secondary_selection() {
        let profile = engine().analyze_website_styling(&page(
            r#"<html><head><style>
                 :root { --primary-color: #e63946; }
                 body { background: #ffffff; color: #222222; font-family: Inter, sans-serif; }
                 button { background: #457b9d; color: #ffffff; }
                 nav { border-bottom: 2px solid #2a9d8f; }
               </style></head><body><nav>n</nav><button>b</button></body></html>"#,
        ));
        assert_eq!(profile.primary_color.as_ref().map(ColorHex::as_str), Some("#e63946"));
        assert_eq!(profile.secondary_color.as_ref().map(ColorHex::as_str), Some("#2a9d8f"));
        let brand: Vec<&str> = profile.brand_colors.iter().map(ColorHex::as_str).collect();
        assert_eq!(brand, vec!["#e63946", "#2a9d8f", "#457b9d"]);
        assert_eq!(profile.background_color.as_str(), "#ffffff");
        assert_eq!(profile.text_color.as_str(), "#222222");
        assert_eq!(profile.font_family, "Inter, sans-serif");
    }

    #[test]
    fn accent_fills_in_without_vibrant_colors() {
        let profile = engine().analyze_website_styling(&page(
            r#"<html><body><a href="/" style="color:#333333">x</a><button style="color:#eeeeee">y</button></body></html>"#,
        ));
        assert_eq!(profile.primary_color.as_ref().map(ColorHex::as_str), Some("#eeeeee"));
        assert_eq!(profile.secondary_color.as_ref().map(ColorHex::as_str), Some("#333333"));
        assert!(profile.theme_colors.is_empty());
        assert!(profile.brand_colors.is_empty());
    }

    #[test]
    fn dark_defaults_when_page_is_dark_by_class() {
        let profile = engine().analyze_website_styling(&page(r#"<html class="dark"><body></body></html>"#));
        assert!(profile.is_dark_mode);
        assert_eq!(profile.background_color.as_str(), "#1a1a1a");
        assert_eq!(profile.text_color.as_str(), "#f5f5f5");
    }

    #[test]
    fn loaded_logo_doubles_as_favicon() {
        struct LogoOnly;
        impl ImageProbe for LogoOnly {
            fn probe(&self, url: &Url) -> tinge_io::ProbeOutcome {
                if url.path() == "/img/logo.png" {
                    tinge_io::ProbeOutcome::Loaded(tinge_io::ImageDimensions { width: 120, height: 40 })
                } else {
                    tinge_io::ProbeOutcome::Failed(tinge_io::ProbeError::Status(404))
                }
            }
        }

        let doc = PageDocument::parse(
            r#"<html><body><div class="logo"><img src="/img/logo.png"></div></body></html>"#,
            PageOptions {
                base_url: Url::parse("https://shop.example.com/").ok(),
                ..PageOptions::default()
            },
        );
        let profile = InferenceEngine::new(TingeConfig::default(), LogoOnly).analyze_website_styling(&doc);
        let logo = Url::parse("https://shop.example.com/img/logo.png").unwrap();
        assert_eq!(profile.logo_url.as_ref(), Some(&logo));
        assert_eq!(profile.favicon_url, Some(logo));
    }

    #[test]
    fn bad_asset_url_recovers_to_default_profile() {
        let mut config = TingeConfig::default();
        config.defaults.asset_url = "not a url".into();
        let engine = InferenceEngine::new(config, NullProbe);
        let doc = page(r#"<html class="dark"><body style="background:#000"></body></html>"#);
        assert!(matches!(
            engine.try_analyze_website_styling(&doc),
            Err(InferError::DefaultAsset { .. })
        ));
        assert_eq!(engine.analyze_website_styling(&doc), StyleProfile::default());
    }
}
