//! Values produced by an analysis.

use std::fmt;
use std::sync::Mutex;

use serde::Serialize;
use tinge_config::DefaultsConfig;
use tinge_css::Rgba;
use tracing::warn;
use url::Url;

/// A lowercase `#rrggbb` color.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ColorHex(String);

impl ColorHex {
    pub fn from_rgba(color: &Rgba) -> Self {
        Self(color.to_hex())
    }

    /// Parse any CSS color; `None` for unparseable or fully transparent values.
    pub fn parse(raw: &str) -> Option<Self> {
        Rgba::parse(raw)
            .filter(|c| !c.is_transparent())
            .map(|c| Self::from_rgba(&c))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColorHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The inferred skin for the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleProfile {
    pub is_dark_mode: bool,
    pub primary_color: Option<ColorHex>,
    pub secondary_color: Option<ColorHex>,
    pub background_color: ColorHex,
    pub text_color: ColorHex,
    /// At most three.
    pub brand_colors: Vec<ColorHex>,
    pub theme_colors: Vec<ColorHex>,
    pub border_colors: Vec<ColorHex>,
    pub logo_url: Option<Url>,
    pub favicon_url: Option<Url>,
    pub font_family: String,
}

fn default_color(configured: &str, builtin: &str) -> ColorHex {
    ColorHex::parse(configured).unwrap_or_else(|| {
        warn!(configured, "invalid default color; using built-in");
        ColorHex(builtin.to_string())
    })
}

/// Background and text colors used when the page declares none.
pub fn mode_colors(defaults: &DefaultsConfig, dark: bool) -> (ColorHex, ColorHex) {
    let builtin = DefaultsConfig::default();
    let (bg, text) = defaults.colors_for(dark);
    let (builtin_bg, builtin_text) = builtin.colors_for(dark);
    (default_color(bg, builtin_bg), default_color(text, builtin_text))
}

impl StyleProfile {
    /// The light-mode profile with nothing detected.
    pub fn from_defaults(defaults: &DefaultsConfig) -> Self {
        let (background_color, text_color) = mode_colors(defaults, false);
        Self {
            is_dark_mode: false,
            primary_color: None,
            secondary_color: None,
            background_color,
            text_color,
            brand_colors: Vec::new(),
            theme_colors: Vec::new(),
            border_colors: Vec::new(),
            logo_url: None,
            favicon_url: None,
            font_family: defaults.font_stack.clone(),
        }
    }
}

impl Default for StyleProfile {
    fn default() -> Self {
        Self::from_defaults(&DefaultsConfig::default())
    }
}

/// Which resolver tier produced a site name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BrandingMethod {
    LogoElement,
    MetaTag,
    DocumentTitle,
    Domain,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteBranding {
    /// Never empty.
    pub name: String,
    /// A font-family value, or `inherit`.
    pub font: String,
    pub favicon_url: Option<Url>,
    pub method: BrandingMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteAnalysis {
    pub profile: StyleProfile,
    pub branding: SiteBranding,
}

static LAST_PROFILE: Mutex<Option<StyleProfile>> = Mutex::new(None);

/// The most recent successfully inferred profile in this process.
pub fn last_profile() -> Option<StyleProfile> {
    match LAST_PROFILE.lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

pub(crate) fn remember_profile(profile: &StyleProfile) {
    let mut guard = match LAST_PROFILE.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *guard = Some(profile.clone());
}
