//! Selector and keyword tables read by the resolvers.
//!
//! Each resolver walks one of these tables in order; nothing else in the
//! crate hard-codes a selector.

/// `<body>`/`<html>` classes that force light mode. Checked before
/// [`DARK_CLASSES`].
pub const LIGHT_CLASSES: &[&str] = &["light", "light-mode", "light-theme", "theme-light"];

pub const DARK_CLASSES: &[&str] = &["dark", "dark-mode", "dark-theme", "theme-dark", "night-mode"];

/// A container sampled by the dark-mode classifier.
#[derive(Debug, Clone, Copy)]
pub struct SampleTarget {
    pub selector: &'static str,
    pub weight: f64,
    /// Main-content containers decide on their own when clearly dark or light.
    pub primary: bool,
}

const fn sample(selector: &'static str, weight: f64, primary: bool) -> SampleTarget {
    SampleTarget {
        selector,
        weight,
        primary,
    }
}

pub const DARK_MODE_SAMPLES: &[SampleTarget] = &[
    sample("html", 1.0, false),
    sample("body", 2.0, false),
    sample("main", 3.0, true),
    sample("article", 3.0, true),
    sample(".content", 2.0, false),
    sample("#content", 2.0, false),
    sample("#root", 2.0, false),
    sample("#app", 2.0, false),
    sample(".main-content", 3.0, false),
    sample("header", 1.0, false),
    sample(".header", 1.0, false),
];

/// Luminance cutoffs for the dark-mode score.
pub mod luminance {
    /// Primary container darker than this: dark, no further sampling.
    pub const DEFINITELY_DARK: f64 = 0.15;
    /// Primary container lighter than this: light, no further sampling.
    pub const DEFINITELY_LIGHT: f64 = 0.85;
    pub const DARK: f64 = 0.2;
    pub const MID: f64 = 0.5;
    pub const LIGHT: f64 = 0.8;
    pub const LIGHT_TEXT: f64 = 0.8;
    pub const DARK_TEXT: f64 = 0.3;
    /// Share of a container's weight carried by its text color.
    pub const TEXT_WEIGHT: f64 = 0.3;
    /// One side must beat the other by this factor to win outright.
    pub const MARGIN: f64 = 1.2;
}

/// An element group sampled by the palette extractor.
#[derive(Debug, Clone, Copy)]
pub struct PaletteTarget {
    pub selector: &'static str,
    /// Also feeds `accent_colors`.
    pub accent: bool,
}

const fn palette(selector: &'static str, accent: bool) -> PaletteTarget {
    PaletteTarget { selector, accent }
}

pub const PALETTE_SAMPLES: &[PaletteTarget] = &[
    palette("header", false),
    palette("nav", false),
    palette("button", true),
    palette(".btn", true),
    palette(".button", true),
    palette("[class*=\"cta\"]", true),
    palette("a", true),
    palette(".logo", false),
    palette(".brand", false),
    palette("h1", false),
    palette("h2", false),
    palette("h3", false),
    palette(".primary", true),
    palette(".accent", true),
    palette(".highlight", true),
    palette("[class*=\"primary\"]", true),
    palette("[class*=\"accent\"]", true),
    palette("body", false),
    palette("html", false),
];

/// Matches sampled per palette selector.
pub const PALETTE_MATCH_LIMIT: usize = 10;

/// Design-token custom properties read off the document element.
pub const BRAND_CUSTOM_PROPERTIES: &[&str] = &[
    "--primary-color",
    "--primary",
    "--accent-color",
    "--accent",
    "--brand-color",
    "--brand",
    "--theme-color",
    "--main-color",
    "--color-primary",
    "--color-accent",
    "--secondary-color",
];

/// Vibrancy: `(max - min) / max` above this...
pub const VIBRANT_MIN_SATURATION: f64 = 0.15;
/// ...and mean channel strictly inside this range.
pub const VIBRANT_BRIGHTNESS: (f64, f64) = (30.0, 240.0);

/// A `<link>` that may name a favicon.
#[derive(Debug, Clone, Copy)]
pub struct IconLink {
    pub selector: &'static str,
    pub priority: u32,
}

const fn icon(selector: &'static str, priority: u32) -> IconLink {
    IconLink { selector, priority }
}

pub const FAVICON_LINKS: &[IconLink] = &[
    icon("link[rel=\"apple-touch-icon\"][sizes=\"180x180\"]", 100),
    icon("link[rel=\"apple-touch-icon\"]", 90),
    icon("link[rel=\"apple-touch-icon-precomposed\"]", 85),
    icon("link[rel=\"icon\"][type=\"image/svg+xml\"]", 80),
    icon("link[rel=\"icon\"][sizes=\"192x192\"]", 75),
    icon("link[rel=\"icon\"][sizes=\"96x96\"]", 70),
    icon("link[rel=\"icon\"][sizes=\"32x32\"]", 60),
    icon("link[rel=\"icon\"]", 50),
    icon("link[rel=\"shortcut icon\"]", 40),
];

/// Conventional locations tried on the page origin after declared links.
pub const FAVICON_FALLBACK_PATHS: &[(&str, u32)] = &[
    ("/favicon.ico", 20),
    ("/favicon.png", 15),
    ("/favicon.svg", 10),
];

pub const LOGO_IMAGE_SELECTORS: &[&str] = &[
    ".logo img",
    ".brand img",
    ".navbar-brand img",
    "header .logo img",
    "#logo img",
    "img.logo",
    "img#logo",
    "header img[src*=\"logo\"]",
    "nav img[src*=\"logo\"]",
    "img[alt*=\"logo\"]",
    "img[alt*=\"Logo\"]",
];

pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "bmp", "avif",
];

pub const BRANDING_SELECTORS: &[&str] = &[
    ".logo",
    "#logo",
    ".site-logo",
    ".brand",
    ".navbar-brand",
    ".site-title",
    ".site-name",
    ".logo-text",
    "header .logo",
    "[class*=\"logo\"]",
    "[class*=\"brand\"]",
    "[itemprop=\"name\"]",
];

/// How a meta tag's `content` becomes a site name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaValue {
    Text,
    /// A handle such as `@acme`.
    Handle,
    /// A URL whose host goes through the domain rule.
    Url,
}

pub const META_TAGS: &[(&str, MetaValue)] = &[
    (
        "meta[property=\"og:site_name\"], meta[name=\"og:site_name\"]",
        MetaValue::Text,
    ),
    ("meta[name=\"application-name\"]", MetaValue::Text),
    ("meta[name=\"apple-mobile-web-app-title\"]", MetaValue::Text),
    (
        "meta[name=\"twitter:site\"], meta[property=\"twitter:site\"]",
        MetaValue::Handle,
    ),
    (
        "meta[property=\"al:web:url\"], meta[name=\"al:web:url\"]",
        MetaValue::Url,
    ),
];

/// Title separators, tried in order; the first one present splits.
pub const TITLE_SEPARATORS: &[&str] = &[
    " | ", " - ", " :: ", " \u{2014} ", " \u{2013} ", " \u{b7} ", " \u{2022} ", " / ", " \\ ",
];

/// Title segments that describe the page rather than name the site.
pub const GENERIC_TITLE_PATTERNS: &[&str] = &[
    r"^(breaking|latest|top|world|local|daily)?\s*news$",
    r"^(news|articles?|stories|story|blog|posts?)$",
    r"^today('s)?(\s.*)?$",
    r"^home(\s*page)?$",
    r"^about(\s+us)?$",
    r"^page\s*\d+(\s+of\s+\d+)?$",
    r"^welcome(\s+to\s.*)?$",
    r"^(official\s+)?(site|website)$",
];

/// Text that is never a site name.
pub const NOISE_NAME_PATTERNS: &[&str] = &[
    r"^\d+$",
    r"^[^\p{L}\p{N}]+$",
    r"^(menu|main menu|nav|navigation|toggle navigation|skip to (main )?content|home|login|log in|sign in|sign up|register|search|close|open menu)$",
    r"^(logo|brand|site|website)$",
];

pub const SITE_NAME_MAX_CHARS: usize = 50;

pub const DOMAIN_PREFIXES: &[&str] = &["www.", "m.", "mobile.", "app."];

/// Display names for domains whose first label is not the brand.
pub const SPECIAL_DOMAINS: &[(&str, &str)] = &[
    ("nytimes", "The New York Times"),
    ("wsj", "The Wall Street Journal"),
    ("washingtonpost", "The Washington Post"),
    ("bbc", "BBC"),
    ("cnn", "CNN"),
    ("theguardian", "The Guardian"),
    ("npr", "NPR"),
    ("reuters", "Reuters"),
    ("bloomberg", "Bloomberg"),
    ("usatoday", "USA Today"),
    ("latimes", "Los Angeles Times"),
    ("foxnews", "Fox News"),
    ("nbcnews", "NBC News"),
    ("cbsnews", "CBS News"),
    ("abcnews", "ABC News"),
    ("techcrunch", "TechCrunch"),
    ("theverge", "The Verge"),
    ("wired", "WIRED"),
    ("github", "GitHub"),
    ("youtube", "YouTube"),
    ("linkedin", "LinkedIn"),
];

pub const FONT_FALLBACK_SELECTORS: &[&str] = &[
    "h1",
    ".logo",
    ".brand",
    ".site-title",
    ".navbar-brand",
    "header h1",
    "h2",
    "body",
];

pub const FALLBACK_SITE_NAME: &str = "this site";

pub const INHERIT_FONT: &str = "inherit";
