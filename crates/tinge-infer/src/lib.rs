//! Theme and branding inference for an embeddable widget.
//!
//! Given a host page, the engine decides whether it renders dark, samples its
//! palette, finds a favicon and logo that actually load, and names the site.
//! Every public entry point recovers its own errors: the worst outcome is a
//! default value, never a failure.

mod branding;
mod color;
mod dark_mode;
mod engine;
mod error;
mod icons;
mod palette;
mod profile;
pub mod tables;
mod widget;

pub use branding::{
    clean_site_name, extract_website_branding, is_valid_site_name, parse_document_title,
    site_name_from_hostname,
};
pub use color::{brightness, is_vibrant, luminance, saturation};
pub use dark_mode::detect_dark_mode;
pub use engine::InferenceEngine;
pub use error::{InferError, Result, Stage};
pub use icons::{
    IconCandidate, ResolvedIcons, declared_favicons, extract_logos_and_icons, favicon_candidates,
    is_valid_image_url, logo_candidates,
};
pub use palette::{ColorScheme, extract_color_scheme};
pub use profile::{
    BrandingMethod, ColorHex, SiteAnalysis, SiteBranding, StyleProfile, last_profile, mode_colors,
};
pub use widget::{WidgetBootstrap, backend_base_url};
