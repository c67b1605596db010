//! One-shot widget start-up.

use std::sync::atomic::{AtomicBool, Ordering};

use tinge_css::PageDocument;
use tinge_io::ImageProbe;
use tracing::debug;

use crate::engine::InferenceEngine;
use crate::profile::SiteAnalysis;

/// Guards against injecting the widget into the same page twice.
#[derive(Debug, Default)]
pub struct WidgetBootstrap {
    initialized: AtomicBool,
}

impl WidgetBootstrap {
    pub const fn new() -> Self {
        Self {
            initialized: AtomicBool::new(false),
        }
    }

    /// The process-wide guard.
    pub fn global() -> &'static WidgetBootstrap {
        static GLOBAL: WidgetBootstrap = WidgetBootstrap::new();
        &GLOBAL
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Analyze the page the first time this is called; later calls return
    /// `None` without touching the page.
    pub fn try_initialize<P: ImageProbe>(
        &self,
        page: &PageDocument,
        engine: &InferenceEngine<P>,
    ) -> Option<SiteAnalysis> {
        if self.initialized.swap(true, Ordering::AcqRel) {
            debug!("widget already initialized");
            return None;
        }
        Some(engine.analyze(page))
    }
}

/// Origin of the first `<script src>` whose path ends with `script_name`,
/// i.e. where the widget was served from.
pub fn backend_base_url(page: &PageDocument, script_name: &str) -> Option<String> {
    let scripts = page.select_all("script[src]", usize::MAX).ok()?;
    scripts
        .iter()
        .filter_map(|el| el.value().attr("src"))
        .filter_map(|src| page.resolve_url(src).ok())
        .find(|url| url.path().ends_with(script_name))
        .map(|url| url.origin())
        .filter(|origin| origin.is_tuple())
        .map(|origin| origin.ascii_serialization())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinge_config::TingeConfig;
    use tinge_css::PageOptions;
    use tinge_io::NullProbe;
    use url::Url;

    #[test]
    fn initializes_once() {
        let guard = WidgetBootstrap::new();
        let engine = InferenceEngine::new(TingeConfig::default(), NullProbe);
        let page = PageDocument::parse("<html><body></body></html>", PageOptions::default());

        assert!(!guard.is_initialized());
        assert!(guard.try_initialize(&page, &engine).is_some());
        assert!(guard.is_initialized());
        assert!(guard.try_initialize(&page, &engine).is_none());
    }

    #[test]
    fn backend_from_script_origin() {
        let page = PageDocument::parse(
            r#"<html><head>
                 <script src="/static/app.js"></script>
                 <script src="https://widget.example.net:8443/v2/embed.js?k=1"></script>
               </head></html>"#,
            PageOptions {
                base_url: Url::parse("https://host.example.com/").ok(),
                ..PageOptions::default()
            },
        );
        assert_eq!(
            backend_base_url(&page, "embed.js").as_deref(),
            Some("https://widget.example.net:8443")
        );
        assert_eq!(
            backend_base_url(&page, "app.js").as_deref(),
            Some("https://host.example.com")
        );
        assert_eq!(backend_base_url(&page, "missing.js"), None);
    }
}
