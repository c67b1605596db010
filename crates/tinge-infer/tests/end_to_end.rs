use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use anyhow::Result;
use tinge_config::{DEFAULT_ASSET_URL, TingeConfig};
use tinge_css::{PageDocument, PageOptions};
use tinge_infer::{BrandingMethod, InferenceEngine, last_profile};
use tinge_io::{HttpImageProbe, Url};

mod stub {
    use tinge_io::{ImageProbe, ProbeError, ProbeOutcome, Url};

    /// Every probe fails, as in an offline environment.
    pub struct Offline;

    impl ImageProbe for Offline {
        fn probe(&self, _url: &Url) -> ProbeOutcome {
            ProbeOutcome::Failed(ProbeError::Status(503))
        }
    }
}

#[test]
fn dark_dashboard_on_app_subdomain() -> Result<()> {
    let page = PageDocument::parse(
        r#"<!doctype html><html class="dark-theme"><head><title>Dashboard - Acme</title></head>
           <body><div id="app"></div></body></html>"#,
        PageOptions {
            base_url: Some(Url::parse("https://app.acme.io/")?),
            ..PageOptions::default()
        },
    );
    let engine = InferenceEngine::new(TingeConfig::default(), stub::Offline);
    let analysis = engine.analyze(&page);

    let asset = Url::parse(DEFAULT_ASSET_URL)?;
    assert!(analysis.profile.is_dark_mode);
    assert_eq!(analysis.branding.name, "Acme");
    assert_eq!(analysis.branding.method, BrandingMethod::DocumentTitle);
    assert_eq!(analysis.profile.favicon_url.as_ref(), Some(&asset));
    assert_eq!(analysis.profile.logo_url.as_ref(), Some(&asset));
    assert_eq!(analysis.branding.favicon_url.as_ref(), Some(&asset));
    assert_eq!(analysis.profile.background_color.as_str(), "#1a1a1a");
    assert_eq!(analysis.profile.text_color.as_str(), "#f5f5f5");

    assert!(last_profile().is_some());
    Ok(())
}

const ICON_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="64"><circle cx="32" cy="32" r="30" fill="green"/></svg>"#;

/// Serve `ICON_SVG` at `path` and 404 everything else.
fn icon_server(path: &'static str) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    thread::spawn(move || {
        for mut stream in listener.incoming().flatten() {
            let mut buf = [0u8; 2048];
            let n = stream.read(&mut buf).unwrap_or(0);
            let request = String::from_utf8_lossy(&buf[..n]);
            let target = request.split_whitespace().nth(1).unwrap_or("");
            let (status, body) = if target == path {
                ("200 OK", ICON_SVG)
            } else {
                ("404 Not Found", "")
            };
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: image/svg+xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    Ok(format!("http://{addr}"))
}

#[test]
fn favicon_fallback_path_loads_and_doubles_as_logo() -> Result<()> {
    let origin = icon_server("/favicon.svg")?;
    let page = PageDocument::parse(
        r#"<html><head><link rel="icon" href="/missing.png"></head><body></body></html>"#,
        PageOptions {
            base_url: Some(Url::parse(&format!("{origin}/docs/"))?),
            ..PageOptions::default()
        },
    );
    let engine = InferenceEngine::new(TingeConfig::default(), HttpImageProbe::new());
    let analysis = engine.analyze(&page);

    let expected = Url::parse(&format!("{origin}/favicon.svg"))?;
    assert_eq!(analysis.profile.favicon_url.as_ref(), Some(&expected));
    assert_eq!(analysis.profile.logo_url.as_ref(), Some(&expected));
    assert_eq!(analysis.branding.favicon_url, Some(expected));
    Ok(())
}

#[test]
fn linked_stylesheet_drives_the_profile() -> Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(
        dir.path().join("site.css"),
        r#"
        :root { --accent: #ff7a00; }
        body { background-color: #fdfdfd; color: #202124; font-family: Roboto, Arial, sans-serif; }
        .site-title { font-family: "Merriweather", serif; }
        "#,
    )?;
    let page = PageDocument::parse(
        r#"<html><head><link rel="stylesheet" href="site.css"></head>
           <body><span class="site-title">Kettle &amp; Co</span></body></html>"#,
        PageOptions {
            base_path: Some(dir.path().to_path_buf()),
            base_url: Some(Url::parse("https://kettle.example/")?),
            ..PageOptions::default()
        },
    );
    let engine = InferenceEngine::new(TingeConfig::default(), stub::Offline);
    let analysis = engine.analyze(&page);

    assert!(!analysis.profile.is_dark_mode);
    assert_eq!(analysis.profile.background_color.as_str(), "#fdfdfd");
    assert_eq!(analysis.profile.text_color.as_str(), "#202124");
    assert_eq!(
        analysis.profile.primary_color.as_ref().map(|c| c.as_str()),
        Some("#ff7a00")
    );
    assert_eq!(analysis.profile.font_family, "Roboto, Arial, sans-serif");
    assert_eq!(analysis.branding.name, "Kettle & Co");
    assert_eq!(analysis.branding.font, r#""Merriweather", serif"#);
    Ok(())
}
