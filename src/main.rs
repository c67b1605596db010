//! `tinge`: print the inferred theme and branding of a page as JSON.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tinge_config::TingeConfig;
use tinge_css::{MediaEnvironment, PageDocument, PageOptions};
use tinge_infer::{InferenceEngine, WidgetBootstrap, backend_base_url};
use tinge_io::{HttpImageProbe, ImageProbe, NullProbe};
use url::Url;

const PAGE_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Parser, Debug)]
#[command(name = "tinge")]
#[command(about = "Infer a page's color theme, icons and site name")]
struct Args {
    /// HTML file path or http(s) URL
    source: String,

    /// Hostname the page is served from (overrides the URL's host)
    #[arg(long)]
    host: Option<String>,

    /// Configuration file (defaults to $TINGE_CONFIG or ./tinge.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Evaluate the page as if the user prefers a dark color scheme
    #[arg(long)]
    prefers_dark: bool,

    /// Skip image probing; icons fall back to the default asset
    #[arg(long)]
    no_probe: bool,

    /// Also report the backend origin derived from this widget script name
    #[arg(long, value_name = "SCRIPT")]
    widget_script: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn load_config(args: &Args) -> Result<TingeConfig> {
    let mut config = match &args.config {
        Some(path) => TingeConfig::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => TingeConfig::load_or_default(),
    };
    config.merge_with_env();
    if args.prefers_dark {
        config.media.prefers_dark = true;
    }
    Ok(config)
}

fn is_web_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Page markup plus where it lives.
fn load_page(args: &Args, config: &TingeConfig) -> Result<(String, PageOptions)> {
    let mut options = PageOptions {
        media: MediaEnvironment {
            prefers_dark: config.media.prefers_dark,
        },
        ..PageOptions::default()
    };

    let html = if is_web_url(&args.source) {
        let url = Url::parse(&args.source).with_context(|| format!("invalid URL {}", args.source))?;
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.probe.user_agent.clone())
            .timeout(PAGE_FETCH_TIMEOUT)
            .build()?;
        let response = client
            .get(url.clone())
            .send()
            .with_context(|| format!("fetching {url}"))?
            .error_for_status()?;
        options.base_url = Some(response.url().clone());
        response.text()?
    } else {
        let path = PathBuf::from(&args.source)
            .canonicalize()
            .with_context(|| format!("reading {}", args.source))?;
        let html = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        options.base_path = path.parent().map(|p| p.to_path_buf());
        options.base_url = Url::from_file_path(&path).ok();
        html
    };

    if let Some(host) = &args.host {
        let url = Url::parse(&format!("https://{host}/")).map_err(|e| anyhow!("invalid host {host}: {e}"))?;
        options.base_url = Some(url);
    }
    Ok((html, options))
}

fn build_probe(args: &Args, config: &TingeConfig) -> Box<dyn ImageProbe> {
    if args.no_probe {
        return Box::new(NullProbe);
    }
    let mut probe = HttpImageProbe::new()
        .with_timeout(config.probe_timeout())
        .with_user_agent(config.probe.user_agent.clone())
        .with_max_bytes(config.probe.max_bytes)
        .with_local_files(!is_web_url(&args.source));
    if !config.probe.allowed_origins.is_empty() {
        probe = probe.with_origin_allowlist(config.probe.allowed_origins.iter().cloned());
    }
    Box::new(probe)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let config = load_config(&args)?;
    let (html, options) = load_page(&args, &config)?;
    log::debug!(
        "loaded {} bytes from {} (base url: {:?})",
        html.len(),
        args.source,
        options.base_url.as_ref().map(Url::as_str)
    );
    let page = PageDocument::parse(&html, options);

    let probe = build_probe(&args, &config);
    let engine = InferenceEngine::new(config, probe);
    let analysis = WidgetBootstrap::global()
        .try_initialize(&page, &engine)
        .ok_or_else(|| anyhow!("widget already initialized"))?;

    let mut output = serde_json::to_value(&analysis)?;
    if let Some(script) = &args.widget_script {
        output["backendBaseUrl"] = serde_json::to_value(backend_base_url(&page, script))?;
    }
    let text = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{text}");
    Ok(())
}
