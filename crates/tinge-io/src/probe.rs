use std::{
    collections::HashSet,
    io::{self, Read},
    path::PathBuf,
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::Duration,
};

use tracing::debug;
use url::Url;

use crate::decode::{ImageDimensions, decode_dimensions};
use crate::error::{ProbeError, Result};

/// Deadline for a single probe when none is configured.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(3000);

/// Largest response body read before giving up.
pub const DEFAULT_MAX_BYTES: usize = 4 * 1024 * 1024;

pub const DEFAULT_USER_AGENT: &str = "Tinge/0.1";

/// How a single probe ended.
#[derive(Debug)]
pub enum ProbeOutcome {
    Loaded(ImageDimensions),
    Failed(ProbeError),
    TimedOut,
}

impl ProbeOutcome {
    pub fn dimensions(&self) -> Option<ImageDimensions> {
        match self {
            ProbeOutcome::Loaded(dims) => Some(*dims),
            _ => None,
        }
    }

    /// Loaded and larger than a tracking pixel.
    pub fn is_usable(&self) -> bool {
        self.dimensions().is_some_and(|d| d.is_nontrivial())
    }
}

/// Loads a candidate image far enough to learn its size.
///
/// Implementations must return within their own deadline; a probe that
/// cannot finish in time reports [`ProbeOutcome::TimedOut`].
pub trait ImageProbe {
    fn probe(&self, url: &Url) -> ProbeOutcome;
}

impl<T: ImageProbe + ?Sized> ImageProbe for Box<T> {
    fn probe(&self, url: &Url) -> ProbeOutcome {
        (**self).probe(url)
    }
}

impl<T: ImageProbe + ?Sized> ImageProbe for &T {
    fn probe(&self, url: &Url) -> ProbeOutcome {
        (**self).probe(url)
    }
}

/// A probe that never loads anything. Every candidate is rejected, so
/// callers fall back to their defaults.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProbe;

impl ImageProbe for NullProbe {
    fn probe(&self, _url: &Url) -> ProbeOutcome {
        ProbeOutcome::Failed(ProbeError::Disabled)
    }
}

#[derive(Debug, Clone)]
struct FetchSettings {
    user_agent: String,
    timeout: Duration,
    max_bytes: usize,
    allowed_origins: Option<HashSet<String>>,
    local_files: bool,
}

/// Probes http(s) URLs, and file URLs once enabled with
/// [`HttpImageProbe::with_local_files`], on a worker thread per request.
///
/// The caller waits at most `timeout`; a worker that is still running past
/// the deadline is detached and its result discarded.
#[derive(Debug, Clone)]
pub struct HttpImageProbe {
    settings: FetchSettings,
}

impl Default for HttpImageProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpImageProbe {
    pub fn new() -> Self {
        Self {
            settings: FetchSettings {
                user_agent: DEFAULT_USER_AGENT.to_string(),
                timeout: DEFAULT_PROBE_TIMEOUT,
                max_bytes: DEFAULT_MAX_BYTES,
                allowed_origins: None,
                local_files: false,
            },
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.settings.user_agent = user_agent.into();
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.settings.max_bytes = max_bytes;
        self
    }

    /// Restrict network probes to the listed origins, e.g.
    /// `"https://example.com:443"`. File URLs are unaffected.
    pub fn with_origin_allowlist<I: IntoIterator<Item = String>>(mut self, origins: I) -> Self {
        self.settings.allowed_origins = Some(origins.into_iter().collect());
        self
    }

    /// Allow `file://` candidates. Only enable this for pages read from
    /// the local filesystem.
    pub fn with_local_files(mut self, enabled: bool) -> Self {
        self.settings.local_files = enabled;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.settings.timeout
    }
}

impl ImageProbe for HttpImageProbe {
    fn probe(&self, url: &Url) -> ProbeOutcome {
        let (tx, rx) = mpsc::channel();
        let target = url.clone();
        let settings = self.settings.clone();

        thread::spawn(move || {
            let _ = tx.send(fetch_dimensions(&target, &settings));
        });

        match rx.recv_timeout(self.settings.timeout) {
            Ok(Ok(dims)) => {
                debug!(url = %url, width = dims.width, height = dims.height, "probe loaded");
                ProbeOutcome::Loaded(dims)
            }
            Ok(Err(err)) => {
                debug!(url = %url, error = %err, "probe failed");
                ProbeOutcome::Failed(err)
            }
            Err(RecvTimeoutError::Timeout) => {
                debug!(url = %url, timeout_ms = self.settings.timeout.as_millis() as u64, "probe timed out");
                ProbeOutcome::TimedOut
            }
            Err(RecvTimeoutError::Disconnected) => ProbeOutcome::Failed(ProbeError::WorkerGone),
        }
    }
}

fn fetch_dimensions(url: &Url, settings: &FetchSettings) -> Result<ImageDimensions> {
    let bytes = match url.scheme() {
        "http" | "https" => fetch_http(url, settings)?,
        "file" if settings.local_files => read_file(url, settings)?,
        other => return Err(ProbeError::UnsupportedScheme(other.to_string())),
    };
    decode_dimensions(&bytes)
}

fn origin_of(url: &Url) -> String {
    let host = url.host_str().unwrap_or("");
    match url.port_or_known_default() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    }
}

fn is_loopback(url: &Url) -> bool {
    matches!(
        url.host_str(),
        Some("localhost") | Some("127.0.0.1") | Some("[::1]") | Some("::1")
    )
}

fn fetch_http(url: &Url, settings: &FetchSettings) -> Result<Vec<u8>> {
    if let Some(allowed) = settings.allowed_origins.as_ref() {
        let origin = origin_of(url);
        if !allowed.contains(&origin) {
            return Err(ProbeError::OriginNotAllowed(origin));
        }
    }

    let mut builder = reqwest::blocking::Client::builder()
        .user_agent(settings.user_agent.clone())
        .timeout(settings.timeout);
    if is_loopback(url) {
        builder = builder.no_proxy();
    }
    let client = builder.build()?;

    let response = client.get(url.clone()).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(ProbeError::Status(status.as_u16()));
    }
    read_limited(response, settings.max_bytes)
}

fn read_file(url: &Url, settings: &FetchSettings) -> Result<Vec<u8>> {
    let path: PathBuf = url
        .to_file_path()
        .map_err(|_| ProbeError::UnsupportedScheme("file".into()))?;
    // FIFOs and devices could block the worker forever.
    if !std::fs::metadata(&path)?.is_file() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a regular file").into());
    }
    let file = std::fs::File::open(path)?;
    read_limited(file, settings.max_bytes)
}

fn read_limited<R: Read>(reader: R, max_bytes: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.take(max_bytes as u64 + 1).read_to_end(&mut buf)?;
    if buf.len() > max_bytes {
        return Err(ProbeError::TooLarge(max_bytes));
    }
    Ok(buf)
}
