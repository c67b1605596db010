//! Time-bounded image loading for icon and logo discovery.
//!
//! A probe answers one question about a URL: does it load as an image, and
//! if so how large is it. Every probe is bounded by a deadline so a slow
//! host cannot stall inference.

mod decode;
mod error;
mod probe;

pub use decode::{ImageDimensions, decode_dimensions};
pub use error::{ProbeError, Result};
pub use probe::{
    DEFAULT_MAX_BYTES, DEFAULT_PROBE_TIMEOUT, DEFAULT_USER_AGENT, HttpImageProbe, ImageProbe,
    NullProbe, ProbeOutcome,
};
pub use url::Url;
