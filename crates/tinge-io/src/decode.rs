use std::io::Cursor;

use crate::error::{ProbeError, Result};

/// Pixel size of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    /// Both sides larger than one pixel (tracking pixels are 1x1).
    pub fn is_nontrivial(&self) -> bool {
        self.width > 1 && self.height > 1
    }
}

/// Read image dimensions from encoded bytes without decoding pixel data.
/// Raster formats are sniffed from magic bytes; SVG is measured with `usvg`.
pub fn decode_dimensions(bytes: &[u8]) -> Result<ImageDimensions> {
    if bytes.is_empty() {
        return Err(ProbeError::Decode("empty body".into()));
    }
    if looks_like_svg(bytes) {
        return svg_dimensions(bytes);
    }
    let reader = image::ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let (width, height) = reader.into_dimensions()?;
    Ok(ImageDimensions { width, height })
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    (text.starts_with("<svg") || text.starts_with("<?xml") || text.starts_with("<!--"))
        && text.contains("<svg")
}

fn svg_dimensions(bytes: &[u8]) -> Result<ImageDimensions> {
    let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())
        .map_err(|err| ProbeError::Decode(err.to_string()))?;
    let size = tree.size();
    Ok(ImageDimensions {
        width: size.width().round() as u32,
        height: size.height().round() as u32,
    })
}
