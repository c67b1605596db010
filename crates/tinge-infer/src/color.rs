//! Channel metrics used by the classifier and palette extractor.

use tinge_css::Rgba;

use crate::tables::{VIBRANT_BRIGHTNESS, VIBRANT_MIN_SATURATION};

/// Perceived luminance in `[0, 1]`: `(0.299 R + 0.587 G + 0.114 B) / 255`.
pub fn luminance(color: &Rgba) -> f64 {
    let [r, g, b] = color.channels().map(f64::from);
    (0.299 * r + 0.587 * g + 0.114 * b) / 255.0
}

/// `(max - min) / max`, zero for black.
pub fn saturation(color: &Rgba) -> f64 {
    let channels = color.channels();
    let max = channels.iter().copied().max().unwrap_or(0);
    let min = channels.iter().copied().min().unwrap_or(0);
    if max == 0 {
        0.0
    } else {
        f64::from(max - min) / f64::from(max)
    }
}

/// Mean of the three channels.
pub fn brightness(color: &Rgba) -> f64 {
    let [r, g, b] = color.channels().map(f64::from);
    (r + g + b) / 3.0
}

/// Colorful and neither near-black nor near-white.
pub fn is_vibrant(color: &Rgba) -> bool {
    let (low, high) = VIBRANT_BRIGHTNESS;
    let brightness = brightness(color);
    saturation(color) > VIBRANT_MIN_SATURATION && brightness > low && brightness < high
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luminance_extremes() {
        assert_eq!(luminance(&Rgba::BLACK), 0.0);
        assert!((luminance(&Rgba::rgb(255, 255, 255)) - 1.0).abs() < 1e-9);
        let grey = luminance(&Rgba::rgb(13, 13, 13));
        assert!((grey - 0.051).abs() < 0.001);
    }

    #[test]
    fn vibrancy() {
        assert!(is_vibrant(&Rgba::rgb(0, 102, 204)));
        assert!(is_vibrant(&Rgba::rgb(255, 102, 0)));
        // greys have no saturation
        assert!(!is_vibrant(&Rgba::rgb(128, 128, 128)));
        // too dark
        assert!(!is_vibrant(&Rgba::rgb(40, 0, 0)));
        // too bright
        assert!(!is_vibrant(&Rgba::rgb(255, 250, 240)));
        assert_eq!(saturation(&Rgba::BLACK), 0.0);
    }
}
