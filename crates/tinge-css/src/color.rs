use csscolorparser::Color as CssColor;
use std::fmt;
use std::str::FromStr;

/// An sRGB color with straight (non-premultiplied) alpha, as a browser would
/// report it from `getComputedStyle`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parse a CSS color value. Keywords that carry no concrete color
    /// (`none`, `inherit`, `currentColor`, unresolved `var()`) yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let v = raw.trim();
        if v.is_empty()
            || v.eq_ignore_ascii_case("none")
            || v.eq_ignore_ascii_case("inherit")
            || v.eq_ignore_ascii_case("initial")
            || v.eq_ignore_ascii_case("unset")
            || v.eq_ignore_ascii_case("currentcolor")
            || v.starts_with("var(")
        {
            return None;
        }
        let c = CssColor::from_str(v).ok()?;
        Some(Self {
            r: channel(c.r),
            g: channel(c.g),
            b: channel(c.b),
            a: c.a.clamp(0.0, 1.0) as f32,
        })
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= f32::EPSILON
    }

    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Browser serialization: `rgb(r, g, b)` or `rgba(r, g, b, a)`.
    pub fn to_css(&self) -> String {
        if (self.a - 1.0).abs() < 1e-6 {
            format!("rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            let alpha = format!("{:.3}", self.a);
            let alpha = alpha.trim_end_matches('0').trim_end_matches('.');
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
        }
    }

    /// Lowercase `#rrggbb`; alpha is dropped.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

fn channel(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Split a declaration value on top-level whitespace, keeping function
/// arguments such as `rgba(0, 0, 0, 0.5)` in one token.
pub(crate) fn split_preserving_parens(s: &str) -> Vec<String> {
    let mut toks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;
    for ch in s.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth -= 1;
                current.push(ch);
            }
            c if c.is_whitespace() && depth == 0 => {
                if !current.trim().is_empty() {
                    toks.push(current.trim().to_string());
                    current.clear();
                }
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        toks.push(current.trim().to_string());
    }
    toks
}
