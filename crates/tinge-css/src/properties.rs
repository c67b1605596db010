//! Turns cascade winners into [`ComputedStyle`] values.

use std::collections::BTreeMap;

use crate::color::{Rgba, split_preserving_parens};
use crate::types::{BORDER_SIDES, ComputedStyle};

const BORDER_STYLES: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

/// Expand a declaration into the longhands [`compute_style`] reads, so a
/// shorthand and its longhands compete in the cascade as one property.
/// Omitted parts of a shorthand take their initial values.
pub(crate) fn longhands(name: &str, value: &str) -> Vec<(String, String)> {
    let v = value.trim();
    match name {
        "background" => vec![("background-color".to_string(), background_color_text(v))],
        "font" if is_wide_keyword(v) => vec![("font-family".to_string(), v.to_string())],
        "font" => family_from_font_shorthand(v)
            .map(|family| vec![("font-family".to_string(), family)])
            .unwrap_or_default(),
        "border" => BORDER_SIDES
            .iter()
            .flat_map(|side| side_longhands(side, v))
            .collect(),
        "border-color" | "border-style" => {
            let suffix = &name["border-".len()..];
            let Some(edges) = edge_values(v) else {
                return Vec::new();
            };
            BORDER_SIDES
                .iter()
                .zip(edges)
                .map(|(side, edge)| (format!("border-{side}-{suffix}"), edge))
                .collect()
        }
        _ => match BORDER_SIDES
            .iter()
            .find(|side| name.strip_prefix("border-") == Some(**side))
        {
            Some(side) => side_longhands(side, v),
            None => vec![(name.to_string(), v.to_string())],
        },
    }
}

fn is_wide_keyword(v: &str) -> bool {
    ["inherit", "initial", "unset"].iter().any(|k| is_keyword(v, k))
}

// Lengths and positions such as `100` or `.5` would otherwise parse as bare hex.
fn is_color_token(token: &str) -> bool {
    if token.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '.' | '-' | '+')) {
        return false;
    }
    is_keyword(token, "currentcolor") || Rgba::parse(token).is_some()
}

/// The color layer of a `background` shorthand: only the final layer may
/// carry one, and image or gradient layers without it leave `transparent`.
fn background_color_text(v: &str) -> String {
    if is_wide_keyword(v) {
        return v.to_ascii_lowercase();
    }
    let last_layer = split_top_level_commas(v).pop().unwrap_or_default();
    split_preserving_parens(&last_layer)
        .into_iter()
        .filter(|tok| !tok.contains("gradient(") && !tok.starts_with("url("))
        .find(|tok| is_color_token(tok))
        .unwrap_or_else(|| "transparent".to_string())
}

/// `border` / `border-<side>`: a color (initially `currentcolor`) and a
/// style (initially `none`).
fn side_longhands(side: &str, v: &str) -> Vec<(String, String)> {
    let (color, style) = if is_wide_keyword(v) {
        (v.to_ascii_lowercase(), v.to_ascii_lowercase())
    } else {
        let tokens = split_preserving_parens(v);
        let color = tokens
            .iter()
            .find(|tok| is_color_token(tok))
            .cloned()
            .unwrap_or_else(|| "currentcolor".to_string());
        let style = tokens
            .iter()
            .map(|tok| tok.to_ascii_lowercase())
            .find(|tok| BORDER_STYLES.contains(&tok.as_str()))
            .unwrap_or_else(|| "none".to_string());
        (color, style)
    };
    vec![
        (format!("border-{side}-color"), color),
        (format!("border-{side}-style"), style),
    ]
}

/// One to four edge values in top, right, bottom, left order.
fn edge_values(v: &str) -> Option<[String; 4]> {
    let tokens = split_preserving_parens(v);
    let out = match tokens.as_slice() {
        [] => return None,
        [a] => [a.clone(), a.clone(), a.clone(), a.clone()],
        [v, h] => [v.clone(), h.clone(), v.clone(), h.clone()],
        [t, h, b] => [t.clone(), h.clone(), b.clone(), h.clone()],
        [t, r, b, l, ..] => [t.clone(), r.clone(), b.clone(), l.clone()],
    };
    Some(out)
}

/// Compute an element's style from its declared winners (already expanded
/// by [`longhands`]) and its parent's computed style. `color` and
/// `font-family` inherit; backgrounds and borders do not.
pub fn compute_style(
    declared: &BTreeMap<String, String>,
    parent: Option<&ComputedStyle>,
) -> ComputedStyle {
    let inherited_color = parent.and_then(|p| p.color);
    let color = match declared.get("color").map(|v| v.trim()) {
        None => inherited_color,
        Some(v) if is_keyword(v, "inherit") || is_keyword(v, "currentcolor") => inherited_color,
        Some(v) if is_keyword(v, "initial") => None,
        Some(v) => Rgba::parse(v).or(inherited_color),
    };
    let current = color.unwrap_or(Rgba::BLACK);

    let mut out = ComputedStyle {
        color,
        font_family: font_family(declared).or_else(|| parent.and_then(|p| p.font_family.clone())),
        ..ComputedStyle::default()
    };

    let parent_background = parent.and_then(|p| p.background_color);
    out.background_color = declared
        .get("background-color")
        .and_then(|v| resolve_color(v, current, parent_background))
        .filter(|c| !c.is_transparent());

    for (i, side) in BORDER_SIDES.iter().enumerate() {
        let hidden = declared
            .get(&format!("border-{side}-style"))
            .is_some_and(|s| is_keyword(s.trim(), "none") || is_keyword(s.trim(), "hidden"));
        if hidden {
            continue;
        }
        out.border_colors[i] = declared
            .get(&format!("border-{side}-color"))
            .and_then(|v| resolve_color(v, current, None))
            .filter(|c| !c.is_transparent());
    }

    out
}

fn is_keyword(v: &str, keyword: &str) -> bool {
    v.eq_ignore_ascii_case(keyword)
}

fn resolve_color(raw: &str, current: Rgba, inherited: Option<Rgba>) -> Option<Rgba> {
    let v = raw.trim();
    if is_keyword(v, "currentcolor") {
        Some(current)
    } else if is_keyword(v, "inherit") {
        inherited
    } else {
        Rgba::parse(v)
    }
}

fn font_family(declared: &BTreeMap<String, String>) -> Option<String> {
    let v = declared.get("font-family")?.trim();
    if v.is_empty() || is_keyword(v, "inherit") || is_keyword(v, "initial") {
        None
    } else {
        Some(v.to_string())
    }
}

/// `font: italic 600 16px/1.5 Inter, sans-serif` -> `Inter, sans-serif`.
fn family_from_font_shorthand(value: &str) -> Option<String> {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    let size_at = tokens.iter().position(|t| is_font_size_token(t))?;
    let family = tokens[size_at + 1..].join(" ");
    let family = family.trim_start_matches('/').trim();
    (!family.is_empty()).then(|| family.to_string())
}

fn is_font_size_token(token: &str) -> bool {
    let size = token.split('/').next().unwrap_or(token);
    let digits_end = size
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(size.len());
    if digits_end == 0 {
        return matches!(
            size,
            "xx-small" | "x-small" | "small" | "medium" | "large" | "x-large" | "xx-large"
                | "smaller" | "larger"
        );
    }
    matches!(&size[digits_end..], "px" | "em" | "rem" | "%" | "pt" | "vw" | "vh")
}

fn split_top_level_commas(value: &str) -> Vec<String> {
    let mut layers = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, ch) in value.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                layers.push(value[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    layers.push(value[start..].trim().to_string());
    layers
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Declarations in source order, expanded the way the cascade does.
    fn declared(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .flat_map(|(k, v)| longhands(k, v))
            .collect()
    }

    #[test]
    fn background_shorthand_extracts_color_layer() {
        let s = compute_style(
            &declared(&[("background", "url(bg.png) no-repeat #222 center")]),
            None,
        );
        assert_eq!(s.background_color, Some(Rgba::rgb(0x22, 0x22, 0x22)));

        let g = compute_style(
            &declared(&[("background", "linear-gradient(45deg, red, blue)")]),
            None,
        );
        assert_eq!(g.background_color, None);
    }

    #[test]
    fn transparent_background_is_none() {
        let s = compute_style(&declared(&[("background-color", "rgba(0,0,0,0)")]), None);
        assert_eq!(s.background_color, None);
    }

    #[test]
    fn color_and_font_inherit_background_does_not() {
        let parent = compute_style(
            &declared(&[
                ("color", "#eee"),
                ("background", "#000"),
                ("font-family", "Inter, sans-serif"),
            ]),
            None,
        );
        let child = compute_style(&BTreeMap::new(), Some(&parent));
        assert_eq!(child.color, Some(Rgba::rgb(0xee, 0xee, 0xee)));
        assert_eq!(child.font_family.as_deref(), Some("Inter, sans-serif"));
        assert_eq!(child.background_color, None);
    }

    #[test]
    fn border_colors_expand_and_resolve_current_color() {
        let s = compute_style(
            &declared(&[
                ("color", "red"),
                ("border", "1px solid currentColor"),
                ("border-left-color", "#00ff00"),
            ]),
            None,
        );
        assert_eq!(s.border_colors[0], Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(s.border_colors[3], Some(Rgba::rgb(0, 255, 0)));

        let two = compute_style(&declared(&[("border-color", "red blue")]), None);
        assert_eq!(two.border_colors[1], Some(Rgba::rgb(0, 0, 255)));
        assert_eq!(two.border_colors[2], Some(Rgba::rgb(255, 0, 0)));
    }

    #[test]
    fn undeclared_borders_stay_empty() {
        let s = compute_style(&declared(&[("color", "red")]), None);
        assert_eq!(s.border_colors, [None; 4]);
    }

    #[test]
    fn font_shorthand_family() {
        let s = compute_style(
            &declared(&[("font", "italic 600 16px/1.5 \"Inter\", sans-serif")]),
            None,
        );
        assert_eq!(s.font_family.as_deref(), Some("\"Inter\", sans-serif"));
    }

    #[test]
    fn later_shorthand_resets_longhand() {
        let s = compute_style(
            &declared(&[("background-color", "#fff"), ("background", "#111")]),
            None,
        );
        assert_eq!(s.background_color, Some(Rgba::rgb(0x11, 0x11, 0x11)));

        let image_only = compute_style(
            &declared(&[("background-color", "#fff"), ("background", "url(hero.jpg) center")]),
            None,
        );
        assert_eq!(image_only.background_color, None);

        let longhand_last = compute_style(
            &declared(&[("background", "#111"), ("background-color", "#fff")]),
            None,
        );
        assert_eq!(longhand_last.background_color, Some(Rgba::rgb(255, 255, 255)));
    }

    #[test]
    fn border_none_hides_earlier_colors() {
        let s = compute_style(
            &declared(&[("border-color", "red"), ("border", "none")]),
            None,
        );
        assert_eq!(s.border_colors, [None; 4]);

        let side = compute_style(
            &declared(&[("border", "none"), ("border-top", "2px dashed #336699")]),
            None,
        );
        assert_eq!(side.border_colors[0], Some(Rgba::rgb(0x33, 0x66, 0x99)));
        assert_eq!(side.border_colors[1], None);
    }
}
