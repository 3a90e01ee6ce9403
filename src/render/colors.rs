use std::collections::BTreeMap;

use plotters::style::RGBColor;

use crate::render::RenderError;

/// Group label to fill colour.
pub type Palette = BTreeMap<String, RGBColor>;

pub const STEELBLUE: RGBColor = RGBColor(70, 130, 180);
pub const LIGHTSTEELBLUE: RGBColor = RGBColor(176, 196, 222);
pub const MISTYROSE: RGBColor = RGBColor(255, 228, 225);
pub const TOMATO: RGBColor = RGBColor(255, 99, 71);

const NAMED: &[(&str, RGBColor)] = &[
    ("black", RGBColor(0, 0, 0)),
    ("white", RGBColor(255, 255, 255)),
    ("gray", RGBColor(128, 128, 128)),
    ("grey", RGBColor(128, 128, 128)),
    ("lightgray", RGBColor(211, 211, 211)),
    ("red", RGBColor(255, 0, 0)),
    ("darkred", RGBColor(139, 0, 0)),
    ("firebrick", RGBColor(178, 34, 34)),
    ("crimson", RGBColor(220, 20, 60)),
    ("salmon", RGBColor(250, 128, 114)),
    ("tomato", TOMATO),
    ("mistyrose", MISTYROSE),
    ("orange", RGBColor(255, 165, 0)),
    ("gold", RGBColor(255, 215, 0)),
    ("green", RGBColor(0, 128, 0)),
    ("seagreen", RGBColor(46, 139, 87)),
    ("lightgreen", RGBColor(144, 238, 144)),
    ("teal", RGBColor(0, 128, 128)),
    ("blue", RGBColor(0, 0, 255)),
    ("navy", RGBColor(0, 0, 128)),
    ("royalblue", RGBColor(65, 105, 225)),
    ("steelblue", STEELBLUE),
    ("lightsteelblue", LIGHTSTEELBLUE),
    ("skyblue", RGBColor(135, 206, 235)),
    ("lightblue", RGBColor(173, 216, 230)),
    ("purple", RGBColor(128, 0, 128)),
    ("orchid", RGBColor(218, 112, 214)),
    ("plum", RGBColor(221, 160, 221)),
];

/// Seaborn "deep" categorical cycle, used for groups without a palette entry.
pub const DEFAULT_CYCLE: [RGBColor; 10] = [
    RGBColor(0x4c, 0x72, 0xb0),
    RGBColor(0xdd, 0x84, 0x52),
    RGBColor(0x55, 0xa8, 0x68),
    RGBColor(0xc4, 0x4e, 0x52),
    RGBColor(0x81, 0x72, 0xb3),
    RGBColor(0x93, 0x78, 0x60),
    RGBColor(0xda, 0x8b, 0xc3),
    RGBColor(0x8c, 0x8c, 0x8c),
    RGBColor(0xcc, 0xb9, 0x74),
    RGBColor(0x64, 0xb5, 0xcd),
];

/// Accepts a CSS colour name or `#rrggbb`.
pub fn parse_color(s: &str) -> Result<RGBColor, RenderError> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() == 6 && hex.is_ascii() {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
            if let (Ok(r), Ok(g), Ok(b)) = (channel(0), channel(2), channel(4)) {
                return Ok(RGBColor(r, g, b));
            }
        }
        return Err(RenderError::Color(s.to_string()));
    }
    let lower = s.to_ascii_lowercase();
    NAMED
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, c)| *c)
        .ok_or_else(|| RenderError::Color(s.to_string()))
}

/// Parses `label=colour,label=colour`.
pub fn parse_palette(s: &str) -> Result<Palette, RenderError> {
    let mut palette = Palette::new();
    for entry in s.split(',').filter(|e| !e.trim().is_empty()) {
        let (label, color) = entry
            .rsplit_once('=')
            .ok_or_else(|| RenderError::Color(format!("expected label=colour, got '{entry}'")))?;
        palette.insert(label.trim().to_string(), parse_color(color)?);
    }
    Ok(palette)
}

pub fn to_hex(c: RGBColor) -> String {
    format!("#{:02x}{:02x}{:02x}", c.0, c.1, c.2)
}

/// Light/dark pairs for the two panels when exactly two groups are compared.
/// Any other group count leaves the palette unset.
pub fn auto_palette(group_order: &[String], panel: usize) -> Option<Palette> {
    if group_order.len() != 2 {
        return None;
    }
    let (light, dark) = if panel == 0 {
        (LIGHTSTEELBLUE, STEELBLUE)
    } else {
        (MISTYROSE, TOMATO)
    };
    let mut palette = Palette::new();
    palette.insert(group_order[0].clone(), light);
    palette.insert(group_order[1].clone(), dark);
    Some(palette)
}

/// Fill for the group at `idx` in the display order.
pub fn group_color(palette: Option<&Palette>, label: &str, idx: usize) -> RGBColor {
    palette
        .and_then(|p| p.get(label).copied())
        .unwrap_or(DEFAULT_CYCLE[idx % DEFAULT_CYCLE.len()])
}

/// Scales HLS saturation, as seaborn does for box faces.
pub fn desaturate(c: RGBColor, factor: f64) -> RGBColor {
    let r = c.0 as f64 / 255.0;
    let g = c.1 as f64 / 255.0;
    let b = c.2 as f64 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if max == min {
        return c;
    }
    let d = max - min;
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
    let sector = if max == r {
        ((g - b) / d).rem_euclid(6.0)
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    let h = sector / 6.0;

    let s = (s * factor).clamp(0.0, 1.0);
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |t: f64| {
        let t = t.rem_euclid(1.0);
        let v = if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        };
        (v * 255.0).round().clamp(0.0, 255.0) as u8
    };
    RGBColor(channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
}

#[cfg(test)]
#[path = "../../tests/src_inline/render/colors.rs"]
mod tests;
