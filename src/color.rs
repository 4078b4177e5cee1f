use std::collections::BTreeMap;

use palette::{Hsl, IntoColor, Srgb};

/// Fallback for keys the map was not built with.
pub const DEFAULT_COLOR: &str = "#808080";

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct `#rrggbb` colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_hex(rgb)
        })
        .collect()
}

fn to_hex(rgb: Srgb) -> String {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        channel(rgb.red),
        channel(rgb.green),
        channel(rgb.blue)
    )
}

// ---------------------------------------------------------------------------
// Color mapping: series key → colour
// ---------------------------------------------------------------------------

/// Maps the distinct keys of a chart (locations or crime types) to distinct
/// colours, in first-seen order.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, String>,
}

impl ColorMap {
    /// Build a colour map from keys; duplicates keep their first colour.
    pub fn new<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut order: Vec<String> = Vec::new();
        for key in keys {
            if !order.iter().any(|k| k == key) {
                order.push(key.to_string());
            }
        }
        let mapping = order
            .iter()
            .cloned()
            .zip(generate_palette(order.len()))
            .collect();
        ColorMap { mapping }
    }

    /// Look up the colour for a given key.
    pub fn color_for(&self, key: &str) -> &str {
        self.mapping
            .get(key)
            .map(String::as_str)
            .unwrap_or(DEFAULT_COLOR)
    }
}
