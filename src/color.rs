use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Categorical palette
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

/// Maps category labels (product lines, deal sizes) to distinct colours.
#[derive(Debug, Clone)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl CategoryColors {
    /// Build the mapping from the full set of labels, so a label keeps its
    /// colour whatever the current filter hides.
    pub fn new(labels: &BTreeSet<String>) -> Self {
        let palette = generate_palette(labels.len());
        let mapping = labels.iter().cloned().zip(palette).collect();
        CategoryColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Sequential scale
// ---------------------------------------------------------------------------

/// Anchors of a plasma-like scale, dark violet → magenta → yellow.
const SEQUENTIAL_STOPS: [(u8, u8, u8); 3] = [(13, 8, 135), (204, 71, 120), (240, 249, 33)];

/// Colour for `value` within `[min, max]` on the sequential scale.
pub fn sequential_color(value: f64, min: f64, max: f64) -> Color32 {
    let range = max - min;
    let t = if !range.is_finite() || range.abs() < f64::EPSILON {
        1.0
    } else {
        ((value - min) / range).clamp(0.0, 1.0) as f32
    };

    let stop = |i: usize| -> LinSrgb {
        let (r, g, b) = SEQUENTIAL_STOPS[i];
        Srgb::new(r, g, b).into_format::<f32>().into_linear()
    };
    let mixed = if t <= 0.5 {
        stop(0).mix(stop(1), t * 2.0)
    } else {
        stop(1).mix(stop(2), (t - 0.5) * 2.0)
    };
    to_color32(Srgb::from_linear(mixed))
}
