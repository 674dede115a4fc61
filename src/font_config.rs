// src/font_config.rs

// Font styles for figure text. Sizes are in points and converted to pixels
// for the requested dpi at render time, so a figure looks the same at 100 and 300 dpi.

/// Font family used for every text element.
pub const FONT_FAMILY: &str = "sans-serif";

/// Represents a font style (family + size in points)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontStyle {
    pub family: &'static str,
    pub size_pt: f64,
}

impl FontStyle {
    /// Pixel size of this font at the given resolution.
    pub fn px(&self, dpi: u32) -> i32 {
        pt_to_px(self.size_pt, dpi).max(1)
    }

    /// `(family, px)` tuple for plotters' `IntoFont`.
    pub fn tuple(&self, dpi: u32) -> (&'static str, i32) {
        (self.family, self.px(dpi))
    }
}

/// Converts a length in points to pixels.
pub fn pt_to_px(points: f64, dpi: u32) -> i32 {
    (points * dpi as f64 / 72.0).round() as i32
}

// medium = 10pt, x-large = 14.4pt
pub const FONT_FIGURE_TITLE: FontStyle = FontStyle {
    family: FONT_FAMILY,
    size_pt: 14.4,
};

pub const FONT_CHART_TITLE: FontStyle = FontStyle {
    family: FONT_FAMILY,
    size_pt: 12.0,
};

pub const FONT_AXIS_LABEL: FontStyle = FontStyle {
    family: FONT_FAMILY,
    size_pt: 10.0,
};

pub const FONT_TICK_LABEL: FontStyle = FontStyle {
    family: FONT_FAMILY,
    size_pt: 8.0,
};

pub const FONT_LEGEND: FontStyle = FontStyle {
    family: FONT_FAMILY,
    size_pt: 8.0,
};

pub const FONT_CORNER_LABEL: FontStyle = FontStyle {
    family: FONT_FAMILY,
    size_pt: 14.4,
};

pub const FONT_MESSAGE: FontStyle = FontStyle {
    family: FONT_FAMILY,
    size_pt: 9.0,
};
