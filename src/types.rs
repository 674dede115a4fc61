// src/types.rs
// Type aliases shared by data input, analysis and plotting

use std::ops::Range;

/// `(iz, iy)` index of a point on the y-z grid.
pub type GridIndex = (usize, usize);

/// Plot-ready curve: `(x, y)` pairs in data units.
pub type CurveData = Vec<(f64, f64)>;

/// Frequency vector and the matching spectral values.
pub type Spectrum = (Vec<f64>, Vec<f64>);

/// Resolved `(x_range, y_range)` of a panel in plotting coordinates.
pub type PanelRanges = (Range<f64>, Range<f64>);

/// `(lower, upper)` axis limits; `None` means auto-scaled.
pub type AxisLimits = (Option<f64>, Option<f64>);

/// Zips a spectrum into plot-ready pairs.
pub fn spectrum_to_curve((f, p): Spectrum) -> CurveData {
    f.into_iter().zip(p).collect()
}
