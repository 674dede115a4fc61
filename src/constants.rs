// src/constants.rs

use plotters::style::colors::{BLACK, BLUE};
use plotters::style::RGBColor;

use crate::axes::Frame;

// Default resolution used when saving figures.
pub const DEFAULT_DPI: u32 = 300;

// Spectral estimation defaults.
pub const DEFAULT_WINDOW_TIME_S: f64 = 600.0; // FFT window length for the spectrum/coherence formats
pub const DEFAULT_NFFT: usize = 1024; // FFT length for the summary and spectra figures

// Profile scaling: tke and stress are plotted in units of 10^-4 m^2/s^2 on the summary figure.
pub const DEFAULT_TKE_FACTOR: f64 = 1e4;
pub const DEFAULT_STRESS_FACTOR: f64 = 1e4;

// Default line transparency for SummaryFigure::plot.
pub const DEFAULT_SUMMARY_ALPHA: f64 = 0.8;

// Coherence axis.
pub const COHERENCE_LIMITS: (f64, f64) = (0.0, 1.0);

// --- Axes layout (inches) ---
pub const FORMS_AXSIZE_IN: f64 = 2.0;
pub const FORMS_GAP_ROWS_IN: f64 = 0.2;
pub const FORMS_GAP_COLS_IN: f64 = 1.0;
pub const FORMS_TIGHTGAP_IN: f64 = 0.2;
pub const FORMS_FRAME_IN: Frame = Frame {
    left: 1.0,
    right: 0.3,
    bottom: 0.6,
    top: 0.3,
};
// Component letters are placed this far across the figure (fraction of its width).
pub const ROW_LABEL_X_FRACTION: f64 = 0.02;

pub const SUMMARY_AXSIZE_IN: (f64, f64) = (3.0, 3.0); // (height, width)
pub const SUMMARY_SPACING_IN: (f64, f64) = (0.4, 0.8); // (rows, columns)
pub const SUMMARY_COLUMN_WIDTHS: [f64; 5] = [0.8, 1.0, 1.0, 0.8, 0.8];
pub const SUMMARY_FRAME_IN: Frame = Frame {
    left: 1.0,
    right: 0.3,
    bottom: 1.0,
    top: 0.7,
};

pub const SPECTRA_AXSIZE_IN: f64 = 3.0;
pub const SPECTRA_GAP_IN: f64 = 0.15;
pub const SPECTRA_FRAME_IN: Frame = Frame {
    left: 1.0,
    right: 0.3,
    bottom: 0.6,
    top: 0.3,
};

// Space outside each axes box for tick labels and axis descriptions.
pub const Y_LABEL_AREA_IN: f64 = 0.55;
pub const X_LABEL_AREA_IN: f64 = 0.45;

// Padding added around auto-scaled data ranges (fraction of the span).
pub const RANGE_PADDING_FRACTION: f64 = 0.05;

// --- Plot Color Assignments ---
pub const COLOR_REFERENCE_LINE: &RGBColor = &BLACK; // zero lines, grid_x lines, theory curves
pub const COLOR_POINT_MARKER: &RGBColor = &BLUE; // igrid / icoh markers on the profile
pub const COLOR_UNAVAILABLE_TEXT: RGBColor = RGBColor(200, 30, 30);

// Stroke widths for lines (points, scaled by dpi at render time)
pub const LINE_WIDTH_PLOT_PT: f64 = 1.0;
pub const LINE_WIDTH_LEGEND_PT: f64 = 1.5;

// Marker sizes (points)
pub const MARKER_SIZE_IGRID_PT: f64 = 6.0;
pub const MARKER_SIZE_ICOH_PT: f64 = 10.0;

// (on, off) lengths of line patterns, as fractions of the panel size.
pub const DASH_PATTERN: (f64, f64) = (0.035, 0.02);
pub const DOT_PATTERN: (f64, f64) = (0.006, 0.012);

// Tick label counts requested from the mesh (log axes ask for one per decade).
pub const LINEAR_TICK_COUNT: usize = 6;
pub const MAX_LOG_TICK_COUNT: usize = 10;

// Inset of corner annotations and figure texts from their anchor (points).
pub const TEXT_INSET_PT: f64 = 4.0;

// src/constants.rs
