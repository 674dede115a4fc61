// src/error.rs

use thiserror::Error;

/// Errors raised while building data objects, computing curves or saving figures.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("unknown velocity component '{0}' (expected u, v, w or 0, 1, 2)")]
    UnknownComponent(String),

    #[error("grid index ({iz}, {iy}) is outside the {nz}x{ny} grid")]
    GridIndex {
        iz: usize,
        iy: usize,
        nz: usize,
        ny: usize,
    },

    #[error("array '{name}' has shape {found:?}, expected {expected:?}")]
    Shape {
        name: &'static str,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("sample interval must be positive and finite, got {0}")]
    SampleInterval(f64),

    #[error("at least one plot format must be provided")]
    NoFormats,

    #[error("invalid input: {0}")]
    Input(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("rendering failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, PlotError>;
