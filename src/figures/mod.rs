// src/figures/mod.rs

pub mod forms_figure;
pub mod spectra_figure;
pub mod summary_figure;

pub use forms_figure::{new_summary_forms, FormsFigure, FormsLayout};
pub use spectra_figure::{plot_spectra, SpectraFigure};
pub use summary_figure::{SummaryFigure, SummaryLayout};

use std::path::Path;

use crate::axes::AxesGrid;
use crate::error::{PlotError, Result};
use crate::plot_framework::render_grid;

/// Renders a finished grid to `path`.
pub(crate) fn save_grid(grid: &AxesGrid, path: &Path, dpi: u32) -> Result<()> {
    render_grid(grid, path, dpi).map_err(|e| PlotError::Render(format!("{}: {e}", path.display())))
}

// src/figures/mod.rs
