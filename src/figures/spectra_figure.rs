// src/figures/spectra_figure.rs

use ndarray::{s, Array2};
use std::path::Path;

use crate::axes::{AxPlacer, AxesGrid, AxisScale, LineStyle};
use crate::component::{Component, COMPONENT_COUNT};
use crate::constants::{SPECTRA_AXSIZE_IN, SPECTRA_FRAME_IN, SPECTRA_GAP_IN};
use crate::data_analysis::psd;
use crate::data_input::ts_data::TsData;
use crate::error::{PlotError, Result};
use crate::figures::save_grid;
use crate::types::{spectrum_to_curve, GridIndex};

/// Log-log spectra of the three components, one row each, in `ncol` columns
/// sharing both axes.
#[derive(Debug)]
pub struct SpectraFigure {
    pub grid: AxesGrid,
}

impl SpectraFigure {
    pub fn new(ncol: usize) -> Result<Self> {
        if ncol == 0 {
            return Err(PlotError::Input("a spectra figure needs at least one column".into()));
        }
        let placer = AxPlacer::uniform(
            COMPONENT_COUNT,
            ncol,
            (SPECTRA_AXSIZE_IN, SPECTRA_AXSIZE_IN),
            (SPECTRA_GAP_IN, SPECTRA_GAP_IN),
            SPECTRA_FRAME_IN,
        );
        let share = Array2::<u16>::ones((COMPONENT_COUNT, ncol));
        let mut grid = AxesGrid::new(&placer, share.clone(), share)?;
        for (row, comp) in Component::ALL.into_iter().enumerate() {
            for col in 0..ncol {
                let panel = grid.panel_mut(row, col);
                panel.comp = Some(comp);
                panel.corner_label = Some(comp.to_string());
                panel.x_scale = AxisScale::Log;
                panel.y_scale = AxisScale::Log;
                panel.hide_x_ticklabels = row + 1 < COMPONENT_COUNT;
                panel.hide_y_ticklabels = col > 0;
            }
            grid.panel_mut(row, 0).y_label = Some("[m²s⁻²/Hz]".to_string());
        }
        for col in 0..ncol {
            grid.panel_mut(COMPONENT_COUNT - 1, col).x_label = Some("f [Hz]".to_string());
        }
        Ok(Self { grid })
    }

    /// Plots the spectra of `data` at `igrid` (the hub when `None`) into column `col`,
    /// adding the theoretical spectrum when the field carries one.
    pub fn plot_spectra(&mut self, data: &TsData, nfft: usize, igrid: Option<GridIndex>, col: usize) -> Result<()> {
        if col >= self.grid.ncols {
            return Err(PlotError::Input(format!(
                "column {col} outside a {}-column spectra figure",
                self.grid.ncols
            )));
        }
        let igrid = igrid.unwrap_or(data.ihub);
        for comp in Component::ALL {
            let series = data.timeseries(comp, igrid)?.to_vec();
            let spectrum = psd(&series, data.sample_rate(), nfft)?;
            let panel = self.grid.panel_mut(comp.index(), col);
            panel.plot(spectrum_to_curve(spectrum), &LineStyle::default());
            if let Some(theory) = data.theory() {
                let suu = theory.suu.slice(s![comp.index(), igrid.0, igrid.1, ..]);
                let curve = theory.f.iter().copied().zip(suu.iter().copied()).collect();
                panel.plot(curve, &LineStyle::default());
            }
        }
        Ok(())
    }

    pub fn save(&self, path: &Path, dpi: u32) -> Result<()> {
        save_grid(&self.grid, path, dpi)
    }
}

/// Spectra figure of `data` at `igrid` (the hub when `None`).
pub fn plot_spectra(data: &TsData, nfft: usize, igrid: Option<GridIndex>) -> Result<SpectraFigure> {
    let mut fig = SpectraFigure::new(1)?;
    fig.plot_spectra(data, nfft, igrid, 0)?;
    Ok(fig)
}
