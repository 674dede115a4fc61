// src/figures/summary_figure.rs

use ndarray::{s, Array2, Axis};
use std::path::Path;

use crate::axes::{AxPlacer, AxSpacer, AxesGrid, AxisScale, Frame, LinePattern, LineStyle, Marker, MarkerFill};
use crate::component::{Component, COMPONENT_COUNT};
use crate::constants::{
    COLOR_POINT_MARKER, COLOR_REFERENCE_LINE, COHERENCE_LIMITS, DEFAULT_NFFT, DEFAULT_STRESS_FACTOR,
    DEFAULT_SUMMARY_ALPHA, DEFAULT_TKE_FACTOR, MARKER_SIZE_ICOH_PT, MARKER_SIZE_IGRID_PT, SUMMARY_AXSIZE_IN,
    SUMMARY_COLUMN_WIDTHS, SUMMARY_FRAME_IN, SUMMARY_SPACING_IN,
};
use crate::data_analysis::{coh, psd};
use crate::data_input::ts_data::TsData;
use crate::data_input::ts_run::TsRun;
use crate::error::Result;
use crate::figures::save_grid;
use crate::plot_formats::profile::profile_curve;
use crate::plot_formats::superscript;
use crate::types::{spectrum_to_curve, GridIndex};

const COL_PROF: usize = 0;
const COL_SPEC: usize = 1;
const COL_COH: usize = 2;
const COL_TKE: usize = 3;
const COL_STRESS: usize = 4;

const COLUMN_TITLES: [&str; 5] = ["Velocity Profile", "Spectrum", "Coherence", "Energy", "Stresses"];
const STRESS_LABELS: [&str; COMPONENT_COUNT] = ["<u'v'>", "<u'w'>", "<v'w'>"];

/// Sizes (inches) of a [`SummaryFigure`].
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLayout {
    /// (height, width) of a full-width axes
    pub axsize: (f64, f64),
    /// (between rows, between columns)
    pub spacing: (f64, f64),
    pub frame: Frame,
}

impl Default for SummaryLayout {
    fn default() -> Self {
        Self {
            axsize: SUMMARY_AXSIZE_IN,
            spacing: SUMMARY_SPACING_IN,
            frame: SUMMARY_FRAME_IN,
        }
    }
}

/// Statistics overview of a simulated field: mean velocity profile, spectrum,
/// coherence, tke and Reynolds stress, one row per velocity component.
#[derive(Debug)]
pub struct SummaryFigure {
    pub grid: AxesGrid,
    /// FFT length of the spectrum and coherence estimates
    pub nfft: usize,
    /// Point of the spectrum and first coherence point; its lateral index selects the profiles
    pub igrid: GridIndex,
    /// Second coherence point; the last grid point when `None`
    pub icoh: Option<GridIndex>,
    tke_factor: f64,
    rs_factor: f64,
}

impl SummaryFigure {
    pub fn new(title: Option<&str>) -> Result<Self> {
        Self::with_layout(&SummaryLayout::default(), DEFAULT_NFFT, title)
    }

    pub fn with_layout(layout: &SummaryLayout, nfft: usize, title: Option<&str>) -> Result<Self> {
        let nrows = COMPONENT_COUNT;
        let ncols = SUMMARY_COLUMN_WIDTHS.len();
        let vertical = AxSpacer::new(nrows, layout.axsize.0, layout.spacing.0, (layout.frame.top, layout.frame.bottom));
        let horizontal = AxSpacer::relative(
            &SUMMARY_COLUMN_WIDTHS,
            layout.axsize.1,
            layout.spacing.1,
            (layout.frame.left, layout.frame.right),
        );

        // spectrum and coherence share x; tke and stress share y
        let mut sharex = Array2::<u16>::ones((nrows, ncols));
        let mut sharey = Array2::<u16>::ones((nrows, ncols));
        sharex.column_mut(COL_PROF).fill(2);
        sharey.column_mut(COL_PROF).fill(2);
        sharex.slice_mut(s![.., COL_SPEC..]).fill(3);
        sharey.column_mut(COL_SPEC).fill(4);
        sharey.column_mut(COL_COH).fill(5);
        sharex.column_mut(COL_TKE).fill(4);
        sharex.column_mut(COL_STRESS).fill(5);

        let mut grid = AxesGrid::new(&AxPlacer::new(vertical, horizontal), sharex, sharey)?;
        for (col, title) in COLUMN_TITLES.iter().enumerate() {
            grid.panel_mut(0, col).title = Some(title.to_string());
        }
        for (row, comp) in Component::ALL.into_iter().enumerate() {
            for col in 0..ncols {
                let panel = grid.panel_mut(row, col);
                panel.comp = Some(comp);
                panel.hide_x_ticklabels = row + 1 < nrows;
                panel.hide_y_ticklabels = row + 1 < nrows;
            }
            grid.panel_mut(row, COL_PROF).corner_label = Some(comp.to_string());
            grid.panel_mut(row, COL_STRESS).corner_label = Some(STRESS_LABELS[row].to_string());
            grid.panel_mut(row, COL_PROF).vln(0.0, *COLOR_REFERENCE_LINE, LinePattern::Dashed);
            grid.panel_mut(row, COL_STRESS).vln(0.0, *COLOR_REFERENCE_LINE, LinePattern::Dashed);

            let spec = grid.panel_mut(row, COL_SPEC);
            spec.x_scale = AxisScale::Log;
            spec.y_scale = AxisScale::Log;
            grid.panel_mut(row, COL_COH).x_scale = AxisScale::Log;
        }

        let mut fig = Self {
            grid,
            nfft,
            igrid: (0, 0),
            icoh: None,
            tke_factor: DEFAULT_TKE_FACTOR,
            rs_factor: DEFAULT_STRESS_FACTOR,
        };
        fig.set_title(title);
        Ok(fig)
    }

    pub fn set_title(&mut self, title: Option<&str>) {
        if let Some(title) = title {
            self.grid.title = Some(title.to_string());
        }
    }

    /// Sets the spectrum point (default: the hub) and the second coherence point (default: (0, 0)).
    pub fn set_indices(&mut self, data: &TsData, igrid: Option<GridIndex>, icoh: Option<GridIndex>) -> Result<()> {
        let igrid = igrid.unwrap_or(data.ihub);
        let icoh = icoh.unwrap_or((0, 0));
        data.check_index(igrid)?;
        data.check_index(icoh)?;
        self.igrid = igrid;
        self.icoh = Some(icoh);
        Ok(())
    }

    fn icoh_within(&self, nz: usize, ny: usize) -> GridIndex {
        self.icoh
            .unwrap_or((nz.saturating_sub(1), ny.saturating_sub(1)))
    }

    /// Mean velocity profile at the lateral index of `igrid`.
    pub fn plot_prof(&mut self, data: &TsData, style: &LineStyle) -> Result<()> {
        for comp in Component::ALL {
            let curve = profile_curve(&data.uprof, comp, self.igrid.1, &data.z)?;
            self.grid.panel_mut(comp.index(), COL_PROF).plot(curve, style);
        }
        Ok(())
    }

    /// Marks the spectrum point (filled) and the second coherence point (open) on the profile.
    pub fn plot_profpt(&mut self, data: &TsData, style: &LineStyle) -> Result<()> {
        let icoh = self.icoh_within(data.nz(), data.ny());
        data.check_index(self.igrid)?;
        data.check_index(icoh)?;
        let color = style.color.unwrap_or(*COLOR_POINT_MARKER);
        for comp in Component::ALL {
            let c = comp.index();
            let panel = self.grid.panel_mut(c, COL_PROF);
            panel.add_marker(Marker {
                x: data.uprof[[c, self.igrid.0, self.igrid.1]],
                y: data.z[self.igrid.0],
                size_pt: MARKER_SIZE_IGRID_PT,
                color,
                fill: MarkerFill::Filled,
                alpha: style.alpha,
            });
            panel.add_marker(Marker {
                x: data.uprof[[c, icoh.0, icoh.1]],
                y: data.z[icoh.0],
                size_pt: MARKER_SIZE_ICOH_PT,
                color,
                fill: MarkerFill::Open,
                alpha: style.alpha,
            });
        }
        Ok(())
    }

    /// Spectrum at `igrid`, optionally with the field's theoretical spectrum as a dashed black line.
    pub fn plot_spec(&mut self, data: &TsData, theory_line: bool, style: &LineStyle) -> Result<()> {
        for comp in Component::ALL {
            let series = data.timeseries(comp, self.igrid)?.to_vec();
            let spectrum = psd(&series, data.sample_rate(), self.nfft)?;
            let panel = self.grid.panel_mut(comp.index(), COL_SPEC);
            panel.plot(spectrum_to_curve(spectrum), style);
            if let (true, Some(theory)) = (theory_line, data.theory()) {
                let suu = theory.suu.slice(s![comp.index(), self.igrid.0, self.igrid.1, ..]);
                let curve = theory.f.iter().copied().zip(suu.iter().copied()).collect();
                let dashed = LineStyle::default()
                    .with_color(*COLOR_REFERENCE_LINE)
                    .with_pattern(LinePattern::Dashed);
                panel.plot(curve, &dashed);
            }
        }
        Ok(())
    }

    /// Coherence between `igrid` and the second coherence point.
    pub fn plot_coh(&mut self, data: &TsData, style: &LineStyle) -> Result<()> {
        let icoh = self.icoh_within(data.nz(), data.ny());
        for comp in Component::ALL {
            let u0 = data.timeseries(comp, self.igrid)?.to_vec();
            let u1 = data.timeseries(comp, icoh)?.to_vec();
            let gamma2 = coh(&u0, &u1, data.sample_rate(), self.nfft)?;
            self.grid.panel_mut(comp.index(), COL_COH).plot(spectrum_to_curve(gamma2), style);
        }
        Ok(())
    }

    /// tke profile multiplied by `factor`.
    pub fn plot_tke(&mut self, data: &TsData, factor: f64, style: &LineStyle) -> Result<()> {
        self.tke_factor = factor;
        let tke = data.tke();
        for comp in Component::ALL {
            let curve = profile_curve(&tke, comp, self.igrid.1, &data.z)?;
            let scaled = curve.into_iter().map(|(x, z)| (x * factor, z)).collect();
            self.grid.panel_mut(comp.index(), COL_TKE).plot(scaled, style);
        }
        Ok(())
    }

    /// Reynolds stress profiles (u'v', u'w', v'w' on the u, v, w rows) multiplied by `factor`.
    pub fn plot_rs(&mut self, data: &TsData, factor: f64, style: &LineStyle) -> Result<()> {
        self.rs_factor = factor;
        let stress = data.stress();
        for comp in Component::ALL {
            let curve = profile_curve(&stress, comp, self.igrid.1, &data.z)?;
            let scaled = curve.into_iter().map(|(x, z)| (x * factor, z)).collect();
            self.grid.panel_mut(comp.index(), COL_STRESS).plot(scaled, style);
        }
        Ok(())
    }

    /// Model values of a run: laterally averaged profiles, spectrum and squared coherence.
    pub fn plot_theory(&mut self, run: &TsRun, style: &LineStyle) -> Result<()> {
        let icoh = self.icoh_within(run.grid.nz(), run.grid.ny());
        let z = &run.grid.z;
        for comp in Component::ALL {
            let row = comp.index();
            let with_z = |values: ndarray::Array1<f64>, factor: f64| -> Vec<(f64, f64)> {
                values.iter().map(|v| v * factor).zip(z.iter().copied()).collect()
            };

            let prof = TsRun::lateral_mean(&run.prof, comp);
            self.grid.panel_mut(row, COL_PROF).plot(with_z(prof, 1.0), style);

            let spec = run.spectrum(comp, self.igrid)?;
            let curve = run.grid.f.iter().copied().zip(spec.iter().copied()).collect();
            self.grid.panel_mut(row, COL_SPEC).plot(curve, style);

            let gamma2 = run.coherence_squared(comp, self.igrid, icoh)?;
            let curve = run.grid.f.iter().copied().zip(gamma2.iter().copied()).collect();
            self.grid.panel_mut(row, COL_COH).plot(curve, style);

            let tke = TsRun::lateral_mean(&run.tke, comp);
            self.grid.panel_mut(row, COL_TKE).plot(with_z(tke, self.tke_factor), style);

            let stress = run.stress.index_axis(Axis(0), row).mean_axis(Axis(1));
            if let Some(stress) = stress {
                self.grid.panel_mut(row, COL_STRESS).plot(with_z(stress, self.rs_factor), style);
            }
        }
        Ok(())
    }

    /// Plots every statistic of `data`. Without an explicit style, lines are drawn at 0.8 opacity.
    pub fn plot(&mut self, data: &TsData, theory_line: bool, style: Option<LineStyle>) -> Result<()> {
        let style = style.unwrap_or_else(|| LineStyle::default().with_alpha(DEFAULT_SUMMARY_ALPHA));
        self.plot_prof(data, &style)?;
        self.plot_profpt(data, &style)?;
        self.plot_spec(data, theory_line, &style)?;
        self.plot_coh(data, &style)?;
        self.plot_tke(data, DEFAULT_TKE_FACTOR, &style)?;
        self.plot_rs(data, DEFAULT_STRESS_FACTOR, &style)?;
        Ok(())
    }

    /// Limits, labels and the spectrum legend.
    pub fn finish(&mut self) {
        let last = COMPONENT_COUNT - 1;
        self.grid.panel_mut(0, COL_COH).set_ylim(Some(COHERENCE_LIMITS.0), Some(COHERENCE_LIMITS.1));

        // Keep the zero line of a positive profile in view
        let (lo, hi) = self.grid.current_xlim(0, COL_PROF);
        if lo >= 0.0 {
            let lower = if hi - lo > 10.0 { -10.0 } else { -1.0 };
            self.grid.panel_mut(0, COL_PROF).set_xlim(Some(lower), Some(hi));
        }

        let prof = self.grid.panel_mut(last, COL_PROF);
        prof.x_label = Some("u, v, w [m/s]".to_string());
        prof.y_label = Some("z [m]".to_string());
        let spec = self.grid.panel_mut(last, COL_SPEC);
        spec.x_label = Some("f [Hz]".to_string());
        spec.y_label = Some("Sxx [m²s⁻²/Hz]".to_string());
        self.grid.panel_mut(last, COL_COH).x_label = Some("f [Hz]".to_string());
        self.grid.panel_mut(last, COL_STRESS).x_label = Some(energy_unit(self.rs_factor));
        let tke = self.grid.panel_mut(last, COL_TKE);
        tke.x_label = Some(energy_unit(self.tke_factor));
        tke.xlim = (Some(0.0), None);

        self.grid.panel_mut(0, COL_SPEC).legend = true;
    }

    pub fn save(&self, path: &Path, dpi: u32) -> Result<()> {
        save_grid(&self.grid, path, dpi)
    }
}

/// Axis unit of an energy scaled by `factor`; the power of ten is left out
/// unless the factor is positive and finite.
fn energy_unit(factor: f64) -> String {
    if factor > 0.0 && factor.is_finite() {
        format!("10{} [m²s⁻²]", superscript(factor.log10().round() as i32))
    } else {
        "[m²s⁻²]".to_string()
    }
}
