// src/plot_formats/mod.rs

//! Plotting formats: one parameter bag per plot style, each knowing how to pull a
//! curve out of a simulated field ([`TsData`]) or a theoretical run ([`TsRun`]).

pub mod coherence;
pub mod profile;
pub mod spectrum;

pub use coherence::Coherence;
pub use profile::{StressProfile, TkeProfile, VelocityProfile};
pub use spectrum::Spectrum;

use std::fmt;
use tracing::debug;

use crate::axes::{AxesGrid, AxisScale, LinePattern, LineStyle};
use crate::component::Component;
use crate::constants::COLOR_REFERENCE_LINE;
use crate::data_input::ts_data::TsData;
use crate::data_input::ts_run::TsRun;
use crate::error::Result;
use crate::types::{AxisLimits, CurveData};

/// The data object a format draws from.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    Data(&'a TsData),
    Run(&'a TsRun),
}

impl<'a> From<&'a TsData> for Source<'a> {
    fn from(data: &'a TsData) -> Self {
        Source::Data(data)
    }
}

impl<'a> From<&'a TsRun> for Source<'a> {
    fn from(run: &'a TsRun) -> Self {
        Source::Run(run)
    }
}

/// What a format puts on the y axis. Neighbouring formats with the same quantity
/// share their y axis in a [`crate::figures::FormsFigure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YQuantity {
    Height,
    SpectralDensity,
    Coherence,
}

/// Display parameters of a format.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatStyle {
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub x_scale: AxisScale,
    pub y_scale: AxisScale,
    /// x values are divided by 10^lin_x_scale before plotting
    pub lin_x_scale: i32,
    /// Dotted vertical reference lines
    pub grid_x: Vec<f64>,
    /// Upper-left annotation per component (u, v, w)
    pub corner_labels: Option<[String; 3]>,
    /// Width of the format's column relative to the figure's axes size
    pub hrel: f64,
    pub y_quantity: YQuantity,
    pub xlim: AxisLimits,
    pub ylim: AxisLimits,
}

impl FormatStyle {
    /// Style of a vertical profile: height on y, linear axes.
    pub fn profile(title: &str, x_label: String) -> Self {
        Self {
            title: Some(title.to_string()),
            x_label: Some(x_label),
            y_label: Some("z [m]".to_string()),
            x_scale: AxisScale::Linear,
            y_scale: AxisScale::Linear,
            lin_x_scale: 0,
            grid_x: Vec::new(),
            corner_labels: None,
            hrel: 0.6,
            y_quantity: YQuantity::Height,
            xlim: (None, None),
            ylim: (None, None),
        }
    }

    /// Style of a frequency-domain plot: frequency on a log x axis.
    pub fn frequency(title: &str, y_label: Option<&str>, y_scale: AxisScale, y_quantity: YQuantity) -> Self {
        Self {
            title: Some(title.to_string()),
            x_label: Some("f [Hz]".to_string()),
            y_label: y_label.map(str::to_string),
            x_scale: AxisScale::Log,
            y_scale,
            lin_x_scale: 0,
            grid_x: Vec::new(),
            corner_labels: None,
            hrel: 1.0,
            y_quantity,
            xlim: (None, None),
            ylim: (None, None),
        }
    }
}

/// Unicode superscript of an integer exponent.
pub fn superscript(value: i32) -> String {
    value
        .to_string()
        .chars()
        .map(|c| match c {
            '-' => '⁻',
            '0' => '⁰',
            '1' => '¹',
            '2' => '²',
            '3' => '³',
            '4' => '⁴',
            '5' => '⁵',
            '6' => '⁶',
            '7' => '⁷',
            '8' => '⁸',
            '9' => '⁹',
            other => other,
        })
        .collect()
}

/// Energy unit label, `[m²s⁻²]` or `[10ⁿ m²s⁻²]` for a scaled axis.
pub fn energy_label(exponent: i32) -> String {
    if exponent == 0 {
        "[m²s⁻²]".to_string()
    } else {
        format!("[10{} m²s⁻²]", superscript(exponent))
    }
}

/// A plotting format.
///
/// `calc_tsdata` and `calc_tsrun` return `Ok(None)` when the format has nothing to
/// show for that kind of source; such panels are left empty.
pub trait PlotFormat: fmt::Debug {
    fn name(&self) -> &'static str;

    fn style(&self) -> &FormatStyle;

    fn calc_tsdata(&self, _data: &TsData, _comp: Component) -> Result<Option<CurveData>> {
        Ok(None)
    }

    fn calc_tsrun(&self, _run: &TsRun, _comp: Component) -> Result<Option<CurveData>> {
        Ok(None)
    }

    fn calc(&self, source: Source<'_>, comp: Component) -> Result<Option<CurveData>> {
        let curve = match source {
            Source::Data(data) => self.calc_tsdata(data, comp)?,
            Source::Run(run) => self.calc_tsrun(run, comp)?,
        };
        if curve.is_none() {
            debug!("{} has no curve for this source ({}), skipping", self.name(), comp);
        }
        Ok(curve)
    }

    /// Plots the curve of each panel's component into column `col` of `grid`.
    fn plot(&self, source: Source<'_>, grid: &mut AxesGrid, col: usize, line_style: &LineStyle) -> Result<()> {
        let style = self.style();
        let divisor = 10f64.powi(style.lin_x_scale);
        for panel in grid.column_mut(col) {
            let Some(comp) = panel.comp else {
                continue;
            };
            if let Some(curve) = self.calc(source, comp)? {
                let scaled = curve.into_iter().map(|(x, y)| (x / divisor, y)).collect();
                panel.plot(scaled, line_style);
            }
            panel.x_scale = style.x_scale;
            panel.y_scale = style.y_scale;
        }
        Ok(())
    }

    /// Labels, limits, tick hiding, reference lines and corner annotations for column `col`.
    fn finalize(&self, grid: &mut AxesGrid, col: usize, hide_ylabels: bool) {
        let style = self.style();
        let last_row = grid.nrows.saturating_sub(1);
        for (row, panel) in grid.column_mut(col).enumerate() {
            if row != last_row {
                panel.hide_x_ticklabels = true;
            }
            if hide_ylabels {
                panel.hide_y_ticklabels = true;
            } else if let Some(label) = &style.y_label {
                panel.y_label = Some(label.clone());
            }
            if row == last_row {
                panel.x_label.clone_from(&style.x_label);
            }
            if row == 0 {
                panel.title.clone_from(&style.title);
            }
            for &x in &style.grid_x {
                panel.vln(x, *COLOR_REFERENCE_LINE, LinePattern::Dotted);
            }
            if let (Some(labels), Some(comp)) = (&style.corner_labels, panel.comp) {
                panel.corner_label = Some(labels[comp.index()].clone());
            }
            if style.xlim != (None, None) {
                panel.xlim = style.xlim;
            }
            if style.ylim != (None, None) {
                panel.ylim = style.ylim;
            }
        }
    }
}


// src/plot_formats/mod.rs
