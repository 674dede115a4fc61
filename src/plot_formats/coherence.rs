// src/plot_formats/coherence.rs

use crate::axes::AxisScale;
use crate::component::Component;
use crate::constants::{COHERENCE_LIMITS, DEFAULT_WINDOW_TIME_S};
use crate::data_analysis::{coh, nfft_from_window};
use crate::data_input::ts_data::TsData;
use crate::data_input::ts_run::TsRun;
use crate::error::Result;
use crate::plot_formats::{FormatStyle, PlotFormat, YQuantity};
use crate::types::{spectrum_to_curve, CurveData, GridIndex};

/// Coherence between two grid points on a log frequency axis.
#[derive(Debug, Clone)]
pub struct Coherence {
    style: FormatStyle,
    /// FFT window length [s]
    pub window_time: f64,
    /// First point; the hub when `None`
    pub igrid0: Option<GridIndex>,
    /// Second point; (0, 0) when `None`
    pub igrid1: Option<GridIndex>,
}

impl Coherence {
    pub fn new(window_time: f64, igrid0: Option<GridIndex>, igrid1: Option<GridIndex>) -> Self {
        let mut style = FormatStyle::frequency("coherence", None, AxisScale::Linear, YQuantity::Coherence);
        style.ylim = (Some(COHERENCE_LIMITS.0), Some(COHERENCE_LIMITS.1));
        Self {
            style,
            window_time,
            igrid0,
            igrid1,
        }
    }

    fn points(&self, ihub: GridIndex) -> (GridIndex, GridIndex) {
        (self.igrid0.unwrap_or(ihub), self.igrid1.unwrap_or((0, 0)))
    }
}

impl Default for Coherence {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_TIME_S, None, None)
    }
}

impl PlotFormat for Coherence {
    fn name(&self) -> &'static str {
        "coherence"
    }

    fn style(&self) -> &FormatStyle {
        &self.style
    }

    fn calc_tsdata(&self, data: &TsData, comp: Component) -> Result<Option<CurveData>> {
        let nfft = nfft_from_window(self.window_time, data.dt)?;
        let (igrid0, igrid1) = self.points(data.ihub);
        let u0 = data.timeseries(comp, igrid0)?.to_vec();
        let u1 = data.timeseries(comp, igrid1)?.to_vec();
        let gamma2 = coh(&u0, &u1, data.sample_rate(), nfft)?;
        Ok(Some(spectrum_to_curve(gamma2)))
    }

    fn calc_tsrun(&self, run: &TsRun, comp: Component) -> Result<Option<CurveData>> {
        let (igrid0, igrid1) = self.points(run.grid.ihub);
        let gamma2 = run.coherence_squared(comp, igrid0, igrid1)?;
        Ok(Some(run.grid.f.iter().copied().zip(gamma2.iter().copied()).collect()))
    }
}
