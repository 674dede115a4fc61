// src/plot_formats/spectrum.rs

use crate::axes::AxisScale;
use crate::component::Component;
use crate::constants::DEFAULT_WINDOW_TIME_S;
use crate::data_analysis::{nfft_from_window, psd};
use crate::data_input::ts_data::TsData;
use crate::data_input::ts_run::TsRun;
use crate::error::Result;
use crate::plot_formats::{FormatStyle, PlotFormat, YQuantity};
use crate::types::{spectrum_to_curve, CurveData, GridIndex};

/// Power spectral density at one grid point on log-log axes.
#[derive(Debug, Clone)]
pub struct Spectrum {
    style: FormatStyle,
    /// FFT window length [s]
    pub window_time: f64,
    /// Grid point of the spectrum; the hub when `None`
    pub igrid: Option<GridIndex>,
}

impl Spectrum {
    pub fn new(window_time: f64, igrid: Option<GridIndex>) -> Self {
        Self {
            style: FormatStyle::frequency(
                "spectrum",
                Some("[m²s⁻²/Hz]"),
                AxisScale::Log,
                YQuantity::SpectralDensity,
            ),
            window_time,
            igrid,
        }
    }
}

impl Default for Spectrum {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_TIME_S, None)
    }
}

impl PlotFormat for Spectrum {
    fn name(&self) -> &'static str {
        "spectrum"
    }

    fn style(&self) -> &FormatStyle {
        &self.style
    }

    fn calc_tsdata(&self, data: &TsData, comp: Component) -> Result<Option<CurveData>> {
        let nfft = nfft_from_window(self.window_time, data.dt)?;
        let igrid = self.igrid.unwrap_or(data.ihub);
        let series = data.timeseries(comp, igrid)?.to_vec();
        let spectrum = psd(&series, data.sample_rate(), nfft)?;
        Ok(Some(spectrum_to_curve(spectrum)))
    }

    fn calc_tsrun(&self, run: &TsRun, comp: Component) -> Result<Option<CurveData>> {
        let igrid = self.igrid.unwrap_or(run.grid.ihub);
        let spec = run.spectrum(comp, igrid)?;
        Ok(Some(run.grid.f.iter().copied().zip(spec.iter().copied()).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_input::ts_data::test_support::sample_field;
    use crate::data_input::ts_run::test_support::sample_run;
    use crate::plot_formats::Source;

    #[test]
    fn test_window_time_sets_resolution() {
        let data = sample_field(); // dt = 0.5, 64 samples
        let curve = Spectrum::new(10.0, None).calc(Source::Data(&data), Component::U).unwrap().unwrap();
        // nfft = 20: first bin at fs/nfft = 0.1 Hz, last at Nyquist
        assert_eq!(curve.len(), 10);
        assert!((curve[0].0 - 0.1).abs() < 1e-12);
        assert!((curve[9].0 - 1.0).abs() < 1e-12);
        assert!(curve.iter().all(|(_, p)| *p >= 0.0));
    }

    #[test]
    fn test_long_window_zero_pads() {
        let data = sample_field();
        let curve = Spectrum::default().calc(Source::Data(&data), Component::W).unwrap().unwrap();
        assert_eq!(curve.len(), 600);
    }

    #[test]
    fn test_run_spectrum_uses_model() {
        let run = sample_run();
        let curve = Spectrum::new(600.0, Some((0, 1))).calc(Source::Run(&run), Component::U).unwrap().unwrap();
        assert_eq!(curve.len(), run.grid.f.len());
        assert!(curve.iter().all(|(_, p)| *p == 2.0));
    }

    #[test]
    fn test_bad_point_is_an_error() {
        let data = sample_field();
        assert!(Spectrum::new(10.0, Some((9, 0))).calc(Source::Data(&data), Component::U).is_err());
    }
}
