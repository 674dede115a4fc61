// src/plot_formats/profile.rs

use ndarray::{s, Array1, Array3};

use crate::component::Component;
use crate::data_input::ts_data::TsData;
use crate::data_input::ts_run::TsRun;
use crate::error::{PlotError, Result};
use crate::plot_formats::{energy_label, FormatStyle, PlotFormat};
use crate::types::CurveData;

/// Stress and tke values are shown in units of 10⁻² m²s⁻².
const PROFILE_LIN_X_SCALE: i32 = -2;

/// Pairs column `iy` of `field[comp]` with the heights `z`.
pub(crate) fn profile_curve(field: &Array3<f64>, comp: Component, iy: usize, z: &Array1<f64>) -> Result<CurveData> {
    let (_, nz, ny) = field.dim();
    if iy >= ny {
        return Err(PlotError::GridIndex { iz: 0, iy, nz, ny });
    }
    let column = field.slice(s![comp.index(), .., iy]);
    Ok(column.iter().copied().zip(z.iter().copied()).collect())
}

/// Mean velocity profile at the hub's lateral position.
#[derive(Debug, Clone)]
pub struct VelocityProfile {
    style: FormatStyle,
}

impl VelocityProfile {
    pub fn new() -> Self {
        Self {
            style: FormatStyle::profile("Mean Velocity", "[m/s]".to_string()),
        }
    }

    pub fn with_xlim(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.style.xlim = (lower, upper);
        self
    }
}

impl Default for VelocityProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl PlotFormat for VelocityProfile {
    fn name(&self) -> &'static str {
        "velocity profile"
    }

    fn style(&self) -> &FormatStyle {
        &self.style
    }

    fn calc_tsdata(&self, data: &TsData, comp: Component) -> Result<Option<CurveData>> {
        profile_curve(&data.uprof, comp, data.ihub.1, &data.z).map(Some)
    }

    fn calc_tsrun(&self, run: &TsRun, comp: Component) -> Result<Option<CurveData>> {
        profile_curve(&run.prof, comp, run.grid.ihub.1, &run.grid.z).map(Some)
    }
}

/// Turbulent kinetic energy profile at the hub's lateral position.
#[derive(Debug, Clone)]
pub struct TkeProfile {
    style: FormatStyle,
}

impl TkeProfile {
    pub fn new() -> Self {
        let mut style = FormatStyle::profile("tke", energy_label(PROFILE_LIN_X_SCALE));
        style.lin_x_scale = PROFILE_LIN_X_SCALE;
        style.xlim = (Some(0.0), None);
        Self { style }
    }

    pub fn with_xlim(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.style.xlim = (lower, upper);
        self
    }
}

impl Default for TkeProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl PlotFormat for TkeProfile {
    fn name(&self) -> &'static str {
        "tke profile"
    }

    fn style(&self) -> &FormatStyle {
        &self.style
    }

    fn calc_tsdata(&self, data: &TsData, comp: Component) -> Result<Option<CurveData>> {
        profile_curve(&data.tke(), comp, data.ihub.1, &data.z).map(Some)
    }

    fn calc_tsrun(&self, run: &TsRun, comp: Component) -> Result<Option<CurveData>> {
        profile_curve(&run.tke, comp, run.grid.ihub.1, &run.grid.z).map(Some)
    }
}

/// Reynolds stress profile. The `u`, `v` and `w` rows show u'v', u'w' and v'w'.
#[derive(Debug, Clone)]
pub struct StressProfile {
    style: FormatStyle,
    /// Lateral index of the profile; the hub's when `None`
    pub igrid: Option<usize>,
}

impl StressProfile {
    pub fn new(igrid: Option<usize>) -> Self {
        let mut style = FormatStyle::profile("stress", energy_label(PROFILE_LIN_X_SCALE));
        style.lin_x_scale = PROFILE_LIN_X_SCALE;
        style.grid_x = vec![0.0];
        style.corner_labels = Some(["u'v'".to_string(), "u'w'".to_string(), "v'w'".to_string()]);
        Self { style, igrid }
    }

    pub fn with_xlim(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.style.xlim = (lower, upper);
        self
    }
}

impl Default for StressProfile {
    fn default() -> Self {
        Self::new(None)
    }
}

impl PlotFormat for StressProfile {
    fn name(&self) -> &'static str {
        "stress profile"
    }

    fn style(&self) -> &FormatStyle {
        &self.style
    }

    fn calc_tsdata(&self, data: &TsData, comp: Component) -> Result<Option<CurveData>> {
        let iy = self.igrid.unwrap_or(data.ihub.1);
        profile_curve(&data.stress(), comp, iy, &data.z).map(Some)
    }

    fn calc_tsrun(&self, run: &TsRun, comp: Component) -> Result<Option<CurveData>> {
        let iy = self.igrid.unwrap_or(run.grid.ihub.1);
        profile_curve(&run.stress, comp, iy, &run.grid.z).map(Some)
    }
}
