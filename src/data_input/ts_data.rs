// src/data_input/ts_data.rs

use ndarray::{s, Array1, Array3, Array4, ArrayView1, Axis};

use crate::component::{Component, COMPONENT_COUNT};
use crate::error::{PlotError, Result};
use crate::types::GridIndex;

/// Theoretical (model) spectra that accompany a simulated field.
#[derive(Debug, Clone)]
pub struct TheorySpectra {
    /// Frequency vector [Hz]
    pub f: Array1<f64>,
    /// Spectra, shape (3, nz, ny, nf) [m²s⁻²/Hz]
    pub suu: Array4<f64>,
}

/// A simulated velocity time series on a rectangular y-z grid.
#[derive(Debug, Clone)]
pub struct TsData {
    /// Fluctuating velocity, shape (3, nz, ny, nt) [m/s]
    pub uturb: Array4<f64>,
    /// Mean velocity, shape (3, nz, ny) [m/s]
    pub uprof: Array3<f64>,
    /// Vertical grid coordinates [m]
    pub z: Array1<f64>,
    /// Lateral grid coordinates [m]
    pub y: Array1<f64>,
    /// Sample interval [s]
    pub dt: f64,
    /// Hub point (iz, iy)
    pub ihub: GridIndex,
    /// Set through [`TsData::with_theory`], which checks its shape
    theory: Option<TheorySpectra>,
}

pub(crate) fn check_shape(name: &'static str, found: &[usize], expected: &[usize]) -> Result<()> {
    if found != expected {
        return Err(PlotError::Shape {
            name,
            expected: expected.to_vec(),
            found: found.to_vec(),
        });
    }
    Ok(())
}

pub(crate) fn check_index(index: GridIndex, nz: usize, ny: usize) -> Result<()> {
    let (iz, iy) = index;
    if iz >= nz || iy >= ny {
        return Err(PlotError::GridIndex { iz, iy, nz, ny });
    }
    Ok(())
}

impl TsData {
    pub fn new(
        uturb: Array4<f64>,
        uprof: Array3<f64>,
        z: Array1<f64>,
        y: Array1<f64>,
        dt: f64,
        ihub: GridIndex,
    ) -> Result<Self> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(PlotError::SampleInterval(dt));
        }
        let (nz, ny) = (z.len(), y.len());
        let nt = uturb.len_of(Axis(3));
        check_shape("uturb", uturb.shape(), &[COMPONENT_COUNT, nz, ny, nt])?;
        check_shape("uprof", uprof.shape(), &[COMPONENT_COUNT, nz, ny])?;
        if nt == 0 {
            return Err(PlotError::Input("uturb holds no time steps".into()));
        }
        check_index(ihub, nz, ny)?;
        Ok(Self {
            uturb,
            uprof,
            z,
            y,
            dt,
            ihub,
            theory: None,
        })
    }

    /// Attaches theoretical spectra sampled on the same grid.
    pub fn with_theory(mut self, theory: TheorySpectra) -> Result<Self> {
        let nf = theory.f.len();
        check_shape("suu", theory.suu.shape(), &[COMPONENT_COUNT, self.nz(), self.ny(), nf])?;
        self.theory = Some(theory);
        Ok(self)
    }

    pub fn theory(&self) -> Option<&TheorySpectra> {
        self.theory.as_ref()
    }

    pub fn nz(&self) -> usize {
        self.z.len()
    }

    pub fn ny(&self) -> usize {
        self.y.len()
    }

    pub fn n_time(&self) -> usize {
        self.uturb.len_of(Axis(3))
    }

    pub fn sample_rate(&self) -> f64 {
        1.0 / self.dt
    }

    pub fn check_index(&self, index: GridIndex) -> Result<()> {
        check_index(index, self.nz(), self.ny())
    }

    /// Fluctuating velocity of one component at one grid point.
    pub fn timeseries(&self, comp: Component, index: GridIndex) -> Result<ArrayView1<'_, f64>> {
        self.check_index(index)?;
        Ok(self.uturb.slice(s![comp.index(), index.0, index.1, ..]))
    }

    /// Turbulent kinetic energy per component: time mean of u'², shape (3, nz, ny).
    pub fn tke(&self) -> Array3<f64> {
        self.uturb.mapv(|v| v * v).mean_axis(Axis(3)).unwrap_or_else(|| {
            Array3::zeros((COMPONENT_COUNT, self.nz(), self.ny()))
        })
    }

    /// Reynolds stresses u'v', u'w' and v'w', shape (3, nz, ny).
    pub fn stress(&self) -> Array3<f64> {
        let mut stress = Array3::zeros((COMPONENT_COUNT, self.nz(), self.ny()));
        let pairs = [(0, 1), (0, 2), (1, 2)];
        for (k, (a, b)) in pairs.into_iter().enumerate() {
            let product = &self.uturb.index_axis(Axis(0), a) * &self.uturb.index_axis(Axis(0), b);
            if let Some(mean) = product.mean_axis(Axis(2)) {
                stress.index_axis_mut(Axis(0), k).assign(&mean);
            }
        }
        stress
    }
}
