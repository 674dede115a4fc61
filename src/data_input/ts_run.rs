// src/data_input/ts_run.rs

use ndarray::{s, Array1, Array3, Array4, ArrayView1, Axis};

use crate::component::{Component, COMPONENT_COUNT};
use crate::data_analysis::spectral_analysis::trapezoid;
use crate::data_input::ts_data::{check_index, check_shape};
use crate::error::{PlotError, Result};
use crate::types::GridIndex;

/// Grid and frequency layout of a TurbSim run.
#[derive(Debug, Clone)]
pub struct TsGrid {
    /// Vertical grid coordinates [m]
    pub z: Array1<f64>,
    /// Lateral grid coordinates [m]
    pub y: Array1<f64>,
    /// Sample interval [s]
    pub dt: f64,
    /// Number of time steps in the simulated series
    pub n_time: usize,
    /// Hub point (iz, iy)
    pub ihub: GridIndex,
    /// Positive frequencies k/(n_time·dt), k = 1..=n_time/2 [Hz]
    pub f: Array1<f64>,
}

impl TsGrid {
    pub fn new(z: Array1<f64>, y: Array1<f64>, dt: f64, n_time: usize, ihub: GridIndex) -> Result<Self> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(PlotError::SampleInterval(dt));
        }
        if n_time < 2 {
            return Err(PlotError::Input(format!(
                "a run needs at least two time steps, got {n_time}"
            )));
        }
        check_index(ihub, z.len(), y.len())?;
        let df = 1.0 / (n_time as f64 * dt);
        let f = (1..=n_time / 2).map(|k| k as f64 * df).collect();
        Ok(Self {
            z,
            y,
            dt,
            n_time,
            ihub,
            f,
        })
    }

    pub fn nz(&self) -> usize {
        self.z.len()
    }

    pub fn ny(&self) -> usize {
        self.y.len()
    }

    /// Flattened (row-major, z then y) index of a grid point.
    pub fn sub2ind(&self, index: GridIndex) -> Result<usize> {
        check_index(index, self.nz(), self.ny())?;
        Ok(index.0 * self.ny() + index.1)
    }

    /// Inverse of [`TsGrid::sub2ind`].
    pub fn ind2sub(&self, ind: usize) -> Result<GridIndex> {
        let npoints = self.nz() * self.ny();
        if ind >= npoints {
            return Err(PlotError::Input(format!(
                "flattened index {ind} outside a grid of {npoints} points"
            )));
        }
        Ok((ind / self.ny(), ind % self.ny()))
    }

    /// Distance between two flattened grid points [m].
    pub fn separation(&self, i0: usize, i1: usize) -> Result<f64> {
        let (z0, y0) = self.ind2sub(i0)?;
        let (z1, y1) = self.ind2sub(i1)?;
        let dz = self.z[z1] - self.z[z0];
        let dy = self.y[y1] - self.y[y0];
        Ok(dz.hypot(dy))
    }
}

/// Spatial coherence model of a run.
pub trait CoherenceModel: std::fmt::Debug {
    /// Coherence (not squared) between flattened grid points `i0` and `i1`
    /// at each frequency in `f`. Indices outside the grid are an error.
    fn calc_coh(&self, grid: &TsGrid, f: &[f64], comp: Component, i0: usize, i1: usize) -> Result<Array1<f64>>;
}

/// IEC 61400-1 exponential coherence model.
///
/// Only the longitudinal component is coherent between distinct points;
/// `v` and `w` are fully coherent with themselves and incoherent elsewhere.
#[derive(Debug, Clone)]
pub struct IecCoherence {
    /// Coherence decrement
    pub a: f64,
    /// Coherence scale parameter [m]
    pub lc: f64,
    /// Mean hub-height wind speed [m/s]
    pub u_hub: f64,
}

impl IecCoherence {
    pub fn new(u_hub: f64, lc: f64) -> Self {
        Self { a: 12.0, lc, u_hub }
    }
}

impl CoherenceModel for IecCoherence {
    fn calc_coh(&self, grid: &TsGrid, f: &[f64], comp: Component, i0: usize, i1: usize) -> Result<Array1<f64>> {
        let r = grid.separation(i0, i1)?;
        if i0 == i1 {
            return Ok(Array1::ones(f.len()));
        }
        let coh = match comp {
            Component::U => f
                .iter()
                .map(|&fi| {
                    let a = fi * r / self.u_hub;
                    let b = 0.12 * r / self.lc;
                    (-self.a * (a * a + b * b).sqrt()).exp()
                })
                .collect(),
            Component::V | Component::W => Array1::zeros(f.len()),
        };
        Ok(coh)
    }
}

/// Theoretical description of a TurbSim run: profiles, spectra, stresses and coherence.
#[derive(Debug)]
pub struct TsRun {
    pub grid: TsGrid,
    /// Mean velocity, shape (3, nz, ny) [m/s]
    pub prof: Array3<f64>,
    /// Spectra, shape (3, nz, ny, nf) [m²s⁻²/Hz]
    pub spec: Array4<f64>,
    /// Reynolds stresses u'v', u'w', v'w', shape (3, nz, ny) [m²s⁻²]
    pub stress: Array3<f64>,
    /// Spectral variance per component, shape (3, nz, ny) [m²s⁻²]
    pub tke: Array3<f64>,
    pub cohere: Box<dyn CoherenceModel>,
}

impl TsRun {
    pub fn new(
        grid: TsGrid,
        prof: Array3<f64>,
        spec: Array4<f64>,
        stress: Array3<f64>,
        cohere: Box<dyn CoherenceModel>,
    ) -> Result<Self> {
        let (nz, ny, nf) = (grid.nz(), grid.ny(), grid.f.len());
        check_shape("prof", prof.shape(), &[COMPONENT_COUNT, nz, ny])?;
        check_shape("spec", spec.shape(), &[COMPONENT_COUNT, nz, ny, nf])?;
        check_shape("stress", stress.shape(), &[COMPONENT_COUNT, nz, ny])?;

        let f = grid.f.to_vec();
        let tke = Array3::from_shape_fn((COMPONENT_COUNT, nz, ny), |(c, iz, iy)| {
            let s = spec.slice(s![c, iz, iy, ..]).to_vec();
            trapezoid(&f, &s)
        });
        Ok(Self {
            grid,
            prof,
            spec,
            stress,
            tke,
            cohere,
        })
    }

    /// Model spectrum of one component at one grid point.
    pub fn spectrum(&self, comp: Component, index: GridIndex) -> Result<ArrayView1<'_, f64>> {
        check_index(index, self.grid.nz(), self.grid.ny())?;
        Ok(self.spec.slice(s![comp.index(), index.0, index.1, ..]))
    }

    /// Squared model coherence between two grid points over `grid.f`.
    pub fn coherence_squared(&self, comp: Component, igrid0: GridIndex, igrid1: GridIndex) -> Result<Array1<f64>> {
        let i0 = self.grid.sub2ind(igrid0)?;
        let i1 = self.grid.sub2ind(igrid1)?;
        let f = self.grid.f.to_vec();
        Ok(self.cohere.calc_coh(&self.grid, &f, comp, i0, i1)?.mapv(|c| c * c))
    }

    /// Lateral mean of `field` (3, nz, ny) for one component, shape (nz).
    pub fn lateral_mean(field: &Array3<f64>, comp: Component) -> Array1<f64> {
        field
            .index_axis(Axis(0), comp.index())
            .mean_axis(Axis(1))
            .unwrap_or_else(|| Array1::zeros(field.len_of(Axis(1))))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// 3x2 grid, 64 steps at dt = 0.5; flat spectrum of 2.0 for u, 1.0 for v and w.
    pub fn sample_run() -> TsRun {
        let grid = TsGrid::new(
            Array1::from(vec![10.0, 20.0, 30.0]),
            Array1::from(vec![-5.0, 5.0]),
            0.5,
            64,
            (1, 1),
        )
        .unwrap();
        let nf = grid.f.len();
        let spec = Array4::from_shape_fn((3, 3, 2, nf), |(c, _, _, _)| if c == 0 { 2.0 } else { 1.0 });
        let prof = Array3::from_shape_fn((3, 3, 2), |(c, iz, _)| if c == 0 { 8.0 + iz as f64 } else { 0.0 });
        let stress = Array3::from_shape_fn((3, 3, 2), |(c, _, _)| -0.1 * (c as f64 + 1.0));
        TsRun::new(grid, prof, spec, stress, Box::new(IecCoherence::new(9.0, 42.0))).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::sample_run;
    use super::*;

    #[test]
    fn test_grid_frequencies_skip_zero() {
        let run = sample_run();
        let f = &run.grid.f;
        assert_eq!(f.len(), 32);
        assert!((f[0] - 1.0 / 32.0).abs() < 1e-12);
        assert!((f[31] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sub2ind_roundtrip() {
        let run = sample_run();
        assert_eq!(run.grid.sub2ind((0, 0)).unwrap(), 0);
        assert_eq!(run.grid.sub2ind((2, 1)).unwrap(), 5);
        assert_eq!(run.grid.ind2sub(3).unwrap(), (1, 1));
        assert!(run.grid.ind2sub(6).is_err());
        assert!(run.grid.sub2ind((0, 2)).is_err());
    }

    #[test]
    fn test_tke_integrates_spectrum() {
        let run = sample_run();
        let f = &run.grid.f;
        let width = f[f.len() - 1] - f[0];
        assert!((run.tke[[0, 0, 0]] - 2.0 * width).abs() < 1e-9);
        assert!((run.tke[[2, 1, 1]] - width).abs() < 1e-9);
    }

    #[test]
    fn test_iec_coherence() {
        let run = sample_run();
        let same = run.coherence_squared(Component::U, (1, 1), (1, 1)).unwrap();
        assert!(same.iter().all(|c| (*c - 1.0).abs() < 1e-12));

        let far = run.coherence_squared(Component::U, (1, 1), (0, 0)).unwrap();
        assert!(far.iter().all(|c| *c > 0.0 && *c < 1.0));
        assert!(far[0] > far[far.len() - 1]); // decays with frequency

        let v = run.coherence_squared(Component::V, (1, 1), (0, 0)).unwrap();
        assert!(v.iter().all(|c| *c == 0.0));
    }

    #[test]
    fn test_iec_coherence_index_checked() {
        let grid = TsGrid::new(
            Array1::from(vec![10.0, 20.0]),
            Array1::from(vec![0.0]),
            0.5,
            8,
            (0, 0),
        )
        .unwrap();
        let model = IecCoherence::new(8.0, 42.0);
        for comp in Component::ALL {
            assert!(matches!(
                model.calc_coh(&grid, &[0.1], comp, 0, 99),
                Err(PlotError::Input(_))
            ));
        }
        assert!(model.calc_coh(&grid, &[0.1], Component::V, 2, 2).is_err());
        let same = model.calc_coh(&grid, &[0.1, 0.2], Component::W, 1, 1).unwrap();
        assert_eq!(same.to_vec(), vec![1.0, 1.0]);
    }

    #[test]
    fn test_separation() {
        let run = sample_run();
        let i0 = run.grid.sub2ind((0, 0)).unwrap();
        let i1 = run.grid.sub2ind((1, 1)).unwrap();
        assert!((run.grid.separation(i0, i1).unwrap() - (200.0f64).sqrt()).abs() < 1e-12);
        assert!(run.grid.separation(i0, 6).is_err());
    }

    #[test]
    fn test_lateral_mean() {
        let run = sample_run();
        let mean = TsRun::lateral_mean(&run.prof, Component::U);
        assert_eq!(mean.to_vec(), vec![8.0, 9.0, 10.0]);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let run = sample_run();
        let bad = TsRun::new(
            run.grid.clone(),
            Array3::zeros((3, 3, 2)),
            Array4::zeros((3, 3, 2, 5)),
            Array3::zeros((3, 3, 2)),
            Box::new(IecCoherence::new(9.0, 42.0)),
        );
        assert!(matches!(bad, Err(PlotError::Shape { name: "spec", .. })));
    }
}
