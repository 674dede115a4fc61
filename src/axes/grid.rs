// src/axes/grid.rs

use ndarray::Array2;
use std::collections::HashMap;

use crate::axes::layout::{AxPlacer, Rect};
use crate::axes::panel::{AxisScale, Panel};
use crate::constants::RANGE_PADDING_FRACTION;
use crate::error::{PlotError, Result};
use crate::font_config::FontStyle;
use crate::types::{AxisLimits, PanelRanges};

/// Free text placed on the figure, positioned in inches from the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureText {
    pub x_in: f64,
    pub y_in: f64,
    pub text: String,
    pub font: FontStyle,
    /// Draw on a white box so the text stays readable over axes
    pub boxed: bool,
}

/// Calculate plot range with padding.
/// Adds a fraction of the span on both sides, or a fixed padding for very small ranges.
pub fn calculate_range(min_val: f64, max_val: f64) -> (f64, f64) {
    let (min, max) = if min_val <= max_val {
        (min_val, max_val)
    } else {
        (max_val, min_val)
    };
    let range = (max - min).abs();
    let padding = if range < 1e-9 {
        0.5_f64.max(min.abs() * 0.1)
    } else {
        range * RANGE_PADDING_FRACTION
    };
    (min - padding, max + padding)
}

/// A figure made of a grid of panels with optional shared axes.
///
/// Panels whose entries in `sharex` (`sharey`) are equal and non-zero share one
/// x (y) range; `0` keeps a panel's range to itself.
#[derive(Debug, Clone)]
pub struct AxesGrid {
    pub nrows: usize,
    pub ncols: usize,
    pub width_in: f64,
    pub height_in: f64,
    pub sharex: Array2<u16>,
    pub sharey: Array2<u16>,
    pub title: Option<String>,
    pub texts: Vec<FigureText>,
    rects: Vec<Rect>,
    panels: Vec<Panel>,
}

impl AxesGrid {
    pub fn new(placer: &AxPlacer, sharex: Array2<u16>, sharey: Array2<u16>) -> Result<Self> {
        let (nrows, ncols) = (placer.nrows(), placer.ncols());
        for (name, share) in [("sharex", &sharex), ("sharey", &sharey)] {
            if share.dim() != (nrows, ncols) {
                return Err(PlotError::Shape {
                    name,
                    expected: vec![nrows, ncols],
                    found: share.shape().to_vec(),
                });
            }
        }
        Ok(Self::build(placer, sharex, sharey))
    }

    /// Grid without any shared axes.
    pub fn unshared(placer: &AxPlacer) -> Self {
        let dim = (placer.nrows(), placer.ncols());
        Self::build(placer, Array2::zeros(dim), Array2::zeros(dim))
    }

    fn build(placer: &AxPlacer, sharex: Array2<u16>, sharey: Array2<u16>) -> Self {
        let (width_in, height_in) = placer.figure_size();
        Self {
            nrows: placer.nrows(),
            ncols: placer.ncols(),
            width_in,
            height_in,
            sharex,
            sharey,
            title: None,
            texts: Vec::new(),
            rects: placer.rects(),
            panels: vec![Panel::default(); placer.nrows() * placer.ncols()],
        }
    }

    fn checked_flat(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.nrows && col < self.ncols).then(|| row * self.ncols + col)
    }

    /// Panics outside the grid; see [`AxesGrid::get_panel`] for the checked form.
    fn flat(&self, row: usize, col: usize) -> usize {
        match self.checked_flat(row, col) {
            Some(idx) => idx,
            None => panic!("panel ({row}, {col}) outside a {}x{} grid", self.nrows, self.ncols),
        }
    }

    pub fn panel(&self, row: usize, col: usize) -> &Panel {
        &self.panels[self.flat(row, col)]
    }

    pub fn panel_mut(&mut self, row: usize, col: usize) -> &mut Panel {
        let idx = self.flat(row, col);
        &mut self.panels[idx]
    }

    pub fn rect(&self, row: usize, col: usize) -> Rect {
        self.rects[self.flat(row, col)]
    }

    /// Like [`AxesGrid::panel`], `None` outside the grid.
    pub fn get_panel(&self, row: usize, col: usize) -> Option<&Panel> {
        self.checked_flat(row, col).map(|idx| &self.panels[idx])
    }

    pub fn get_panel_mut(&mut self, row: usize, col: usize) -> Option<&mut Panel> {
        let idx = self.checked_flat(row, col)?;
        self.panels.get_mut(idx)
    }

    pub fn get_rect(&self, row: usize, col: usize) -> Option<Rect> {
        self.checked_flat(row, col).map(|idx| self.rects[idx])
    }

    /// Row-major panels with their rectangles.
    pub fn panels(&self) -> impl Iterator<Item = (&Panel, Rect)> {
        self.panels.iter().zip(self.rects.iter().copied())
    }

    pub fn column_mut(&mut self, col: usize) -> impl Iterator<Item = &mut Panel> {
        self.panels.iter_mut().skip(col).step_by(self.ncols)
    }

    pub fn add_text(&mut self, text: FigureText) {
        self.texts.push(text);
    }

    /// Resolves the `(x, y)` range of every panel (row-major) in plotting coordinates.
    pub fn resolve_ranges(&self) -> Vec<PanelRanges> {
        let x = self.resolve_axis(&self.sharex, |p| (p.x_bounds(), p.xlim, p.x_scale));
        let y = self.resolve_axis(&self.sharey, |p| (p.y_bounds(), p.ylim, p.y_scale));
        x.into_iter()
            .zip(y)
            .map(|((x0, x1), (y0, y1))| (x0..x1, y0..y1))
            .collect()
    }

    /// Current x limits of a panel in data units.
    pub fn current_xlim(&self, row: usize, col: usize) -> (f64, f64) {
        let idx = self.flat(row, col);
        let (range, _) = &self.resolve_ranges()[idx];
        let scale = self.panels[idx].x_scale;
        (scale.unproject(range.start), scale.unproject(range.end))
    }

    fn resolve_axis<F>(&self, share: &Array2<u16>, axis: F) -> Vec<(f64, f64)>
    where
        F: Fn(&Panel) -> (Option<(f64, f64)>, AxisLimits, AxisScale),
    {
        // Group key: the share id, or a private key for unshared panels.
        let keys: Vec<(u16, usize)> = share
            .iter()
            .enumerate()
            .map(|(i, &id)| if id == 0 { (0, i) } else { (id, 0) })
            .collect();

        let mut data: HashMap<(u16, usize), (f64, f64)> = HashMap::new();
        let mut limits: HashMap<(u16, usize), (Option<f64>, Option<f64>)> = HashMap::new();
        for (panel, key) in self.panels.iter().zip(&keys) {
            let (bounds, lim, scale) = axis(panel);
            if let Some((lo, hi)) = bounds {
                let entry = data.entry(*key).or_insert((lo, hi));
                entry.0 = entry.0.min(lo);
                entry.1 = entry.1.max(hi);
            }
            let entry = limits.entry(*key).or_insert((None, None));
            if let Some(lo) = lim.0.and_then(|v| scale.project(v)) {
                entry.0 = Some(lo);
            }
            if let Some(hi) = lim.1.and_then(|v| scale.project(v)) {
                entry.1 = Some(hi);
            }
        }

        keys.iter()
            .map(|key| {
                let (auto_lo, auto_hi) = data
                    .get(key)
                    .map(|&(lo, hi)| calculate_range(lo, hi))
                    .unwrap_or((0.0, 1.0));
                let (lim_lo, lim_hi) = limits.get(key).copied().unwrap_or((None, None));
                let lo = lim_lo.unwrap_or(auto_lo);
                let mut hi = lim_hi.unwrap_or(auto_hi);
                if hi <= lo {
                    hi = lo + 1.0;
                }
                (lo, hi)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axes::layout::Frame;
    use crate::axes::panel::LineStyle;

    fn placer(nrows: usize, ncols: usize) -> AxPlacer {
        let frame = Frame {
            left: 0.5,
            right: 0.5,
            bottom: 0.5,
            top: 0.5,
        };
        AxPlacer::uniform(nrows, ncols, (1.0, 1.0), (0.2, 0.2), frame)
    }

    #[test]
    fn test_calculate_range_padding() {
        assert_eq!(calculate_range(0.0, 10.0), (-0.5, 10.5));
        assert_eq!(calculate_range(10.0, 0.0), (-0.5, 10.5));
        assert_eq!(calculate_range(2.0, 2.0), (1.5, 2.5));
    }

    #[test]
    fn test_share_matrix_shape_checked() {
        let err = AxesGrid::new(&placer(2, 2), Array2::zeros((2, 3)), Array2::zeros((2, 2)));
        assert!(matches!(err, Err(PlotError::Shape { name: "sharex", .. })));
    }

    #[test]
    fn test_shared_ranges_are_unioned() {
        let share = Array2::from_elem((2, 1), 1u16);
        let mut grid = AxesGrid::new(&placer(2, 1), share.clone(), Array2::zeros((2, 1))).unwrap();
        grid.panel_mut(0, 0).plot(vec![(0.0, 0.0), (10.0, 1.0)], &LineStyle::default());
        grid.panel_mut(1, 0).plot(vec![(20.0, 5.0), (30.0, 6.0)], &LineStyle::default());
        let ranges = grid.resolve_ranges();
        assert_eq!(ranges[0].0, ranges[1].0);
        assert!((ranges[0].0.start + 1.5).abs() < 1e-9);
        assert!((ranges[0].0.end - 31.5).abs() < 1e-9);
        assert_ne!(ranges[0].1, ranges[1].1);
    }

    #[test]
    fn test_explicit_limits_apply_to_group() {
        let share = Array2::from_elem((1, 2), 3u16);
        let mut grid = AxesGrid::new(&placer(1, 2), Array2::zeros((1, 2)), share).unwrap();
        grid.panel_mut(0, 0).plot(vec![(0.0, 0.2), (1.0, 0.9)], &LineStyle::default());
        grid.panel_mut(0, 1).plot(vec![(0.0, 0.5)], &LineStyle::default());
        grid.panel_mut(0, 1).set_ylim(Some(0.0), Some(1.0));
        let ranges = grid.resolve_ranges();
        assert_eq!(ranges[0].1, 0.0..1.0);
        assert_eq!(ranges[1].1, 0.0..1.0);
    }

    #[test]
    fn test_one_sided_limit_and_empty_panel() {
        let mut grid = AxesGrid::unshared(&placer(1, 2));
        grid.panel_mut(0, 0).plot(vec![(2.0, 0.0), (4.0, 1.0)], &LineStyle::default());
        grid.panel_mut(0, 0).set_xlim(Some(0.0), None);
        let ranges = grid.resolve_ranges();
        assert_eq!(ranges[0].0.start, 0.0);
        assert!((ranges[0].0.end - 4.1).abs() < 1e-9);
        assert_eq!(ranges[1], (0.0..1.0, 0.0..1.0));
    }

    #[test]
    fn test_log_axis_limits_are_projected() {
        let mut grid = AxesGrid::unshared(&placer(1, 1));
        let panel = grid.panel_mut(0, 0);
        panel.x_scale = AxisScale::Log;
        panel.plot(vec![(0.1, 1.0), (100.0, 2.0)], &LineStyle::default());
        panel.set_xlim(Some(0.01), None);
        let (lo, hi) = grid.current_xlim(0, 0);
        assert!((lo - 0.01).abs() < 1e-12);
        assert!(hi > 100.0);
    }

    #[test]
    fn test_checked_accessors() {
        let mut grid = AxesGrid::unshared(&placer(2, 3));
        assert!(grid.get_panel(1, 2).is_some());
        assert!(grid.get_panel(2, 0).is_none());
        assert!(grid.get_panel(0, 3).is_none());
        assert!(grid.get_panel_mut(2, 2).is_none());
        if let Some(panel) = grid.get_panel_mut(1, 1) {
            panel.title = Some("checked".into());
        }
        assert_eq!(grid.panel(1, 1).title.as_deref(), Some("checked"));
        assert_eq!(grid.get_rect(0, 1), Some(grid.rect(0, 1)));
        assert_eq!(grid.get_rect(0, 5), None);
    }

    #[test]
    fn test_column_iteration() {
        let mut grid = AxesGrid::unshared(&placer(3, 2));
        for panel in grid.column_mut(1) {
            panel.title = Some("right".into());
        }
        assert!(grid.panel(2, 1).title.is_some());
        assert!(grid.panel(2, 0).title.is_none());
        assert_eq!(grid.panels().count(), 6);
    }
}
