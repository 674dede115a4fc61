// src/axes/panel.rs

use plotters::style::RGBColor;

use crate::component::Component;
use crate::constants::LINE_WIDTH_PLOT_PT;
use crate::types::{AxisLimits, CurveData};

/// Axis scaling of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisScale {
    #[default]
    Linear,
    Log,
}

impl AxisScale {
    /// Maps a data value into plotting coordinates (log10 for log axes).
    /// Values that cannot be shown on this axis give `None`.
    pub fn project(self, value: f64) -> Option<f64> {
        match self {
            AxisScale::Linear if value.is_finite() => Some(value),
            AxisScale::Log if value.is_finite() && value > 0.0 => Some(value.log10()),
            _ => None,
        }
    }

    /// Inverse of [`AxisScale::project`].
    pub fn unproject(self, coord: f64) -> f64 {
        match self {
            AxisScale::Linear => coord,
            AxisScale::Log => 10f64.powf(coord),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinePattern {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Caller-side line options (colour, transparency, width, pattern, legend label).
#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    /// `None` takes the next colour of the panel's cycle
    pub color: Option<RGBColor>,
    pub alpha: f64,
    pub width_pt: f64,
    pub pattern: LinePattern,
    pub label: Option<String>,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: None,
            alpha: 1.0,
            width_pt: LINE_WIDTH_PLOT_PT,
            pattern: LinePattern::Solid,
            label: None,
        }
    }
}

impl LineStyle {
    pub fn with_color(mut self, color: RGBColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    pub fn with_pattern(mut self, pattern: LinePattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    pub data: CurveData,
    pub label: String,
    pub color: RGBColor,
    pub alpha: f64,
    pub width_pt: f64,
    pub pattern: LinePattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerFill {
    Filled,
    Open,
}

/// Circle marker at a data point.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub x: f64,
    pub y: f64,
    pub size_pt: f64,
    pub color: RGBColor,
    pub fill: MarkerFill,
    pub alpha: f64,
}

/// Vertical reference line spanning the whole panel.
#[derive(Debug, Clone, PartialEq)]
pub struct VLine {
    pub x: f64,
    pub color: RGBColor,
    pub pattern: LinePattern,
}

/// One axes of a figure and everything drawn into it.
#[derive(Debug, Clone, Default)]
pub struct Panel {
    pub comp: Option<Component>,
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub x_scale: AxisScale,
    pub y_scale: AxisScale,
    pub xlim: AxisLimits,
    pub ylim: AxisLimits,
    pub series: Vec<PlotSeries>,
    pub markers: Vec<Marker>,
    pub vlines: Vec<VLine>,
    /// Annotation in the upper-left corner
    pub corner_label: Option<String>,
    pub hide_x_ticklabels: bool,
    pub hide_y_ticklabels: bool,
    pub legend: bool,
    color_cursor: usize,
}

impl Panel {
    pub fn for_component(comp: Component) -> Self {
        Self {
            comp: Some(comp),
            ..Self::default()
        }
    }

    /// Next colour of the Category10 cycle.
    pub fn next_color(&mut self) -> RGBColor {
        let c = colorous::CATEGORY10[self.color_cursor % colorous::CATEGORY10.len()];
        self.color_cursor += 1;
        RGBColor(c.r, c.g, c.b)
    }

    /// Adds a line. Curves without any point are ignored.
    pub fn plot(&mut self, data: CurveData, style: &LineStyle) {
        if data.is_empty() {
            return;
        }
        let color = match style.color {
            Some(color) => color,
            None => self.next_color(),
        };
        self.series.push(PlotSeries {
            data,
            label: style.label.clone().unwrap_or_default(),
            color,
            alpha: style.alpha,
            width_pt: style.width_pt,
            pattern: style.pattern,
        });
    }

    pub fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    pub fn vln(&mut self, x: f64, color: RGBColor, pattern: LinePattern) {
        self.vlines.push(VLine { x, color, pattern });
    }

    pub fn set_xlim(&mut self, lower: Option<f64>, upper: Option<f64>) {
        self.xlim = (lower, upper);
    }

    pub fn set_ylim(&mut self, lower: Option<f64>, upper: Option<f64>) {
        self.ylim = (lower, upper);
    }

    pub fn has_data(&self) -> bool {
        !self.series.is_empty() || !self.markers.is_empty()
    }

    /// Projected `(min, max)` of everything plotted along x, including vertical lines.
    pub fn x_bounds(&self) -> Option<(f64, f64)> {
        let points = self.series.iter().flat_map(|s| s.data.iter().map(|p| p.0));
        let markers = self.markers.iter().map(|m| m.x);
        let lines = self.vlines.iter().map(|l| l.x);
        bounds(points.chain(markers).chain(lines), self.x_scale)
    }

    /// Projected `(min, max)` of everything plotted along y.
    pub fn y_bounds(&self) -> Option<(f64, f64)> {
        let points = self.series.iter().flat_map(|s| s.data.iter().map(|p| p.1));
        let markers = self.markers.iter().map(|m| m.y);
        bounds(points.chain(markers), self.y_scale)
    }
}

fn bounds(values: impl Iterator<Item = f64>, scale: AxisScale) -> Option<(f64, f64)> {
    values
        .filter_map(|v| scale.project(v))
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_projection_drops_non_positive() {
        assert_eq!(AxisScale::Log.project(100.0), Some(2.0));
        assert_eq!(AxisScale::Log.project(0.0), None);
        assert_eq!(AxisScale::Linear.project(-3.0), Some(-3.0));
        assert_eq!(AxisScale::Linear.project(f64::NAN), None);
        assert!((AxisScale::Log.unproject(-1.0) - 0.1).abs() < 1e-15);
    }

    #[test]
    fn test_color_cycle_advances_only_for_implicit_colors() {
        let mut panel = Panel::default();
        panel.plot(vec![(0.0, 1.0)], &LineStyle::default());
        panel.plot(vec![(0.0, 1.0)], &LineStyle::default().with_color(RGBColor(1, 2, 3)));
        panel.plot(vec![(0.0, 1.0)], &LineStyle::default());
        assert_eq!(panel.series[0].color, RGBColor(0x1f, 0x77, 0xb4));
        assert_eq!(panel.series[1].color, RGBColor(1, 2, 3));
        assert_eq!(panel.series[2].color, RGBColor(0xff, 0x7f, 0x0e));
    }

    #[test]
    fn test_empty_curve_is_ignored() {
        let mut panel = Panel::default();
        panel.plot(Vec::new(), &LineStyle::default());
        assert!(!panel.has_data());
    }

    #[test]
    fn test_bounds_include_vlines_and_markers() {
        let mut panel = Panel::default();
        panel.plot(vec![(1.0, 5.0), (3.0, 7.0)], &LineStyle::default());
        panel.vln(-2.0, RGBColor(0, 0, 0), LinePattern::Dashed);
        panel.add_marker(Marker {
            x: 2.0,
            y: 9.0,
            size_pt: 6.0,
            color: RGBColor(0, 0, 255),
            fill: MarkerFill::Filled,
            alpha: 1.0,
        });
        assert_eq!(panel.x_bounds(), Some((-2.0, 3.0)));
        assert_eq!(panel.y_bounds(), Some((5.0, 9.0)));
    }

    #[test]
    fn test_log_bounds() {
        let mut panel = Panel {
            x_scale: AxisScale::Log,
            ..Panel::default()
        };
        panel.plot(vec![(0.0, 1.0), (0.01, 1.0), (10.0, 1.0)], &LineStyle::default());
        let (lo, hi) = panel.x_bounds().unwrap();
        assert!((lo + 2.0).abs() < 1e-12 && (hi - 1.0).abs() < 1e-12);
    }
}
