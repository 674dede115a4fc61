// src/plot_framework.rs

use plotters::backend::BitMapBackend;
use plotters::chart::{ChartBuilder, SeriesLabelPosition};
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::{Circle, PathElement, Rectangle, Text};
use plotters::series::LineSeries;
use plotters::style::colors::{BLACK, WHITE};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{Color, IntoFont};
use tracing::{debug, info, warn};

use std::error::Error;
use std::ops::Range;
use std::path::Path;

use crate::axes::{AxesGrid, AxisScale, FigureText, LinePattern, MarkerFill, Panel, Rect};
use crate::constants::{
    COLOR_UNAVAILABLE_TEXT, DASH_PATTERN, DOT_PATTERN, LINEAR_TICK_COUNT, LINE_WIDTH_LEGEND_PT,
    LINE_WIDTH_PLOT_PT, MAX_LOG_TICK_COUNT, TEXT_INSET_PT, X_LABEL_AREA_IN, Y_LABEL_AREA_IN,
};
use crate::font_config::{
    pt_to_px, FONT_AXIS_LABEL, FONT_CHART_TITLE, FONT_CORNER_LABEL, FONT_FIGURE_TITLE, FONT_LEGEND,
    FONT_MESSAGE, FONT_TICK_LABEL,
};
use crate::plot_formats::superscript;

type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Length of the sample line in legend entries (points).
const LEGEND_LINE_PT: f64 = 14.0;

/// Converts a length in inches to pixels.
pub fn inches_to_px(inches: f64, dpi: u32) -> i32 {
    (inches * dpi as f64).round() as i32
}

/// Tick label for a value in plotting coordinates.
/// Log axes show decades as powers of ten and other positions with two significant digits.
pub fn format_tick(value: f64, scale: AxisScale) -> String {
    match scale {
        AxisScale::Linear => format_linear_tick(value),
        AxisScale::Log => {
            let exponent = value.round();
            if (value - exponent).abs() < 1e-6 {
                format!("10{}", superscript(exponent as i32))
            } else {
                format_significant(10f64.powf(value))
            }
        }
    }
}

fn format_linear_tick(value: f64) -> String {
    if value.abs() < 1e-9 {
        return "0".to_string();
    }
    let rounded = (value * 1e6).round() / 1e6;
    format!("{rounded}")
}

fn format_significant(value: f64) -> String {
    let digits = (1.0 - value.abs().log10().floor()).clamp(0.0, 12.0) as usize;
    format!("{value:.digits$}")
}

/// Number of tick labels to request for an axis.
pub fn tick_count(scale: AxisScale, range: &Range<f64>) -> usize {
    match scale {
        AxisScale::Linear => LINEAR_TICK_COUNT,
        AxisScale::Log => {
            let decades = (range.end - range.start).ceil().max(0.0) as usize;
            (decades + 1).clamp(2, MAX_LOG_TICK_COUNT)
        }
    }
}

/// Projects a curve onto plotting coordinates, splitting it where a point
/// cannot be shown (non-finite, or non-positive on a log axis).
pub fn projected_runs(data: &[(f64, f64)], x_scale: AxisScale, y_scale: AxisScale) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for &(x, y) in data {
        match (x_scale.project(x), y_scale.project(y)) {
            (Some(px), Some(py)) => current.push((px, py)),
            _ => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Splits a polyline into dashes.
///
/// `spans` normalises both axes so the `(on, off)` pattern is measured as a
/// fraction of the panel size.
pub fn dash_segments(points: &[(f64, f64)], spans: (f64, f64), pattern: (f64, f64)) -> Vec<Vec<(f64, f64)>> {
    let mut dashes = Vec::new();
    let Some(&first) = points.first() else {
        return dashes;
    };
    if pattern.0 <= 0.0 || pattern.1 <= 0.0 {
        dashes.push(points.to_vec());
        return dashes;
    }
    let sx = spans.0.abs().max(f64::MIN_POSITIVE);
    let sy = spans.1.abs().max(f64::MIN_POSITIVE);

    let mut on = true;
    let mut remaining = pattern.0;
    let mut current = vec![first];
    for pair in points.windows(2) {
        let (p0, p1) = (pair[0], pair[1]);
        let length = ((p1.0 - p0.0) / sx).hypot((p1.1 - p0.1) / sy);
        let mut travelled = 0.0;
        while length - travelled > remaining {
            travelled += remaining;
            let t = travelled / length;
            current.push((p0.0 + t * (p1.0 - p0.0), p0.1 + t * (p1.1 - p0.1)));
            if on {
                dashes.push(std::mem::take(&mut current));
            }
            on = !on;
            remaining = if on { pattern.0 } else { pattern.1 };
        }
        remaining -= length - travelled;
        if on {
            current.push(p1);
        }
    }
    if on && current.len() > 1 {
        dashes.push(current);
    }
    dashes
}

fn pattern_pieces(run: Vec<(f64, f64)>, pattern: LinePattern, spans: (f64, f64)) -> Vec<Vec<(f64, f64)>> {
    match pattern {
        LinePattern::Solid => vec![run],
        LinePattern::Dashed => dash_segments(&run, spans, DASH_PATTERN),
        LinePattern::Dotted => dash_segments(&run, spans, DOT_PATTERN),
    }
}

fn stroke_px(width_pt: f64, dpi: u32) -> u32 {
    pt_to_px(width_pt, dpi).max(1) as u32
}

/// Draw a "Data Unavailable" message on a plot area.
pub fn draw_unavailable_message(
    area: &Canvas<'_>,
    panel_name: &str,
    reason: &str,
    dpi: u32,
) -> Result<(), Box<dyn Error>> {
    let (x_range, y_range) = area.get_pixel_range();
    let (width, height) = (x_range.end - x_range.start, y_range.end - y_range.start);
    let message = format!("{panel_name} Data Unavailable: {reason}");
    let text_style = FONT_MESSAGE
        .tuple(dpi)
        .into_font()
        .color(&COLOR_UNAVAILABLE_TEXT)
        .pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Rectangle::new([(0, 0), (width - 1, height - 1)], BLACK.stroke_width(1)))?;
    area.draw(&Text::new(message, (width / 2, height / 2), text_style))?;
    Ok(())
}

/// Draws one panel's chart (mesh, reference lines, series, markers, legend) so that
/// its plotting area covers `rect`.
fn draw_panel_chart(
    root: &Canvas<'_>,
    panel: &Panel,
    rect: Rect,
    x_range: Range<f64>,
    y_range: Range<f64>,
    dpi: u32,
) -> Result<(), Box<dyn Error>> {
    let y_area = inches_to_px(Y_LABEL_AREA_IN, dpi);
    let x_area = inches_to_px(X_LABEL_AREA_IN, dpi);
    let left = (inches_to_px(rect.x, dpi) - y_area).max(0);
    let top = inches_to_px(rect.y, dpi).max(0);
    let width = (inches_to_px(rect.width, dpi) + y_area).max(1) as u32;
    let height = (inches_to_px(rect.height, dpi) + x_area).max(1) as u32;
    let area = root.clone().shrink((left, top), (width, height));

    let mut chart = ChartBuilder::on(&area)
        .x_label_area_size(x_area as u32)
        .y_label_area_size(y_area as u32)
        .build_cartesian_2d(x_range.clone(), y_range.clone())?;

    let (x_scale, y_scale) = (panel.x_scale, panel.y_scale);
    let x_formatter = |v: &f64| {
        if panel.hide_x_ticklabels {
            String::new()
        } else {
            format_tick(*v, x_scale)
        }
    };
    let y_formatter = |v: &f64| {
        if panel.hide_y_ticklabels {
            String::new()
        } else {
            format_tick(*v, y_scale)
        }
    };
    chart
        .configure_mesh()
        .x_desc(panel.x_label.clone().unwrap_or_default())
        .y_desc(panel.y_label.clone().unwrap_or_default())
        .x_labels(tick_count(x_scale, &x_range))
        .y_labels(tick_count(y_scale, &y_range))
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .light_line_style(WHITE.mix(0.7))
        .label_style(FONT_TICK_LABEL.tuple(dpi))
        .axis_desc_style(FONT_AXIS_LABEL.tuple(dpi))
        .draw()?;

    let spans = (x_range.end - x_range.start, y_range.end - y_range.start);

    // Reference lines go below the data
    for line in &panel.vlines {
        let Some(x) = x_scale.project(line.x) else {
            continue;
        };
        if x < x_range.start || x > x_range.end {
            continue;
        }
        let style = line.color.stroke_width(stroke_px(LINE_WIDTH_PLOT_PT, dpi));
        for piece in pattern_pieces(vec![(x, y_range.start), (x, y_range.end)], line.pattern, spans) {
            chart.draw_series(LineSeries::new(piece, style))?;
        }
    }

    let legend_width = stroke_px(LINE_WIDTH_LEGEND_PT, dpi);
    let legend_len = pt_to_px(LEGEND_LINE_PT, dpi);
    let mut legend_series_count = 0;
    for s in &panel.series {
        let style = s.color.mix(s.alpha).stroke_width(stroke_px(s.width_pt, dpi));
        let pieces: Vec<Vec<(f64, f64)>> = projected_runs(&s.data, x_scale, y_scale)
            .into_iter()
            .flat_map(|run| pattern_pieces(run, s.pattern, spans))
            .collect();
        for (i, piece) in pieces.into_iter().enumerate() {
            let drawn = chart.draw_series(LineSeries::new(piece, style))?;
            if i == 0 && panel.legend && !s.label.is_empty() {
                let color = s.color;
                drawn.label(s.label.as_str()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + legend_len, y)], color.stroke_width(legend_width))
                });
                legend_series_count += 1;
            }
        }
    }

    for marker in &panel.markers {
        let (Some(x), Some(y)) = (x_scale.project(marker.x), y_scale.project(marker.y)) else {
            continue;
        };
        let radius = (pt_to_px(marker.size_pt, dpi) / 2).max(1) as u32;
        let color = marker.color.mix(marker.alpha);
        let style = match marker.fill {
            MarkerFill::Filled => color.filled(),
            MarkerFill::Open => color.stroke_width(stroke_px(LINE_WIDTH_PLOT_PT, dpi)),
        };
        chart.draw_series(std::iter::once(Circle::new((x, y), radius, style)))?;
    }

    if legend_series_count > 0 {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(FONT_LEGEND.tuple(dpi))
            .draw()?;
    }
    Ok(())
}

fn draw_figure_text(root: &Canvas<'_>, text: &FigureText, dpi: u32) -> Result<(), Box<dyn Error>> {
    let position = (inches_to_px(text.x_in, dpi), inches_to_px(text.y_in, dpi));
    let style = text.font.tuple(dpi).into_font().color(&BLACK);
    if text.boxed {
        let (w, h) = root.estimate_text_size(&text.text, &style)?;
        let pad = pt_to_px(TEXT_INSET_PT / 2.0, dpi);
        root.draw(&Rectangle::new(
            [
                (position.0 - pad, position.1 - pad),
                (position.0 + w as i32 + pad, position.1 + h as i32 + pad),
            ],
            WHITE.filled(),
        ))?;
    }
    root.draw(&Text::new(text.text.as_str(), position, style))?;
    Ok(())
}

/// Renders every panel of `grid` into a PNG file at `dpi` dots per inch.
pub fn render_grid(grid: &AxesGrid, output_path: &Path, dpi: u32) -> Result<(), Box<dyn Error>> {
    let size = (
        inches_to_px(grid.width_in, dpi).max(1) as u32,
        inches_to_px(grid.height_in, dpi).max(1) as u32,
    );
    debug!("Rendering {}x{} panels at {}x{} px", grid.nrows, grid.ncols, size.0, size.1);
    let root = BitMapBackend::new(output_path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let inset = pt_to_px(TEXT_INSET_PT, dpi);
    let mut any_panel_plotted = false;
    for ((panel, rect), (x_range, y_range)) in grid.panels().zip(grid.resolve_ranges()) {
        if panel.has_data() {
            draw_panel_chart(&root, panel, rect, x_range, y_range, dpi)?;
            any_panel_plotted = true;
        } else {
            let area = root.clone().shrink(
                (inches_to_px(rect.x, dpi), inches_to_px(rect.y, dpi)),
                (
                    inches_to_px(rect.width, dpi).max(1) as u32,
                    inches_to_px(rect.height, dpi).max(1) as u32,
                ),
            );
            let name = match (panel.comp, &panel.title) {
                (Some(comp), Some(title)) => format!("{comp} {title}"),
                (Some(comp), None) => comp.to_string(),
                (None, Some(title)) => title.clone(),
                (None, None) => String::new(),
            };
            draw_unavailable_message(&area, name.trim(), "No data points", dpi)?;
        }

        if let Some(title) = &panel.title {
            let center = inches_to_px(rect.x + rect.width / 2.0, dpi);
            let style = FONT_CHART_TITLE
                .tuple(dpi)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Bottom));
            root.draw(&Text::new(title.as_str(), (center, inches_to_px(rect.y, dpi) - inset), style))?;
        }
        if let Some(label) = &panel.corner_label {
            let position = (inches_to_px(rect.x, dpi) + inset, inches_to_px(rect.y, dpi) + inset);
            let style = FONT_CORNER_LABEL.tuple(dpi).into_font().color(&BLACK);
            root.draw(&Text::new(label.as_str(), position, style))?;
        }
    }

    if let Some(title) = &grid.title {
        let style = FONT_FIGURE_TITLE
            .tuple(dpi)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top));
        root.draw(&Text::new(title.as_str(), (size.0 as i32 / 2, inset), style))?;
    }
    for text in &grid.texts {
        draw_figure_text(&root, text, dpi)?;
    }

    root.present()?;
    if any_panel_plotted {
        info!("Figure saved as '{}'.", output_path.display());
    } else {
        warn!(
            "Figure '{}' saved with placeholder messages only: no panel had data.",
            output_path.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_ticks() {
        assert_eq!(format_tick(2.0, AxisScale::Log), "10²");
        assert_eq!(format_tick(-3.0, AxisScale::Log), "10⁻³");
        assert_eq!(format_tick(0.5, AxisScale::Log), "3.2");
        assert_eq!(format_tick(-1.5, AxisScale::Log), "0.032");
    }

    #[test]
    fn test_linear_ticks() {
        assert_eq!(format_tick(0.30000000000000004, AxisScale::Linear), "0.3");
        assert_eq!(format_tick(-1e-12, AxisScale::Linear), "0");
        assert_eq!(format_tick(20.0, AxisScale::Linear), "20");
        assert_eq!(format_tick(-2.5, AxisScale::Linear), "-2.5");
    }

    #[test]
    fn test_tick_count() {
        assert_eq!(tick_count(AxisScale::Linear, &(0.0..100.0)), LINEAR_TICK_COUNT);
        assert_eq!(tick_count(AxisScale::Log, &(-2.2..2.1)), 6);
        assert_eq!(tick_count(AxisScale::Log, &(0.1..0.4)), 2);
        assert_eq!(tick_count(AxisScale::Log, &(-20.0..20.0)), MAX_LOG_TICK_COUNT);
    }

    #[test]
    fn test_projected_runs_split_on_hidden_points() {
        let data = vec![(1.0, 1.0), (10.0, 0.0), (100.0, 10.0), (1000.0, 100.0)];
        let runs = projected_runs(&data, AxisScale::Log, AxisScale::Log);
        assert_eq!(runs, vec![vec![(0.0, 0.0)], vec![(2.0, 1.0), (3.0, 2.0)]]);
        assert_eq!(projected_runs(&data, AxisScale::Linear, AxisScale::Linear).len(), 1);
    }

    #[test]
    fn test_dash_segments() {
        let dashes = dash_segments(&[(0.0, 0.0), (1.0, 0.0)], (1.0, 1.0), (0.25, 0.25));
        assert_eq!(dashes, vec![vec![(0.0, 0.0), (0.25, 0.0)], vec![(0.5, 0.0), (0.75, 0.0)]]);
    }

    #[test]
    fn test_dash_segments_follow_polyline() {
        let points = [(0.0, 0.0), (0.1, 0.0), (0.1, 0.1)];
        let dashes = dash_segments(&points, (1.0, 1.0), (0.15, 1.0));
        assert_eq!(dashes.len(), 1);
        // the dash turns the corner and ends half way up the second leg
        assert_eq!(dashes[0].len(), 3);
        assert!((dashes[0][2].1 - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_pattern_keeps_line() {
        let points = [(0.0, 0.0), (1.0, 1.0)];
        assert_eq!(dash_segments(&points, (1.0, 1.0), (0.0, 0.1)), vec![points.to_vec()]);
        assert!(dash_segments(&[], (1.0, 1.0), DASH_PATTERN).is_empty());
    }

    #[test]
    fn test_inches_to_px() {
        assert_eq!(inches_to_px(2.5, 300), 750);
        assert_eq!(inches_to_px(0.55, 100), 55);
    }
}

// src/plot_framework.rs
