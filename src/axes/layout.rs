// src/axes/layout.rs

//! Inch-based placement of axes on a figure.
//!
//! All coordinates use a top-left origin so they map directly onto bitmap pixels.

/// Axes rectangle in inches (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Border around the block of axes, in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

/// Lays out `n` axes along one direction: frame, axis, gap, axis, ..., frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AxSpacer {
    /// Size of each axis
    pub axsize: Vec<f64>,
    /// `gap[i]` is the space before axis `i`; `gap[0]` is always 0
    pub gap: Vec<f64>,
    /// (leading, trailing) border: (left, right) or (top, bottom)
    pub frame: (f64, f64),
}

impl AxSpacer {
    /// `n` equally sized axes separated by equal gaps.
    pub fn new(n: usize, axsize: f64, gap: f64, frame: (f64, f64)) -> Self {
        Self::relative(&vec![1.0; n], axsize, gap, frame)
    }

    /// Axes whose sizes are `rel[i] * axsize`.
    pub fn relative(rel: &[f64], axsize: f64, gap: f64, frame: (f64, f64)) -> Self {
        let gap = (0..rel.len()).map(|i| if i == 0 { 0.0 } else { gap }).collect();
        Self {
            axsize: rel.iter().map(|r| r * axsize).collect(),
            gap,
            frame,
        }
    }

    pub fn len(&self) -> usize {
        self.axsize.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axsize.is_empty()
    }

    /// Overrides the space before axis `idx` (ignored for the first axis).
    pub fn set_gap_before(&mut self, idx: usize, gap: f64) {
        if idx > 0 && idx < self.gap.len() {
            self.gap[idx] = gap;
        }
    }

    /// Total length including both frame borders.
    pub fn total(&self) -> f64 {
        self.frame.0 + self.axsize.iter().sum::<f64>() + self.gap.iter().sum::<f64>() + self.frame.1
    }

    /// `(start, size)` of every axis measured from the leading edge.
    pub fn positions(&self) -> Vec<(f64, f64)> {
        let mut cursor = self.frame.0;
        self.axsize
            .iter()
            .zip(&self.gap)
            .map(|(&size, &gap)| {
                cursor += gap;
                let start = cursor;
                cursor += size;
                (start, size)
            })
            .collect()
    }
}

/// Combines a vertical (rows) and a horizontal (columns) spacer into an axes grid.
#[derive(Debug, Clone, PartialEq)]
pub struct AxPlacer {
    pub vertical: AxSpacer,
    pub horizontal: AxSpacer,
}

impl AxPlacer {
    pub fn new(vertical: AxSpacer, horizontal: AxSpacer) -> Self {
        Self {
            vertical,
            horizontal,
        }
    }

    /// Uniform grid from a frame, per-direction gaps and (height, width) axes sizes.
    pub fn uniform(nrows: usize, ncols: usize, axsize: (f64, f64), gap: (f64, f64), frame: Frame) -> Self {
        Self::new(
            AxSpacer::new(nrows, axsize.0, gap.0, (frame.top, frame.bottom)),
            AxSpacer::new(ncols, axsize.1, gap.1, (frame.left, frame.right)),
        )
    }

    pub fn nrows(&self) -> usize {
        self.vertical.len()
    }

    pub fn ncols(&self) -> usize {
        self.horizontal.len()
    }

    /// Figure (width, height) in inches.
    pub fn figure_size(&self) -> (f64, f64) {
        (self.horizontal.total(), self.vertical.total())
    }

    /// Row-major rectangles of every axes.
    pub fn rects(&self) -> Vec<Rect> {
        let rows = self.vertical.positions();
        let cols = self.horizontal.positions();
        rows.iter()
            .flat_map(|&(y, height)| {
                cols.iter().map(move |&(x, width)| Rect {
                    x,
                    y,
                    width,
                    height,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spacer_positions_and_total() {
        let spacer = AxSpacer::new(3, 2.0, 0.5, (1.0, 0.25));
        assert_eq!(spacer.positions(), vec![(1.0, 2.0), (3.5, 2.0), (6.0, 2.0)]);
        assert!((spacer.total() - 8.25).abs() < 1e-12);
    }

    #[test]
    fn test_relative_sizes_and_gap_override() {
        let mut spacer = AxSpacer::relative(&[0.5, 1.0], 2.0, 1.0, (0.0, 0.0));
        spacer.set_gap_before(1, 0.2);
        spacer.set_gap_before(0, 9.0); // no gap before the first axis
        assert_eq!(spacer.positions(), vec![(0.0, 1.0), (1.2, 2.0)]);
        assert!((spacer.total() - 3.2).abs() < 1e-12);
    }

    #[test]
    fn test_placer_grid() {
        let frame = Frame {
            left: 1.0,
            right: 0.5,
            bottom: 0.75,
            top: 0.25,
        };
        let placer = AxPlacer::uniform(2, 3, (1.0, 2.0), (0.5, 0.25), frame);
        let (w, h) = placer.figure_size();
        assert!((w - (1.0 + 6.0 + 0.5 + 0.5)).abs() < 1e-12);
        assert!((h - (0.25 + 2.0 + 0.5 + 0.75)).abs() < 1e-12);

        let rects = placer.rects();
        assert_eq!(rects.len(), 6);
        assert_eq!(rects[0], Rect { x: 1.0, y: 0.25, width: 2.0, height: 1.0 });
        assert_eq!(rects[5].x, 1.0 + 2.0 * 2.25);
        assert_eq!(rects[5].y, 0.25 + 1.5);
        assert!((rects[5].bottom() - (h - 0.75)).abs() < 1e-12);
    }
}
