// src/figures/forms_figure.rs

use ndarray::Array2;
use std::path::Path;
use tracing::debug;

use crate::axes::{AxPlacer, AxSpacer, AxesGrid, FigureText, Frame, LineStyle};
use crate::component::Component;
use crate::constants::{
    DEFAULT_WINDOW_TIME_S, FORMS_AXSIZE_IN, FORMS_FRAME_IN, FORMS_GAP_COLS_IN, FORMS_GAP_ROWS_IN,
    FORMS_TIGHTGAP_IN, ROW_LABEL_X_FRACTION,
};
use crate::error::{PlotError, Result};
use crate::figures::save_grid;
use crate::font_config::FONT_CORNER_LABEL;
use crate::plot_formats::{PlotFormat, Source, Spectrum, VelocityProfile};

/// Sizes (inches) of a [`FormsFigure`].
#[derive(Debug, Clone, PartialEq)]
pub struct FormsLayout {
    pub axsize: f64,
    pub frame: Frame,
    /// (between rows, between columns)
    pub gap: (f64, f64),
    /// Gap before a column that shares its y axis with the previous one
    pub tightgap: f64,
}

impl Default for FormsLayout {
    fn default() -> Self {
        Self {
            axsize: FORMS_AXSIZE_IN,
            frame: FORMS_FRAME_IN,
            gap: (FORMS_GAP_ROWS_IN, FORMS_GAP_COLS_IN),
            tightgap: FORMS_TIGHTGAP_IN,
        }
    }
}

/// A components × formats grid: one row per velocity component, one column per format.
#[derive(Debug)]
pub struct FormsFigure {
    pub grid: AxesGrid,
    pub comps: Vec<Component>,
    formats: Vec<Box<dyn PlotFormat>>,
    hide_ylabels: Vec<bool>,
    finalized: bool,
}

impl FormsFigure {
    pub fn new(formats: Vec<Box<dyn PlotFormat>>, comps: &[Component]) -> Result<Self> {
        Self::with_layout(formats, comps, &FormsLayout::default())
    }

    pub fn with_layout(formats: Vec<Box<dyn PlotFormat>>, comps: &[Component], layout: &FormsLayout) -> Result<Self> {
        if formats.is_empty() {
            return Err(PlotError::NoFormats);
        }
        let (nrows, ncols) = (comps.len(), formats.len());

        let mut sharex = Array2::<u16>::zeros((nrows, ncols));
        let mut sharey = Array2::<u16>::zeros((nrows, ncols));
        let mut horizontal = AxSpacer::new(ncols, layout.axsize, layout.gap.1, (layout.frame.left, layout.frame.right));
        let vertical = AxSpacer::new(nrows, layout.axsize, layout.gap.0, (layout.frame.top, layout.frame.bottom));
        let mut hide_ylabels = vec![false; ncols];

        let mut last_quantity = None;
        for (idx, format) in formats.iter().enumerate() {
            let style = format.style();
            sharex.column_mut(idx).fill(idx as u16 + 1);
            if last_quantity == Some(style.y_quantity) {
                let previous = sharey[[0, idx - 1]];
                sharey.column_mut(idx).fill(previous);
                horizontal.set_gap_before(idx, layout.tightgap);
                hide_ylabels[idx] = true;
            } else {
                sharey.column_mut(idx).fill(idx as u16 + 1);
            }
            last_quantity = Some(style.y_quantity);
            horizontal.axsize[idx] *= style.hrel;
        }

        let placer = AxPlacer::new(vertical, horizontal);
        let mut grid = AxesGrid::new(&placer, sharex, sharey)?;
        for (row, &comp) in comps.iter().enumerate() {
            for col in 0..ncols {
                grid.panel_mut(row, col).comp = Some(comp);
            }
        }
        debug!(
            "Forms figure {}x{} ({:.1}\" x {:.1}\")",
            nrows, ncols, grid.width_in, grid.height_in
        );
        Ok(Self {
            grid,
            comps: comps.to_vec(),
            formats,
            hide_ylabels,
            finalized: false,
        })
    }

    pub fn formats(&self) -> &[Box<dyn PlotFormat>] {
        &self.formats
    }

    /// Whether column `col` shares its y axis with the previous one and hides its labels.
    pub fn hides_ylabels(&self, col: usize) -> bool {
        self.hide_ylabels.get(col).copied().unwrap_or(false)
    }

    /// Plots `source` in every column according to its format.
    pub fn plot<'a>(&mut self, source: impl Into<Source<'a>>, style: &LineStyle) -> Result<()> {
        let source = source.into();
        for (col, format) in self.formats.iter().enumerate() {
            format.plot(source, &mut self.grid, col, style)?;
        }
        Ok(())
    }

    /// Applies each format's labels and decorations and writes the component letter by every row.
    /// Later calls do nothing.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        self.finalized = true;
        for (col, format) in self.formats.iter().enumerate() {
            format.finalize(&mut self.grid, col, self.hide_ylabels[col]);
        }
        let x_in = ROW_LABEL_X_FRACTION * self.grid.width_in;
        for (row, comp) in self.comps.iter().enumerate() {
            let y_in = self.grid.rect(row, 0).y;
            self.grid.add_text(FigureText {
                x_in,
                y_in,
                text: comp.to_string(),
                font: FONT_CORNER_LABEL,
                boxed: true,
            });
        }
    }

    pub fn save(&self, path: &Path, dpi: u32) -> Result<()> {
        save_grid(&self.grid, path, dpi)
    }
}

/// Forms figure with the mean velocity profile next to the spectrum.
pub fn new_summary_forms(comps: &[Component]) -> Result<FormsFigure> {
    let formats: Vec<Box<dyn PlotFormat>> = vec![
        Box::new(VelocityProfile::new()),
        Box::new(Spectrum::new(DEFAULT_WINDOW_TIME_S, None)),
    ];
    FormsFigure::new(formats, comps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_input::ts_data::test_support::sample_field;
    use crate::data_input::ts_run::test_support::sample_run;
    use crate::plot_formats::{Coherence, StressProfile, TkeProfile};

    fn profile_forms() -> FormsFigure {
        let formats: Vec<Box<dyn PlotFormat>> = vec![
            Box::new(VelocityProfile::new()),
            Box::new(TkeProfile::new()),
            Box::new(StressProfile::default()),
            Box::new(Spectrum::new(10.0, None)),
            Box::new(Coherence::new(10.0, None, None)),
        ];
        FormsFigure::new(formats, &Component::ALL).unwrap()
    }

    #[test]
    fn test_empty_format_list_rejected() {
        let err = FormsFigure::new(Vec::new(), &Component::ALL).unwrap_err();
        assert!(matches!(err, PlotError::NoFormats));
    }

    #[test]
    fn test_neighbouring_profiles_share_y() {
        let fig = profile_forms();
        let sharey = &fig.grid.sharey;
        assert_eq!(sharey[[0, 1]], sharey[[0, 0]]);
        assert_eq!(sharey[[2, 2]], sharey[[2, 0]]);
        assert_ne!(sharey[[0, 3]], sharey[[0, 2]]);
        assert_ne!(sharey[[0, 4]], sharey[[0, 3]]);
        assert_eq!(
            (0..5).map(|c| fig.hides_ylabels(c)).collect::<Vec<_>>(),
            vec![false, true, true, false, false]
        );
        // every column shares x down its rows, never across columns
        assert_eq!(fig.grid.sharex[[0, 3]], fig.grid.sharex[[2, 3]]);
        assert_ne!(fig.grid.sharex[[0, 3]], fig.grid.sharex[[0, 4]]);
    }

    #[test]
    fn test_column_widths_follow_hrel() {
        let fig = profile_forms();
        let profile = fig.grid.rect(0, 0);
        let tke = fig.grid.rect(0, 1);
        let spectrum = fig.grid.rect(0, 3);
        assert!((profile.width - 1.2).abs() < 1e-12);
        assert!((spectrum.width - 2.0).abs() < 1e-12);
        // tightgap between the shared-y profile columns
        assert!((tke.x - profile.right() - FORMS_TIGHTGAP_IN).abs() < 1e-12);
        assert!((spectrum.x - fig.grid.rect(0, 2).right() - FORMS_GAP_COLS_IN).abs() < 1e-12);
    }

    #[test]
    fn test_plot_and_finalize() {
        let data = sample_field();
        let mut fig = profile_forms();
        fig.plot(&data, &LineStyle::default()).unwrap();
        fig.finalize();

        let grid = &fig.grid;
        assert!(grid.panels().all(|(p, _)| p.series.len() == 1));
        // tke is shown in 10^-2 units
        let tke = &grid.panel(0, 1).series[0].data;
        assert!((tke[0].0 - 100.0 * data.tke()[[0, 0, 1]]).abs() < 1e-9);

        assert_eq!(grid.panel(0, 0).title.as_deref(), Some("Mean Velocity"));
        assert!(grid.panel(1, 0).title.is_none());
        assert_eq!(grid.panel(2, 3).x_label.as_deref(), Some("f [Hz]"));
        assert!(grid.panel(0, 3).hide_x_ticklabels);
        assert!(!grid.panel(2, 3).hide_x_ticklabels);
        assert_eq!(grid.panel(1, 0).y_label.as_deref(), Some("z [m]"));
        assert!(grid.panel(1, 1).hide_y_ticklabels && grid.panel(1, 1).y_label.is_none());
        assert_eq!(grid.panel(1, 2).corner_label.as_deref(), Some("u'w'"));
        assert_eq!(grid.panel(0, 2).vlines.len(), 1);
        assert_eq!(grid.panel(0, 4).ylim, (Some(0.0), Some(1.0)));
        assert_eq!(grid.texts.len(), 3);
        assert_eq!(grid.texts[2].text, "w");
    }

    #[test]
    fn test_finalize_twice() {
        let data = sample_field();
        let mut fig = profile_forms();
        fig.plot(&data, &LineStyle::default()).unwrap();
        fig.finalize();
        fig.finalize();

        let grid = &fig.grid;
        assert_eq!(grid.texts.len(), 3);
        for row in 0..grid.nrows {
            assert_eq!(grid.panel(row, 2).vlines.len(), 1);
        }
    }

    #[test]
    fn test_plot_run_source() {
        let run = sample_run();
        let mut fig = new_summary_forms(&[Component::U, Component::W]).unwrap();
        fig.plot(&run, &LineStyle::default().with_label("model")).unwrap();
        assert_eq!(fig.grid.nrows, 2);
        let spectrum = &fig.grid.panel(1, 1).series[0];
        assert_eq!(spectrum.label, "model");
        assert_eq!(spectrum.data.len(), run.grid.f.len());
        assert_eq!(fig.grid.panel(1, 1).comp, Some(Component::W));
    }
}
