// src/axes/mod.rs

pub mod grid;
pub mod layout;
pub mod panel;

pub use grid::{AxesGrid, FigureText};
pub use layout::{AxPlacer, AxSpacer, Frame, Rect};
pub use panel::{AxisScale, LinePattern, LineStyle, Marker, MarkerFill, Panel, PlotSeries, VLine};

// src/axes/mod.rs
