// src/lib.rs - Library interface for internal module access

pub mod axes;
pub mod component;
pub mod constants;
pub mod data_analysis;
pub mod data_input;
pub mod error;
pub mod figures;
pub mod font_config;
pub mod plot_formats;
pub mod plot_framework;
pub mod types;

pub use error::{PlotError, Result};

// Crate version as reported by `--version` and in log output.
pub fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
