// src/data_analysis/mod.rs

pub mod detrend;
pub mod fft_utils;
pub mod spectral_analysis;

pub use spectral_analysis::{coh, nfft_from_window, psd};

// src/data_analysis/mod.rs
