// src/data_analysis/fft_utils.rs

use realfft::num_complex::Complex64;
use realfft::RealFftPlanner;
use tracing::warn;

/// Number of unique bins in the real FFT of an `n` point signal.
pub fn rfft_len(n: usize) -> usize {
    n / 2 + 1
}

/// Computes the Fast Fourier Transform (FFT) of a real-valued signal.
/// Returns the `n/2 + 1` complex bins of the one-sided spectrum. Handles empty input.
pub fn fft_forward(data: &[f64]) -> Vec<Complex64> {
    if data.is_empty() {
        return Vec::new();
    }
    let n = data.len();
    let mut input = data.to_vec();
    let planner = RealFftPlanner::<f64>::new().plan_fft_forward(n);
    let mut output = planner.make_output_vec();
    if planner.process(&mut input, &mut output).is_err() {
        warn!("FFT forward processing failed for {} samples.", n);
        return vec![Complex64::new(0.0, 0.0); rfft_len(n)];
    }
    output
}

/// Calculates the frequencies of the real FFT bins for window length `n`
/// and sample spacing `d` (numpy's `rfftfreq`).
pub fn fft_rfftfreq(n: usize, d: f64) -> Vec<f64> {
    if n == 0 || d <= 0.0 {
        return Vec::new();
    }
    let df = 1.0 / (n as f64 * d);
    (0..rfft_len(n)).map(|i| i as f64 * df).collect()
}
