// src/data_analysis/spectral_analysis.rs

use num_complex::Complex64;
use tracing::debug;

use crate::data_analysis::{detrend, fft_utils};
use crate::error::{PlotError, Result};
use crate::types::Spectrum;

/// Configuration for Welch's method spectral analysis
#[derive(Debug, Clone)]
pub struct WelchConfig {
    /// Segment (and FFT) length in samples
    pub nfft: usize,
    /// Samples shared by consecutive segments
    pub noverlap: usize,
    /// Remove a least-squares line from every segment before windowing
    pub detrend: bool,
    /// Scale to a density (units²/Hz) instead of a power per bin
    pub scale_by_freq: bool,
}

impl WelchConfig {
    /// Half-overlapping, linearly detrended density estimate with `nfft` point segments.
    pub fn new(nfft: usize) -> Self {
        Self {
            nfft,
            noverlap: nfft / 2,
            detrend: true,
            scale_by_freq: true,
        }
    }
}

/// Generates a symmetric Hanning window of specified length
pub fn hanning_window(length: usize) -> Vec<f64> {
    match length {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => (0..length)
            .map(|i| {
                0.5 * (1.0
                    - (2.0 * std::f64::consts::PI * i as f64 / (length as f64 - 1.0)).cos())
            })
            .collect(),
    }
}

/// FFT window length (samples) covering `window_time` seconds at sample interval `dt`.
///
/// The sample count is truncated and then rounded up to an even number.
pub fn nfft_from_window(window_time: f64, dt: f64) -> Result<usize> {
    if !(dt.is_finite() && dt > 0.0) {
        return Err(PlotError::SampleInterval(dt));
    }
    let samples = window_time / dt;
    if !samples.is_finite() || samples < 1.0 {
        return Err(PlotError::Input(format!(
            "window of {window_time} s is shorter than one sample of {dt} s"
        )));
    }
    let mut nfft = samples as usize;
    nfft += nfft % 2;
    Ok(nfft)
}

fn validate(signal_len: usize, sample_rate: f64, cfg: &WelchConfig) -> Result<()> {
    if signal_len == 0 {
        return Err(PlotError::Input("Empty signal provided".into()));
    }
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(PlotError::SampleInterval(1.0 / sample_rate));
    }
    if cfg.nfft < 2 {
        return Err(PlotError::Input(format!("nfft must be at least 2, got {}", cfg.nfft)));
    }
    if cfg.noverlap >= cfg.nfft {
        return Err(PlotError::Input("Invalid overlap: noverlap must be below nfft".into()));
    }
    Ok(())
}

/// Start offsets of the Welch segments. A signal shorter than `nfft` is handled
/// as a single zero-padded segment.
fn segment_starts(signal_len: usize, cfg: &WelchConfig) -> Vec<usize> {
    let hop_size = cfg.nfft - cfg.noverlap;
    if signal_len <= cfg.nfft {
        return vec![0];
    }
    let num_segments = (signal_len - cfg.nfft) / hop_size + 1;
    (0..num_segments).map(|i| i * hop_size).collect()
}

/// Copies (zero-padding when needed), detrends and windows one segment.
fn prepare_segment(signal: &[f64], start: usize, window: &[f64], cfg: &WelchConfig) -> Vec<f64> {
    let end = (start + cfg.nfft).min(signal.len());
    let mut segment = vec![0.0; cfg.nfft];
    segment[..end - start].copy_from_slice(&signal[start..end]);
    if cfg.detrend {
        detrend::detrend_linear(&mut segment);
    }
    for (s, w) in segment.iter_mut().zip(window) {
        *s *= w;
    }
    segment
}

/// Normalisation and one-sided doubling factor for bin `i`.
fn bin_scale(i: usize, num_freqs: usize, sample_rate: f64, window: &[f64], cfg: &WelchConfig) -> f64 {
    let norm = if cfg.scale_by_freq {
        sample_rate * window.iter().map(|w| w * w).sum::<f64>()
    } else {
        window.iter().sum::<f64>().powi(2)
    };
    // One-sided spectrum: double power for positive frequencies (except DC and Nyquist)
    let is_nyquist = cfg.nfft % 2 == 0 && i == num_freqs - 1;
    if i > 0 && !is_nyquist {
        2.0 / norm
    } else {
        1.0 / norm
    }
}

/// Computes Power Spectral Density using Welch's method
///
/// Segments the signal with overlap, detrends and windows each segment,
/// computes the FFT and averages power across segments.
/// The returned spectrum includes the zero-frequency bin.
pub fn welch_psd(signal: &[f64], sample_rate: f64, cfg: &WelchConfig) -> Result<Spectrum> {
    validate(signal.len(), sample_rate, cfg)?;

    let window = hanning_window(cfg.nfft);
    let num_freqs = fft_utils::rfft_len(cfg.nfft);
    let starts = segment_starts(signal.len(), cfg);

    let mut psd_sum = vec![0.0f64; num_freqs];
    for &start in &starts {
        let segment = prepare_segment(signal, start, &window, cfg);
        let spectrum = fft_utils::fft_forward(&segment);
        for (acc, bin) in psd_sum.iter_mut().zip(&spectrum) {
            *acc += bin.norm_sqr();
        }
    }

    let segment_count = starts.len() as f64;
    let psd = psd_sum
        .iter()
        .enumerate()
        .map(|(i, &p)| p * bin_scale(i, num_freqs, sample_rate, &window, cfg) / segment_count)
        .collect();
    let frequencies = fft_utils::fft_rfftfreq(cfg.nfft, 1.0 / sample_rate);
    debug!(
        "Welch PSD: {} samples, nfft {}, {} segments",
        signal.len(),
        cfg.nfft,
        starts.len()
    );
    Ok((frequencies, psd))
}

/// Computes Cross-Power Spectral Density using Welch's method
///
/// Returns the complex CPSD `X(f)·conj(Y(f))` averaged across segments.
pub fn welch_cpsd(
    signal1: &[f64],
    signal2: &[f64],
    sample_rate: f64,
    cfg: &WelchConfig,
) -> Result<(Vec<f64>, Vec<Complex64>)> {
    if signal1.len() != signal2.len() {
        return Err(PlotError::Input(format!(
            "Signals must have equal length ({} vs {})",
            signal1.len(),
            signal2.len()
        )));
    }
    validate(signal1.len(), sample_rate, cfg)?;

    let window = hanning_window(cfg.nfft);
    let num_freqs = fft_utils::rfft_len(cfg.nfft);
    let starts = segment_starts(signal1.len(), cfg);

    let mut cpsd_sum = vec![Complex64::new(0.0, 0.0); num_freqs];
    for &start in &starts {
        let spectrum1 = fft_utils::fft_forward(&prepare_segment(signal1, start, &window, cfg));
        let spectrum2 = fft_utils::fft_forward(&prepare_segment(signal2, start, &window, cfg));
        for ((acc, x), y) in cpsd_sum.iter_mut().zip(&spectrum1).zip(&spectrum2) {
            *acc += x * y.conj();
        }
    }

    let segment_count = starts.len() as f64;
    let cpsd = cpsd_sum
        .iter()
        .enumerate()
        .map(|(i, &c)| c * bin_scale(i, num_freqs, sample_rate, &window, cfg) / segment_count)
        .collect();
    Ok((fft_utils::fft_rfftfreq(cfg.nfft, 1.0 / sample_rate), cpsd))
}

/// Calculates coherence: γ²(f) = |Sxy(f)|² / (Sxx(f) × Syy(f))
///
/// Bins where either signal carries no power get zero coherence.
pub fn coherence(cpsd: &[Complex64], psd1: &[f64], psd2: &[f64]) -> Result<Vec<f64>> {
    if cpsd.len() != psd1.len() || cpsd.len() != psd2.len() {
        return Err(PlotError::Input("Input arrays must have equal length".into()));
    }
    Ok(cpsd
        .iter()
        .zip(psd1.iter().zip(psd2))
        .map(|(sxy, (&sxx, &syy))| {
            let psd_product = sxx * syy;
            if psd_product > f64::MIN_POSITIVE {
                (sxy.norm_sqr() / psd_product).min(1.0)
            } else {
                0.0
            }
        })
        .collect())
}

/// Drops the zero-frequency bin, which is meaningless on log axes.
fn drop_zero_frequency((f, p): Spectrum) -> Spectrum {
    (f.into_iter().skip(1).collect(), p.into_iter().skip(1).collect())
}

/// Power spectral density of `u` (units of u² per Hz) without the zero-frequency bin.
pub fn psd(u: &[f64], sample_rate: f64, nfft: usize) -> Result<Spectrum> {
    welch_psd(u, sample_rate, &WelchConfig::new(nfft)).map(drop_zero_frequency)
}

/// Magnitude-squared coherence between `u1` and `u2` without the zero-frequency bin.
pub fn coh(u1: &[f64], u2: &[f64], sample_rate: f64, nfft: usize) -> Result<Spectrum> {
    let cfg = WelchConfig {
        scale_by_freq: false,
        ..WelchConfig::new(nfft)
    };
    let (f, p11) = welch_psd(u1, sample_rate, &cfg)?;
    let (_, p22) = welch_psd(u2, sample_rate, &cfg)?;
    let (_, p12) = welch_cpsd(u1, u2, sample_rate, &cfg)?;
    let gamma2 = coherence(&p12, &p11, &p22)?;
    Ok(drop_zero_frequency((f, gamma2)))
}

/// Trapezoid-rule integral of `y` over `x`.
pub fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| 0.5 * (xs[1] - xs[0]) * (ys[0] + ys[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(n: usize, freq: f64, fs: f64, amplitude: f64) -> Vec<f64> {
        (0..n)
            .map(|i| amplitude * (2.0 * std::f64::consts::PI * freq * i as f64 / fs).sin())
            .collect()
    }

    #[test]
    fn test_nfft_rounds_to_even() {
        assert_eq!(nfft_from_window(10.0, 0.25).unwrap(), 40);
        assert_eq!(nfft_from_window(10.0, 0.3).unwrap(), 34); // 33.3 -> 33 -> 34
        assert_eq!(nfft_from_window(600.0, 0.5).unwrap(), 1200);
        assert_eq!(nfft_from_window(7.0, 1.0).unwrap(), 8);
    }

    #[test]
    fn test_nfft_rejects_bad_inputs() {
        assert!(matches!(nfft_from_window(10.0, 0.0), Err(PlotError::SampleInterval(_))));
        assert!(nfft_from_window(0.1, 1.0).is_err());
    }

    #[test]
    fn test_hanning_window_shape() {
        let w = hanning_window(5);
        assert_eq!(w.len(), 5);
        assert!(w[0].abs() < 1e-12 && w[4].abs() < 1e-12);
        assert!((w[2] - 1.0).abs() < 1e-12);
        assert_eq!(hanning_window(1), vec![1.0]);
    }

    #[test]
    fn test_segment_starts_half_overlap() {
        let cfg = WelchConfig::new(8);
        assert_eq!(segment_starts(16, &cfg), vec![0, 4, 8]);
        assert_eq!(segment_starts(5, &cfg), vec![0]);
    }

    #[test]
    fn test_psd_peak_at_sine_frequency() {
        let fs = 64.0;
        let (f, p) = psd(&sine(4096, 4.0, fs, 1.0), fs, 256).unwrap();
        let (peak_idx, _) = p
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |acc, (i, &v)| if v > acc.1 { (i, v) } else { acc });
        assert!((f[peak_idx] - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_psd_integrates_to_variance() {
        let fs = 20.0;
        let nfft = 200;
        let (f, p) = psd(&sine(8000, 2.0, fs, 1.0), fs, nfft).unwrap();
        let df = fs / nfft as f64;
        assert!((f[1] - f[0] - df).abs() < 1e-12);
        let power: f64 = p.iter().sum::<f64>() * df;
        assert!((power - 0.5).abs() < 0.05, "power = {power}");
    }

    #[test]
    fn test_psd_of_ramp_is_negligible() {
        let ramp: Vec<f64> = (0..512).map(|i| 1.0 + 0.01 * i as f64).collect();
        let (_, p) = psd(&ramp, 10.0, 64).unwrap();
        assert!(p.iter().all(|v| *v < 1e-20));
    }

    #[test]
    fn test_psd_short_signal_is_zero_padded() {
        let (f, p) = psd(&sine(30, 1.0, 10.0, 1.0), 10.0, 64).unwrap();
        assert_eq!(f.len(), 32);
        assert_eq!(p.len(), 32);
    }

    #[test]
    fn test_psd_errors() {
        assert!(psd(&[], 10.0, 64).is_err());
        assert!(psd(&[1.0, 2.0], 10.0, 1).is_err());
        assert!(psd(&[1.0, 2.0], 0.0, 4).is_err());
    }

    #[test]
    fn test_coherence_clamps_and_zero_power() {
        let cpsd = vec![Complex64::new(2.0, 0.0), Complex64::new(1.0, 0.0)];
        let coh = coherence(&cpsd, &[1.0, 0.0], &[1.0, 5.0]).unwrap();
        assert_eq!(coh, vec![1.0, 0.0]);
        assert!(coherence(&cpsd, &[1.0], &[1.0, 1.0]).is_err());
    }

    #[test]
    fn test_cpsd_length_mismatch() {
        let cfg = WelchConfig::new(4);
        assert!(welch_cpsd(&[1.0; 8], &[1.0; 6], 1.0, &cfg).is_err());
    }

    #[test]
    fn test_trapezoid() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 1.0, 2.0, 3.0];
        assert!((trapezoid(&x, &y) - 4.5).abs() < 1e-12);
        assert_eq!(trapezoid(&[1.0], &[2.0]), 0.0);
    }
}
