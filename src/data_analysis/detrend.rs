// src/data_analysis/detrend.rs

/// Removes the least-squares straight line from `data` in place.
///
/// The fit is made against the sample index, so the result does not depend on
/// the sample interval. Signals with fewer than two samples only lose their mean.
pub fn detrend_linear(data: &mut [f64]) {
    let n = data.len();
    if n == 0 {
        return;
    }
    if n == 1 {
        data[0] = 0.0;
        return;
    }
    let n_f = n as f64;
    let x_mean = (n_f - 1.0) / 2.0;
    let y_mean = data.iter().sum::<f64>() / n_f;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, &y) in data.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }
    let slope = sxy / sxx;

    for (i, y) in data.iter_mut().enumerate() {
        *y -= y_mean + slope * (i as f64 - x_mean);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_is_removed() {
        let mut ramp: Vec<f64> = (0..50).map(|i| 3.0 + 0.25 * i as f64).collect();
        detrend_linear(&mut ramp);
        assert!(ramp.iter().all(|v| v.abs() < 1e-10));
    }

    #[test]
    fn test_detrended_signal_has_zero_mean_and_slope() {
        let mut data: Vec<f64> = (0..64)
            .map(|i| (i as f64 * 0.7).sin() + 0.1 * i as f64 + 5.0)
            .collect();
        detrend_linear(&mut data);
        let n = data.len() as f64;
        let mean = data.iter().sum::<f64>() / n;
        let x_mean = (n - 1.0) / 2.0;
        let slope: f64 = data
            .iter()
            .enumerate()
            .map(|(i, y)| (i as f64 - x_mean) * y)
            .sum();
        assert!(mean.abs() < 1e-10);
        assert!(slope.abs() < 1e-8);
    }

    #[test]
    fn test_short_inputs() {
        let mut empty: Vec<f64> = Vec::new();
        detrend_linear(&mut empty);
        let mut single = vec![4.0];
        detrend_linear(&mut single);
        assert_eq!(single, vec![0.0]);
    }
}
