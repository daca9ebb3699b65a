//! Rolling-window helpers over plain `f64` series.
//!
//! Every helper returns a vector of the input's length. A position is `NaN`
//! when its window is incomplete or contains a `NaN`.

use crate::domain::Bar;

/// Extract one field of every bar.
pub fn extract(bars: &[Bar], field: impl Fn(&Bar) -> f64) -> Vec<f64> {
    bars.iter().map(field).collect()
}

/// Apply `reduce` to every complete, `NaN`-free window of `period` values.
fn rolling(values: &[f64], period: usize, reduce: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }
    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = reduce(window);
    }
    result
}

/// Rolling arithmetic mean.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Rolling sample standard deviation (divides by N - 1).
///
/// A window of one value has no sample deviation, so `period == 1` yields
/// all `NaN`.
pub fn rolling_std(values: &[f64], period: usize) -> Vec<f64> {
    if period < 2 {
        return vec![f64::NAN; values.len()];
    }
    rolling(values, period, |w| {
        let mean = w.iter().sum::<f64>() / w.len() as f64;
        let ss: f64 = w.iter().map(|v| (v - mean) * (v - mean)).sum();
        (ss / (w.len() - 1) as f64).sqrt()
    })
}

/// Rolling minimum.
pub fn rolling_min(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Rolling maximum.
pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    rolling(values, period, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

/// Fractional change over `horizon` bars: (v[t] - v[t-h]) / v[t-h].
///
/// A zero base value leaves the position undefined.
pub fn pct_change(values: &[f64], horizon: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if horizon == 0 {
        return result;
    }
    for i in horizon..n {
        let prev = values[i - horizon];
        let curr = values[i];
        if prev.is_nan() || curr.is_nan() || prev == 0.0 {
            continue;
        }
        result[i] = (curr - prev) / prev;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn rolling_mean_basic() {
        let r = rolling_mean(&[10.0, 11.0, 12.0, 13.0, 14.0], 3);
        assert!(r[0].is_nan());
        assert!(r[1].is_nan());
        assert_approx(r[2], 11.0, DEFAULT_EPSILON);
        assert_approx(r[4], 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_mean_nan_window() {
        let r = rolling_mean(&[10.0, 11.0, f64::NAN, 13.0, 14.0, 15.0], 3);
        assert!(r[2].is_nan());
        assert!(r[3].is_nan());
        assert!(r[4].is_nan());
        assert_approx(r[5], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_std_is_sample_deviation() {
        // 2, 4, 4, 4, 5, 5, 7, 9: mean 5, sum of squares 32
        // sample variance = 32 / 7
        let r = rolling_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8);
        assert_approx(r[7], (32.0_f64 / 7.0).sqrt(), 1e-12);
    }

    #[test]
    fn rolling_std_period_one_is_undefined() {
        assert!(rolling_std(&[1.0, 2.0], 1).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rolling_min_max() {
        let values = [5.0, 3.0, 8.0, 1.0, 4.0];
        let lo = rolling_min(&values, 3);
        let hi = rolling_max(&values, 3);
        assert_eq!(lo[2], 3.0);
        assert_eq!(lo[3], 1.0);
        assert_eq!(hi[2], 8.0);
        assert_eq!(hi[4], 8.0);
    }

    #[test]
    fn pct_change_fractional() {
        let r = pct_change(&[100.0, 110.0, 121.0], 1);
        assert!(r[0].is_nan());
        assert_approx(r[1], 0.10, DEFAULT_EPSILON);
        assert_approx(r[2], 0.10, DEFAULT_EPSILON);
        let r2 = pct_change(&[100.0, 110.0, 121.0], 2);
        assert_approx(r2[2], 0.21, DEFAULT_EPSILON);
    }

    #[test]
    fn pct_change_zero_base_is_undefined() {
        let r = pct_change(&[0.0, 5.0], 1);
        assert!(r[1].is_nan());
    }

    #[test]
    fn short_input_is_all_nan() {
        assert!(rolling_mean(&[1.0, 2.0], 5).iter().all(|v| v.is_nan()));
        assert!(pct_change(&[1.0, 2.0], 5).iter().all(|v| v.is_nan()));
        assert!(rolling_mean(&[], 3).is_empty());
    }
}
