//! Volume ratio: current volume over its rolling mean.
//!
//! ratio[t] = volume[t] / mean(volume[t-period+1..=t])
//! A zero mean leaves the value undefined.
//! Lookback: period - 1.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::series::{extract, rolling_mean};

#[derive(Debug, Clone)]
pub struct VolumeRatio {
    period: usize,
    name: String,
}

impl VolumeRatio {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Volume ratio period must be >= 1");
        Self {
            period,
            name: format!("volume_ratio_{period}"),
        }
    }
}

impl Indicator for VolumeRatio {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let volumes = extract(bars, |b| b.volume);
        let mean = rolling_mean(&volumes, self.period);
        volumes
            .iter()
            .zip(&mean)
            .map(|(&v, &m)| if m == 0.0 { f64::NAN } else { v / m })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn spike_doubles_ratio() {
        let mut bars = make_bars(&[10.0; 4]);
        for (bar, v) in bars.iter_mut().zip([100.0, 100.0, 100.0, 300.0]) {
            bar.volume = v;
        }
        let result = VolumeRatio::new(4).compute(&bars);
        assert!(result[2].is_nan());
        // mean = 150 → 300 / 150 = 2
        assert_approx(result[3], 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn zero_volume_window_is_undefined() {
        let mut bars = make_bars(&[10.0; 3]);
        for bar in &mut bars {
            bar.volume = 0.0;
        }
        let result = VolumeRatio::new(3).compute(&bars);
        assert!(result[2].is_nan());
    }

    #[test]
    fn ratio_is_non_negative() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = VolumeRatio::new(2).compute(&bars);
        assert!(result.iter().filter(|v| !v.is_nan()).all(|&v| v >= 0.0));
    }

    #[test]
    fn volume_ratio_lookback() {
        assert_eq!(VolumeRatio::new(20).lookback(), 19);
    }
}
