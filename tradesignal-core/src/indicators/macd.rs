//! Moving Average Convergence Divergence (MACD).
//!
//! Three outputs (separate Indicator instances):
//! - Line: EMA(close, fast) - EMA(close, slow)
//! - Signal: EMA(line, signal)
//! - Histogram: line - signal
//!
//! The EMAs recurse over the whole series from the first bar; only the
//! reported output is masked.
//! Lookback: slow - 1 for the line, slow + signal - 2 for signal and histogram.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::ema::{ema_recursive, mask_warmup};
use super::series::extract;

/// Which MACD output to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdOutput {
    Line,
    Signal,
    Histogram,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    output: MacdOutput,
    name: String,
}

impl Macd {
    fn build(fast: usize, slow: usize, signal: usize, output: MacdOutput) -> Self {
        assert!(fast >= 1, "MACD fast period must be >= 1");
        assert!(slow >= 1, "MACD slow period must be >= 1");
        assert!(signal >= 1, "MACD signal period must be >= 1");
        let prefix = match output {
            MacdOutput::Line => "macd",
            MacdOutput::Signal => "macd_signal",
            MacdOutput::Histogram => "macd_histogram",
        };
        Self {
            fast,
            slow,
            signal,
            output,
            name: format!("{prefix}_{fast}_{slow}_{signal}"),
        }
    }

    pub fn line(fast: usize, slow: usize, signal: usize) -> Self {
        Self::build(fast, slow, signal, MacdOutput::Line)
    }

    pub fn signal(fast: usize, slow: usize, signal: usize) -> Self {
        Self::build(fast, slow, signal, MacdOutput::Signal)
    }

    pub fn histogram(fast: usize, slow: usize, signal: usize) -> Self {
        Self::build(fast, slow, signal, MacdOutput::Histogram)
    }

    fn line_lookback(&self) -> usize {
        self.fast.max(self.slow) - 1
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.output {
            MacdOutput::Line => self.line_lookback(),
            MacdOutput::Signal | MacdOutput::Histogram => self.line_lookback() + self.signal - 1,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes = extract(bars, |b| b.close);
        let fast = ema_recursive(&closes, self.fast);
        let slow = ema_recursive(&closes, self.slow);
        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();

        let raw = match self.output {
            MacdOutput::Line => line,
            MacdOutput::Signal => ema_recursive(&line, self.signal),
            MacdOutput::Histogram => {
                let signal = ema_recursive(&line, self.signal);
                line.iter().zip(&signal).map(|(l, s)| l - s).collect()
            }
        };

        mask_warmup(raw, self.lookback())
    }
}
