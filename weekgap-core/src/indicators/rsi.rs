//! Relative Strength Index (RSI).
//!
//! Simple (not Wilder) averages of gains and losses over the last `period`
//! close-to-close changes.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period (the first change needs a prior bar).
//! Edge case: avg_loss == 0 → RSI = 100.

use std::collections::VecDeque;

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let n = bars.len();
        let mut result = vec![None; n];

        if n < self.period + 1 {
            return result;
        }

        // Trailing window of changes. Gaining/losing day counts keep an empty
        // side at exactly zero instead of a float residue from the rolling sums.
        let mut window: VecDeque<f64> = VecDeque::with_capacity(self.period + 1);
        let mut gain_sum = 0.0;
        let mut loss_sum = 0.0;
        let mut gaining = 0usize;
        let mut losing = 0usize;

        for i in 1..n {
            let change = bars[i].close - bars[i - 1].close;
            window.push_back(change);
            if change > 0.0 {
                gain_sum += change;
                gaining += 1;
            } else if change < 0.0 {
                loss_sum -= change;
                losing += 1;
            }

            if window.len() > self.period {
                if let Some(leaving) = window.pop_front() {
                    if leaving > 0.0 {
                        gain_sum -= leaving;
                        gaining -= 1;
                    } else if leaving < 0.0 {
                        loss_sum += leaving;
                        losing -= 1;
                    }
                }
            }

            if window.len() == self.period {
                let period = self.period as f64;
                let avg_gain = if gaining == 0 { 0.0 } else { gain_sum / period };
                let avg_loss = if losing == 0 { 0.0 } else { loss_sum / period };
                result[i] = Some(compute_rsi(avg_gain, avg_loss));
            }
        }

        result
    }
}

/// RSI from average gain and loss; saturates at 100 when there are no losses.
pub fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}
