//! Risk-budget position sizing.
//!
//! Classic fixed-fractional sizing: risk a fixed share of capital per trade,
//! with the stop distance expressed as a percentage of entry.
//!
//! ```text
//! risk_amount    = capital * risk_fraction
//! risk_pct       = |stop - entry| / entry * 100
//! position_value = risk_amount / (risk_pct / 100)
//! shares         = floor(position_value / entry)
//! ```
//!
//! Example: capital 100,000, risk 1% (1,000), entry 100, stop 102
//! → risk_pct 2.0, position_value 50,000, shares 500.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::Capital;

/// Fraction of capital risked on a single trade.
pub const RISK_PER_TRADE: f64 = 0.01;

/// Why a trade cannot be sized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DegenerateRisk {
    /// Entry price is zero, negative or not finite.
    InvalidEntry(f64),
    /// Stop equals entry: zero stop distance.
    StopAtEntry(f64),
}

impl fmt::Display for DegenerateRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegenerateRisk::InvalidEntry(entry) => write!(f, "invalid entry price {entry}"),
            DegenerateRisk::StopAtEntry(price) => write!(f, "stop equals entry at {price}"),
        }
    }
}

/// Result of sizing one trade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSize {
    pub risk_amount: f64,
    pub risk_pct: f64,
    pub position_value: f64,
    /// Truncated toward zero so the risk budget is never exceeded.
    pub shares: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct RiskSizer {
    risk_fraction: f64,
}

impl Default for RiskSizer {
    fn default() -> Self {
        Self::new(RISK_PER_TRADE)
    }
}

impl RiskSizer {
    pub fn new(risk_fraction: f64) -> Self {
        assert!(
            risk_fraction > 0.0 && risk_fraction < 1.0,
            "risk_fraction must be in (0, 1)"
        );
        Self { risk_fraction }
    }

    pub fn risk_fraction(&self) -> f64 {
        self.risk_fraction
    }

    pub fn size(
        &self,
        capital: Capital,
        entry: f64,
        stop: f64,
    ) -> Result<PositionSize, DegenerateRisk> {
        if !entry.is_finite() || entry <= 0.0 {
            return Err(DegenerateRisk::InvalidEntry(entry));
        }

        let risk_pct = ((stop - entry) / entry * 100.0).abs();
        if risk_pct == 0.0 || !risk_pct.is_finite() {
            return Err(DegenerateRisk::StopAtEntry(entry));
        }

        let risk_amount = capital.amount() * self.risk_fraction;
        let position_value = risk_amount / (risk_pct / 100.0);
        let shares = (position_value / entry).floor() as u64;

        Ok(PositionSize {
            risk_amount,
            risk_pct,
            position_value,
            shares,
        })
    }
}
