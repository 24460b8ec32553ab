//! Trade signal — a sized instruction derived from a setup and its Monday gap.

use serde::{Deserialize, Serialize};

/// Entry, exits and size for one symbol.
///
/// `profit_if_target` and `loss_if_stop` are signed share-weighted price
/// deltas, `shares * (target - entry)` and `shares * (entry - stop)`.
/// Reports render their magnitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSignal {
    pub symbol: String,
    pub display_name: String,
    pub entry: f64,
    pub target: f64,
    pub stop: f64,
    pub shares: u64,
    /// Risk budget divided by the stop distance fraction.
    pub position_value: f64,
    /// `shares * entry`, the capital actually deployed after truncation.
    pub notional: f64,
    pub risk_amount: f64,
    pub profit_if_target: f64,
    pub loss_if_stop: f64,
    pub risk_pct: f64,
    pub reward_pct: f64,
    pub capital_risk_pct: f64,
    pub gap_pct: f64,
    pub gap_success_pct: f64,
}
