//! Signal synthesis — turn a stored setup plus its Monday gap into a sized trade.
//!
//! Entry is Monday's open, the target is Friday's low and the stop is
//! Friday's high. A valid trade therefore has `target < entry < stop`.

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{Capital, GapResult, SetupCandidate, TradeSignal};
use crate::sizing::{DegenerateRisk, RiskSizer};

/// Why a setup/gap pair produced no trade.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    #[error("gap for {gap_symbol} does not belong to setup {setup_symbol}")]
    SymbolMismatch {
        setup_symbol: String,
        gap_symbol: String,
    },

    #[error("{symbol}: gap {gap_pct:.2}% is not actionable")]
    GapNotActionable { symbol: String, gap_pct: f64 },

    /// Data-quality anomaly: the trade cannot be sized at all.
    #[error("{symbol}: degenerate risk ({reason})")]
    DegenerateRisk {
        symbol: String,
        reason: DegenerateRisk,
    },

    /// Target and stop are not on opposite sides of the entry.
    #[error("{symbol}: target {target:.2} / stop {stop:.2} inconsistent with entry {entry:.2}")]
    DirectionMismatch {
        symbol: String,
        entry: f64,
        target: f64,
        stop: f64,
    },
}

impl SignalError {
    /// True for anomalies worth surfacing, as opposed to an ordinary "no trade".
    pub fn is_anomaly(&self) -> bool {
        matches!(
            self,
            SignalError::DegenerateRisk { .. } | SignalError::DirectionMismatch { .. }
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignalSynthesizer {
    sizer: RiskSizer,
}

impl SignalSynthesizer {
    pub fn new(sizer: RiskSizer) -> Self {
        Self { sizer }
    }

    pub fn risk_fraction(&self) -> f64 {
        self.sizer.risk_fraction()
    }

    pub fn synthesize(
        &self,
        setup: &SetupCandidate,
        gap: &GapResult,
        capital: Capital,
    ) -> Result<TradeSignal, SignalError> {
        if setup.symbol != gap.symbol {
            return Err(SignalError::SymbolMismatch {
                setup_symbol: setup.symbol.clone(),
                gap_symbol: gap.symbol.clone(),
            });
        }
        if !gap.is_actionable {
            return Err(SignalError::GapNotActionable {
                symbol: setup.symbol.clone(),
                gap_pct: gap.gap_pct,
            });
        }

        let entry = gap.monday_open;
        let target = setup.friday_low;
        let stop = setup.friday_high;

        let size = self.sizer.size(capital, entry, stop).map_err(|reason| {
            warn!(symbol = %setup.symbol, %reason, "degenerate risk, skipping");
            SignalError::DegenerateRisk {
                symbol: setup.symbol.clone(),
                reason,
            }
        })?;

        if !(target < entry && entry < stop) {
            warn!(symbol = %setup.symbol, entry, target, stop, "direction mismatch, skipping");
            return Err(SignalError::DirectionMismatch {
                symbol: setup.symbol.clone(),
                entry,
                target,
                stop,
            });
        }

        let shares = size.shares as f64;
        let profit_if_target = shares * (target - entry);
        let loss_if_stop = shares * (entry - stop);
        let capital_risk_pct = loss_if_stop.abs() / capital.amount() * 100.0;

        info!(
            symbol = %setup.symbol,
            entry,
            target,
            stop,
            shares = size.shares,
            "trade signal"
        );

        Ok(TradeSignal {
            symbol: setup.symbol.clone(),
            display_name: setup.display_name.clone(),
            entry,
            target,
            stop,
            shares: size.shares,
            position_value: size.position_value,
            notional: shares * entry,
            risk_amount: size.risk_amount,
            profit_if_target,
            loss_if_stop,
            risk_pct: size.risk_pct,
            reward_pct: (target - entry) / entry * 100.0,
            capital_risk_pct,
            gap_pct: gap.gap_pct,
            gap_success_pct: setup.gap_success_pct,
        })
    }
}
