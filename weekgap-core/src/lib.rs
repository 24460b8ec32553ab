//! weekgap core — the weekly gap-down pattern engine.
//!
//! - Domain types (bars, capital, setup candidates, gap results, trade signals)
//! - RSI(14), SMA(20) and volume-ratio indicators
//! - Thursday/Friday setup detector and Friday/Monday gap detector
//! - Risk-budget sizing and signal synthesis
//! - Data providers (Yahoo Finance, CSV directory) with canonicalization
//!
//! Nothing here touches the filesystem except the CSV provider; persistence,
//! configuration and reporting live in `weekgap-runner`.

pub mod data;
pub mod detectors;
pub mod domain;
pub mod indicators;
pub mod sizing;
pub mod synth;

pub use detectors::GAP_DOWN_THRESHOLD_PCT;
pub use sizing::RISK_PER_TRADE;
