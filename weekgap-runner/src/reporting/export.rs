//! CSV export of Monday trade signals.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use weekgap_core::domain::TradeSignal;

pub fn signals_file_name(date: NaiveDate) -> String {
    format!("signals_{}.csv", date.format("%Y%m%d"))
}

/// Export trade signals as CSV, one row per signal in the given order.
///
/// Columns: symbol, stock, gap_pct, success_pct, entry, target, stop, shares,
/// position, risk_amount, profit_if_target, loss_if_stop, capital_risk_pct
pub fn export_signals_csv(signals: &[TradeSignal]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "symbol",
        "stock",
        "gap_pct",
        "success_pct",
        "entry",
        "target",
        "stop",
        "shares",
        "position",
        "risk_amount",
        "profit_if_target",
        "loss_if_stop",
        "capital_risk_pct",
    ])?;

    for s in signals {
        wtr.write_record([
            &s.symbol,
            &s.display_name,
            &format!("{:.2}", s.gap_pct),
            &format!("{:.1}", s.gap_success_pct),
            &format!("{:.2}", s.entry),
            &format!("{:.2}", s.target),
            &format!("{:.2}", s.stop),
            &s.shares.to_string(),
            &format!("{:.2}", s.notional),
            &format!("{:.2}", s.risk_amount),
            &format!("{:.2}", s.profit_if_target),
            &format!("{:.2}", s.loss_if_stop),
            &format!("{:.4}", s.capital_risk_pct),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Write `signals_<YYYYMMDD>.csv` under `dir`, creating it if needed.
pub fn save_signals_csv(signals: &[TradeSignal], dir: &Path, date: NaiveDate) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create signals dir: {}", dir.display()))?;
    let path = dir.join(signals_file_name(date));
    let csv = export_signals_csv(signals)?;
    std::fs::write(&path, csv).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
