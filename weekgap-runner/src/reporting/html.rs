//! HTML bodies for the Friday watchlist and Monday signal notifications.
//!
//! Attachments are left empty; the workflow attaches the files it wrote.

use chrono::NaiveDate;
use weekgap_core::domain::{Capital, SetupCandidate, TradeSignal};
use weekgap_core::GAP_DOWN_THRESHOLD_PCT;

use super::{Notification, Priority};
use crate::scan::GapCounts;

const STYLE: &str = r#"
    body { font-family: Arial, sans-serif; }
    h2 { color: #2ecc71; }
    table { border-collapse: collapse; width: 100%; margin: 20px 0; }
    th { background-color: #3498db; color: white; padding: 12px; text-align: left; }
    td { border: 1px solid #ddd; padding: 10px; }
    tr:nth-child(even) { background-color: #f2f2f2; }
    .priority1 { background-color: #d5f4e6; }
    .priority2 { background-color: #fef5e7; }
    .priority3 { background-color: #eaf2f8; }
    .trade-box { background-color: #f8f9fa; border: 2px solid #3498db; padding: 15px; margin: 15px 0; border-radius: 5px; }
    .profit { color: #27ae60; font-weight: bold; }
    .loss { color: #e74c3c; font-weight: bold; }
    .footer { color: gray; font-size: 12px; }
"#;

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Rupee amount rounded to whole units with thousands separators.
fn money(amount: f64) -> String {
    let rounded = amount.abs().round() as u64;
    let digits = rounded.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if amount < 0.0 && rounded > 0 { "-" } else { "" };
    format!("{sign}₹{grouped}")
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape(title)
    )
}

fn rsi_cell(rsi: Option<f64>) -> String {
    rsi.map_or_else(|| "n/a".to_string(), |v| format!("{v:.1}"))
}

/// Friday watchlist, or the "no setups" report when `watchlist` is empty.
///
/// `watchlist` is expected in success-rate order.
pub fn friday_report(
    date: NaiveDate,
    batch_id: &str,
    watchlist: &[SetupCandidate],
) -> Notification {
    let day = date.format("%Y-%m-%d");

    if watchlist.is_empty() {
        let body = format!(
            "<h2 style=\"color: #e74c3c;\">No Pattern Setups Today</h2>\n\
             <p>Date: {day}</p>\n\
             <p>No stocks met the Friday High &lt; Thursday High condition this week.</p>\n\
             <p>Check again next Friday.</p>\n\
             <p class=\"footer\">Batch: {}</p>\n",
            escape(batch_id)
        );
        let subject = format!("Friday Scanner: No Setups - {day}");
        return Notification {
            html: page(&subject, &body),
            subject,
            attachments: Vec::new(),
        };
    }

    let mut body = String::with_capacity(4096);
    body.push_str("<h2>Friday Pattern Scanner Results</h2>\n");
    body.push_str(&format!(
        "<p><strong>Date:</strong> {}</p>\n",
        date.format("%Y-%m-%d %A")
    ));
    body.push_str(&format!(
        "<p><strong>Total Setups Found:</strong> {}</p>\n<hr>\n",
        watchlist.len()
    ));

    for tier in [Priority::P1, Priority::P2, Priority::P3] {
        let rows: Vec<&SetupCandidate> = watchlist
            .iter()
            .filter(|s| Priority::for_rate(s.gap_success_pct) == Some(tier))
            .collect();
        if rows.is_empty() {
            continue;
        }
        body.push_str(&format!("<h3>{}</h3>\n<table>\n", tier.label()));
        body.push_str(
            "<tr><th>Stock</th><th>Friday Low</th><th>Friday Close</th>\
             <th>Decline %</th><th>RSI</th><th>Gap Success %</th></tr>\n",
        );
        for s in rows {
            body.push_str(&format!(
                "<tr class=\"{}\"><td><strong>{}</strong></td><td>₹{:.2}</td><td>₹{:.2}</td>\
                 <td>{:.2}%</td><td>{}</td><td><strong>{:.1}%</strong></td></tr>\n",
                tier.css_class(),
                escape(&s.display_name),
                s.friday_low,
                s.friday_close,
                s.decline_pct,
                rsi_cell(s.rsi_at_friday),
                s.gap_success_pct
            ));
        }
        body.push_str("</table>\n");
    }

    body.push_str("<h3>Full Watchlist</h3>\n<table>\n");
    body.push_str(
        "<tr><th>Stock</th><th>Symbol</th><th>Thursday High</th><th>Friday High</th>\
         <th>Friday Low</th><th>Friday Close</th><th>Decline %</th><th>RSI</th>\
         <th>Below SMA20</th><th>Volume Ratio</th><th>Gap Success %</th></tr>\n",
    );
    for s in watchlist {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>₹{:.2}</td><td>₹{:.2}</td><td>₹{:.2}</td><td>₹{:.2}</td>\
             <td>{:.2}%</td><td>{}</td><td>{}</td><td>{}</td><td>{:.1}%</td></tr>\n",
            escape(&s.display_name),
            escape(&s.symbol),
            s.thursday_high,
            s.friday_high,
            s.friday_low,
            s.friday_close,
            s.decline_pct,
            rsi_cell(s.rsi_at_friday),
            if s.below_sma20 { "Yes" } else { "No" },
            s.volume_ratio.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}")),
            s.gap_success_pct
        ));
    }
    body.push_str("</table>\n<hr>\n");

    body.push_str(&format!(
        "<h3>Next Steps</h3>\n<ol>\n\
         <li>Review the watchlist (attached CSV)</li>\n\
         <li>On Monday after the open, run the Monday scanner</li>\n\
         <li>If the gap down exceeds {:.1}%, place the trades</li>\n\
         </ol>\n\
         <p class=\"footer\">Batch: {}</p>\n",
        GAP_DOWN_THRESHOLD_PCT.abs(),
        escape(batch_id)
    ));

    let subject = format!(
        "Friday Alert: {} Pattern Setups Found - {day}",
        watchlist.len()
    );
    Notification {
        html: page(&subject, &body),
        subject,
        attachments: Vec::new(),
    }
}

/// Monday signals, or the "no signals" report when `signals` is empty.
pub fn monday_report(
    date: NaiveDate,
    signals: &[TradeSignal],
    capital: Capital,
    counts: &GapCounts,
) -> Notification {
    let day = date.format("%Y-%m-%d");
    let summary = format!(
        "<p class=\"footer\">Not actionable: {} | No gap data: {} | Stale setups: {} | \
         Skipped: {} ({} anomalies) | Data unavailable: {}</p>\n",
        counts.not_actionable,
        counts.no_gap,
        counts.stale,
        counts.skipped,
        counts.anomalies,
        counts.data_unavailable
    );

    if signals.is_empty() {
        let body = format!(
            "<h2 style=\"color: #e74c3c;\">No Gap Down Signals Today</h2>\n\
             <p>Date: {day}</p>\n\
             <p>None of the watchlist stocks gapped down more than {:.1}%.</p>\n\
             <p>No trades to execute today.</p>\n{summary}",
            GAP_DOWN_THRESHOLD_PCT.abs()
        );
        let subject = format!("Monday Scanner: No Signals - {day}");
        return Notification {
            html: page(&subject, &body),
            subject,
            attachments: Vec::new(),
        };
    }

    let mut body = String::with_capacity(4096);
    body.push_str("<h2>Monday Gap Down Signals</h2>\n");
    body.push_str(&format!(
        "<p><strong>Date:</strong> {}</p>\n\
         <p><strong>Total Trade Signals:</strong> {}</p>\n\
         <p><strong>Trading Capital:</strong> {}</p>\n<hr>\n",
        date.format("%Y-%m-%d %A"),
        signals.len(),
        money(capital.amount())
    ));

    for (i, s) in signals.iter().enumerate() {
        body.push_str(&format!(
            "<div class=\"trade-box\">\n\
             <h3>Trade {}: {} (Success: {:.1}%)</h3>\n\
             <p><strong>Gap:</strong> {:.2}%</p>\n\
             <table>\n\
             <tr><th>Entry</th><th>Target</th><th>Stop Loss</th><th>Shares</th></tr>\n\
             <tr><td>₹{:.2}</td><td>₹{:.2}</td><td>₹{:.2}</td><td>{}</td></tr>\n\
             </table>\n\
             <p><strong>Position Value:</strong> {}</p>\n\
             <p class=\"profit\">If Target Hit: {} profit</p>\n\
             <p class=\"loss\">If Stop Hit: {} loss ({:.2}% of capital)</p>\n\
             </div>\n",
            i + 1,
            escape(&s.display_name),
            s.gap_success_pct,
            s.gap_pct,
            s.entry,
            s.target,
            s.stop,
            s.shares,
            money(s.notional),
            money(s.profit_if_target.abs()),
            money(s.loss_if_stop.abs()),
            s.capital_risk_pct
        ));
    }

    body.push_str(
        "<hr>\n<h3>Action Required</h3>\n<ol>\n\
         <li>Enter at the specified entry prices</li>\n\
         <li><strong>Set stops immediately</strong> after entry</li>\n\
         <li>Set targets at the Friday low</li>\n\
         <li>Use the exact position sizes calculated</li>\n\
         </ol>\n\
         <p class=\"footer\">Attached: trade signals CSV. Risk per trade: 1% of capital.</p>\n",
    );
    body.push_str(&summary);

    let subject = format!(
        "TRADE ALERT: {} Signals - Execute Today! - {day}",
        signals.len()
    );
    Notification {
        html: page(&subject, &body),
        subject,
        attachments: Vec::new(),
    }
}

/// Sent when the Monday run finds no usable setup batch.
pub fn missing_watchlist_report(date: NaiveDate, reason: &str) -> Notification {
    let subject = format!("Monday Scanner: Error - No Watchlist - {}", date.format("%Y-%m-%d"));
    let body = format!(
        "<h2 style=\"color: #e74c3c;\">Error: No Friday Watchlist</h2>\n\
         <p>{}</p>\n\
         <p>Run the Friday scanner first to generate a watchlist.</p>\n",
        escape(reason)
    );
    Notification {
        html: page(&subject, &body),
        subject,
        attachments: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
    }

    fn setup(name: &str, rate: f64) -> SetupCandidate {
        SetupCandidate {
            symbol: format!("{name}.NS"),
            display_name: name.into(),
            friday_date: date(),
            thursday_high: 110.0,
            friday_high: 108.0,
            friday_low: 100.0,
            friday_close: 104.0,
            decline_pct: -1.818,
            rsi_at_friday: Some(41.2),
            below_sma20: true,
            volume_ratio: None,
            gap_success_pct: rate,
        }
    }

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(100_000.0), "₹100,000");
        assert_eq!(money(999.4), "₹999");
        assert_eq!(money(1_234_567.8), "₹1,234,568");
        assert_eq!(money(-1_500.0), "-₹1,500");
        assert_eq!(money(0.0), "₹0");
    }

    #[test]
    fn names_are_escaped() {
        let report = friday_report(date(), "b1", &[setup("L&T", 96.0)]);
        assert!(report.html.contains("L&amp;T"));
        assert!(!report.html.contains("<strong>L&T"));
    }

    #[test]
    fn watchlist_groups_by_tier() {
        let report = friday_report(
            date(),
            "b1",
            &[setup("Alpha", 97.0), setup("Beta", 91.0), setup("Gamma", 50.0)],
        );
        assert_eq!(report.subject, "Friday Alert: 3 Pattern Setups Found - 2024-06-14");
        assert!(report.html.contains(Priority::P1.label()));
        assert!(report.html.contains(Priority::P2.label()));
        assert!(!report.html.contains(Priority::P3.label()));
        assert!(report.html.contains("Gamma"));
    }

    #[test]
    fn empty_watchlist_is_no_setups_report() {
        let report = friday_report(date(), "b1", &[]);
        assert!(report.subject.starts_with("Friday Scanner: No Setups"));
    }

    #[test]
    fn empty_signals_is_no_signals_report() {
        let capital = Capital::new(100_000.0).unwrap();
        let report = monday_report(date(), &[], capital, &GapCounts::default());
        assert!(report.subject.starts_with("Monday Scanner: No Signals"));
    }

    #[test]
    fn missing_watchlist_mentions_reason() {
        let report = missing_watchlist_report(date(), "no setup batches in batches");
        assert!(report.subject.contains("No Watchlist"));
        assert!(report.html.contains("no setup batches in batches"));
    }
}
