//! Basket — the fixed list of symbols scanned each week.
//!
//! Each entry pairs a provider symbol with the display name used in reports
//! and as the key into the historical success-rate table.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketEntry {
    pub symbol: String,
    pub name: String,
}

impl BasketEntry {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
        }
    }
}

/// Ordered basket. Scan results follow this order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basket {
    entries: Vec<BasketEntry>,
}

const NIFTY_50: &[(&str, &str)] = &[
    ("ADANIPORTS.NS", "Adani Ports"),
    ("ASIANPAINT.NS", "Asian Paints"),
    ("AXISBANK.NS", "Axis Bank"),
    ("BAJAJ-AUTO.NS", "Bajaj Auto"),
    ("BAJFINANCE.NS", "Bajaj Finance"),
    ("BAJAJFINSV.NS", "Bajaj Finserv"),
    ("BPCL.NS", "BPCL"),
    ("BHARTIARTL.NS", "Bharti Airtel"),
    ("BRITANNIA.NS", "Britannia"),
    ("CIPLA.NS", "Cipla"),
    ("COALINDIA.NS", "Coal India"),
    ("DIVISLAB.NS", "Divi's Labs"),
    ("DRREDDY.NS", "Dr Reddy"),
    ("EICHERMOT.NS", "Eicher Motors"),
    ("GRASIM.NS", "Grasim"),
    ("HCLTECH.NS", "HCL Tech"),
    ("HDFCBANK.NS", "HDFC Bank"),
    ("HDFCLIFE.NS", "HDFC Life"),
    ("HEROMOTOCO.NS", "Hero MotoCorp"),
    ("HINDALCO.NS", "Hindalco"),
    ("HINDUNILVR.NS", "HUL"),
    ("ICICIBANK.NS", "ICICI Bank"),
    ("ITC.NS", "ITC"),
    ("INDUSINDBK.NS", "IndusInd Bank"),
    ("INFY.NS", "Infosys"),
    ("JSWSTEEL.NS", "JSW Steel"),
    ("KOTAKBANK.NS", "Kotak Bank"),
    ("LT.NS", "L&T"),
    ("M&M.NS", "M&M"),
    ("MARUTI.NS", "Maruti"),
    ("NTPC.NS", "NTPC"),
    ("NESTLEIND.NS", "Nestle"),
    ("ONGC.NS", "ONGC"),
    ("POWERGRID.NS", "Power Grid"),
    ("RELIANCE.NS", "Reliance"),
    ("SBILIFE.NS", "SBI Life"),
    ("SHRIRAMFIN.NS", "Shriram Finance"),
    ("SBIN.NS", "SBI"),
    ("SUNPHARMA.NS", "Sun Pharma"),
    ("TCS.NS", "TCS"),
    ("TATACONSUM.NS", "Tata Consumer"),
    ("TATASTEEL.NS", "Tata Steel"),
    ("TECHM.NS", "Tech Mahindra"),
    ("TITAN.NS", "Titan"),
    ("ULTRACEMCO.NS", "UltraTech"),
    ("WIPRO.NS", "Wipro"),
    ("^NSEI", "NIFTY 50"),
    ("^NSEBANK", "BANK NIFTY"),
];

impl Basket {
    pub fn new(entries: Vec<BasketEntry>) -> Self {
        Self { entries }
    }

    /// NIFTY 50 constituents plus the NIFTY and BANK NIFTY indices.
    pub fn nifty50() -> Self {
        Self::new(
            NIFTY_50
                .iter()
                .map(|&(symbol, name)| BasketEntry::new(symbol, name))
                .collect(),
        )
    }

    pub fn entries(&self) -> &[BasketEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn display_name(&self, symbol: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.symbol == symbol)
            .map(|e| e.name.as_str())
    }
}
