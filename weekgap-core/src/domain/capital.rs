//! Trading capital, validated once at the configuration boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CapitalError {
    #[error("capital must be a positive finite amount, got {0}")]
    NotPositive(f64),
}

/// Account capital used as the base of every risk computation.
///
/// Construction rejects zero, negative and non-finite amounts, so risk code
/// never has to re-check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Capital(f64);

impl Capital {
    pub fn new(amount: f64) -> Result<Self, CapitalError> {
        if amount.is_finite() && amount > 0.0 {
            Ok(Self(amount))
        } else {
            Err(CapitalError::NotPositive(amount))
        }
    }

    pub fn amount(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Capital {
    type Error = CapitalError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Capital> for f64 {
    fn from(capital: Capital) -> Self {
        capital.0
    }
}
