//! Option type definitions

use serde::{Deserialize, Serialize};

/// Option type (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Intrinsic value at given spot
    pub fn intrinsic(&self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }

    /// No-arbitrage upper bound on the undiscounted premium
    pub fn upper_bound(&self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => spot,
            OptionType::Put => strike,
        }
    }
}
