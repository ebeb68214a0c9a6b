//! Configuration for volatility cone runs
//!
//! Two presets carry the settings of the two pipelines: the implied vs
//! realized cone and the cone against live implied volatility quantiles.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{ConeError, ConeResult, ExpiryBasis};

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Configuration for one cone run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConeConfig {
    /// Volatility index whose closes form the implied-vol proxy
    /// Default: "^VIX"
    pub index_symbol: String,

    /// Underlying for realized volatility and the option chain
    /// Default: "SPY"
    pub underlying_symbol: String,

    /// History start (inclusive)
    pub start: NaiveDate,

    /// History end (exclusive, as the provider treats it)
    pub end: NaiveDate,

    /// Rolling window lengths in trading days
    pub windows: Vec<usize>,

    /// Flat annual risk-free rate for the implied volatility solver
    pub risk_free_rate: f64,

    /// How option rows are dated for filtering and time-to-expiry
    pub expiry_basis: ExpiryBasis,

    /// Chart output
    pub chart: ChartConfig,
}

impl Default for ConeConfig {
    fn default() -> Self {
        Self::realized_vs_implied()
    }
}

impl ConeConfig {
    /// VIX cone summaries against mean SPY realized volatility, 2010-2024
    pub fn realized_vs_implied() -> Self {
        Self {
            index_symbol: "^VIX".to_string(),
            underlying_symbol: "SPY".to_string(),
            start: ymd(2010, 1, 1),
            end: ymd(2024, 1, 1),
            windows: vec![21, 42, 63, 126, 189],
            risk_free_rate: 0.05,
            expiry_basis: ExpiryBasis::ContractExpiry,
            chart: ChartConfig {
                output_path: PathBuf::from("volatility_cone.svg"),
                ..Default::default()
            },
        }
    }

    /// VIX cone deciles against live SPY call implied volatility, 2020-2024
    pub fn implied_quantiles() -> Self {
        Self {
            start: ymd(2020, 1, 1),
            end: ymd(2024, 1, 1),
            windows: vec![21, 63, 126],
            chart: ChartConfig {
                output_path: PathBuf::from("volatility_cone_iv.svg"),
                ..Default::default()
            },
            ..Self::realized_vs_implied()
        }
    }

    /// Reject settings no run can succeed with
    pub fn validate(&self) -> ConeResult<()> {
        if self.index_symbol.trim().is_empty() || self.underlying_symbol.trim().is_empty() {
            return Err(ConeError::invalid_input("symbols must not be empty"));
        }
        if self.start >= self.end {
            return Err(ConeError::invalid_input(format!(
                "start {} must be before end {}",
                self.start, self.end
            )));
        }
        if self.windows.is_empty() {
            return Err(ConeError::invalid_input("at least one rolling window is required"));
        }
        if let Some(&w) = self.windows.iter().find(|&&w| w < 2) {
            return Err(ConeError::invalid_input(format!(
                "rolling window must be at least 2, got {}",
                w
            )));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(ConeError::invalid_input("risk-free rate must be finite"));
        }
        self.chart.validate()
    }
}

/// Chart output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Output file
    pub output_path: PathBuf,
    /// Canvas width in pixels
    /// Default: 1200
    pub width: u32,
    /// Canvas height in pixels
    /// Default: 800
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("volatility_cone.svg"),
            width: 1200,
            height: 800,
        }
    }
}

impl ChartConfig {
    pub fn validate(&self) -> ConeResult<()> {
        if self.width < 200 || self.height < 200 {
            return Err(ConeError::invalid_input(format!(
                "chart canvas {}x{} is too small",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let realized = ConeConfig::realized_vs_implied();
        assert_eq!(realized.windows, vec![21, 42, 63, 126, 189]);
        assert_eq!(realized.start, ymd(2010, 1, 1));
        assert!(realized.validate().is_ok());

        let implied = ConeConfig::implied_quantiles();
        assert_eq!(implied.windows, vec![21, 63, 126]);
        assert_eq!(implied.start, ymd(2020, 1, 1));
        assert_eq!(implied.end, ymd(2024, 1, 1));
        assert_eq!(implied.risk_free_rate, 0.05);
        assert_eq!(implied.underlying_symbol, "SPY");
        assert_ne!(implied.chart.output_path, realized.chart.output_path);
        assert!(implied.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects() {
        let mut config = ConeConfig::default();
        config.windows = vec![21, 1];
        assert!(config.validate().is_err());

        let mut config = ConeConfig::default();
        config.windows.clear();
        assert!(config.validate().is_err());

        let mut config = ConeConfig::default();
        config.end = config.start;
        assert!(config.validate().is_err());

        let mut config = ConeConfig::default();
        config.index_symbol = " ".into();
        assert!(config.validate().is_err());

        let mut config = ConeConfig::default();
        config.chart.width = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let config = ConeConfig::implied_quantiles();
        let json = serde_json::to_string(&config).unwrap();
        let back: ConeConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(back.windows, config.windows);
        assert_eq!(back.expiry_basis, config.expiry_basis);
    }
}
