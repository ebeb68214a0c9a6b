//! Implied vs realized volatility cone
//!
//! For each window: the five-number summary of the index's annualized
//! rolling close-price volatility, and the mean annualized rolling
//! volatility of the underlying's daily returns.

use serde::{Deserialize, Serialize};

use super::fetch_history;
use crate::config::ConeConfig;
use crate::core::{ConeError, ConeResult, PriceField, PriceSeries};
use crate::data::MarketDataProvider;
use crate::stats::{FiveNumberSummary, RollingVolatility};

/// Cone statistics for one window length
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindowCone {
    /// Window length in trading days
    pub window: usize,
    /// Summary of the index's rolling volatility
    pub implied: FiveNumberSummary,
    /// Mean rolling realized volatility of the underlying (decimal)
    pub realized_mean: f64,
}

/// Result of the implied vs realized pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealizedConeReport {
    pub index_symbol: String,
    pub underlying_symbol: String,
    /// One entry per window, in configured order
    pub cones: Vec<WindowCone>,
}

/// Annualized rolling volatility of daily percentage returns
pub fn realized_volatility(prices: &PriceSeries, window: usize) -> ConeResult<RollingVolatility> {
    RollingVolatility::compute(&prices.pct_change(), window)
}

impl RealizedConeReport {
    /// Compute the cone from already fetched histories
    pub fn compute(
        index: &PriceSeries,
        underlying: &PriceSeries,
        windows: &[usize],
    ) -> ConeResult<Self> {
        let mut cones = Vec::with_capacity(windows.len());

        for &window in windows {
            let implied_vol = RollingVolatility::compute(&index.observations, window)?;
            let implied = FiveNumberSummary::from_values(&implied_vol.values()).ok_or_else(|| {
                insufficient_history(&index.symbol, window, index.len())
            })?;

            let realized_mean = realized_volatility(underlying, window)?
                .mean()
                .ok_or_else(|| {
                    insufficient_history(&underlying.symbol, window, underlying.len().saturating_sub(1))
                })?;

            tracing::debug!(
                window,
                implied_mean = implied.mean,
                realized_mean,
                "Window statistics"
            );

            cones.push(WindowCone {
                window,
                implied,
                realized_mean,
            });
        }

        Ok(Self {
            index_symbol: index.symbol.clone(),
            underlying_symbol: underlying.symbol.clone(),
            cones,
        })
    }

    pub fn windows(&self) -> Vec<usize> {
        self.cones.iter().map(|c| c.window).collect()
    }

    /// Summary table, one row per window
    pub fn format_table(&self) -> String {
        let mut out = format!("{:>8}", "Window");
        for label in FiveNumberSummary::LABELS {
            out.push_str(&format!(" {:>16}", label));
        }
        out.push_str(&format!(" {:>16}\n", "Realized Mean"));

        for cone in &self.cones {
            out.push_str(&format!("{:>8}", cone.window));
            for value in cone.implied.as_array() {
                out.push_str(&format!(" {:>16.4}", value));
            }
            out.push_str(&format!(" {:>15.2}%\n", cone.realized_mean * 100.0));
        }

        out
    }
}

fn insufficient_history(symbol: &str, window: usize, available: usize) -> ConeError {
    ConeError::data(format!(
        "{}: {} observations cannot fill a {}-day window",
        symbol, available, window
    ))
}

/// Fetch index and underlying history and compute the cone
pub fn build_realized_cone<P: MarketDataProvider + ?Sized>(
    provider: &P,
    config: &ConeConfig,
) -> ConeResult<RealizedConeReport> {
    config.validate()?;

    let index = fetch_history(provider, config, &config.index_symbol, PriceField::Close)?;
    let underlying = fetch_history(provider, config, &config.underlying_symbol, PriceField::AdjClose)?;

    tracing::info!(windows = ?config.windows, "Computing rolling statistics");
    let report = RealizedConeReport::compute(&index, &underlying, &config.windows)?;

    tracing::info!(windows = report.cones.len(), "Volatility cone complete");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cone::fixtures::{wave, FixtureProvider};
    use chrono::{Duration, NaiveDate};

    fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceSeries::from_pairs(
            symbol,
            PriceField::Close,
            closes
                .iter()
                .enumerate()
                .map(|(i, &c)| (start + Duration::days(i as i64), c)),
        )
    }

    #[test]
    fn test_realized_end_to_end_scenario() {
        let prices = series("SPY", &[100.0, 101.0, 99.0, 102.0, 98.0, 103.0]);
        let vol = realized_volatility(&prices, 3).unwrap();

        // Five returns; the first two window positions are undefined
        assert_eq!(prices.pct_change().len(), 5);
        assert_eq!(vol.len(), 3);
        assert_eq!(vol.dates(), prices.dates()[3..].to_vec());

        let expected = [0.4000713585122152, 0.5694301999823745, 0.7503291320838851];
        for (v, e) in vol.values().iter().zip(expected) {
            assert!((v - e).abs() < 1e-12, "{} vs {}", v, e);
        }
        assert!((vol.mean().unwrap() - expected.iter().sum::<f64>() / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_compute_report() {
        let index = series("^VIX", &wave(80, 18.0, 3.0));
        let underlying = series("SPY", &wave(80, 400.0, 6.0));
        let report = RealizedConeReport::compute(&index, &underlying, &[5, 10, 20]).unwrap();

        assert_eq!(report.windows(), vec![5, 10, 20]);
        for cone in &report.cones {
            let s = cone.implied;
            assert!(s.min <= s.q25 && s.q25 <= s.q75 && s.q75 <= s.max);
            assert!(s.min <= s.mean && s.mean <= s.max);
            assert!(cone.realized_mean > 0.0);
        }

        let table = report.format_table();
        assert_eq!(table.lines().count(), 4);
        assert!(table.contains("75th Percentile"));
    }

    #[test]
    fn test_constant_index_has_flat_cone() {
        let index = series("^VIX", &[20.0; 30]);
        let underlying = series("SPY", &[100.0; 30]);
        let report = RealizedConeReport::compute(&index, &underlying, &[5, 21]).unwrap();

        for cone in &report.cones {
            assert_eq!(cone.implied.as_array(), [0.0; 5]);
            assert_eq!(cone.realized_mean, 0.0);
        }
    }

    #[test]
    fn test_window_longer_than_history() {
        let index = series("^VIX", &[20.0, 21.0, 19.0]);
        let underlying = series("SPY", &[100.0, 101.0, 99.0]);
        let err = RealizedConeReport::compute(&index, &underlying, &[5]).unwrap_err();

        assert!(err.to_string().contains("5-day window"));
    }

    #[test]
    fn test_build_with_provider() {
        let provider = FixtureProvider::default()
            .with_history("^VIX", wave(300, 20.0, 4.0))
            .with_history("SPY", wave(300, 450.0, 5.0));
        let mut config = ConeConfig::realized_vs_implied();
        config.windows = vec![21, 63];

        let report = build_realized_cone(&provider, &config).unwrap();
        assert_eq!(report.index_symbol, "^VIX");
        assert_eq!(report.underlying_symbol, "SPY");
        assert_eq!(report.cones.len(), 2);
    }

    #[test]
    fn test_build_aborts_on_empty_history() {
        let provider = FixtureProvider::default().with_history("SPY", wave(300, 450.0, 5.0));
        let err = build_realized_cone(&provider, &ConeConfig::realized_vs_implied()).unwrap_err();

        assert!(matches!(err, ConeError::EmptySeries(ref s) if s == "^VIX"));
    }
}
