//! Volatility cone pipelines
//!
//! Each pipeline is a single pass: fetch through a [`MarketDataProvider`],
//! compute rolling statistics, and return a report for printing and
//! charting. Fetch failures and empty histories abort the run.
//!
//! - Realized: VIX five-number cone against mean SPY realized volatility
//! - Implied: VIX 10/50/90 cone against live SPY call implied volatility
//!
//! [`MarketDataProvider`]: crate::data::MarketDataProvider

pub mod implied;
pub mod realized;

pub use implied::*;
pub use realized::*;

use chrono::NaiveDate;

use crate::config::ConeConfig;
use crate::core::{ConeError, ConeResult, PriceField, PriceSeries};
use crate::data::MarketDataProvider;

/// Fail with [`ConeError::EmptySeries`] when a fetched history is empty
pub fn require_history(series: &PriceSeries) -> ConeResult<()> {
    if series.is_empty() {
        return Err(ConeError::EmptySeries(series.symbol.clone()));
    }
    Ok(())
}

/// Fetch a non-empty daily history over the configured range
pub(crate) fn fetch_history<P: MarketDataProvider + ?Sized>(
    provider: &P,
    config: &ConeConfig,
    symbol: &str,
    field: PriceField,
) -> ConeResult<PriceSeries> {
    tracing::info!(symbol, "Downloading {} to {}", config.start, config.end);
    let series = provider.history(symbol, config.start, config.end, field)?;
    require_history(&series)?;
    Ok(series)
}

/// First date in `dates` strictly after `today`
pub fn first_after(dates: &[NaiveDate], today: NaiveDate) -> Option<NaiveDate> {
    dates.iter().copied().filter(|&d| d > today).min()
}
