//! Data fetching
//!
//! Handles:
//! - Yahoo Finance API for index/ETF daily history and option chains
//! - The provider seam the cone pipelines are driven through

pub mod yahoo;

pub use yahoo::*;

use chrono::NaiveDate;

use crate::core::{CallChain, ConeResult, PriceField, PriceSeries};

/// Source of market data for the cone pipelines.
///
/// Every call blocks until the provider answers or fails; nothing is retried.
pub trait MarketDataProvider {
    /// Daily closes of `symbol` in `[start, end)`
    fn history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        field: PriceField,
    ) -> ConeResult<PriceSeries>;

    /// Current price of `symbol`
    fn spot(&self, symbol: &str) -> ConeResult<f64>;

    /// Listed option expiration dates, ascending
    fn expirations(&self, symbol: &str) -> ConeResult<Vec<NaiveDate>>;

    /// Call side of the chain expiring on `expiry`
    fn call_chain(&self, symbol: &str, expiry: NaiveDate) -> ConeResult<CallChain>;
}
