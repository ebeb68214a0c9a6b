//! Option quote data
//!
//! Call-side snapshots from a live option chain and their solved implied
//! volatilities.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::America::New_York;
use serde::{Deserialize, Serialize};

use super::error::IvError;

/// Settlement hour on the expiry date, New York time
pub const SETTLEMENT_HOUR_ET: u32 = 16;

/// Days per year for time-to-expiry year fractions
pub const DAYS_PER_YEAR: f64 = 365.0;

const SECONDS_PER_YEAR: f64 = DAYS_PER_YEAR * 86_400.0;

/// Timestamp a quote row is dated by when filtering and timing it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExpiryBasis {
    /// The chain's expiration date at settlement
    #[default]
    ContractExpiry,
    /// The row's last trade timestamp
    LastTrade,
}

impl ExpiryBasis {
    /// Year fraction from `now` to `reference`.
    ///
    /// Contract expiries count elapsed seconds, so a contract settling later
    /// today still has positive time. Last-trade dating counts whole days.
    pub fn time_to_expiry(&self, reference: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
        match self {
            ExpiryBasis::ContractExpiry => year_fraction(reference, now),
            ExpiryBasis::LastTrade => time_to_expiry(reference, now),
        }
    }
}

/// A single call quote as returned by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallQuote {
    /// Contract symbol (e.g. "SPY240119C00470000")
    pub contract_symbol: Option<String>,
    /// Strike price
    pub strike: f64,
    /// Last traded price
    pub last_price: Option<f64>,
    /// Last trade timestamp
    pub last_trade: Option<DateTime<Utc>>,
}

impl CallQuote {
    /// Row identity for diagnostics: contract symbol, else row index
    pub fn row_id(&self, index: usize) -> String {
        match &self.contract_symbol {
            Some(symbol) => symbol.clone(),
            None => format!("row {}", index),
        }
    }
}

/// Call side of one option expiry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallChain {
    /// Underlying symbol
    pub underlying: String,
    /// Expiration date
    pub expiry: NaiveDate,
    /// Call quotes in provider order
    pub calls: Vec<CallQuote>,
}

impl CallChain {
    pub fn new(underlying: impl Into<String>, expiry: NaiveDate) -> Self {
        Self {
            underlying: underlying.into(),
            expiry,
            calls: Vec::new(),
        }
    }

    /// Expiration instant at settlement
    pub fn expiry_time(&self) -> Option<DateTime<Utc>> {
        expiry_instant(self.expiry)
    }

    /// The timestamp a row is dated by under the given basis
    pub fn reference_time(&self, quote: &CallQuote, basis: ExpiryBasis) -> Option<DateTime<Utc>> {
        match basis {
            ExpiryBasis::ContractExpiry => self.expiry_time(),
            ExpiryBasis::LastTrade => quote.last_trade,
        }
    }
}

/// Expiry date at the 16:00 New York settlement, in UTC
pub fn expiry_instant(expiry: NaiveDate) -> Option<DateTime<Utc>> {
    let local = expiry.and_hms_opt(SETTLEMENT_HOUR_ET, 0, 0)?;
    New_York
        .from_local_datetime(&local)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Year fraction from `now` to `reference`, counted in whole days
pub fn time_to_expiry(reference: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (reference - now).num_days() as f64 / DAYS_PER_YEAR
}

/// Year fraction from `now` to `reference`, counted in seconds
pub fn year_fraction(reference: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (reference - now).num_seconds() as f64 / SECONDS_PER_YEAR
}

/// A live call with its derived inputs and solved implied volatility
#[derive(Debug, Clone)]
pub struct PricedCall {
    pub quote: CallQuote,
    /// Year fraction to expiry
    pub time_to_expiry: f64,
    /// Solved implied volatility, or why the solve failed
    pub implied_vol: Result<f64, IvError>,
}

impl PricedCall {
    /// Implied volatility if the solve succeeded
    pub fn iv(&self) -> Option<f64> {
        self.implied_vol.as_ref().ok().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_time_to_expiry_whole_days() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

        let t = time_to_expiry(now + Duration::days(73), now);
        assert!((t - 0.2).abs() < 1e-12);

        // Partial days truncate
        let t = time_to_expiry(now + Duration::hours(20), now);
        assert_eq!(t, 0.0);

        let t = time_to_expiry(now - Duration::days(3), now);
        assert!(t < 0.0);
    }

    #[test]
    fn test_year_fraction_keeps_partial_days() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 18, 0, 0).unwrap();
        let settle = Utc.with_ymd_and_hms(2024, 1, 11, 21, 0, 0).unwrap();

        let t = year_fraction(settle, now);
        assert!((t - 27.0 / 24.0 / 365.0).abs() < 1e-12);
        assert_eq!(ExpiryBasis::ContractExpiry.time_to_expiry(settle, now), t);
        assert_eq!(ExpiryBasis::LastTrade.time_to_expiry(settle, now), 1.0 / 365.0);
    }

    #[test]
    fn test_expiry_instant_new_york_settlement() {
        // EST in January, EDT after the March switch
        let winter = NaiveDate::from_ymd_opt(2024, 1, 19).unwrap();
        assert_eq!(
            expiry_instant(winter),
            Some(Utc.with_ymd_and_hms(2024, 1, 19, 21, 0, 0).unwrap())
        );

        let summer = NaiveDate::from_ymd_opt(2024, 7, 19).unwrap();
        assert_eq!(
            expiry_instant(summer),
            Some(Utc.with_ymd_and_hms(2024, 7, 19, 20, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_reference_time() {
        let expiry = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let chain = CallChain::new("SPY", expiry);
        let traded = Utc.with_ymd_and_hms(2024, 3, 1, 15, 30, 0).unwrap();
        let quote = CallQuote {
            contract_symbol: None,
            strike: 500.0,
            last_price: Some(4.2),
            last_trade: Some(traded),
        };

        assert_eq!(
            chain.reference_time(&quote, ExpiryBasis::ContractExpiry),
            Some(Utc.with_ymd_and_hms(2024, 3, 15, 20, 0, 0).unwrap())
        );
        assert_eq!(chain.reference_time(&quote, ExpiryBasis::LastTrade), Some(traded));
        assert_eq!(quote.row_id(7), "row 7");
    }
}
