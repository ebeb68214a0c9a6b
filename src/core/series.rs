//! Daily price and return series
//!
//! Series are ordered by date and may contain gaps; nothing here fills them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which close to take from a provider bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceField {
    /// Raw close
    Close,
    /// Split/dividend adjusted close
    AdjClose,
}

/// A single dated value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Date-indexed close prices for one symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    /// Ticker symbol (e.g. "^VIX", "SPY")
    pub symbol: String,
    /// Field the closes were taken from
    pub field: PriceField,
    /// Observations in ascending date order
    pub observations: Vec<Observation>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, field: PriceField) -> Self {
        Self {
            symbol: symbol.into(),
            field,
            observations: Vec::new(),
        }
    }

    /// Build from (date, close) pairs, sorting by date and keeping the last
    /// value on duplicate dates.
    pub fn from_pairs(
        symbol: impl Into<String>,
        field: PriceField,
        pairs: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Self {
        let mut series = Self::new(symbol, field);
        for (date, value) in pairs {
            series.push(date, value);
        }
        series
    }

    /// Insert an observation, keeping date order
    pub fn push(&mut self, date: NaiveDate, value: f64) {
        match self.observations.binary_search_by_key(&date, |o| o.date) {
            Ok(idx) => self.observations[idx].value = value,
            Err(idx) => self.observations.insert(idx, Observation::new(date, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|o| o.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    /// Day-over-day percentage changes.
    ///
    /// The first observation has no predecessor and is dropped, so the result
    /// holds `len() - 1` entries dated at the later day of each pair.
    pub fn pct_change(&self) -> Vec<Observation> {
        self.observations
            .windows(2)
            .map(|pair| Observation::new(pair[1].date, pair[1].value / pair[0].value - 1.0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_push_keeps_order() {
        let mut series = PriceSeries::new("SPY", PriceField::Close);
        series.push(day(3), 3.0);
        series.push(day(1), 1.0);
        series.push(day(2), 2.0);
        series.push(day(2), 2.5);

        assert_eq!(series.dates(), vec![day(1), day(2), day(3)]);
        assert_eq!(series.values(), vec![1.0, 2.5, 3.0]);
    }

    #[test]
    fn test_pct_change() {
        let series = PriceSeries::from_pairs(
            "SPY",
            PriceField::AdjClose,
            vec![(day(1), 100.0), (day(2), 110.0), (day(3), 99.0)],
        );
        let returns = series.pct_change();

        assert_eq!(returns.len(), 2);
        assert_eq!(returns[0].date, day(2));
        assert!((returns[0].value - 0.10).abs() < 1e-12);
        assert!((returns[1].value + 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_pct_change_short_series() {
        let series = PriceSeries::from_pairs("SPY", PriceField::Close, vec![(day(1), 100.0)]);
        assert!(series.pct_change().is_empty());
        assert!(PriceSeries::new("SPY", PriceField::Close).pct_change().is_empty());
    }
}
