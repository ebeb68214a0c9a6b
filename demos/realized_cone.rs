//! Example: Realized volatility cone from synthetic history
//!
//! Run with: cargo run --example realized_cone
//!
//! Drives the realized pipeline through a small in-memory provider, so no
//! network access is needed. Swap in `YahooClient::new()?` for live data.

use chrono::{Duration, NaiveDate};
use vol_cone::prelude::*;

/// Deterministic daily closes for an index and an underlying
struct SyntheticProvider;

impl SyntheticProvider {
    fn closes(symbol: &str, n: usize) -> Vec<f64> {
        let (base, amplitude, period) = match symbol {
            "^VIX" => (18.0, 5.0, 0.21), // Mean-reverting around 18
            _ => (450.0, 8.0, 0.05),     // Slow drift around 450
        };
        (0..n)
            .map(|i| {
                let x = i as f64;
                base + amplitude * (x * period).sin() + 0.6 * (x * 1.7).cos()
            })
            .collect()
    }
}

impl MarketDataProvider for SyntheticProvider {
    fn history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        field: PriceField,
    ) -> ConeResult<PriceSeries> {
        let days = (end - start).num_days().max(0) as usize;
        Ok(PriceSeries::from_pairs(
            symbol,
            field,
            Self::closes(symbol, days)
                .into_iter()
                .enumerate()
                .map(|(i, close)| (start + Duration::days(i as i64), close)),
        ))
    }

    fn spot(&self, symbol: &str) -> ConeResult<f64> {
        Err(ConeError::data(format!("no live quote for {}", symbol)))
    }

    fn expirations(&self, _symbol: &str) -> ConeResult<Vec<NaiveDate>> {
        Ok(Vec::new())
    }

    fn call_chain(&self, symbol: &str, expiry: NaiveDate) -> ConeResult<CallChain> {
        Err(ConeError::data(format!("no chain for {} {}", symbol, expiry)))
    }
}

fn main() -> ConeResult<()> {
    // Two years of calendar days is plenty for the longest window
    let mut config = ConeConfig::realized_vs_implied();
    config.start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default();
    config.end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    config.chart.output_path = "realized_cone_demo.svg".into();

    println!("=== Realized Volatility Cone ===\n");
    println!("Index:      {}", config.index_symbol);
    println!("Underlying: {}", config.underlying_symbol);
    println!("Windows:    {:?}\n", config.windows);

    let report = build_realized_cone(&SyntheticProvider, &config)?;
    println!("{}", report.format_table());

    // Interquartile range of the index cone per window
    let spreads: Vec<(usize, f64)> = report
        .cones
        .iter()
        .map(|c| (c.window, c.implied.q75 - c.implied.q25))
        .collect();
    for (window, iqr) in &spreads {
        println!("{:>4}-Day IQR: {:.4}", window, iqr);
    }

    save_realized_cone(&report, &config.chart)?;
    println!("\nChart written to {}", config.chart.output_path.display());
    Ok(())
}
