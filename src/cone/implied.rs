//! Volatility cone against live implied volatility
//!
//! The index's rolling volatility for every window is aligned on common
//! dates and summarized by its 10/50/90 quantiles. Calls from the next
//! listed expiry are solved for Black-Scholes implied volatility, one row at
//! a time; a row that fails is logged and left out of the implied quantiles.

use chrono::{DateTime, NaiveDate, Utc};

use super::{fetch_history, first_after};
use crate::config::ConeConfig;
use crate::core::{
    CallChain, CallQuote, ConeError, ConeResult, ExpiryBasis, IvError,
    OptionType, PriceField, PricedCall,
};
use crate::data::MarketDataProvider;
use crate::models::black_scholes;
use crate::stats::{rolling_volatilities, AlignedVolTable, QuantileBand};

/// 10/50/90 band for one window
#[derive(Debug, Clone, Copy)]
pub struct WindowBand {
    pub window: usize,
    pub band: QuantileBand,
}

/// A call that passed the live filter, with its year fraction to expiry
#[derive(Debug, Clone, Copy)]
pub struct LiveCall<'a> {
    /// Position in the provider's chain
    pub row: usize,
    pub quote: &'a CallQuote,
    pub time_to_expiry: f64,
}

/// Result of the implied volatility pipeline
#[derive(Debug, Clone)]
pub struct ImpliedConeReport {
    pub index_symbol: String,
    pub underlying_symbol: String,
    /// Rolling index volatility, all windows on common dates
    pub table: AlignedVolTable,
    /// Per-window quantiles of `table`
    pub bands: Vec<WindowBand>,
    /// Expiry whose calls were solved
    pub expiry: NaiveDate,
    /// Underlying price used by the solver
    pub spot: f64,
    /// Every live call with its solve result
    pub calls: Vec<PricedCall>,
    /// Quantiles of the successfully solved implied vols
    pub implied_band: Option<QuantileBand>,
}

impl ImpliedConeReport {
    /// Rows whose implied volatility is undefined
    pub fn missing_count(&self) -> usize {
        self.calls.iter().filter(|c| c.implied_vol.is_err()).count()
    }

    /// Successfully solved implied vols
    pub fn implied_vols(&self) -> Vec<f64> {
        self.calls.iter().filter_map(PricedCall::iv).collect()
    }

    /// Per-window quantile listing
    pub fn format_bands(&self) -> String {
        self.bands
            .iter()
            .map(|b| format!("{:>4}-Day  {}\n", b.window, b.band))
            .collect()
    }

    /// First `n` live calls: last trade, last price, strike
    pub fn format_calls_head(&self, n: usize) -> String {
        let mut out = format!(
            "{:<22} {:<25} {:>10} {:>10}\n",
            "Contract", "Last Trade", "Last", "Strike"
        );
        for (i, call) in self.calls.iter().enumerate().take(n) {
            let q = &call.quote;
            out.push_str(&format!(
                "{:<22} {:<25} {:>10} {:>10.2}\n",
                q.row_id(i),
                q.last_trade
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                    .unwrap_or_else(|| "-".into()),
                q.last_price
                    .map(|p| format!("{:.2}", p))
                    .unwrap_or_else(|| "-".into()),
                q.strike
            ));
        }
        out
    }
}

/// Next expiration strictly after today, if any
pub fn next_future_expiry(expirations: &[NaiveDate], now: DateTime<Utc>) -> Option<NaiveDate> {
    first_after(expirations, now.date_naive())
}

/// Calls with strictly positive time to expiry under `basis`.
///
/// Rows with no timestamp for the basis (e.g. never traded) are dropped,
/// as are rows whose year fraction rounds to zero.
pub fn filter_live_calls(
    chain: &CallChain,
    now: DateTime<Utc>,
    basis: ExpiryBasis,
) -> Vec<LiveCall<'_>> {
    chain
        .calls
        .iter()
        .enumerate()
        .filter_map(|(row, quote)| {
            let reference = chain.reference_time(quote, basis)?;
            let time_to_expiry = basis.time_to_expiry(reference, now);
            (time_to_expiry > 0.0).then_some(LiveCall {
                row,
                quote,
                time_to_expiry,
            })
        })
        .collect()
}

/// Solve one call's implied volatility from its last traded price
pub fn solve_call(quote: &CallQuote, spot: f64, rate: f64, time: f64) -> Result<f64, IvError> {
    let price = quote
        .last_price
        .ok_or_else(|| IvError::invalid_input("no last traded price"))?;

    black_scholes::implied_volatility(price, spot, quote.strike, rate, time, OptionType::Call)
}

/// Solve every live call independently; failures stay in their row
pub fn solve_live_calls(live: &[LiveCall<'_>], spot: f64, rate: f64) -> Vec<PricedCall> {
    live.iter()
        .map(|call| {
            let implied_vol = solve_call(call.quote, spot, rate, call.time_to_expiry);

            if let Err(e) = &implied_vol {
                tracing::warn!(
                    row = %call.quote.row_id(call.row),
                    strike = call.quote.strike,
                    "Error calculating IV: {}",
                    e
                );
            }

            PricedCall {
                quote: call.quote.clone(),
                time_to_expiry: call.time_to_expiry,
                implied_vol,
            }
        })
        .collect()
}

/// Fetch index history and the next call chain, then compute the cone
pub fn build_implied_cone<P: MarketDataProvider + ?Sized>(
    provider: &P,
    config: &ConeConfig,
    now: DateTime<Utc>,
) -> ConeResult<ImpliedConeReport> {
    config.validate()?;

    // Historical cone
    let index = fetch_history(provider, config, &config.index_symbol, PriceField::Close)?;
    let rolling = rolling_volatilities(&index.observations, &config.windows)?;
    let table = AlignedVolTable::align(&rolling);

    let bands = table
        .windows
        .iter()
        .map(|&window| {
            table
                .column(window)
                .and_then(|values| QuantileBand::from_values(&values))
                .map(|band| WindowBand { window, band })
                .ok_or_else(|| {
                    ConeError::data(format!(
                        "{}: {} observations cannot fill a {}-day window",
                        index.symbol,
                        index.len(),
                        window
                    ))
                })
        })
        .collect::<ConeResult<Vec<_>>>()?;
    tracing::info!(rows = table.n_rows(), "Rolling volatility table complete");

    // Live options
    let symbol = config.underlying_symbol.as_str();
    let expirations = provider.expirations(symbol)?;
    let expiry = next_future_expiry(&expirations, now)
        .ok_or_else(|| ConeError::NoExpirations(symbol.to_string()))?;
    tracing::info!(symbol, %expiry, "Using option expiration");

    let chain = provider.call_chain(symbol, expiry)?;
    let spot = provider.spot(symbol)?;
    tracing::info!(symbol, spot, calls = chain.calls.len(), "Fetched call chain");

    let live = filter_live_calls(&chain, now, config.expiry_basis);
    tracing::info!(
        live = live.len(),
        dropped = chain.calls.len() - live.len(),
        basis = ?config.expiry_basis,
        "Filtered out expired contracts"
    );

    let calls = solve_live_calls(&live, spot, config.risk_free_rate);
    let solved: Vec<f64> = calls.iter().filter_map(PricedCall::iv).collect();
    let implied_band = QuantileBand::from_values(&solved);

    tracing::info!(
        solved = solved.len(),
        missing = calls.len() - solved.len(),
        "Implied volatility complete"
    );

    Ok(ImpliedConeReport {
        index_symbol: index.symbol,
        underlying_symbol: symbol.to_string(),
        table,
        bands,
        expiry,
        spot,
        calls,
        implied_band,
    })
}
