//! Yahoo Finance data fetcher
//!
//! Daily history for the volatility index and the underlying, plus the
//! underlying's spot price and call chains. Uses Yahoo Finance's unofficial
//! API.
//!
//! Note: This is for educational/research purposes. Yahoo Finance
//! data is delayed ~15 minutes and intended for personal use.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

use super::MarketDataProvider;
use crate::core::{CallChain, CallQuote, ConeError, ConeResult, PriceField, PriceSeries};

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

/// Yahoo Finance API client
pub struct YahooClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new() -> ConeResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Client against a different host (mirrors, local stubs)
    pub fn with_base_url(base_url: impl Into<String>) -> ConeResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| ConeError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn get_text(&self, url: &str) -> ConeResult<String> {
        tracing::debug!(url, "GET");
        self.client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| ConeError::network(e.to_string()))?
            .text()
            .map_err(|e| ConeError::network(e.to_string()))
    }

    /// Daily closes in `[start, end)`
    pub fn get_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        field: PriceField,
    ) -> ConeResult<PriceSeries> {
        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&includeAdjustedClose=true",
            self.base_url,
            symbol,
            midnight_ts(start),
            midnight_ts(end)
        );

        let body = self.get_text(&url)?;
        let series = parse_chart(&body, symbol, field)?;

        tracing::info!(
            symbol,
            observations = series.len(),
            "Fetched daily history {} to {}",
            start,
            end
        );
        Ok(series)
    }

    /// Current price of a symbol
    pub fn get_spot(&self, symbol: &str) -> ConeResult<f64> {
        let url = format!(
            "{}/v8/finance/chart/{}?range=1d&interval=1d",
            self.base_url, symbol
        );

        let body = self.get_text(&url)?;
        parse_spot(&body, symbol)
    }

    /// Available option expiration dates
    pub fn get_expirations(&self, symbol: &str) -> ConeResult<Vec<NaiveDate>> {
        let url = format!("{}/v7/finance/options/{}", self.base_url, symbol);

        let body = self.get_text(&url)?;
        parse_expirations(&body)
    }

    /// Call side of the chain for a specific expiration
    pub fn get_call_chain(&self, symbol: &str, expiry: NaiveDate) -> ConeResult<CallChain> {
        let url = format!(
            "{}/v7/finance/options/{}?date={}",
            self.base_url,
            symbol,
            midnight_ts(expiry)
        );

        let body = self.get_text(&url)?;
        parse_call_chain(&body, symbol, expiry)
    }
}

impl MarketDataProvider for YahooClient {
    fn history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        field: PriceField,
    ) -> ConeResult<PriceSeries> {
        self.get_history(symbol, start, end, field)
    }

    fn spot(&self, symbol: &str) -> ConeResult<f64> {
        self.get_spot(symbol)
    }

    fn expirations(&self, symbol: &str) -> ConeResult<Vec<NaiveDate>> {
        self.get_expirations(symbol)
    }

    fn call_chain(&self, symbol: &str, expiry: NaiveDate) -> ConeResult<CallChain> {
        self.get_call_chain(symbol, expiry)
    }
}

/// Unix timestamp of a date at 00:00 UTC
fn midnight_ts(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

fn parse_json<'a, T: Deserialize<'a>>(body: &'a str, what: &str) -> ConeResult<T> {
    serde_json::from_str(body).map_err(|e| ConeError::data(format!("Failed to parse {}: {}", what, e)))
}

fn first_chart_result(body: &str) -> ConeResult<YahooChartResult> {
    let response: YahooChartResponse = parse_json(body, "chart")?;

    if let Some(err) = response.chart.error {
        return Err(ConeError::data(format!("{}: {}", err.code, err.description)));
    }

    response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ConeError::data("No chart data returned"))
}

/// Parse a chart response into a date-ordered close series.
///
/// Bars with a null close are skipped, not filled.
pub fn parse_chart(body: &str, symbol: &str, field: PriceField) -> ConeResult<PriceSeries> {
    let result = first_chart_result(body)?;
    let offset = Duration::seconds(result.meta.gmtoffset.unwrap_or(0));

    let closes = match field {
        PriceField::Close => result.indicators.quote.into_iter().next().map(|q| q.close),
        PriceField::AdjClose => result
            .indicators
            .adjclose
            .into_iter()
            .next()
            .map(|a| a.adjclose),
    };
    let closes = match closes {
        Some(c) => c,
        // No bars in range: the provider omits indicators entirely
        None if result.timestamp.is_empty() => Vec::new(),
        None => {
            return Err(ConeError::data(format!(
                "No {:?} values in chart for {}",
                field, symbol
            )))
        }
    };

    let mut series = PriceSeries::new(symbol, field);
    let mut skipped = 0usize;

    for (&ts, close) in result.timestamp.iter().zip(closes) {
        let date = DateTime::from_timestamp(ts, 0).map(|dt| (dt + offset).date_naive());
        match (date, close) {
            (Some(date), Some(close)) if close.is_finite() => series.push(date, close),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::warn!(symbol, skipped, "Skipped bars without a close");
    }

    Ok(series)
}

/// Parse the current price from a chart response
pub fn parse_spot(body: &str, symbol: &str) -> ConeResult<f64> {
    let result = first_chart_result(body)?;

    if let Some(price) = result.meta.regular_market_price {
        return Ok(price);
    }

    result
        .indicators
        .quote
        .into_iter()
        .next()
        .and_then(|q| q.close.into_iter().rev().flatten().next())
        .ok_or_else(|| ConeError::data(format!("No current price for {}", symbol)))
}

fn first_option_result(body: &str) -> ConeResult<YahooOptionChainData> {
    let response: YahooOptionsResponse = parse_json(body, "options")?;

    if let Some(err) = response.option_chain.error {
        return Err(ConeError::data(format!("{}: {}", err.code, err.description)));
    }

    response
        .option_chain
        .result
        .into_iter()
        .next()
        .ok_or_else(|| ConeError::data("No options data returned"))
}

/// Parse the list of expiration dates from an options response
pub fn parse_expirations(body: &str) -> ConeResult<Vec<NaiveDate>> {
    let chain = first_option_result(body)?;

    let mut expiries: Vec<NaiveDate> = chain
        .expiration_dates
        .iter()
        .filter_map(|&ts| DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()))
        .collect();
    expiries.sort();
    expiries.dedup();

    Ok(expiries)
}

/// Parse the call side of an options response
pub fn parse_call_chain(body: &str, symbol: &str, expiry: NaiveDate) -> ConeResult<CallChain> {
    let data = first_option_result(body)?;
    let mut chain = CallChain::new(symbol, expiry);

    if let Some(options) = data.options.into_iter().next() {
        for call in options.calls {
            if let Some(quote) = convert_call(call) {
                chain.calls.push(quote);
            }
        }
    }

    Ok(chain)
}

/// Convert Yahoo option data to our quote format
fn convert_call(data: YahooOptionData) -> Option<CallQuote> {
    let strike = data.strike?;

    Some(CallQuote {
        contract_symbol: data.contract_symbol,
        strike,
        last_price: data.last_price,
        last_trade: data
            .last_trade_date
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
    })
}

// Yahoo Finance API response structures

#[derive(Debug, Deserialize)]
struct YahooApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooChartResult>>,
    error: Option<YahooApiError>,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    meta: YahooChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooChartMeta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    gmtoffset: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooIndicators {
    #[serde(default)]
    quote: Vec<YahooQuoteIndicator>,
    #[serde(default)]
    adjclose: Vec<YahooAdjCloseIndicator>,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteIndicator {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct YahooAdjCloseIndicator {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct YahooOptionsResponse {
    #[serde(rename = "optionChain")]
    option_chain: YahooOptionChain,
}

#[derive(Debug, Deserialize)]
struct YahooOptionChain {
    #[serde(default)]
    result: Vec<YahooOptionChainData>,
    error: Option<YahooApiError>,
}

#[derive(Debug, Deserialize)]
struct YahooOptionChainData {
    #[serde(rename = "expirationDates", default)]
    expiration_dates: Vec<i64>,
    #[serde(default)]
    options: Vec<YahooOptions>,
}

#[derive(Debug, Deserialize)]
struct YahooOptions {
    #[serde(default)]
    calls: Vec<YahooOptionData>,
}

#[derive(Debug, Deserialize)]
struct YahooOptionData {
    #[serde(rename = "contractSymbol")]
    contract_symbol: Option<String>,
    strike: Option<f64>,
    #[serde(rename = "lastPrice")]
    last_price: Option<f64>,
    #[serde(rename = "lastTradeDate")]
    last_trade_date: Option<i64>,
}
