//! Rolling-window volatility
//!
//! Every window is computed on its own from the raw observations: a sample
//! standard deviation over exactly the trailing `window` values, scaled by
//! sqrt(252). Positions with insufficient history are never emitted.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::core::{ConeError, ConeResult, Observation};

/// Trading days per year used for annualization
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// sqrt(252)
pub fn annualization_factor() -> f64 {
    TRADING_DAYS_PER_YEAR.sqrt()
}

/// Sample standard deviation (n - 1 divisor). `None` for fewer than 2 values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let sumsq_dev = values
        .iter()
        .map(|v| {
            let dev = v - mean;
            dev * dev
        })
        .sum::<f64>();

    Some((sumsq_dev / (n - 1) as f64).sqrt())
}

/// Arithmetic mean, `None` when empty
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Rolling sample standard deviation (not annualized).
///
/// Entry `i` covers `values[i..i + window]`, so the output has
/// `values.len() - window + 1` entries, or none when the input is shorter
/// than the window.
pub fn rolling_std(values: &[f64], window: usize) -> ConeResult<Vec<f64>> {
    if window < 2 {
        return Err(ConeError::invalid_input(format!(
            "rolling window must be at least 2, got {}",
            window
        )));
    }

    Ok(values
        .windows(window)
        .filter_map(sample_std)
        .collect())
}

/// Annualized rolling volatility for one window length
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingVolatility {
    /// Window length in observations
    pub window: usize,
    /// Values dated at the last observation of each window
    pub points: Vec<Observation>,
}

impl RollingVolatility {
    /// Annualized rolling standard deviation of `observations`
    pub fn compute(observations: &[Observation], window: usize) -> ConeResult<Self> {
        let values: Vec<f64> = observations.iter().map(|o| o.value).collect();
        let factor = annualization_factor();

        let points = rolling_std(&values, window)?
            .into_iter()
            .zip(observations.iter().skip(window - 1))
            .map(|(std, obs)| Observation::new(obs.date, std * factor))
            .collect();

        Ok(Self { window, points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Mean over the whole rolling series
    pub fn mean(&self) -> Option<f64> {
        mean(&self.values())
    }

    /// Column label, e.g. "21-Day"
    pub fn label(&self) -> String {
        format!("{}-Day", self.window)
    }
}

/// One rolling series per window, each computed independently
pub fn rolling_volatilities(
    observations: &[Observation],
    windows: &[usize],
) -> ConeResult<Vec<RollingVolatility>> {
    windows
        .iter()
        .map(|&window| RollingVolatility::compute(observations, window))
        .collect()
}

/// Several rolling series joined on the dates they all share
#[derive(Debug, Clone)]
pub struct AlignedVolTable {
    /// Window length per column
    pub windows: Vec<usize>,
    /// Row dates, ascending
    pub dates: Vec<NaiveDate>,
    /// [date, window] -> annualized volatility
    pub values: Array2<f64>,
}

impl AlignedVolTable {
    /// Intersection join: keep only dates defined in every series
    pub fn align(series: &[RollingVolatility]) -> Self {
        let windows: Vec<usize> = series.iter().map(|s| s.window).collect();

        let lookups: Vec<HashMap<NaiveDate, f64>> = series
            .iter()
            .map(|s| s.points.iter().map(|p| (p.date, p.value)).collect())
            .collect();

        let mut common: BTreeSet<NaiveDate> = match series.first() {
            Some(first) => first.dates().into_iter().collect(),
            None => BTreeSet::new(),
        };
        for lookup in &lookups[1.min(lookups.len())..] {
            common.retain(|d| lookup.contains_key(d));
        }

        let dates: Vec<NaiveDate> = common.into_iter().collect();
        let mut values = Array2::zeros((dates.len(), windows.len()));
        for (row, date) in dates.iter().enumerate() {
            for (col, lookup) in lookups.iter().enumerate() {
                values[[row, col]] = lookup[date];
            }
        }

        Self {
            windows,
            dates,
            values,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Values for one window across all aligned dates
    pub fn column(&self, window: usize) -> Option<Vec<f64>> {
        let col = self.windows.iter().position(|&w| w == window)?;
        Some(self.values.column(col).to_vec())
    }

    /// First `n` rows as a text table
    pub fn format_head(&self, n: usize) -> String {
        let mut out = format!("{:<12}", "Date");
        for w in &self.windows {
            out.push_str(&format!(" {:>10}", format!("{}-Day", w)));
        }
        out.push('\n');

        for (row, date) in self.dates.iter().enumerate().take(n) {
            out.push_str(&format!("{:<12}", date.format("%Y-%m-%d")));
            for col in 0..self.windows.len() {
                out.push_str(&format!(" {:>10.4}", self.values[[row, col]]));
            }
            out.push('\n');
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn dated(values: &[f64]) -> Vec<Observation> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Observation::new(start + Duration::days(i as i64), v))
            .collect()
    }

    #[test]
    fn test_sample_std() {
        // Sample std of 2, 4, 4, 4, 5, 5, 7, 9 is sqrt(32/7)
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let std = sample_std(&values).unwrap();
        assert!((std - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);

        assert!(sample_std(&[1.0]).is_none());
        assert!(sample_std(&[]).is_none());
    }

    #[test]
    fn test_constant_series_is_zero() {
        let prices = vec![42.0; 30];
        for window in [2, 5, 21, 30] {
            let vol = rolling_std(&prices, window).unwrap();
            assert_eq!(vol.len(), prices.len() - window + 1);
            assert!(vol.iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn test_defined_entry_count() {
        let values: Vec<f64> = (0..50).map(|i| (i as f64 * 0.7).sin()).collect();
        for window in [2, 3, 10, 49, 50] {
            let vol = RollingVolatility::compute(&dated(&values), window).unwrap();
            assert_eq!(vol.len(), values.len() - window + 1);
        }

        // Shorter than the window: nothing defined
        let vol = RollingVolatility::compute(&dated(&values[..5]), 6).unwrap();
        assert!(vol.is_empty());
    }

    #[test]
    fn test_rejects_short_window() {
        assert!(rolling_std(&[1.0, 2.0, 3.0], 1).is_err());
        assert!(rolling_std(&[1.0, 2.0, 3.0], 0).is_err());
    }

    #[test]
    fn test_zero_returns_annualize_to_zero() {
        let returns = dated(&[0.0; 10]);
        let vol = RollingVolatility::compute(&returns, 5).unwrap();
        assert!(vol.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_alternating_returns_closed_form() {
        // +x/-x with an even window: mean 0, sample variance x^2 * W / (W - 1)
        let x = 0.01;
        let returns: Vec<f64> = (0..12).map(|i| if i % 2 == 0 { x } else { -x }).collect();
        let window = 4;
        let vol = RollingVolatility::compute(&dated(&returns), window).unwrap();

        let expected = x * (window as f64 / (window as f64 - 1.0)).sqrt() * 252.0_f64.sqrt();
        assert_eq!(vol.len(), 9);
        for v in vol.values() {
            assert!((v - expected).abs() < 1e-12);
        }
        assert!((expected - 0.18330302779823363).abs() < 1e-12);
    }

    #[test]
    fn test_points_dated_at_window_end() {
        let obs = dated(&[1.0, 2.0, 4.0, 8.0]);
        let vol = RollingVolatility::compute(&obs, 3).unwrap();

        assert_eq!(vol.dates(), vec![obs[2].date, obs[3].date]);
        assert_eq!(vol.label(), "3-Day");
    }

    #[test]
    fn test_align_intersection() {
        let obs = dated(&[10.0, 12.0, 11.0, 13.0, 12.5, 14.0, 13.0]);
        let series = rolling_volatilities(&obs, &[2, 3, 5]).unwrap();
        let table = AlignedVolTable::align(&series);

        // Only dates where the 5-day window is defined survive
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.dates, series[2].dates());
        assert_eq!(table.windows, vec![2, 3, 5]);

        let col2 = table.column(2).unwrap();
        assert_eq!(col2, series[0].values()[3..].to_vec());
        assert_eq!(table.column(5).unwrap(), series[2].values());
        assert!(table.column(7).is_none());
    }

    #[test]
    fn test_align_disjoint_dates() {
        let a = RollingVolatility {
            window: 2,
            points: dated(&[1.0, 2.0]),
        };
        let mut b = a.clone();
        b.window = 3;
        for p in &mut b.points {
            p.date += Duration::days(10);
        }

        let table = AlignedVolTable::align(&[a, b]);
        assert!(table.is_empty());
        assert_eq!(table.values.dim(), (0, 2));
    }

    #[test]
    fn test_format_head() {
        let obs = dated(&[10.0, 12.0, 11.0, 13.0, 12.5, 14.0, 13.0]);
        let series = rolling_volatilities(&obs, &[2, 3]).unwrap();
        let table = AlignedVolTable::align(&series);

        let text = table.format_head(2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("2-Day") && lines[0].contains("3-Day"));
        assert!(lines[1].starts_with("2024-01-03"));
    }
}
