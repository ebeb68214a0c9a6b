//! Cone summaries over an entire rolling series
//!
//! Quantiles use linear interpolation between the two nearest ranks, with
//! position `q * (n - 1)` in the sorted values. Non-finite values are ignored.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::rolling::mean;

/// Finite values in ascending order
fn clean_sorted(values: &[f64]) -> Vec<f64> {
    let mut clean: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    clean.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    clean
}

/// Linearly interpolated quantile of already sorted values
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let idx = pos.floor() as usize;
    let frac = pos - idx as f64;

    if idx + 1 >= sorted.len() {
        Some(sorted[idx])
    } else {
        let lower = sorted[idx];
        let upper = sorted[idx + 1];
        Some(lower + (upper - lower) * frac)
    }
}

/// Linearly interpolated quantile of unsorted values
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    quantile_sorted(&clean_sorted(values), q)
}

/// {min, 25th, mean, 75th, max} of a rolling series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiveNumberSummary {
    pub min: f64,
    pub q25: f64,
    pub mean: f64,
    pub q75: f64,
    pub max: f64,
}

impl FiveNumberSummary {
    pub const LABELS: [&'static str; 5] =
        ["Max", "75th Percentile", "Mean", "25th Percentile", "Min"];

    pub fn from_values(values: &[f64]) -> Option<Self> {
        let sorted = clean_sorted(values);
        Some(Self {
            min: *sorted.first()?,
            q25: quantile_sorted(&sorted, 0.25)?,
            mean: mean(&sorted)?,
            q75: quantile_sorted(&sorted, 0.75)?,
            max: *sorted.last()?,
        })
    }

    /// Values in `LABELS` order
    pub fn as_array(&self) -> [f64; 5] {
        [self.max, self.q75, self.mean, self.q25, self.min]
    }
}

/// {10th, 50th, 90th} percentiles of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantileBand {
    pub q10: f64,
    pub q50: f64,
    pub q90: f64,
}

impl QuantileBand {
    pub const LEVELS: [f64; 3] = [0.1, 0.5, 0.9];

    pub fn from_values(values: &[f64]) -> Option<Self> {
        let sorted = clean_sorted(values);
        let [q10, q50, q90] = Self::LEVELS.map(|q| quantile_sorted(&sorted, q));
        Some(Self {
            q10: q10?,
            q50: q50?,
            q90: q90?,
        })
    }

    /// Values in `LEVELS` order
    pub fn as_array(&self) -> [f64; 3] {
        [self.q10, self.q50, self.q90]
    }
}

impl fmt::Display for QuantileBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "10%: {:.4}  50%: {:.4}  90%: {:.4}",
            self.q10, self.q50, self.q90
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_linear() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(quantile(&values, 0.0), Some(1.0));
        assert_eq!(quantile(&values, 1.0), Some(4.0));
        assert_eq!(quantile(&values, 0.5), Some(2.5));
        // pos = 0.25 * 3 = 0.75
        assert!((quantile(&values, 0.25).unwrap() - 1.75).abs() < 1e-12);
        // pos = 0.9 * 3 = 2.7
        assert!((quantile(&values, 0.9).unwrap() - 3.7).abs() < 1e-12);

        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[7.0], 0.1), Some(7.0));
    }

    #[test]
    fn test_quantile_ignores_nan() {
        let values = [f64::NAN, 2.0, 1.0, f64::INFINITY, 3.0];
        assert_eq!(quantile(&values, 0.5), Some(2.0));
        assert_eq!(quantile(&[f64::NAN], 0.5), None);
    }

    #[test]
    fn test_five_number_summary() {
        let values: Vec<f64> = (1..=9).map(|i| i as f64).collect();
        let summary = FiveNumberSummary::from_values(&values).unwrap();

        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.q25, 3.0);
        assert_eq!(summary.mean, 5.0);
        assert_eq!(summary.q75, 7.0);
        assert_eq!(summary.max, 9.0);
        assert_eq!(summary.as_array(), [9.0, 7.0, 5.0, 3.0, 1.0]);

        assert!(FiveNumberSummary::from_values(&[]).is_none());
    }

    #[test]
    fn test_summary_ordering() {
        // Skewed, unsorted input
        let values: Vec<f64> = (0..200)
            .map(|i| ((i * 37) % 101) as f64 * 0.3 + if i % 17 == 0 { 40.0 } else { 0.0 })
            .collect();

        let s = FiveNumberSummary::from_values(&values).unwrap();
        assert!(s.min <= s.q25 && s.q25 <= s.q75 && s.q75 <= s.max);
        assert!(s.min <= s.mean && s.mean <= s.max);

        let band = QuantileBand::from_values(&values).unwrap();
        assert!(band.q10 <= band.q50 && band.q50 <= band.q90);
    }

    #[test]
    fn test_quantile_band() {
        let values: Vec<f64> = (0..=10).map(|i| i as f64).collect();
        let band = QuantileBand::from_values(&values).unwrap();

        assert!((band.q10 - 1.0).abs() < 1e-12);
        assert!((band.q50 - 5.0).abs() < 1e-12);
        assert!((band.q90 - 9.0).abs() < 1e-12);

        let skewed = [0.11, 0.35, 0.12, 0.9, 0.14, 0.13];
        let band = QuantileBand::from_values(&skewed).unwrap();
        for (value, level) in band.as_array().iter().zip(QuantileBand::LEVELS) {
            assert_eq!(Some(*value), quantile(&skewed, level));
        }

        let band = QuantileBand::from_values(&values).unwrap();
        assert!(band.to_string().starts_with("10%: 1.0000"));
        assert!(QuantileBand::from_values(&[]).is_none());
    }
}
