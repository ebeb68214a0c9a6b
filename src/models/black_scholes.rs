//! Black-Scholes Model
//!
//! Provides:
//! - European option pricing under a flat risk-free rate
//! - Implied volatility solver (Newton-Raphson with bisection fallback)
//!
//! Used to turn live call prices into implied volatilities that are
//! compared against the historical volatility cone.

use std::f64::consts::{PI, SQRT_2};
use statrs::function::erf::erfc;
use crate::core::{IvError, OptionType};

/// Convergence tolerance on price, shared by both root-finders
pub const IV_TOLERANCE: f64 = 1e-8;

/// Iteration cap per root-finder
pub const IV_MAX_ITER: usize = 100;

/// Bisection search range for volatility
const VOL_LOW: f64 = 0.001;
const VOL_HIGH: f64 = 5.0;

/// Standard normal CDF
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Standard normal PDF
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Black-Scholes d1 parameter
pub fn d1(spot: f64, strike: f64, rate: f64, vol: f64, time: f64) -> f64 {
    ((spot / strike).ln() + (rate + 0.5 * vol * vol) * time) / (vol * time.sqrt())
}

/// Black-Scholes d2 parameter
pub fn d2(spot: f64, strike: f64, rate: f64, vol: f64, time: f64) -> f64 {
    d1(spot, strike, rate, vol, time) - vol * time.sqrt()
}

/// Black-Scholes European option price
pub fn price(
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    time: f64,
    option_type: OptionType,
) -> f64 {
    if time <= 0.0 {
        return option_type.intrinsic(spot, strike);
    }

    let df = (-rate * time).exp();

    if vol <= 0.0 {
        // Zero vol = discounted intrinsic on the forward
        return option_type.intrinsic(spot, strike * df);
    }

    let d1 = d1(spot, strike, rate, vol, time);
    let d2 = d2(spot, strike, rate, vol, time);

    match option_type {
        OptionType::Call => spot * norm_cdf(d1) - strike * df * norm_cdf(d2),
        OptionType::Put => strike * df * norm_cdf(-d2) - spot * norm_cdf(-d1),
    }
}

/// Vega per unit of volatility
pub fn vega(spot: f64, strike: f64, rate: f64, vol: f64, time: f64) -> f64 {
    if time <= 0.0 || vol <= 0.0 {
        return 0.0;
    }
    spot * norm_pdf(d1(spot, strike, rate, vol, time)) * time.sqrt()
}

/// Implied volatility solver using Newton-Raphson with bisection fallback
///
/// Degenerate inputs (non-positive price, spot, strike or time, prices
/// outside the no-arbitrage bounds) are rejected with
/// [`IvError::InvalidInput`]. A price whose volatility lies outside
/// [0.001, 5.0] yields [`IvError::NoConvergence`] with zero iterations.
pub fn implied_volatility(
    market_price: f64,
    spot: f64,
    strike: f64,
    rate: f64,
    time: f64,
    option_type: OptionType,
) -> Result<f64, IvError> {
    // Sanity checks
    if !market_price.is_finite() || market_price <= 0.0 {
        return Err(IvError::invalid_input("non-positive option price"));
    }
    if !time.is_finite() || time <= 0.0 {
        return Err(IvError::invalid_input("non-positive time to expiry"));
    }
    if !(spot > 0.0 && strike > 0.0) {
        return Err(IvError::invalid_input("non-positive spot or strike"));
    }

    // No-arbitrage bounds
    let lower = price(spot, strike, rate, 0.0, time, option_type);
    if market_price < lower {
        return Err(IvError::invalid_input(format!(
            "price {:.4} below intrinsic value {:.4}",
            market_price, lower
        )));
    }
    let upper = option_type.upper_bound(spot, strike);
    if market_price >= upper {
        return Err(IvError::invalid_input(format!(
            "price {:.4} at or above upper bound {:.4}",
            market_price, upper
        )));
    }

    // Initial guess using Brenner-Subrahmanyam approximation
    let atm_approx = market_price / (0.4 * spot * time.sqrt());
    let mut vol = atm_approx.clamp(0.01, 3.0);

    for _ in 0..IV_MAX_ITER {
        let diff = price(spot, strike, rate, vol, time, option_type) - market_price;

        if diff.abs() < IV_TOLERANCE {
            return Ok(vol);
        }

        let vega = vega(spot, strike, rate, vol, time);
        if vega.abs() < 1e-12 {
            break; // Vega too small, switch to bisection
        }

        let new_vol = vol - diff / vega;
        if new_vol <= 0.0 || new_vol > VOL_HIGH {
            break; // Out of bounds, switch to bisection
        }

        vol = new_vol;
    }

    bisection_iv(market_price, spot, strike, rate, time, option_type)
}

/// Bisection method for IV (slower but more robust)
///
/// Halving [0.001, 5.0] reaches the tolerance width in about 30 steps, so
/// once the bracket check passes this returns a volatility. The trailing
/// error only guards the loop bound.
fn bisection_iv(
    market_price: f64,
    spot: f64,
    strike: f64,
    rate: f64,
    time: f64,
    option_type: OptionType,
) -> Result<f64, IvError> {
    let mut low = VOL_LOW;
    let mut high = VOL_HIGH;

    // Root must lie inside the search range
    let price_low = price(spot, strike, rate, low, time, option_type);
    let price_high = price(spot, strike, rate, high, time, option_type);
    if market_price < price_low - IV_TOLERANCE || market_price > price_high + IV_TOLERANCE {
        return Err(IvError::NoConvergence { iterations: 0 });
    }

    for _ in 0..IV_MAX_ITER {
        let mid = (low + high) / 2.0;
        let diff = price(spot, strike, rate, mid, time, option_type) - market_price;

        if diff.abs() < IV_TOLERANCE {
            return Ok(mid);
        }

        if diff > 0.0 {
            high = mid;
        } else {
            low = mid;
        }

        if (high - low) < IV_TOLERANCE {
            return Ok(mid);
        }
    }

    Err(IvError::NoConvergence { iterations: IV_MAX_ITER })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norm_cdf() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-10);
        assert!((norm_cdf(1.96) - 0.975).abs() < 0.001);
        assert!((norm_cdf(-1.96) - 0.025).abs() < 0.001);
    }

    #[test]
    fn test_bs_price() {
        // ATM call, 20% vol, 1 year, 5% rate: textbook value 10.4506
        let call_price = price(100.0, 100.0, 0.05, 0.20, 1.0, OptionType::Call);
        assert!((call_price - 10.4506).abs() < 1e-3);

        // Put-call parity
        let put_price = price(100.0, 100.0, 0.05, 0.20, 1.0, OptionType::Put);
        let parity = call_price - put_price - (100.0 - 100.0 * (-0.05_f64).exp());
        assert!(parity.abs() < 1e-10);
    }

    #[test]
    fn test_implied_vol_round_trip() {
        let cases = [
            (100.0, 100.0, 0.05, 0.25, 0.5),
            (470.0, 500.0, 0.05, 0.15, 30.0 / 365.0),
            (470.0, 420.0, 0.05, 0.40, 0.1),
            (100.0, 120.0, 0.01, 0.80, 2.0),
        ];

        for (spot, strike, rate, vol, time) in cases {
            let market_price = price(spot, strike, rate, vol, time, OptionType::Call);
            let iv = implied_volatility(market_price, spot, strike, rate, time, OptionType::Call)
                .unwrap();
            assert!((iv - vol).abs() < 1e-4, "K={} expected {} got {}", strike, vol, iv);
        }
    }

    #[test]
    fn test_iv_otm_put() {
        let market_price = price(100.0, 90.0, 0.05, 0.30, 0.25, OptionType::Put);
        let iv = implied_volatility(market_price, 100.0, 90.0, 0.05, 0.25, OptionType::Put).unwrap();

        assert!((iv - 0.30).abs() < 1e-4);
    }

    #[test]
    fn test_iv_invalid_inputs() {
        let call = OptionType::Call;

        assert!(matches!(
            implied_volatility(0.0, 100.0, 100.0, 0.05, 0.5, call),
            Err(IvError::InvalidInput(_))
        ));
        assert!(matches!(
            implied_volatility(5.0, 100.0, 100.0, 0.05, 0.0, call),
            Err(IvError::InvalidInput(_))
        ));
        assert!(matches!(
            implied_volatility(5.0, 100.0, 100.0, 0.05, -0.1, call),
            Err(IvError::InvalidInput(_))
        ));
        // Deep ITM call priced below intrinsic
        assert!(matches!(
            implied_volatility(10.0, 150.0, 100.0, 0.05, 0.5, call),
            Err(IvError::InvalidInput(_))
        ));
        // Call worth more than the underlying
        assert!(matches!(
            implied_volatility(101.0, 100.0, 100.0, 0.05, 0.5, call),
            Err(IvError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_iv_near_bracket_edges_converges() {
        // Just inside either end of the search range
        for vol in [0.0015, 4.9] {
            let market_price = price(100.0, 100.0, 0.0, vol, 1.0, OptionType::Call);
            let iv = implied_volatility(market_price, 100.0, 100.0, 0.0, 1.0, OptionType::Call);

            assert!((iv.unwrap() - vol).abs() < 1e-4, "vol {}", vol);
        }
    }

    #[test]
    fn test_iv_outside_search_range() {
        // Needs a volatility far above the bisection ceiling
        let market_price = price(100.0, 100.0, 0.0, 8.0, 1.0, OptionType::Call);
        let result = implied_volatility(market_price, 100.0, 100.0, 0.0, 1.0, OptionType::Call);

        assert_eq!(result, Err(IvError::NoConvergence { iterations: 0 }));
    }
}
