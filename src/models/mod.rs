//! Option pricing models
//!
//! - Black-Scholes: Pricing and implied volatility solver

pub mod black_scholes;

pub use black_scholes::{implied_volatility, norm_cdf, norm_pdf, price, vega};
