//! Core data types for volatility cones
//!
//! Defines fundamental types:
//! - PriceSeries: Date-indexed closes and derived returns
//! - OptionType: Call/put payoff helpers
//! - CallQuote / PricedCall: Live call rows and their implied vols
//! - ConeError / IvError: Fatal and row-local failures

pub mod error;
pub mod option;
pub mod quote;
pub mod series;

pub use error::*;
pub use option::*;
pub use quote::*;
pub use series::*;
