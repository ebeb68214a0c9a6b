//! Rolling volatility statistics
//!
//! - Rolling: Annualized rolling standard deviation and date alignment
//! - Summary: Five-number and 10/50/90 quantile summaries

pub mod rolling;
pub mod summary;

pub use rolling::*;
pub use summary::*;
