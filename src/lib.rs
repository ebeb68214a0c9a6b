//! # Vol Cone - Historical Volatility Cones
//!
//! Computes and charts volatility cones: how rolling historical volatility
//! of a volatility index (VIX) has been distributed across several horizons,
//! compared against realized volatility of an underlying (SPY) or against
//! the underlying's live option-implied volatility.
//!
//! ## Key Components
//!
//! - **Data Fetching**: Yahoo Finance daily history, spot and call chains
//! - **Rolling Statistics**: Annualized rolling standard deviation per window
//! - **Cone Summaries**: Five-number and 10/50/90 quantile summaries
//! - **Black-Scholes**: Implied volatility solver for live calls
//! - **Charts**: Static SVG output
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vol_cone::prelude::*;
//!
//! let client = YahooClient::new().unwrap();
//! let config = ConeConfig::realized_vs_implied();
//!
//! let report = build_realized_cone(&client, &config).unwrap();
//! println!("{}", report.format_table());
//! save_realized_cone(&report, &config.chart).unwrap();
//! ```
//!
//! ## What This Crate Does NOT Do
//!
//! - Cache or persist fetched data between runs
//! - Retry failed requests
//! - Forecast volatility or generate trading signals

pub mod chart;
pub mod cone;
pub mod config;
pub mod core;
pub mod data;
pub mod models;
pub mod stats;

/// Prelude with commonly used types
pub mod prelude {
    // Core types
    pub use crate::core::{
        CallChain, CallQuote, ConeError, ConeResult, ExpiryBasis, IvError, Observation,
        OptionType, PriceField, PriceSeries, PricedCall,
    };

    // Configuration
    pub use crate::config::{ChartConfig, ConeConfig};

    // Data fetching
    pub use crate::data::{MarketDataProvider, YahooClient};

    // Statistics
    pub use crate::stats::{
        rolling_std, rolling_volatilities, AlignedVolTable, FiveNumberSummary, QuantileBand,
        RollingVolatility,
    };

    // Black-Scholes
    pub use crate::models::{implied_volatility, price as bs_price};

    // Pipelines
    pub use crate::cone::{
        build_implied_cone, build_realized_cone, filter_live_calls, ImpliedConeReport,
        RealizedConeReport,
    };

    // Charts
    pub use crate::chart::{
        render_implied_cone, render_realized_cone, save_implied_cone, save_realized_cone,
    };
}

// Re-export main types at crate root
pub use crate::config::ConeConfig;
pub use crate::core::{ConeError, ConeResult};
