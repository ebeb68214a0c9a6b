//! Error types for volatility cone pipelines

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConeError {
    #[error("Data error: {0}")]
    Data(String),

    #[error("Empty series: no observations returned for {0}")]
    EmptySeries(String),

    #[error("No future option expirations available for {0}")]
    NoExpirations(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}

pub type ConeResult<T> = Result<T, ConeError>;

impl ConeError {
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Why a single implied volatility solve produced no value.
///
/// Row-local: a failing row is recorded and skipped, never fatal to a batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IvError {
    /// Inputs for which no volatility can reproduce the price
    #[error("degenerate input: {0}")]
    InvalidInput(String),

    /// No volatility in the solver's search range reproduces the price.
    ///
    /// `iterations` is 0 when the bracket check rejects the price before
    /// bisection starts. That is the case seen in practice: a bracketed
    /// bisection narrows below tolerance long before the iteration cap.
    #[error("solver did not converge after {iterations} iterations")]
    NoConvergence { iterations: usize },
}

impl IvError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
