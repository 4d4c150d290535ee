//! Error handling for payday
//!
//! Defines the user-facing error taxonomy and establishes a unified Result
//! type using anyhow for context chaining at the application edges.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that escape the dividend computation or its collaborators
#[derive(Error, Debug)]
pub enum PaydayError {
    /// The portfolio has no lots at all; the report does not run.
    #[error("no data: the portfolio is empty")]
    EmptyPortfolio,

    #[error("portfolio store {path:?} could not be read: {reason}")]
    Portfolio { path: PathBuf, reason: String },

    #[error("invalid lot: {0}")]
    InvalidLot(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for application operations
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting_is_readable() {
        let err = PaydayError::InvalidLot("quantity must be at least 1".to_string());
        assert_eq!(err.to_string(), "invalid lot: quantity must be at least 1");
    }

    #[test]
    fn test_empty_portfolio_mentions_no_data() {
        assert!(PaydayError::EmptyPortfolio.to_string().starts_with("no data"));
    }

    #[test]
    fn test_anyhow_context_chains_errors() {
        use anyhow::Context;
        let result: Result<()> = Err(PaydayError::Portfolio {
            path: PathBuf::from("lots.csv"),
            reason: "permission denied".to_string(),
        })
        .context("failed to load portfolio");

        let err = result.unwrap_err();
        assert!(err.to_string().contains("failed to load portfolio"));
        let debug_msg = format!("{:?}", err);
        assert!(debug_msg.contains("permission denied"));
    }
}
