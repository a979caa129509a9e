//! Error type shared by every calculator

use thiserror::Error;

/// Errors produced by the calculators and loaders
#[derive(Debug, Error)]
pub enum CalcError {
    #[error("invalid input for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("series has no usable data points")]
    EmptySeries,

    #[error("cash flows need at least one inflow and one outflow")]
    NoSignChange,

    #[error("rate solver did not converge after {iterations} iterations (last rate {last_rate})")]
    NotConverged { iterations: u32, last_rate: f64 },

    #[error("no NAV available on or before {date}")]
    DateOutOfRange { date: chrono::NaiveDate },

    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CalcError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;
