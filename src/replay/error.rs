use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Reasons a balance replay refuses to run.
#[derive(Debug, Clone, PartialEq, Error)]
pub(crate) enum ReplayError {
    #[error("No exchange rate for {currency} (needed by account '{account}')")]
    MissingRate { account: String, currency: String },
    #[error("Exchange rate for {currency} must be positive, got {rate}")]
    InvalidRate { currency: String, rate: Decimal },
    #[error("Invalid range: first day {first} is after last day {last}")]
    InvalidRange { first: NaiveDate, last: NaiveDate },
    #[error("Amount out of range while computing {what}")]
    Overflow { what: &'static str },
}
