//! Error types for the Tukin Engine.
//!
//! Two families of failure exist.  A [`ValidationError`] describes
//! malformed input for a single employee and is always reported back
//! to the caller; a [`ConfigurationError`] describes a broken rule
//! table or cap setting and prevents the engine from being built at
//! all.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::ReportingPeriod;

/// Malformed or out-of-range input for one employee-period.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid reporting period {year}-{month:02}")]
    InvalidPeriod { year: i32, month: u32 },

    #[error("date {date} is outside reporting period {period}")]
    DateOutsidePeriod {
        date: NaiveDate,
        period: ReportingPeriod,
    },

    #[error("duplicate attendance record for {date}")]
    DuplicateDay { date: NaiveDate },

    #[error("total days in period must be positive")]
    NonPositiveTotalDays,

    #[error("base allowance must not be negative (got {amount})")]
    NegativeBaseAllowance { amount: Decimal },

    #[error("negative deduction amount {amount} ({reason})")]
    NegativeAmount { amount: Decimal, reason: String },

    #[error("deduction percentage {percentage} is outside 0-100 ({reason})")]
    PercentageOutOfRange { percentage: Decimal, reason: String },

    #[error("more than one deduction override for {date}")]
    DuplicateOverride { date: NaiveDate },

    #[error("deduction override for {date} has no attendance record")]
    OverrideWithoutRecord { date: NaiveDate },

    #[error("amount overflow while computing {context}")]
    AmountOverflow { context: &'static str },
}

/// Invalid engine configuration.  Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("rule table has no entry for status {0}")]
    MissingStatus(&'static str),

    #[error("rule percentage for {status} must be within 0-100 (got {percentage})")]
    RulePercentageOutOfRange {
        status: &'static str,
        percentage: Decimal,
    },

    #[error("cap percentage `{name}` must be within 0-100 (got {percentage})")]
    CapOutOfRange {
        name: &'static str,
        percentage: Decimal,
    },

    #[error("amount scale {0} exceeds the supported maximum of 10")]
    AmountScaleTooLarge(u32),

    #[error("failed to read rules file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse rules file: {0}")]
    Parse(#[from] serde_json::Error),
}
