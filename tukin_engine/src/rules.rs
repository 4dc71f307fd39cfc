//! Per-day deduction rules.
//!
//! A day's deduction is a percentage of the employee's per-day share of
//! the monthly base allowance.  The percentage and reason come from the
//! configured rule table; an upstream override replaces both.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::CompiledRules;
use crate::error::ValidationError;
use crate::models::{AttendanceDayRecord, AttendanceStatus, DailyDeductionOverride, DayStatus};

/// The deduction computed for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyDeduction {
    pub amount: Decimal,
    pub percentage: Decimal,
    pub reason: String,
}

/// Splits the monthly base evenly across the days of the period.
pub fn per_day_allowance(base_allowance: Decimal, total_days: u32) -> Result<Decimal, ValidationError> {
    if total_days == 0 {
        return Err(ValidationError::NonPositiveTotalDays);
    }
    base_allowance
        .checked_div(Decimal::from(total_days))
        .ok_or(ValidationError::AmountOverflow {
            context: "per-day allowance",
        })
}

/// Looks up the rule for `day` and applies it to `per_day_allowance`.
///
/// The amount is rounded to `scale` decimal places, midpoint away from
/// zero, with trailing zeros stripped.  A late day with zero recorded
/// minutes counts as present.
pub fn daily_deduction(
    day: &AttendanceDayRecord,
    per_day_allowance: Decimal,
    rules: &CompiledRules,
    scale: u32,
) -> Result<DailyDeduction, ValidationError> {
    let status = match day.status {
        DayStatus::Late { late_minutes: 0 } => AttendanceStatus::Present,
        other => other.kind(),
    };
    let rule = rules.entry(status);
    let amount = per_day_allowance
        .checked_mul(rule.percentage)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(ValidationError::AmountOverflow {
            context: "daily deduction",
        })?
        .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    Ok(DailyDeduction {
        amount,
        percentage: rule.percentage,
        reason: rule.render_reason(day.status.late_minutes()),
    })
}

/// Validates an upstream override and passes it through verbatim.
pub fn apply_override(ov: &DailyDeductionOverride) -> Result<DailyDeduction, ValidationError> {
    if ov.amount < Decimal::ZERO {
        return Err(ValidationError::NegativeAmount {
            amount: ov.amount,
            reason: ov.reason.clone(),
        });
    }
    if ov.percentage < Decimal::ZERO || ov.percentage > Decimal::ONE_HUNDRED {
        return Err(ValidationError::PercentageOutOfRange {
            percentage: ov.percentage,
            reason: ov.reason.clone(),
        });
    }
    Ok(DailyDeduction {
        amount: ov.amount,
        percentage: ov.percentage,
        reason: ov.reason.clone(),
    })
}
