//! Period aggregation into the attendance and "other" deduction buckets.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::config::CompiledRules;
use crate::error::ValidationError;
use crate::models::{
    AttendanceDayRecord, DailyDeductionOverride, DeductionBucket, DeductionItem, OtherDeductionEntry,
    ReportingPeriod,
};
use crate::rules::{apply_override, daily_deduction};

/// Builds the attendance bucket for a period.
///
/// Each recorded day is evaluated against the rule table unless an
/// override exists for its date.  Only days with a positive deduction
/// become items; item order follows `days`.
pub fn aggregate_attendance(
    period: &ReportingPeriod,
    days: &[AttendanceDayRecord],
    overrides: &[DailyDeductionOverride],
    per_day_allowance: Decimal,
    rules: &CompiledRules,
    scale: u32,
) -> Result<DeductionBucket, ValidationError> {
    let mut by_date = HashMap::with_capacity(overrides.len());
    for ov in overrides {
        if !period.contains(ov.date) {
            return Err(ValidationError::DateOutsidePeriod {
                date: ov.date,
                period: *period,
            });
        }
        if by_date.insert(ov.date, ov).is_some() {
            return Err(ValidationError::DuplicateOverride { date: ov.date });
        }
    }
    if let Some(orphan) = overrides
        .iter()
        .find(|ov| !days.iter().any(|d| d.date == ov.date))
    {
        return Err(ValidationError::OverrideWithoutRecord { date: orphan.date });
    }

    let mut items = Vec::new();
    for day in days {
        let deduction = match by_date.get(&day.date) {
            Some(ov) => apply_override(ov)?,
            None => daily_deduction(day, per_day_allowance, rules, scale)?,
        };
        if deduction.amount > Decimal::ZERO {
            items.push(DeductionItem {
                date: Some(day.date),
                amount: deduction.amount,
                percentage_of_base: deduction.percentage,
                reason: deduction.reason,
            });
        }
    }
    DeductionBucket::from_items(items)
}

/// Builds the "other" bucket straight from manually entered entries.
pub fn aggregate_other(
    entries: &[OtherDeductionEntry],
    base_allowance: Decimal,
) -> Result<DeductionBucket, ValidationError> {
    let items = entries
        .iter()
        .map(|entry| {
            let share = if base_allowance > Decimal::ZERO {
                entry
                    .amount
                    .checked_mul(Decimal::ONE_HUNDRED)
                    .and_then(|v| v.checked_div(base_allowance))
                    .ok_or(ValidationError::AmountOverflow {
                        context: "other deduction share",
                    })?
                    .round_dp(2)
                    .min(Decimal::ONE_HUNDRED)
            } else {
                Decimal::ZERO
            };
            Ok(DeductionItem {
                date: None,
                amount: entry.amount,
                percentage_of_base: share,
                reason: entry.reason.clone(),
            })
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;
    DeductionBucket::from_items(items)
}
