//! Capping of deduction buckets against percentage ceilings of the base.

use rust_decimal::Decimal;

use crate::config::CapConfig;
use crate::error::ValidationError;
use crate::models::{CappedDeduction, DeductionBucket};

/// The three capped results for one employee-period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CappedTotals {
    pub attendance: CappedDeduction,
    pub other: CappedDeduction,
    pub total: CappedDeduction,
}

/// Caps `raw_total` at `cap_percent` of `base_allowance`.
///
/// Equality with the ceiling is not flagged as capped.
pub fn cap(
    raw_total: Decimal,
    base_allowance: Decimal,
    cap_percent: Decimal,
) -> Result<CappedDeduction, ValidationError> {
    if raw_total < Decimal::ZERO {
        return Err(ValidationError::NegativeAmount {
            amount: raw_total,
            reason: "deduction total".to_string(),
        });
    }
    if base_allowance < Decimal::ZERO {
        return Err(ValidationError::NegativeBaseAllowance {
            amount: base_allowance,
        });
    }
    let ceiling = base_allowance
        .checked_mul(cap_percent)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(ValidationError::AmountOverflow {
            context: "deduction ceiling",
        })?;
    Ok(CappedDeduction {
        raw_total,
        capped_total: raw_total.min(ceiling),
        cap_percent,
        was_capped: raw_total > ceiling,
    })
}

/// Caps each bucket, then caps the sum of the two capped totals.
pub fn cap_all(
    attendance: &DeductionBucket,
    other: &DeductionBucket,
    base_allowance: Decimal,
    caps: &CapConfig,
) -> Result<CappedTotals, ValidationError> {
    let attendance = cap(attendance.raw_total(), base_allowance, caps.attendance_percent)?;
    let other = cap(other.raw_total(), base_allowance, caps.other_percent)?;
    let combined = attendance
        .capped_total
        .checked_add(other.capped_total)
        .ok_or(ValidationError::AmountOverflow {
            context: "combined deduction",
        })?;
    let total = cap(combined, base_allowance, caps.total_percent)?;
    Ok(CappedTotals {
        attendance,
        other,
        total,
    })
}
