//! Folding employee summaries into period totals.

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::models::{EmployeeTukinSummary, ReportTotals, TukinReport};

fn add(acc: Decimal, value: Decimal) -> Result<Decimal, ValidationError> {
    acc.checked_add(value).ok_or(ValidationError::AmountOverflow {
        context: "report totals",
    })
}

impl ReportTotals {
    /// Returns these totals with one more summary added.  The totals
    /// are left untouched when any column would overflow.
    pub fn try_add(&self, s: &EmployeeTukinSummary) -> Result<ReportTotals, ValidationError> {
        Ok(ReportTotals {
            employee_count: self.employee_count + 1,
            total_base_allowance: add(self.total_base_allowance, s.base_allowance)?,
            total_attendance_deduction_raw: add(
                self.total_attendance_deduction_raw,
                s.attendance_deduction.raw_total,
            )?,
            total_attendance_deduction: add(
                self.total_attendance_deduction,
                s.attendance_deduction.capped_total,
            )?,
            total_other_deduction_raw: add(self.total_other_deduction_raw, s.other_deduction.raw_total)?,
            total_other_deduction: add(self.total_other_deduction, s.other_deduction.capped_total)?,
            total_deduction: add(self.total_deduction, s.total_deduction.capped_total)?,
            total_net_allowance: add(self.total_net_allowance, s.net_allowance)?,
            attendance_capped_count: self.attendance_capped_count + usize::from(s.is_attendance_capped),
            other_capped_count: self.other_capped_count + usize::from(s.is_other_deductions_capped),
            total_capped_count: self.total_capped_count + usize::from(s.is_total_capped),
        })
    }
}

/// Sums summaries into totals.  No per-employee value is recomputed;
/// an empty input yields all-zero totals.
pub fn fold<'a, I>(summaries: I) -> Result<ReportTotals, ValidationError>
where
    I: IntoIterator<Item = &'a EmployeeTukinSummary>,
{
    summaries
        .into_iter()
        .try_fold(ReportTotals::default(), |totals, s| totals.try_add(s))
}

impl TukinReport {
    /// Totals over the summaries matching `predicate`, e.g. one unit.
    pub fn totals_matching<P>(&self, predicate: P) -> Result<ReportTotals, ValidationError>
    where
        P: Fn(&EmployeeTukinSummary) -> bool,
    {
        fold(self.summaries.iter().filter(|s| predicate(s)))
    }
}
