//! Data models for the Tukin Engine.
//!
//! The `models` module defines the serialisable structs and enums
//! flowing through the deduction pipeline: raw attendance rows as
//! upstream systems deliver them, the canonical per-day records the
//! calculator works on, deduction buckets before and after capping,
//! and the per-employee and per-period results.  JSON field names are
//! camelCase to match the report service that consumes them.

use std::fmt;

use chrono::{Datelike, Months, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ValidationError;

/// One calendar month, the unit over which deductions are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportingPeriod {
    /// Calendar year, e.g. `2024`.
    pub year: i32,
    /// Month number, 1 through 12.
    pub month: u32,
}

impl ReportingPeriod {
    /// Builds a period, rejecting month numbers outside 1–12.
    pub fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        let period = ReportingPeriod { year, month };
        period.first_day()?;
        Ok(period)
    }

    /// The first calendar day of the period.
    pub fn first_day(&self) -> Result<NaiveDate, ValidationError> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).ok_or(ValidationError::InvalidPeriod {
            year: self.year,
            month: self.month,
        })
    }

    /// The last calendar day of the period.
    pub fn last_day(&self) -> Result<NaiveDate, ValidationError> {
        self.first_day()?
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or(ValidationError::InvalidPeriod {
                year: self.year,
                month: self.month,
            })
    }

    /// Number of calendar days in the period.
    pub fn days(&self) -> Result<u32, ValidationError> {
        self.last_day().map(|d| d.day())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// The closed set of daily attendance statuses.  This is the key type
/// of the rule table; it carries no per-day data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Late,
    LateCompensatedOvertime,
    AbsentUnexcused,
    Sick,
    Leave,
    Holiday,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 7] = [
        AttendanceStatus::Present,
        AttendanceStatus::Late,
        AttendanceStatus::LateCompensatedOvertime,
        AttendanceStatus::AbsentUnexcused,
        AttendanceStatus::Sick,
        AttendanceStatus::Leave,
        AttendanceStatus::Holiday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "PRESENT",
            AttendanceStatus::Late => "LATE",
            AttendanceStatus::LateCompensatedOvertime => "LATE_COMPENSATED_OVERTIME",
            AttendanceStatus::AbsentUnexcused => "ABSENT_UNEXCUSED",
            AttendanceStatus::Sick => "SICK",
            AttendanceStatus::Leave => "LEAVE",
            AttendanceStatus::Holiday => "HOLIDAY",
        }
    }

    /// Whether the employee physically attended on a day with this status.
    pub fn is_attended(&self) -> bool {
        matches!(
            self,
            AttendanceStatus::Present
                | AttendanceStatus::Late
                | AttendanceStatus::LateCompensatedOvertime
        )
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The status of one canonical day.  Late minutes only exist on the
/// late-family variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayStatus {
    Present,
    Late {
        #[serde(rename = "lateMinutes")]
        late_minutes: u32,
    },
    LateCompensatedOvertime {
        #[serde(rename = "lateMinutes")]
        late_minutes: u32,
    },
    AbsentUnexcused,
    Sick,
    Leave,
    Holiday,
}

impl DayStatus {
    pub fn kind(&self) -> AttendanceStatus {
        match self {
            DayStatus::Present => AttendanceStatus::Present,
            DayStatus::Late { .. } => AttendanceStatus::Late,
            DayStatus::LateCompensatedOvertime { .. } => AttendanceStatus::LateCompensatedOvertime,
            DayStatus::AbsentUnexcused => AttendanceStatus::AbsentUnexcused,
            DayStatus::Sick => AttendanceStatus::Sick,
            DayStatus::Leave => AttendanceStatus::Leave,
            DayStatus::Holiday => AttendanceStatus::Holiday,
        }
    }

    pub fn late_minutes(&self) -> Option<u32> {
        match self {
            DayStatus::Late { late_minutes } | DayStatus::LateCompensatedOvertime { late_minutes } => {
                Some(*late_minutes)
            }
            _ => None,
        }
    }
}

/// A raw daily attendance row as delivered by upstream systems.
///
/// Older schemas name the status field `statusMasuk` and use
/// Indonesian names for the time fields; both spellings are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttendanceRow {
    /// The calendar day this row describes.
    pub date: NaiveDate,
    /// Status code in the current schema.  Takes precedence over
    /// `status_masuk` when both are present and non-blank.
    #[serde(default)]
    pub status: Option<String>,
    /// Status code in the legacy schema.
    #[serde(default)]
    pub status_masuk: Option<String>,
    /// Recorded arrival time, if any.
    #[serde(default, alias = "jamMasuk")]
    pub clock_in: Option<NaiveTime>,
    /// Recorded departure time, if any.
    #[serde(default, alias = "jamKeluar")]
    pub clock_out: Option<NaiveTime>,
    /// Minutes late.  Only read for the late statuses; treated as zero
    /// when missing.
    #[serde(default, alias = "menitTerlambat")]
    pub late_minutes: Option<u32>,
}

/// The canonical record of one day, produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceDayRecord {
    /// The calendar day, always inside the reporting period.
    pub date: NaiveDate,
    /// Resolved status, serialized inline as `status` plus
    /// `lateMinutes` for the late variants.
    #[serde(flatten)]
    pub status: DayStatus,
    /// Absent for statuses that imply no attendance.
    pub clock_in: Option<NaiveTime>,
    /// Absent for statuses that imply no attendance.
    pub clock_out: Option<NaiveTime>,
}

/// A pre-computed deduction for one day that replaces the rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyDeductionOverride {
    /// The recorded day whose table deduction is replaced.
    pub date: NaiveDate,
    /// Deducted amount for the day.  Must not be negative.
    pub amount: Decimal,
    /// Percentage of the day's allowance share, 0 through 100.
    pub percentage: Decimal,
    /// Reason shown on the deduction line.
    pub reason: String,
}

/// A manually entered administrative deduction ("pemotongan lain").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherDeductionEntry {
    /// Amount to deduct.  Must not be negative.
    pub amount: Decimal,
    /// Free-text justification entered by the operator.
    pub reason: String,
}

/// A single deduction line inside a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductionItem {
    /// The day the deduction belongs to; `None` for "other" entries.
    pub date: Option<NaiveDate>,
    /// Deducted amount; always positive inside a bucket.
    pub amount: Decimal,
    /// For daily items, the share of that day's allowance; for other
    /// items, the share of the monthly base (clamped to 100).
    pub percentage_of_base: Decimal,
    /// Rendered reason text, e.g. `"Terlambat 15 menit"`.
    pub reason: String,
}

/// An ordered list of deduction items and their uncapped sum.
///
/// The total is computed on construction and cannot drift from the
/// items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductionBucket {
    items: Vec<DeductionItem>,
    raw_total: Decimal,
}

impl DeductionBucket {
    /// Builds a bucket, rejecting negative amounts.
    pub fn from_items(items: Vec<DeductionItem>) -> Result<Self, ValidationError> {
        if let Some(bad) = items.iter().find(|i| i.amount < Decimal::ZERO) {
            return Err(ValidationError::NegativeAmount {
                amount: bad.amount,
                reason: bad.reason.clone(),
            });
        }
        let raw_total = items
            .iter()
            .try_fold(Decimal::ZERO, |acc, i| acc.checked_add(i.amount))
            .ok_or(ValidationError::AmountOverflow {
                context: "deduction bucket total",
            })?;
        Ok(DeductionBucket { items, raw_total })
    }

    pub fn items(&self) -> &[DeductionItem] {
        &self.items
    }

    pub fn raw_total(&self) -> Decimal {
        self.raw_total
    }

    pub fn into_items(self) -> Vec<DeductionItem> {
        self.items
    }
}

/// A bucket total after its ceiling has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CappedDeduction {
    /// Sum of the bucket before the ceiling.
    pub raw_total: Decimal,
    /// `min(raw_total, ceiling)`, the amount actually deducted.
    pub capped_total: Decimal,
    /// The ceiling in percent of the base allowance.
    pub cap_percent: Decimal,
    /// True iff `raw_total` strictly exceeded the ceiling.
    pub was_capped: bool,
}

/// Everything the engine needs for one employee in one period.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeTukinInput {
    /// Identifier of the employee, echoed into the summary or failure.
    pub employee_id: String,
    /// Display name, carried through unchanged.
    #[serde(default)]
    pub employee_name: Option<String>,
    /// Monthly performance-allowance entitlement.
    pub base_allowance: Decimal,
    /// Overrides the calendar length of the period when set.
    #[serde(default)]
    pub total_days_in_period: Option<u32>,
    /// Raw attendance rows, at most one per date.  Days without a row
    /// incur no deduction.
    #[serde(default)]
    pub attendance: Vec<RawAttendanceRow>,
    /// Pre-computed daily deductions that take precedence over the
    /// rule table for their date.
    #[serde(default)]
    pub daily_overrides: Vec<DailyDeductionOverride>,
    /// Administrative deductions for the "other" bucket.
    #[serde(default)]
    pub other_deductions: Vec<OtherDeductionEntry>,
}

/// The result of the deduction calculation for a single employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeTukinSummary {
    pub employee_id: String,
    pub employee_name: Option<String>,
    pub base_allowance: Decimal,
    /// Divisor used for the per-day share.
    pub total_days_in_period: u32,
    /// `base_allowance / total_days_in_period`, unrounded.
    pub per_day_allowance: Decimal,
    /// Daily deduction lines in attendance order.
    pub attendance_items: Vec<DeductionItem>,
    /// "Other" deduction lines in entry order.
    pub other_items: Vec<DeductionItem>,
    /// Attendance bucket against its ceiling (60% by default).
    pub attendance_deduction: CappedDeduction,
    /// "Other" bucket against its ceiling (60% by default).
    pub other_deduction: CappedDeduction,
    /// Capped at 100% of base, computed from the two capped buckets.
    pub total_deduction: CappedDeduction,
    /// Base allowance minus the capped total, never below zero.
    pub net_allowance: Decimal,
    /// Mirrors `attendance_deduction.was_capped`.
    pub is_attendance_capped: bool,
    /// Mirrors `other_deduction.was_capped`.
    pub is_other_deductions_capped: bool,
    /// Mirrors `total_deduction.was_capped`.
    pub is_total_capped: bool,
    /// Recorded days with an attended status (present or late).
    pub days_present: u32,
    /// Recorded days that produced an attendance deduction line.
    pub days_with_deduction: u32,
    /// `total_days - days_with_deduction`.
    pub days_without_deduction: u32,
    /// Number of recorded days; unrecorded days are not counted.
    pub total_days: u32,
}

/// Period-level totals across a set of employee summaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTotals {
    /// Number of summaries folded in.
    pub employee_count: usize,
    pub total_base_allowance: Decimal,
    /// Sum of the attendance buckets before capping.
    pub total_attendance_deduction_raw: Decimal,
    /// Sum of the capped attendance buckets.
    pub total_attendance_deduction: Decimal,
    /// Sum of the "other" buckets before capping.
    pub total_other_deduction_raw: Decimal,
    /// Sum of the capped "other" buckets.
    pub total_other_deduction: Decimal,
    /// Sum of each employee's capped total deduction.
    pub total_deduction: Decimal,
    pub total_net_allowance: Decimal,
    /// Employees whose attendance bucket hit its ceiling.
    pub attendance_capped_count: usize,
    /// Employees whose "other" bucket hit its ceiling.
    pub other_capped_count: usize,
    /// Employees whose combined deduction hit its ceiling.
    pub total_capped_count: usize,
}

/// Input to a report run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TukinRunInput {
    /// The month every employee is evaluated for.
    pub period: ReportingPeriod,
    /// Employees to evaluate.  Each one succeeds or fails on its own.
    pub employees: Vec<EmployeeTukinInput>,
}

/// An employee whose input was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeFailure {
    pub employee_id: String,
    /// Why the employee was excluded; serialized as its message.
    #[serde(serialize_with = "serialize_display")]
    pub error: ValidationError,
}

/// The aggregate result of a report run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TukinReport {
    pub period: ReportingPeriod,
    /// One summary per accepted employee.
    pub summaries: Vec<EmployeeTukinSummary>,
    /// One entry per rejected employee.
    pub failures: Vec<EmployeeFailure>,
    /// Folded from the successful summaries only.
    pub totals: ReportTotals,
}

fn serialize_display<T: fmt::Display, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(value)
}
