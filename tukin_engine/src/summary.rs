//! Assembly of the per-employee summary.

use rust_decimal::Decimal;

use crate::capping::CappedTotals;
use crate::models::{AttendanceDayRecord, DeductionBucket, EmployeeTukinSummary};

/// Day statistics over the recorded days of a period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayCounts {
    pub days_present: u32,
    pub days_with_deduction: u32,
    pub days_without_deduction: u32,
    pub total_days: u32,
}

impl DayCounts {
    /// Counts `days`; a day has a deduction iff it produced an item in
    /// the attendance bucket.
    pub fn from_days(days: &[AttendanceDayRecord], attendance: &DeductionBucket) -> Self {
        let total_days = days.len() as u32;
        let days_present = days.iter().filter(|d| d.status.kind().is_attended()).count() as u32;
        let days_with_deduction = attendance.items().len() as u32;
        DayCounts {
            days_present,
            days_with_deduction,
            days_without_deduction: total_days - days_with_deduction,
            total_days,
        }
    }
}

/// Identity and period facts carried into the summary unchanged.
#[derive(Debug, Clone)]
pub struct SummaryHeader {
    pub employee_id: String,
    pub employee_name: Option<String>,
    pub base_allowance: Decimal,
    pub total_days_in_period: u32,
    pub per_day_allowance: Decimal,
}

pub fn build_summary(
    header: SummaryHeader,
    attendance: DeductionBucket,
    other: DeductionBucket,
    capped: CappedTotals,
    counts: DayCounts,
) -> EmployeeTukinSummary {
    let net_allowance = (header.base_allowance - capped.total.capped_total).max(Decimal::ZERO);
    EmployeeTukinSummary {
        employee_id: header.employee_id,
        employee_name: header.employee_name,
        base_allowance: header.base_allowance,
        total_days_in_period: header.total_days_in_period,
        per_day_allowance: header.per_day_allowance,
        attendance_items: attendance.into_items(),
        other_items: other.into_items(),
        attendance_deduction: capped.attendance,
        other_deduction: capped.other,
        total_deduction: capped.total,
        net_allowance,
        is_attendance_capped: capped.attendance.was_capped,
        is_other_deductions_capped: capped.other.was_capped,
        is_total_capped: capped.total.was_capped,
        days_present: counts.days_present,
        days_with_deduction: counts.days_with_deduction,
        days_without_deduction: counts.days_without_deduction,
        total_days: counts.total_days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capping::cap_all;
    use crate::config::CapConfig;
    use crate::models::{DayStatus, DeductionItem};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn record(d: u32, status: DayStatus) -> AttendanceDayRecord {
        AttendanceDayRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, d).unwrap(),
            status,
            clock_in: None,
            clock_out: None,
        }
    }

    fn item(d: u32, amount: Decimal) -> DeductionItem {
        DeductionItem {
            date: NaiveDate::from_ymd_opt(2024, 3, d),
            amount,
            percentage_of_base: dec!(100),
            reason: "Tidak hadir".into(),
        }
    }

    fn header(base: Decimal) -> SummaryHeader {
        SummaryHeader {
            employee_id: "E-1".into(),
            employee_name: Some("Siti".into()),
            base_allowance: base,
            total_days_in_period: 30,
            per_day_allowance: base / dec!(30),
        }
    }

    #[test]
    fn counts_recorded_days() {
        let days = [
            record(1, DayStatus::Present),
            record(2, DayStatus::Late { late_minutes: 10 }),
            record(3, DayStatus::AbsentUnexcused),
            record(4, DayStatus::Holiday),
        ];
        let bucket = DeductionBucket::from_items(vec![item(2, dec!(10)), item(3, dec!(100))]).unwrap();
        let counts = DayCounts::from_days(&days, &bucket);
        assert_eq!(counts.days_present, 2);
        assert_eq!(counts.days_with_deduction, 2);
        assert_eq!(counts.days_without_deduction, 2);
        assert_eq!(counts.days_with_deduction + counts.days_without_deduction, counts.total_days);
    }

    #[test]
    fn net_is_base_minus_total() {
        let attendance = DeductionBucket::from_items(vec![item(3, dec!(100000))]).unwrap();
        let other = DeductionBucket::default();
        let capped = cap_all(&attendance, &other, dec!(3000000), &CapConfig::default()).unwrap();
        let counts = DayCounts::from_days(&[record(3, DayStatus::AbsentUnexcused)], &attendance);
        let summary = build_summary(header(dec!(3000000)), attendance, other, capped, counts);
        assert_eq!(summary.net_allowance, dec!(2900000));
        assert_eq!(summary.attendance_items.len(), 1);
        assert!(!summary.is_attendance_capped);
        assert!(!summary.is_total_capped);
    }

    #[test]
    fn net_never_negative_with_loose_total_cap() {
        let caps = CapConfig {
            attendance_percent: dec!(100),
            other_percent: dec!(100),
            total_percent: dec!(100),
        };
        let attendance = DeductionBucket::from_items(vec![item(1, dec!(900))]).unwrap();
        let other = DeductionBucket::from_items(vec![item(2, dec!(900))]).unwrap();
        let capped = cap_all(&attendance, &other, dec!(1000), &caps).unwrap();
        let summary = build_summary(header(dec!(1000)), attendance, other, capped, DayCounts::default());
        assert_eq!(summary.total_deduction.capped_total, dec!(1000));
        assert_eq!(summary.net_allowance, dec!(0));
        assert!(summary.is_total_capped);
    }
}
