//! Tukin computation engine.
//!
//! The `engine` module turns a [`TukinRunInput`] into a
//! [`TukinReport`].  Each employee runs through the pipeline
//! normalize → daily rules → aggregate → cap → summarize on its own,
//! so the [`rayon`] crate fans employees out across CPU cores with no
//! shared mutable state.  Employees whose input fails validation are
//! collected as failures; the rest are folded into the totals.

use std::sync::Arc;

use rayon::prelude::*;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::aggregate::{aggregate_attendance, aggregate_other};
use crate::capping::cap_all;
use crate::config::{CompiledRules, EngineConfig};
use crate::error::{ConfigurationError, ValidationError};
use crate::models::{
    EmployeeFailure, EmployeeTukinInput, EmployeeTukinSummary, ReportTotals, ReportingPeriod,
    TukinReport, TukinRunInput,
};
use crate::normalize::normalize_days;
use crate::rules::per_day_allowance;
use crate::summary::{build_summary, DayCounts, SummaryHeader};

/// The deduction engine with its configuration frozen at construction.
///
/// Cloning is cheap; clones share the configuration.
#[derive(Debug, Clone)]
pub struct TukinEngine {
    config: Arc<EngineConfig>,
    rules: Arc<CompiledRules>,
}

impl TukinEngine {
    /// Validates `config` and builds an engine around it.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigurationError> {
        let rules = config.compile_rules()?;
        Ok(TukinEngine {
            config: Arc::new(config),
            rules: Arc::new(rules),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Computes one employee's summary for `period`.
    pub fn summarize(
        &self,
        period: &ReportingPeriod,
        employee: &EmployeeTukinInput,
    ) -> Result<EmployeeTukinSummary, ValidationError> {
        let calendar_days = period.days()?;
        if employee.base_allowance < Decimal::ZERO {
            return Err(ValidationError::NegativeBaseAllowance {
                amount: employee.base_allowance,
            });
        }
        let total_days = employee.total_days_in_period.unwrap_or(calendar_days);
        let per_day = per_day_allowance(employee.base_allowance, total_days)?;

        let days = normalize_days(period, &employee.attendance)?;
        let attendance = aggregate_attendance(
            period,
            &days,
            &employee.daily_overrides,
            per_day,
            &self.rules,
            self.config.amount_scale,
        )?;
        let other = aggregate_other(&employee.other_deductions, employee.base_allowance)?;
        let capped = cap_all(&attendance, &other, employee.base_allowance, &self.config.caps)?;
        let counts = DayCounts::from_days(&days, &attendance);

        debug!(
            employee_id = %employee.employee_id,
            attendance_raw = %capped.attendance.raw_total,
            other_raw = %capped.other.raw_total,
            total = %capped.total.capped_total,
            "computed tukin deductions"
        );

        let header = SummaryHeader {
            employee_id: employee.employee_id.clone(),
            employee_name: employee.employee_name.clone(),
            base_allowance: employee.base_allowance,
            total_days_in_period: total_days,
            per_day_allowance: per_day,
        };
        Ok(build_summary(header, attendance, other, capped, counts))
    }

    /// Runs a whole period report, one parallel task per employee.
    pub fn run_report(&self, input: TukinRunInput) -> TukinReport {
        let period = input.period;
        let outcomes: Vec<Result<EmployeeTukinSummary, EmployeeFailure>> = input
            .employees
            .into_par_iter()
            .map(|employee| {
                self.summarize(&period, &employee).map_err(|error| {
                    warn!(employee_id = %employee.employee_id, %error, "employee excluded from report");
                    EmployeeFailure {
                        employee_id: employee.employee_id,
                        error,
                    }
                })
            })
            .collect();

        let mut summaries = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        let mut totals = ReportTotals::default();
        for outcome in outcomes {
            let summary = match outcome {
                Ok(summary) => summary,
                Err(failure) => {
                    failures.push(failure);
                    continue;
                }
            };
            // a summary that would overflow the totals is excluded like any other failure
            match totals.try_add(&summary) {
                Ok(next) => {
                    totals = next;
                    summaries.push(summary);
                }
                Err(error) => {
                    warn!(employee_id = %summary.employee_id, %error, "employee excluded from report");
                    failures.push(EmployeeFailure {
                        employee_id: summary.employee_id,
                        error,
                    });
                }
            }
        }
        info!(
            %period,
            employees = totals.employee_count,
            failures = failures.len(),
            total_net = %totals.total_net_allowance,
            "tukin report complete"
        );
        TukinReport {
            period,
            summaries,
            failures,
            totals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DailyDeductionOverride, OtherDeductionEntry, RawAttendanceRow};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    // April has 30 days, so the default per-day share of 3,000,000 is 100,000.
    fn april() -> ReportingPeriod {
        ReportingPeriod::new(2024, 4).unwrap()
    }

    fn engine() -> TukinEngine {
        TukinEngine::new(EngineConfig::default()).unwrap()
    }

    fn row(day: u32, status: &str) -> RawAttendanceRow {
        RawAttendanceRow {
            date: NaiveDate::from_ymd_opt(2024, 4, day).unwrap(),
            status: Some(status.to_string()),
            status_masuk: None,
            clock_in: None,
            clock_out: None,
            late_minutes: None,
        }
    }

    fn employee(id: &str, base: Decimal, attendance: Vec<RawAttendanceRow>) -> EmployeeTukinInput {
        EmployeeTukinInput {
            employee_id: id.to_string(),
            employee_name: None,
            base_allowance: base,
            total_days_in_period: None,
            attendance,
            daily_overrides: vec![],
            other_deductions: vec![],
        }
    }

    fn absences(n: u32) -> Vec<RawAttendanceRow> {
        (1..=n).map(|d| row(d, "ABSENT_UNEXCUSED")).collect()
    }

    #[test]
    fn scenario_single_absence() {
        let mut days = absences(1);
        days.extend((2..=5).map(|d| row(d, "PRESENT")));
        let s = engine()
            .summarize(&april(), &employee("A", dec!(3000000), days))
            .unwrap();
        assert_eq!(s.per_day_allowance, dec!(100000));
        assert_eq!(s.attendance_deduction.raw_total, dec!(100000));
        assert_eq!(s.attendance_deduction.capped_total, dec!(100000));
        assert!(!s.is_attendance_capped);
        assert_eq!(s.net_allowance, dec!(2900000));
        assert_eq!(s.days_present, 4);
        assert_eq!(s.days_with_deduction, 1);
        assert_eq!(s.days_without_deduction, 4);
        assert_eq!(s.total_days, 5);
    }

    #[test]
    fn scenario_attendance_cap() {
        let s = engine()
            .summarize(&april(), &employee("B", dec!(3000000), absences(20)))
            .unwrap();
        assert_eq!(s.attendance_deduction.raw_total, dec!(2000000));
        assert_eq!(s.attendance_deduction.capped_total, dec!(1800000));
        assert!(s.attendance_deduction.was_capped);
        assert!(s.is_attendance_capped);
        assert!(!s.is_total_capped);
        assert_eq!(s.net_allowance, dec!(1200000));
    }

    #[test]
    fn scenario_total_cap() {
        let mut input = employee("C", dec!(3000000), absences(20));
        input.other_deductions = vec![OtherDeductionEntry {
            amount: dec!(2000000),
            reason: "Hukuman disiplin".into(),
        }];
        let s = engine().summarize(&april(), &input).unwrap();
        assert_eq!(s.attendance_deduction.capped_total, dec!(1800000));
        assert_eq!(s.other_deduction.capped_total, dec!(1800000));
        assert!(s.is_other_deductions_capped);
        assert_eq!(s.total_deduction.raw_total, dec!(3600000));
        assert_eq!(s.total_deduction.capped_total, dec!(3000000));
        assert!(s.is_total_capped);
        assert_eq!(s.net_allowance, dec!(0));
    }

    #[test]
    fn scenario_zero_base() {
        let mut input = employee("D", dec!(0), absences(3));
        input.other_deductions = vec![OtherDeductionEntry {
            amount: dec!(50000),
            reason: "Denda".into(),
        }];
        input.daily_overrides = vec![DailyDeductionOverride {
            date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            amount: dec!(10000),
            percentage: dec!(100),
            reason: "Koreksi manual".into(),
        }];
        let s = engine().summarize(&april(), &input).unwrap();
        assert_eq!(s.attendance_deduction.raw_total, dec!(10000));
        assert_eq!(s.attendance_deduction.capped_total, dec!(0));
        assert!(s.is_attendance_capped);
        assert_eq!(s.other_deduction.capped_total, dec!(0));
        assert!(s.is_other_deductions_capped);
        assert_eq!(s.total_deduction.capped_total, dec!(0));
        assert!(!s.is_total_capped);
        assert_eq!(s.net_allowance, dec!(0));
    }

    #[test]
    fn explicit_period_length() {
        let mut input = employee("E", dec!(2200000), absences(1));
        input.total_days_in_period = Some(22);
        let s = engine().summarize(&april(), &input).unwrap();
        assert_eq!(s.total_days_in_period, 22);
        assert_eq!(s.attendance_deduction.raw_total, dec!(100000));

        input.total_days_in_period = Some(0);
        assert_eq!(
            engine().summarize(&april(), &input),
            Err(ValidationError::NonPositiveTotalDays)
        );
    }

    #[test]
    fn negative_base_is_rejected() {
        assert!(matches!(
            engine().summarize(&april(), &employee("F", dec!(-1), vec![])),
            Err(ValidationError::NegativeBaseAllowance { .. })
        ));
    }

    #[test]
    fn summaries_are_reproducible() {
        let mut days = absences(3);
        days.push(row(10, "SAKIT"));
        let input = employee("G", dec!(3100000), days);
        let a = engine().summarize(&april(), &input).unwrap();
        let b = engine().summarize(&april(), &input).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn report_collects_failures_and_folds_the_rest() {
        let mut duplicate = absences(2);
        duplicate.push(row(1, "PRESENT"));
        let input = TukinRunInput {
            period: april(),
            employees: vec![
                employee("ok-1", dec!(3000000), absences(1)),
                employee("bad", dec!(3000000), duplicate),
                employee("ok-2", dec!(3000000), absences(20)),
            ],
        };
        let report = engine().run_report(input);
        assert_eq!(report.summaries.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].employee_id, "bad");
        assert_eq!(
            report.failures[0].error,
            ValidationError::DuplicateDay {
                date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
            }
        );
        assert_eq!(report.totals.employee_count, 2);
        assert_eq!(report.totals.total_base_allowance, dec!(6000000));
        assert_eq!(report.totals.total_deduction, dec!(1900000));
        assert_eq!(report.totals.total_net_allowance, dec!(4100000));
        assert_eq!(report.totals.attendance_capped_count, 1);
    }

    #[test]
    fn oversized_base_fails_alone() {
        let input = TukinRunInput {
            period: april(),
            employees: vec![
                employee("huge", Decimal::from_i128_with_scale(10_i128.pow(28), 0), absences(1)),
                employee("ok", dec!(3000000), absences(1)),
            ],
        };
        let report = engine().run_report(input);
        assert_eq!(report.summaries.len(), 1);
        assert_eq!(report.summaries[0].employee_id, "ok");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].employee_id, "huge");
        assert!(matches!(
            report.failures[0].error,
            ValidationError::AmountOverflow { .. }
        ));
        assert_eq!(report.totals.employee_count, 1);
        assert_eq!(report.totals.total_net_allowance, dec!(2900000));
    }

    #[test]
    fn overflowing_totals_exclude_the_employee() {
        let mut config = EngineConfig::default();
        config.caps.attendance_percent = dec!(0);
        config.caps.other_percent = dec!(0);
        config.caps.total_percent = dec!(0);
        let engine = TukinEngine::new(config).unwrap();
        let report = engine.run_report(TukinRunInput {
            period: april(),
            employees: vec![
                employee("first", Decimal::MAX, vec![]),
                employee("second", Decimal::MAX, vec![]),
            ],
        });
        assert_eq!(report.summaries.len(), 1);
        assert_eq!(report.summaries[0].employee_id, "first");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            report.failures[0].error,
            ValidationError::AmountOverflow {
                context: "report totals"
            }
        );
        assert_eq!(report.totals.employee_count, 1);
        assert_eq!(report.totals.total_base_allowance, Decimal::MAX);
    }

    #[test]
    fn empty_report() {
        let report = engine().run_report(TukinRunInput {
            period: april(),
            employees: vec![],
        });
        assert!(report.summaries.is_empty());
        assert_eq!(report.totals.employee_count, 0);
    }

    #[test]
    fn invalid_config_refuses_to_build() {
        let mut config = EngineConfig::default();
        config.caps.total_percent = dec!(120);
        assert!(TukinEngine::new(config).is_err());
    }
}
