//! Turns raw attendance rows into canonical day records.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::ValidationError;
use crate::models::{AttendanceDayRecord, AttendanceStatus, DayStatus, RawAttendanceRow, ReportingPeriod};

/// Outcome of reading the status text of a raw row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedStatus {
    Known(AttendanceStatus),
    /// Neither `status` nor `statusMasuk` was supplied.
    Missing,
    Unrecognized,
}

/// Maps upstream status text (English or Indonesian) to a status.
pub fn parse_status(raw: &str) -> ParsedStatus {
    let key = raw.trim().to_ascii_uppercase().replace(['-', ' '], "_");
    let status = match key.as_str() {
        "" => return ParsedStatus::Missing,
        "PRESENT" | "HADIR" | "TEPAT_WAKTU" => AttendanceStatus::Present,
        "LATE" | "TERLAMBAT" => AttendanceStatus::Late,
        "LATE_COMPENSATED_OVERTIME" | "TERLAMBAT_DIKOMPENSASI" | "KOMPENSASI_LEMBUR" => {
            AttendanceStatus::LateCompensatedOvertime
        }
        "ABSENT_UNEXCUSED" | "ALPHA" | "ALPA" | "TIDAK_HADIR" => AttendanceStatus::AbsentUnexcused,
        "SICK" | "SAKIT" => AttendanceStatus::Sick,
        "LEAVE" | "CUTI" => AttendanceStatus::Leave,
        "HOLIDAY" | "LIBUR" => AttendanceStatus::Holiday,
        _ => return ParsedStatus::Unrecognized,
    };
    ParsedStatus::Known(status)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn resolve_status(row: &RawAttendanceRow) -> AttendanceStatus {
    let raw = non_blank(&row.status).or(non_blank(&row.status_masuk));
    match raw.map(parse_status).unwrap_or(ParsedStatus::Missing) {
        ParsedStatus::Known(status) => status,
        ParsedStatus::Missing => {
            warn!(date = %row.date, "attendance row has no status, treating as PRESENT");
            AttendanceStatus::Present
        }
        ParsedStatus::Unrecognized => {
            warn!(
                date = %row.date,
                status = raw.unwrap_or_default(),
                "unrecognized attendance status, treating as PRESENT"
            );
            AttendanceStatus::Present
        }
    }
}

/// Normalizes one raw row, checking that it falls inside `period`.
pub fn normalize_row(
    period: &ReportingPeriod,
    row: &RawAttendanceRow,
) -> Result<AttendanceDayRecord, ValidationError> {
    if !period.contains(row.date) {
        return Err(ValidationError::DateOutsidePeriod {
            date: row.date,
            period: *period,
        });
    }
    let kind = resolve_status(row);
    let late_minutes = row.late_minutes.unwrap_or(0);
    let status = match kind {
        AttendanceStatus::Present => DayStatus::Present,
        AttendanceStatus::Late => DayStatus::Late { late_minutes },
        AttendanceStatus::LateCompensatedOvertime => DayStatus::LateCompensatedOvertime { late_minutes },
        AttendanceStatus::AbsentUnexcused => DayStatus::AbsentUnexcused,
        AttendanceStatus::Sick => DayStatus::Sick,
        AttendanceStatus::Leave => DayStatus::Leave,
        AttendanceStatus::Holiday => DayStatus::Holiday,
    };
    let (clock_in, clock_out) = if kind.is_attended() {
        (row.clock_in, row.clock_out)
    } else {
        if row.clock_in.is_some() || row.clock_out.is_some() {
            debug!(date = %row.date, status = %kind, "dropping clock times on non-attendance day");
        }
        (None, None)
    };
    Ok(AttendanceDayRecord {
        date: row.date,
        status,
        clock_in,
        clock_out,
    })
}

/// Normalizes an employee's rows for one period, preserving order.
pub fn normalize_days(
    period: &ReportingPeriod,
    rows: &[RawAttendanceRow],
) -> Result<Vec<AttendanceDayRecord>, ValidationError> {
    let mut seen = HashSet::with_capacity(rows.len());
    rows.iter()
        .map(|row| {
            let record = normalize_row(period, row)?;
            if !seen.insert(record.date) {
                return Err(ValidationError::DuplicateDay { date: record.date });
            }
            Ok(record)
        })
        .collect()
}
