//! Engine configuration: the status rule table and the cap settings.
//!
//! The configuration is an immutable value handed to
//! [`TukinEngine::new`](crate::engine::TukinEngine::new).  It may be
//! loaded from a JSON file so that operators can adjust percentages
//! without a rebuild; a missing status or an out-of-range percentage is
//! a [`ConfigurationError`] and the engine refuses to start.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::models::AttendanceStatus;

/// Deduction rule for one attendance status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    /// Percentage of the day's allowance share that is deducted.
    pub percentage: Decimal,
    /// Reason text; `{minutes}` is replaced with the late minutes.
    pub reason: String,
}

impl RuleEntry {
    fn new(percentage: Decimal, reason: &str) -> Self {
        RuleEntry {
            percentage,
            reason: reason.to_string(),
        }
    }

    /// Renders the reason text for a day.
    pub fn render_reason(&self, late_minutes: Option<u32>) -> String {
        match late_minutes {
            Some(minutes) => self.reason.replace("{minutes}", &minutes.to_string()),
            None => self.reason.clone(),
        }
    }
}

/// Declarative map from status to its deduction rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable(BTreeMap<AttendanceStatus, RuleEntry>);

impl RuleTable {
    pub fn new(entries: BTreeMap<AttendanceStatus, RuleEntry>) -> Self {
        RuleTable(entries)
    }

    pub fn get(&self, status: AttendanceStatus) -> Option<&RuleEntry> {
        self.0.get(&status)
    }

    pub fn insert(&mut self, status: AttendanceStatus, entry: RuleEntry) {
        self.0.insert(status, entry);
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        use AttendanceStatus::*;
        let entries = [
            (Present, RuleEntry::new(dec!(0), "Normal")),
            (Late, RuleEntry::new(dec!(10), "Terlambat {minutes} menit")),
            (LateCompensatedOvertime, RuleEntry::new(dec!(0), "Dikompensasi lembur")),
            (AbsentUnexcused, RuleEntry::new(dec!(100), "Tidak hadir")),
            (Sick, RuleEntry::new(dec!(50), "Sakit")),
            (Leave, RuleEntry::new(dec!(0), "Cuti resmi")),
            (Holiday, RuleEntry::new(dec!(0), "Hari libur")),
        ];
        RuleTable(entries.into_iter().collect())
    }
}

/// Ceilings, in percent of the base allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapConfig {
    pub attendance_percent: Decimal,
    pub other_percent: Decimal,
    /// Applied to the sum of the two capped buckets.
    pub total_percent: Decimal,
}

impl Default for CapConfig {
    fn default() -> Self {
        CapConfig {
            attendance_percent: dec!(60),
            other_percent: dec!(60),
            total_percent: dec!(100),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default)]
    pub rules: RuleTable,
    #[serde(default)]
    pub caps: CapConfig,
    /// Decimal places each daily deduction is rounded to.
    #[serde(default = "default_amount_scale")]
    pub amount_scale: u32,
}

fn default_amount_scale() -> u32 {
    2
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            rules: RuleTable::default(),
            caps: CapConfig::default(),
            amount_scale: default_amount_scale(),
        }
    }
}

fn in_percent_range(p: Decimal) -> bool {
    p >= Decimal::ZERO && p <= dec!(100)
}

impl EngineConfig {
    /// Checks that every status has a rule and all percentages lie in 0–100.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for status in AttendanceStatus::ALL {
            let entry = self
                .rules
                .get(status)
                .ok_or(ConfigurationError::MissingStatus(status.as_str()))?;
            if !in_percent_range(entry.percentage) {
                return Err(ConfigurationError::RulePercentageOutOfRange {
                    status: status.as_str(),
                    percentage: entry.percentage,
                });
            }
        }
        let caps = [
            ("attendancePercent", self.caps.attendance_percent),
            ("otherPercent", self.caps.other_percent),
            ("totalPercent", self.caps.total_percent),
        ];
        for (name, percentage) in caps {
            if !in_percent_range(percentage) {
                return Err(ConfigurationError::CapOutOfRange { name, percentage });
            }
        }
        if self.amount_scale > 10 {
            return Err(ConfigurationError::AmountScaleTooLarge(self.amount_scale));
        }
        Ok(())
    }
}

/// A rule table known to cover every status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRules {
    // indexed by `AttendanceStatus as usize`
    entries: Vec<RuleEntry>,
}

impl CompiledRules {
    pub fn entry(&self, status: AttendanceStatus) -> &RuleEntry {
        &self.entries[status as usize]
    }
}

impl EngineConfig {
    /// Validates the configuration and freezes its rule table.
    pub fn compile_rules(&self) -> Result<CompiledRules, ConfigurationError> {
        self.validate()?;
        let entries = AttendanceStatus::ALL
            .iter()
            .map(|status| {
                self.rules
                    .get(*status)
                    .cloned()
                    .ok_or(ConfigurationError::MissingStatus(status.as_str()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CompiledRules { entries })
    }
}

/// Load and validate an engine configuration from a JSON file.
///
/// Omitted sections fall back to their defaults, but a `rules` object
/// that is present must list every status.
pub fn load_config_from_file(path: &Path) -> Result<EngineConfig, ConfigurationError> {
    let data = std::fs::read_to_string(path)?;
    let config: EngineConfig = serde_json::from_str(&data)?;
    config.validate()?;
    Ok(config)
}

/// Environment variable naming an optional JSON rules file.
pub const RULES_PATH_ENV: &str = "TUKIN_RULES_PATH";

/// Loads the rules file at `path`, or the defaults when there is none.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, ConfigurationError> {
    match path {
        Some(path) => load_config_from_file(path),
        None => {
            let config = EngineConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

/// Loads the configuration named by `TUKIN_RULES_PATH`, or the
/// defaults when the variable is unset.
pub fn load_config_from_env() -> Result<EngineConfig, ConfigurationError> {
    let path = std::env::var_os(RULES_PATH_ENV).map(PathBuf::from);
    load_config(path.as_deref())
}
