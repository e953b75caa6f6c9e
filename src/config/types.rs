//! Configuration types for the payroll engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::calculation::{HolidayCalendar, NightWindow, WorkTypeClassifier};
use crate::models::{PolicyCategory, PolicyRecord};

/// Metadata about the engine build.
///
/// The version is stamped on every computed payroll result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineMetadata {
    /// The human-readable name of the engine deployment.
    pub name: String,
    /// The engine version recorded on results.
    pub version: String,
}

impl Default for EngineMetadata {
    fn default() -> Self {
        Self {
            name: "payroll-engine".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Leave ledger settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LeaveSettings {
    /// Days granted to a worker who has no balance record yet.
    pub default_entitlement_days: Decimal,
}

impl Default for LeaveSettings {
    fn default() -> Self {
        Self {
            default_entitlement_days: Decimal::ZERO,
        }
    }
}

/// Engine configuration file structure (`engine.yaml`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineSettings {
    /// Engine metadata.
    pub engine: EngineMetadata,
    /// The night window used by the classifier.
    #[serde(default)]
    pub night_window: NightWindow,
    /// Leave ledger settings.
    #[serde(default)]
    pub leave: LeaveSettings,
}

/// One policy record as written in `policies.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PolicySeed {
    /// The policy category.
    pub category: PolicyCategory,
    /// The multiplier for the category.
    pub multiplier: Decimal,
    /// First day the multiplier applies.
    pub valid_from: NaiveDate,
    /// Last day the multiplier applies; absent means open-ended.
    #[serde(default)]
    pub valid_to: Option<NaiveDate>,
}

/// Policies configuration file structure (`policies.yaml`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PoliciesConfig {
    /// Seed records, in lookup order.
    #[serde(default)]
    pub policies: Vec<PolicySeed>,
}

/// The complete engine configuration loaded from files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Engine metadata.
    pub engine: EngineMetadata,
    /// The night window used by the classifier.
    pub night_window: NightWindow,
    /// Leave ledger settings.
    pub leave: LeaveSettings,
    /// The holiday calendar.
    pub holidays: HolidayCalendar,
    /// Validated seed policies.
    pub policies: Vec<PolicyRecord>,
}

impl EngineConfig {
    /// Builds the work-type classifier described by this configuration.
    pub fn classifier(&self) -> WorkTypeClassifier {
        WorkTypeClassifier::new(self.holidays.clone(), self.night_window)
    }
}
