//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration from YAML files.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fs;
use std::path::Path;

use crate::calculation::{HolidayCalendar, WorkTypeClassifier, find_overlapping_policy};
use crate::error::{EngineError, EngineResult};
use crate::models::PolicyRecord;

use super::types::{EngineConfig, EngineMetadata, EngineSettings, PoliciesConfig, PolicySeed};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml    # Engine metadata, night window, leave settings
/// ├── holidays.yaml  # Recurring and dated holidays
/// └── policies.yaml  # Seed policy records
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default")?;
/// println!("Engine version: {}", loader.engine().version);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - A seed policy is out of bounds or overlaps another of its category
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("engine.yaml"))?;
        let holidays = Self::load_yaml::<HolidayCalendar>(&path.join("holidays.yaml"))?;
        let policies = Self::load_yaml::<PoliciesConfig>(&path.join("policies.yaml"))?;

        if settings.leave.default_entitlement_days.is_sign_negative()
            && !settings.leave.default_entitlement_days.is_zero()
        {
            return Err(EngineError::ConfigParseError {
                path: path.join("engine.yaml").display().to_string(),
                message: "leave.default_entitlement_days must not be negative".to_string(),
            });
        }

        let policies = Self::seed_policies(&policies.policies, Utc::now())?;

        Ok(Self {
            config: EngineConfig {
                engine: settings.engine,
                night_window: settings.night_window,
                leave: settings.leave,
                holidays,
                policies,
            },
        })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Turns seeds into validated records, rejecting same-category overlaps.
    fn seed_policies(
        seeds: &[PolicySeed],
        created_at: DateTime<Utc>,
    ) -> EngineResult<Vec<PolicyRecord>> {
        let mut records: Vec<PolicyRecord> = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let record = PolicyRecord::new(
                seed.category,
                seed.multiplier,
                seed.valid_from,
                seed.valid_to,
                created_at,
            )?;
            if let Some(existing) = find_overlapping_policy(&records, record.category, &record.window)
            {
                return Err(EngineError::OverlappingPolicy {
                    category: record.category,
                    valid_from: record.window.valid_from,
                    existing_id: existing.id,
                });
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Returns the full configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the engine metadata.
    pub fn engine(&self) -> &EngineMetadata {
        &self.config.engine
    }

    /// Returns the validated seed policies.
    pub fn policies(&self) -> &[PolicyRecord] {
        &self.config.policies
    }

    /// Returns the days granted to a worker without a balance record.
    pub fn default_leave_entitlement(&self) -> Decimal {
        self.config.leave.default_entitlement_days
    }

    /// Builds the configured work-type classifier.
    pub fn classifier(&self) -> WorkTypeClassifier {
        self.config.classifier()
    }
}
