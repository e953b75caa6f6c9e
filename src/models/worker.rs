//! Worker model.
//!
//! This module defines the [`Worker`] struct for representing the people
//! the engine computes payroll for.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents a worker known to the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    /// Unique identifier for the worker.
    pub id: String,
    /// Display name.
    pub name: String,
    /// The department the worker belongs to, used as a batch scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// The worker's hourly rate.
    pub hourly_rate: Decimal,
    /// Inactive workers are never settled in a batch.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Worker {
    /// Returns true if the worker should be settled for the given scope.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::Worker;
    /// use rust_decimal::Decimal;
    ///
    /// let worker = Worker {
    ///     id: "w1".to_string(),
    ///     name: "Ada".to_string(),
    ///     department: Some("ops".to_string()),
    ///     hourly_rate: Decimal::from(20),
    ///     active: true,
    /// };
    /// assert!(worker.is_eligible(None));
    /// assert!(worker.is_eligible(Some("ops")));
    /// assert!(!worker.is_eligible(Some("sales")));
    /// ```
    pub fn is_eligible(&self, scope: Option<&str>) -> bool {
        self.active
            && scope.is_none_or(|department| self.department.as_deref() == Some(department))
    }
}
