//! Service layer for the Payroll Engine.
//!
//! Services are the operations callers invoke. Each takes an explicit
//! [`RequestContext`](crate::models::RequestContext), fetches inputs through
//! the collaborator traits in [`store`](crate::store), delegates the
//! arithmetic to [`calculation`](crate::calculation), and persists the outcome.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use payroll_engine::config::ConfigLoader;
//! use payroll_engine::models::{AttendanceInterval, PayPeriod, RequestContext, Worker};
//! use payroll_engine::service::PayrollService;
//! use payroll_engine::store::InMemoryStore;
//! use rust_decimal::Decimal;
//!
//! let store = Arc::new(InMemoryStore::new());
//! store.put_worker(Worker {
//!     id: "w1".to_string(),
//!     name: "Ada".to_string(),
//!     department: None,
//!     hourly_rate: Decimal::from(20),
//!     active: true,
//! }).unwrap();
//! let day = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
//! store.add_attendance(AttendanceInterval::new(
//!     "w1",
//!     day,
//!     day.and_hms_opt(9, 0, 0).unwrap(),
//!     Some(day.and_hms_opt(17, 0, 0).unwrap()),
//! ).unwrap()).unwrap();
//!
//! let payroll = PayrollService::new(store, &ConfigLoader::default());
//! let ctx = RequestContext::new("payroll-admin");
//! let result = payroll
//!     .compute_payroll(&ctx, "w1", PayPeriod::new(2024, 1).unwrap(), Decimal::from(20))
//!     .unwrap();
//! assert_eq!(result.total(), Decimal::from(160));
//! ```

mod batch;
mod leave;
mod payroll;
mod policy;

pub use batch::BatchSettlement;
pub use leave::LeaveService;
pub use payroll::PayrollService;
pub use policy::PolicyService;
