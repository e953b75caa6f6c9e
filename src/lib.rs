//! Payroll Computation & Batch Settlement Engine
//!
//! This crate turns a period's attendance records, approved leave, an hourly
//! rate, and a set of time-bounded policy multipliers into a reproducible,
//! auditable payroll result for one worker, and settles whole workforces in
//! batch runs with per-worker failure isolation.
//!
//! The pure pipeline lives in [`calculation`]; [`service`] wires it to the
//! collaborator traits in [`store`].

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
