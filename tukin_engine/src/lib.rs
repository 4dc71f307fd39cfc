//! Tukin Engine library crate.
//!
//! This crate computes performance-allowance (tunjangan kinerja)
//! deductions from monthly attendance: per-day rule lookups, the
//! attendance and "other" deduction buckets, the 60% / 100% caps and
//! the resulting net allowance per employee, folded into period
//! totals.  External applications may call
//! [`engine::TukinEngine::run_report`] directly or embed the API via
//! [`api::build_router`].

pub mod aggregate;
pub mod api;
pub mod capping;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod normalize;
pub mod report;
pub mod rules;
pub mod summary;

pub use config::EngineConfig;
pub use engine::TukinEngine;
pub use error::{ConfigurationError, ValidationError};
