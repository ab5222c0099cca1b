#![forbid(unsafe_code)]

//! Core domain model and persistence for the Sama health tracker.
//!
//! This crate provides:
//! - Domain types (habits, medications, frequencies, outcomes)
//! - Flat-file (CSV) record stores
//! - Habit, medication, and period trackers
//! - Cycle phase engine

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod store;
pub mod habit;
pub mod medication;
pub mod phase;
pub mod period;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use store::{FlatFile, FlatRecord};
pub use habit::HabitTracker;
pub use medication::{MedicationTracker, NewMedication};
pub use phase::{CycleProfile, Phase, PhaseReading, PhaseShare};
pub use period::PeriodTracker;
