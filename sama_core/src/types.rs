//! Core domain types for the Sama tracker.
//!
//! This module defines the records the trackers own in memory:
//! - Habits and their completion frequency
//! - Medications and their dosing frequency
//! - Outcomes reported by mutating operations

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Serialized calendar date format used by every backing file
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| Error::InvalidRecord(format!("Invalid date '{}': {}", s, e)))
}

/// Parse an optional date where an empty field means "unset"
pub fn parse_optional_date(s: &str) -> Result<Option<NaiveDate>> {
    if s.trim().is_empty() {
        Ok(None)
    } else {
        parse_date(s).map(Some)
    }
}

/// Format a date as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// The local calendar date
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

// ============================================================================
// Habit Types
// ============================================================================

/// How often a habit is meant to be performed
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum HabitFrequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl HabitFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitFrequency::Daily => "daily",
            HabitFrequency::Weekly => "weekly",
            HabitFrequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for HabitFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for HabitFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(HabitFrequency::Daily),
            "weekly" => Ok(HabitFrequency::Weekly),
            "monthly" => Ok(HabitFrequency::Monthly),
            other => Err(Error::InvalidRecord(format!(
                "Unknown habit frequency: {}",
                other
            ))),
        }
    }
}

/// A tracked habit, keyed by name
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Habit {
    pub name: String,
    pub frequency: HabitFrequency,
    pub streak: u32,
    pub last_completed: Option<NaiveDate>,
}

impl Habit {
    /// A fresh habit with no completions
    pub fn new(name: impl Into<String>, frequency: HabitFrequency) -> Self {
        Self {
            name: name.into(),
            frequency,
            streak: 0,
            last_completed: None,
        }
    }
}

// ============================================================================
// Medication Types
// ============================================================================

/// How often a medication is taken
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MedicationFrequency {
    #[default]
    Daily,
    Weekly,
    AsNeeded,
}

impl MedicationFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            MedicationFrequency::Daily => "daily",
            MedicationFrequency::Weekly => "weekly",
            MedicationFrequency::AsNeeded => "as-needed",
        }
    }
}

impl fmt::Display for MedicationFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MedicationFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(MedicationFrequency::Daily),
            "weekly" => Ok(MedicationFrequency::Weekly),
            "as-needed" | "as needed" | "as_needed" => Ok(MedicationFrequency::AsNeeded),
            other => Err(Error::InvalidRecord(format!(
                "Unknown medication frequency: {}",
                other
            ))),
        }
    }
}

/// A medication course. Names are not unique.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    pub name: String,
    pub dosage: f64,
    pub frequency: MedicationFrequency,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub last_taken: Option<NaiveDate>,
}

// ============================================================================
// Operation Outcomes
// ============================================================================

/// What a name-addressed mutation did to the collection
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The record was changed and persisted
    Updated,
    /// The record exists but nothing needed changing (e.g. already marked today)
    Unchanged,
    /// No record carries that name
    NotFound,
}

impl Outcome {
    pub fn is_found(&self) -> bool {
        !matches!(self, Outcome::NotFound)
    }
}

/// Reject empty names
pub(crate) fn require_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation("name must not be empty".into()));
    }
    Ok(())
}
