//! Medication tracker.
//!
//! Medications are kept in insertion order and persisted to
//! `medications.csv` with the columns
//! `name, dosage, frequency, start_date, end_date, last_taken`.
//! Names may repeat; name lookups hit the first match.

use crate::store::{FlatFile, FlatRecord};
use crate::types::{format_date, parse_date, parse_optional_date, require_name, today};
use crate::{Error, Medication, MedicationFrequency, Outcome, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Serialized medication row
#[derive(Debug, Serialize, Deserialize)]
pub struct MedicationRow {
    name: String,
    #[serde(default)]
    dosage: String,
    #[serde(default)]
    frequency: String,
    #[serde(default)]
    start_date: String,
    #[serde(default)]
    end_date: String,
    #[serde(default)]
    last_taken: String,
}

impl FlatRecord for Medication {
    type Row = MedicationRow;
    const HEADERS: &'static [&'static str] = &[
        "name",
        "dosage",
        "frequency",
        "start_date",
        "end_date",
        "last_taken",
    ];
    const KEY_COLUMN: &'static str = "name";

    fn to_row(&self) -> MedicationRow {
        MedicationRow {
            name: self.name.clone(),
            dosage: self.dosage.to_string(),
            frequency: self.frequency.to_string(),
            start_date: format_date(self.start_date),
            end_date: format_date(self.end_date),
            last_taken: self.last_taken.map(format_date).unwrap_or_default(),
        }
    }

    fn from_row(row: MedicationRow) -> Result<Self> {
        let dosage: f64 = row.dosage.trim().parse().map_err(|e| {
            Error::InvalidRecord(format!("Invalid dosage '{}' for {}: {}", row.dosage, row.name, e))
        })?;
        if !dosage.is_finite() || dosage <= 0.0 {
            return Err(Error::InvalidRecord(format!(
                "Non-positive dosage {} for {}",
                dosage, row.name
            )));
        }

        Ok(Medication {
            dosage,
            frequency: row.frequency.parse()?,
            start_date: parse_date(&row.start_date)?,
            end_date: parse_date(&row.end_date)?,
            last_taken: parse_optional_date(&row.last_taken)?,
            name: row.name,
        })
    }
}

/// Input for [`MedicationTracker::add`]
#[derive(Clone, Debug)]
pub struct NewMedication {
    pub name: String,
    pub dosage: f64,
    pub frequency: MedicationFrequency,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl NewMedication {
    fn validate(&self) -> Result<()> {
        require_name(&self.name)?;
        if !self.dosage.is_finite() || self.dosage <= 0.0 {
            return Err(Error::Validation(format!(
                "dosage must be a positive number, got {}",
                self.dosage
            )));
        }
        Ok(())
    }
}

/// Owns the medication list and its backing file
#[derive(Debug)]
pub struct MedicationTracker {
    store: FlatFile<Medication>,
    medications: Vec<Medication>,
}

impl MedicationTracker {
    /// Open the tracker, loading whatever the file holds
    ///
    /// Load failures are logged and leave the tracker empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let store = FlatFile::<Medication>::new(path);
        let medications = store.load().unwrap_or_else(|e| {
            tracing::error!("Failed to load medications from {:?}: {}", store.path(), e);
            Vec::new()
        });
        Self { store, medications }
    }

    pub fn medications(&self) -> &[Medication] {
        &self.medications
    }

    pub fn len(&self) -> usize {
        self.medications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.medications.is_empty()
    }

    /// Append a medication
    ///
    /// Start and end dates are not checked against each other.
    pub fn add(&mut self, new: NewMedication) -> Result<()> {
        new.validate()?;
        tracing::info!("Added medication '{}' ({} {})", new.name, new.dosage, new.frequency);
        self.medications.push(Medication {
            name: new.name,
            dosage: new.dosage,
            frequency: new.frequency,
            start_date: new.start_date,
            end_date: new.end_date,
            last_taken: None,
        });
        self.persist()
    }

    /// Mark the first medication named `name` as taken today
    pub fn mark_as_taken(&mut self, name: &str) -> Result<Outcome> {
        self.mark_as_taken_on(name, today())
    }

    /// Mark the first medication named `name` as taken on `date`
    pub fn mark_as_taken_on(&mut self, name: &str, date: NaiveDate) -> Result<Outcome> {
        let Some(med) = self.medications.iter_mut().find(|m| m.name == name) else {
            tracing::warn!("Medication '{}' not found", name);
            return Ok(Outcome::NotFound);
        };

        med.last_taken = Some(date);
        tracing::info!("Medication '{}' marked as taken on {}", name, date);
        self.persist()?;
        Ok(Outcome::Updated)
    }

    /// Remove every medication
    pub fn reset(&mut self) -> Result<()> {
        self.medications.clear();
        tracing::info!("Reset all medications");
        self.persist()
    }

    /// (last taken, name) pairs for every medication taken at least once
    pub fn doses_taken(&self) -> Vec<(NaiveDate, String)> {
        self.medications
            .iter()
            .filter_map(|m| m.last_taken.map(|date| (date, m.name.clone())))
            .collect()
    }

    fn persist(&self) -> Result<()> {
        self.store.save(&self.medications).map_err(|e| {
            tracing::error!("Error saving medications to {:?}: {}", self.store.path(), e);
            e
        })
    }
}
