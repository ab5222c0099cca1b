//! Period tracker.
//!
//! Holds the cycle profile supplied by the caller and the single persisted
//! value, the last period start date (`periods.csv`, column
//! `last_period_start_date`, at most one row).

use crate::phase::{CycleProfile, PhaseReading, PhaseShare};
use crate::store::{FlatFile, FlatRecord};
use crate::types::{format_date, parse_date};
use crate::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The one persisted period record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LastPeriodStart(pub NaiveDate);

#[derive(Debug, Serialize, Deserialize)]
pub struct PeriodRow {
    last_period_start_date: String,
}

impl FlatRecord for LastPeriodStart {
    type Row = PeriodRow;
    const HEADERS: &'static [&'static str] = &["last_period_start_date"];
    const KEY_COLUMN: &'static str = "last_period_start_date";

    fn to_row(&self) -> PeriodRow {
        PeriodRow {
            last_period_start_date: format_date(self.0),
        }
    }

    fn from_row(row: PeriodRow) -> Result<Self> {
        parse_date(&row.last_period_start_date).map(LastPeriodStart)
    }
}

/// Cycle profile plus the persisted last period start date
#[derive(Debug)]
pub struct PeriodTracker {
    store: FlatFile<LastPeriodStart>,
    profile: CycleProfile,
    last_period_start: Option<NaiveDate>,
}

impl PeriodTracker {
    /// Open the tracker with the given profile
    ///
    /// Only the first data row of the file is used. Load failures are logged
    /// and leave the date unset.
    pub fn open(path: impl Into<PathBuf>, profile: CycleProfile) -> Self {
        let store = FlatFile::<LastPeriodStart>::new(path);
        let last_period_start = match store.load() {
            Ok(rows) => {
                if rows.len() > 1 {
                    tracing::warn!(
                        "{:?} holds {} rows, using the first",
                        store.path(),
                        rows.len()
                    );
                }
                rows.first().map(|row| row.0)
            }
            Err(e) => {
                tracing::error!(
                    "Error loading last period date from {:?}: {}",
                    store.path(),
                    e
                );
                None
            }
        };

        Self {
            store,
            profile,
            last_period_start,
        }
    }

    pub fn profile(&self) -> CycleProfile {
        self.profile
    }

    pub fn last_period_start(&self) -> Option<NaiveDate> {
        self.last_period_start
    }

    /// Overwrite the last period start date
    pub fn update_last_period_start_date(&mut self, date: NaiveDate) -> Result<()> {
        self.last_period_start = Some(date);
        tracing::info!("Last period start date set to {}", date);

        self.store
            .save(&[LastPeriodStart(date)])
            .map_err(|e| {
                tracing::error!(
                    "Error saving last period date to {:?}: {}",
                    self.store.path(),
                    e
                );
                e
            })
    }

    /// One cycle after the last start, if known
    pub fn predict_next_period(&self) -> Option<NaiveDate> {
        self.profile.predict_next_period(self.last_period_start)
    }

    pub fn current_phase(&self, current: NaiveDate) -> PhaseReading {
        self.profile.current_phase(self.last_period_start, current)
    }

    pub fn phase_proportions(&self) -> Vec<PhaseShare> {
        self.profile.phase_proportions()
    }
}
