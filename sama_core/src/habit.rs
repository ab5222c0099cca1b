//! Habit tracker.
//!
//! Habits are keyed by name and persisted to `habits.csv` with the columns
//! `name, frequency, streak, last_completed`. Every mutation rewrites the file.

use crate::store::{FlatFile, FlatRecord};
use crate::types::{format_date, parse_optional_date, require_name, today};
use crate::{Error, Habit, HabitFrequency, Outcome, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Serialized habit row
#[derive(Debug, Serialize, Deserialize)]
pub struct HabitRow {
    name: String,
    #[serde(default)]
    frequency: String,
    #[serde(default)]
    streak: String,
    #[serde(default)]
    last_completed: String,
}

impl FlatRecord for Habit {
    type Row = HabitRow;
    const HEADERS: &'static [&'static str] = &["name", "frequency", "streak", "last_completed"];
    const KEY_COLUMN: &'static str = "name";

    fn to_row(&self) -> HabitRow {
        HabitRow {
            name: self.name.clone(),
            frequency: self.frequency.to_string(),
            streak: self.streak.to_string(),
            last_completed: self.last_completed.map(format_date).unwrap_or_default(),
        }
    }

    fn from_row(row: HabitRow) -> Result<Self> {
        let streak = match row.streak.trim() {
            "" => 0,
            s => s.parse().map_err(|e| {
                Error::InvalidRecord(format!("Invalid streak '{}' for {}: {}", s, row.name, e))
            })?,
        };

        Ok(Habit {
            frequency: row.frequency.parse()?,
            streak,
            last_completed: parse_optional_date(&row.last_completed)?,
            name: row.name,
        })
    }
}

/// Owns the habit collection and its backing file
#[derive(Debug)]
pub struct HabitTracker {
    store: FlatFile<Habit>,
    habits: BTreeMap<String, Habit>,
}

impl HabitTracker {
    /// Open the tracker, loading whatever the file holds
    ///
    /// Load failures are logged and leave the tracker empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let store = FlatFile::<Habit>::new(path);
        let habits = match store.load() {
            Ok(habits) => habits.into_iter().map(|h| (h.name.clone(), h)).collect(),
            Err(e) => {
                tracing::error!("Failed to load habits from {:?}: {}", store.path(), e);
                BTreeMap::new()
            }
        };
        Self { store, habits }
    }

    /// Habits in name order
    pub fn habits(&self) -> impl Iterator<Item = &Habit> {
        self.habits.values()
    }

    pub fn get(&self, name: &str) -> Option<&Habit> {
        self.habits.get(name)
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    /// Add a habit, replacing any habit of the same name
    pub fn add(&mut self, name: &str, frequency: HabitFrequency) -> Result<()> {
        require_name(name)?;
        self.habits
            .insert(name.to_string(), Habit::new(name, frequency));
        tracing::info!("Added habit '{}' ({})", name, frequency);
        self.persist()
    }

    /// Mark a habit completed today
    pub fn mark_completed(&mut self, name: &str) -> Result<Outcome> {
        self.mark_completed_on(name, today())
    }

    /// Mark a habit completed on `date`
    ///
    /// Completing twice on the same date is a no-op. The streak only grows;
    /// a missed interval does not reset it.
    pub fn mark_completed_on(&mut self, name: &str, date: NaiveDate) -> Result<Outcome> {
        let Some(habit) = self.habits.get_mut(name) else {
            tracing::warn!("Habit '{}' not found", name);
            return Ok(Outcome::NotFound);
        };

        if habit.last_completed == Some(date) {
            tracing::debug!("Habit '{}' already completed on {}", name, date);
            return Ok(Outcome::Unchanged);
        }

        habit.last_completed = Some(date);
        habit.streak = habit.streak.saturating_add(1);
        tracing::info!("Habit '{}' completed, streak {}", name, habit.streak);
        self.persist()?;
        Ok(Outcome::Updated)
    }

    /// Change a habit's frequency in place
    pub fn edit(&mut self, name: &str, frequency: HabitFrequency) -> Result<Outcome> {
        let Some(habit) = self.habits.get_mut(name) else {
            tracing::warn!("Habit '{}' not found", name);
            return Ok(Outcome::NotFound);
        };

        habit.frequency = frequency;
        tracing::info!("Habit '{}' frequency set to {}", name, frequency);
        self.persist()?;
        Ok(Outcome::Updated)
    }

    /// Remove every habit
    pub fn reset(&mut self) -> Result<()> {
        self.habits.clear();
        tracing::info!("Reset all habits");
        self.persist()
    }

    /// (name, streak) pairs for charting
    pub fn streaks(&self) -> Vec<(String, u32)> {
        self.habits
            .values()
            .map(|h| (h.name.clone(), h.streak))
            .collect()
    }

    fn persist(&self) -> Result<()> {
        self.store.save(self.habits.values()).map_err(|e| {
            tracing::error!("Error saving habits to {:?}: {}", self.store.path(), e);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tracker_in(dir: &tempfile::TempDir) -> HabitTracker {
        HabitTracker::open(dir.path().join("habits.csv"))
    }

    #[test]
    fn test_add_then_load_starts_at_zero() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut tracker = tracker_in(&temp_dir);
        tracker.add("stretch", HabitFrequency::Weekly).unwrap();

        let reloaded = tracker_in(&temp_dir);
        let habit = reloaded.get("stretch").unwrap();
        assert_eq!(habit.frequency, HabitFrequency::Weekly);
        assert_eq!(habit.streak, 0);
        assert_eq!(habit.last_completed, None);
    }

    #[test]
    fn test_add_overwrites_existing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut tracker = tracker_in(&temp_dir);
        tracker.add("read", HabitFrequency::Daily).unwrap();
        tracker.mark_completed_on("read", day(2024, 5, 1)).unwrap();

        tracker.add("read", HabitFrequency::Monthly).unwrap();
        let habit = tracker.get("read").unwrap();
        assert_eq!(habit.streak, 0);
        assert_eq!(habit.frequency, HabitFrequency::Monthly);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_add_rejects_empty_name() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut tracker = tracker_in(&temp_dir);
        assert!(matches!(
            tracker.add("  ", HabitFrequency::Daily),
            Err(Error::Validation(_))
        ));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_mark_completed_same_day_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut tracker = tracker_in(&temp_dir);
        tracker.add("walk", HabitFrequency::Daily).unwrap();

        let d = day(2024, 5, 1);
        assert_eq!(tracker.mark_completed_on("walk", d).unwrap(), Outcome::Updated);
        assert_eq!(tracker.mark_completed_on("walk", d).unwrap(), Outcome::Unchanged);

        let reloaded = tracker_in(&temp_dir);
        let habit = reloaded.get("walk").unwrap();
        assert_eq!(habit.streak, 1);
        assert_eq!(habit.last_completed, Some(d));
    }

    #[test]
    fn test_mark_completed_consecutive_days() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut tracker = tracker_in(&temp_dir);
        tracker.add("walk", HabitFrequency::Daily).unwrap();

        let d = day(2024, 5, 1);
        tracker.mark_completed_on("walk", d).unwrap();
        tracker.mark_completed_on("walk", d + Duration::days(1)).unwrap();

        assert_eq!(tracker.get("walk").unwrap().streak, 2);
    }

    #[test]
    fn test_streak_survives_missed_days() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut tracker = tracker_in(&temp_dir);
        tracker.add("walk", HabitFrequency::Daily).unwrap();

        tracker.mark_completed_on("walk", day(2024, 5, 1)).unwrap();
        tracker.mark_completed_on("walk", day(2024, 5, 20)).unwrap();

        assert_eq!(tracker.get("walk").unwrap().streak, 2);
    }

    #[test]
    fn test_mark_unknown_habit_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut tracker = tracker_in(&temp_dir);
        tracker.add("walk", HabitFrequency::Daily).unwrap();
        let before = std::fs::read_to_string(temp_dir.path().join("habits.csv")).unwrap();

        let outcome = tracker.mark_completed_on("swim", day(2024, 5, 1)).unwrap();
        assert_eq!(outcome, Outcome::NotFound);
        let after = std::fs::read_to_string(temp_dir.path().join("habits.csv")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_edit_frequency() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut tracker = tracker_in(&temp_dir);
        tracker.add("journal", HabitFrequency::Daily).unwrap();
        tracker.mark_completed_on("journal", day(2024, 5, 1)).unwrap();

        assert_eq!(
            tracker.edit("journal", HabitFrequency::Weekly).unwrap(),
            Outcome::Updated
        );
        assert_eq!(
            tracker.edit("missing", HabitFrequency::Weekly).unwrap(),
            Outcome::NotFound
        );

        let reloaded = tracker_in(&temp_dir);
        let habit = reloaded.get("journal").unwrap();
        assert_eq!(habit.frequency, HabitFrequency::Weekly);
        assert_eq!(habit.streak, 1);
    }

    #[test]
    fn test_reset_clears_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut tracker = tracker_in(&temp_dir);
        tracker.add("a", HabitFrequency::Daily).unwrap();
        tracker.add("b", HabitFrequency::Weekly).unwrap();

        tracker.reset().unwrap();
        assert!(tracker.is_empty());
        assert!(tracker_in(&temp_dir).is_empty());
    }

    #[test]
    fn test_roundtrip_preserves_collection() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut tracker = tracker_in(&temp_dir);
        tracker.add("a", HabitFrequency::Daily).unwrap();
        tracker.add("b", HabitFrequency::Monthly).unwrap();
        tracker.mark_completed_on("b", day(2024, 2, 29)).unwrap();

        let reloaded = tracker_in(&temp_dir);
        let original: Vec<_> = tracker.habits().cloned().collect();
        let loaded: Vec<_> = reloaded.habits().cloned().collect();
        assert_eq!(original, loaded);
    }

    #[test]
    fn test_streaks_view() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut tracker = tracker_in(&temp_dir);
        tracker.add("b", HabitFrequency::Daily).unwrap();
        tracker.add("a", HabitFrequency::Daily).unwrap();
        tracker.mark_completed_on("b", day(2024, 1, 1)).unwrap();

        assert_eq!(
            tracker.streaks(),
            vec![("a".to_string(), 0), ("b".to_string(), 1)]
        );
    }

    #[test]
    fn test_reads_file_written_by_hand() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            temp_dir.path().join("habits.csv"),
            "name,frequency,streak,last_completed\nfloss,daily,4,2024-06-01\nrun,weekly,0,\n",
        )
        .unwrap();

        let tracker = tracker_in(&temp_dir);
        assert_eq!(tracker.len(), 2);
        let floss = tracker.get("floss").unwrap();
        assert_eq!(floss.streak, 4);
        assert_eq!(floss.last_completed, Some(day(2024, 6, 1)));
        assert_eq!(tracker.get("run").unwrap().last_completed, None);
    }

    #[test]
    fn test_streak_saturates_at_max() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            temp_dir.path().join("habits.csv"),
            "name,frequency,streak,last_completed\nfloss,daily,4294967295,2024-06-01\n",
        )
        .unwrap();

        let mut tracker = tracker_in(&temp_dir);
        let outcome = tracker.mark_completed_on("floss", day(2024, 6, 2)).unwrap();
        assert_eq!(outcome, Outcome::Updated);
        assert_eq!(tracker.get("floss").unwrap().streak, u32::MAX);
        assert_eq!(tracker.get("floss").unwrap().last_completed, Some(day(2024, 6, 2)));
    }

    #[test]
    fn test_failed_save_keeps_in_memory_change() {
        let temp_dir = tempfile::tempdir().unwrap();
        let data_dir = temp_dir.path().join("data");
        let mut tracker = HabitTracker::open(data_dir.join("habits.csv"));
        assert!(tracker.is_empty());

        // Replace the data directory with a regular file so saves cannot land
        std::fs::remove_dir_all(&data_dir).unwrap();
        std::fs::write(&data_dir, "not a directory").unwrap();

        let result = tracker.add("stretch", HabitFrequency::Daily);
        assert!(result.is_err());
        assert_eq!(tracker.len(), 1);
        assert!(tracker.get("stretch").is_some());
    }

    #[test]
    fn test_missing_name_column_degrades_to_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            temp_dir.path().join("habits.csv"),
            "habit,frequency,streak,last_completed\nfloss,daily,4,\n",
        )
        .unwrap();

        let tracker = tracker_in(&temp_dir);
        assert!(tracker.is_empty());
    }
}
