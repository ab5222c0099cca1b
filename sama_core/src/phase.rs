//! Cycle phase engine.
//!
//! Maps a calendar date to a phase of the menstrual cycle given the cycle
//! profile and the last period start date. Everything here is pure.
//!
//! ## Phase boundaries
//!
//! Measured in whole days since the last period started:
//!
//! 1. **Menstrual**: `[0, menstrual_length)`
//! 2. **Follicular**: up to `menstrual_end + cycle_length / 2`
//! 3. **Ovulation**: one day
//! 4. **Luteal**: the remainder of the cycle
//!
//! Dates before the stored start are not guarded and classify as menstrual.

use crate::{Error, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

pub const DEFAULT_CYCLE_LENGTH: u32 = 28;
pub const DEFAULT_MENSTRUAL_LENGTH: u32 = 5;
pub const CYCLE_LENGTH_RANGE: RangeInclusive<u32> = 21..=35;
pub const MENSTRUAL_LENGTH_RANGE: RangeInclusive<u32> = 3..=7;

/// Luteal length assumed by the proportion view
const CHART_LUTEAL_DAYS: i64 = 14;
const OVULATION_DAYS: i64 = 1;

/// Phases of the cycle, in order
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Menstrual,
    Follicular,
    Ovulation,
    Luteal,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Menstrual,
        Phase::Follicular,
        Phase::Ovulation,
        Phase::Luteal,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Menstrual => "Menstrual",
            Phase::Follicular => "Follicular",
            Phase::Ovulation => "Ovulation",
            Phase::Luteal => "Luteal",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Phase", self.label())
    }
}

/// Result of classifying a date
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "status", content = "phase", rename_all = "snake_case")]
pub enum PhaseReading {
    /// No last period start date is recorded
    NoDateSet,
    InPhase(Phase),
    /// The date lies past the end of the predicted cycle
    CycleReset,
}

impl fmt::Display for PhaseReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseReading::NoDateSet => f.write_str("No last period date set."),
            PhaseReading::InPhase(phase) => write!(f, "{}", phase),
            PhaseReading::CycleReset => f.write_str("Cycle has reset or invalid date"),
        }
    }
}

/// Exclusive day offsets where each phase ends
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseBoundaries {
    pub menstrual_end: i64,
    pub follicular_end: i64,
    pub ovulation_end: i64,
    pub luteal_end: i64,
}

impl PhaseBoundaries {
    /// Classify a day offset from the last period start
    pub fn classify(&self, days_since_last_period: i64) -> PhaseReading {
        let d = days_since_last_period;
        if d < self.menstrual_end {
            PhaseReading::InPhase(Phase::Menstrual)
        } else if d < self.follicular_end {
            PhaseReading::InPhase(Phase::Follicular)
        } else if d < self.ovulation_end {
            PhaseReading::InPhase(Phase::Ovulation)
        } else if d < self.luteal_end {
            PhaseReading::InPhase(Phase::Luteal)
        } else {
            PhaseReading::CycleReset
        }
    }
}

/// One slice of the phase proportion view
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct PhaseShare {
    pub phase: Phase,
    pub days: i64,
    pub fraction: f64,
}

/// Cycle and menstrual lengths in days
///
/// Ranges are not enforced here; callers use [`CycleProfile::validate`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleProfile {
    pub cycle_length: u32,
    pub menstrual_length: u32,
}

impl Default for CycleProfile {
    fn default() -> Self {
        Self {
            cycle_length: DEFAULT_CYCLE_LENGTH,
            menstrual_length: DEFAULT_MENSTRUAL_LENGTH,
        }
    }
}

impl CycleProfile {
    pub fn new(cycle_length: u32, menstrual_length: u32) -> Self {
        Self {
            cycle_length,
            menstrual_length,
        }
    }

    /// Build a profile, falling back to 28/5 for absent values
    pub fn with_defaults(cycle_length: Option<u32>, menstrual_length: Option<u32>) -> Self {
        Self {
            cycle_length: cycle_length.unwrap_or(DEFAULT_CYCLE_LENGTH),
            menstrual_length: menstrual_length.unwrap_or(DEFAULT_MENSTRUAL_LENGTH),
        }
    }

    /// Check the 21–35 / 3–7 day ranges
    pub fn validate(&self) -> Result<()> {
        if !CYCLE_LENGTH_RANGE.contains(&self.cycle_length) {
            return Err(Error::Validation(format!(
                "cycle length {} outside {}..={}",
                self.cycle_length,
                CYCLE_LENGTH_RANGE.start(),
                CYCLE_LENGTH_RANGE.end()
            )));
        }
        if !MENSTRUAL_LENGTH_RANGE.contains(&self.menstrual_length) {
            return Err(Error::Validation(format!(
                "menstrual length {} outside {}..={}",
                self.menstrual_length,
                MENSTRUAL_LENGTH_RANGE.start(),
                MENSTRUAL_LENGTH_RANGE.end()
            )));
        }
        Ok(())
    }

    pub fn boundaries(&self) -> PhaseBoundaries {
        let cycle_length = i64::from(self.cycle_length);
        let menstrual_end = i64::from(self.menstrual_length);
        let follicular_length = cycle_length / 2;
        let follicular_end = menstrual_end + follicular_length;
        let ovulation_end = follicular_end + OVULATION_DAYS;
        let luteal_end =
            ovulation_end + (cycle_length - menstrual_end - follicular_length - OVULATION_DAYS);

        PhaseBoundaries {
            menstrual_end,
            follicular_end,
            ovulation_end,
            luteal_end,
        }
    }

    /// Classify `current` against a cycle that started on `last_start`
    pub fn current_phase(&self, last_start: Option<NaiveDate>, current: NaiveDate) -> PhaseReading {
        match last_start {
            None => PhaseReading::NoDateSet,
            Some(start) => self.boundaries().classify((current - start).num_days()),
        }
    }

    /// Start of the next period, one cycle after `last_start`
    pub fn predict_next_period(&self, last_start: Option<NaiveDate>) -> Option<NaiveDate> {
        last_start.map(|start| start + Duration::days(i64::from(self.cycle_length)))
    }

    /// Day counts and fractions for each phase, in phase order
    ///
    /// Assumes a 14-day luteal phase and a single ovulation day; the
    /// follicular phase takes what remains and never goes negative.
    pub fn phase_proportions(&self) -> Vec<PhaseShare> {
        let menstrual = i64::from(self.menstrual_length);
        let follicular =
            (i64::from(self.cycle_length) - (menstrual + CHART_LUTEAL_DAYS)).max(0);
        let days = [menstrual, follicular, OVULATION_DAYS, CHART_LUTEAL_DAYS];
        let total: i64 = days.iter().sum();

        Phase::ALL
            .iter()
            .zip(days)
            .map(|(phase, days)| PhaseShare {
                phase: *phase,
                days,
                fraction: if total > 0 {
                    days as f64 / total as f64
                } else {
                    0.0
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn phase_on(profile: &CycleProfile, offset: i64) -> PhaseReading {
        profile.current_phase(Some(start()), start() + Duration::days(offset))
    }

    #[test]
    fn test_default_profile_phases() {
        let profile = CycleProfile::default();

        assert_eq!(phase_on(&profile, 0), PhaseReading::InPhase(Phase::Menstrual));
        assert_eq!(phase_on(&profile, 4), PhaseReading::InPhase(Phase::Menstrual));
        assert_eq!(phase_on(&profile, 5), PhaseReading::InPhase(Phase::Follicular));
        assert_eq!(phase_on(&profile, 14), PhaseReading::InPhase(Phase::Follicular));
        assert_eq!(phase_on(&profile, 18), PhaseReading::InPhase(Phase::Follicular));
        assert_eq!(phase_on(&profile, 19), PhaseReading::InPhase(Phase::Ovulation));
        assert_eq!(phase_on(&profile, 20), PhaseReading::InPhase(Phase::Luteal));
        assert_eq!(phase_on(&profile, 27), PhaseReading::InPhase(Phase::Luteal));
        assert_eq!(phase_on(&profile, 28), PhaseReading::CycleReset);
    }

    #[test]
    fn test_default_boundaries() {
        let b = CycleProfile::default().boundaries();
        assert_eq!(
            b,
            PhaseBoundaries {
                menstrual_end: 5,
                follicular_end: 19,
                ovulation_end: 20,
                luteal_end: 28,
            }
        );
    }

    #[test]
    fn test_luteal_end_matches_cycle_length_across_ranges() {
        for cycle in CYCLE_LENGTH_RANGE {
            for menstrual in MENSTRUAL_LENGTH_RANGE {
                let b = CycleProfile::new(cycle, menstrual).boundaries();
                assert_eq!(b.luteal_end, i64::from(cycle));
                assert!(b.menstrual_end < b.follicular_end);
                assert!(b.ovulation_end <= b.luteal_end);
            }
        }
    }

    #[test]
    fn test_date_before_start_is_menstrual() {
        let profile = CycleProfile::default();
        assert_eq!(phase_on(&profile, -3), PhaseReading::InPhase(Phase::Menstrual));
    }

    #[test]
    fn test_no_date_set() {
        let profile = CycleProfile::default();
        assert_eq!(profile.current_phase(None, start()), PhaseReading::NoDateSet);
        assert_eq!(profile.predict_next_period(None), None);
    }

    #[test]
    fn test_predict_next_period() {
        let profile = CycleProfile::default();
        assert_eq!(
            profile.predict_next_period(Some(start())),
            Some(start() + Duration::days(28))
        );

        let short = CycleProfile::new(21, 3);
        assert_eq!(
            short.predict_next_period(Some(start())),
            NaiveDate::from_ymd_opt(2024, 3, 22)
        );
    }

    #[test]
    fn test_with_defaults() {
        assert_eq!(CycleProfile::with_defaults(None, None), CycleProfile::default());
        assert_eq!(
            CycleProfile::with_defaults(Some(30), None),
            CycleProfile::new(30, 5)
        );
    }

    #[test]
    fn test_validate_ranges() {
        assert!(CycleProfile::new(21, 3).validate().is_ok());
        assert!(CycleProfile::new(35, 7).validate().is_ok());
        assert!(CycleProfile::new(20, 5).validate().is_err());
        assert!(CycleProfile::new(28, 8).validate().is_err());
    }

    #[test]
    fn test_phase_proportions() {
        let shares = CycleProfile::default().phase_proportions();
        let days: Vec<_> = shares.iter().map(|s| (s.phase, s.days)).collect();
        assert_eq!(
            days,
            vec![
                (Phase::Menstrual, 5),
                (Phase::Follicular, 9),
                (Phase::Ovulation, 1),
                (Phase::Luteal, 14),
            ]
        );

        let total: f64 = shares.iter().map(|s| s.fraction).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_phase_proportions_short_cycle_floors_follicular() {
        let shares = CycleProfile::new(21, 7).phase_proportions();
        assert_eq!(shares[1].days, 0);
    }

    #[test]
    fn test_reading_display() {
        assert_eq!(
            PhaseReading::InPhase(Phase::Luteal).to_string(),
            "Luteal Phase"
        );
        assert_eq!(
            PhaseReading::CycleReset.to_string(),
            "Cycle has reset or invalid date"
        );
    }
}
