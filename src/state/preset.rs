//! Interval presets and the four-slot preset store

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{Phase, SessionStopAfter, StartPhase};
use crate::error::PresetError;

pub const PRESET_COUNT: usize = 4;
pub const MAX_INTERVAL_MINUTES: f64 = 120.0;
pub const MAX_WORK_INTERVALS_PER_SET: u32 = 10;

/// One named configuration of interval lengths and session behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preset {
    pub work_minutes: f64,
    pub short_rest_minutes: f64,
    pub long_rest_minutes: f64,
    pub work_intervals_per_set: u32,
    pub start_phase: StartPhase,
    pub session_stop_after: SessionStopAfter,
    pub focus_mode_on_work: bool,
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            work_minutes: 25.0,
            short_rest_minutes: 5.0,
            long_rest_minutes: 15.0,
            work_intervals_per_set: 4,
            start_phase: StartPhase::Work,
            session_stop_after: SessionStopAfter::Disabled,
            focus_mode_on_work: false,
        }
    }
}

impl Preset {
    /// Length of the given phase in minutes. Idle has no length.
    pub fn minutes_for(&self, phase: Phase) -> Option<f64> {
        match phase {
            Phase::Idle => None,
            Phase::Work => Some(self.work_minutes),
            Phase::ShortRest => Some(self.short_rest_minutes),
            Phase::LongRest => Some(self.long_rest_minutes),
        }
    }

    pub fn seconds_for(&self, phase: Phase) -> Option<f64> {
        self.minutes_for(phase).map(|m| m * 60.0)
    }

    /// The phase a start from idle enters
    pub fn first_phase(&self) -> Phase {
        match self.start_phase {
            StartPhase::Work => Phase::Work,
            StartPhase::Rest => Phase::ShortRest,
        }
    }

    pub fn set_minutes(&mut self, phase: Phase, minutes: f64) -> Result<(), PresetError> {
        check_length(phase, minutes)?;
        match phase {
            Phase::Idle => return Err(PresetError::NoLengthForIdle),
            Phase::Work => self.work_minutes = minutes,
            Phase::ShortRest => self.short_rest_minutes = minutes,
            Phase::LongRest => self.long_rest_minutes = minutes,
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), PresetError> {
        check_length(Phase::Work, self.work_minutes)?;
        check_length(Phase::ShortRest, self.short_rest_minutes)?;
        check_length(Phase::LongRest, self.long_rest_minutes)?;
        if !(1..=MAX_WORK_INTERVALS_PER_SET).contains(&self.work_intervals_per_set) {
            return Err(PresetError::InvalidIntervalCount {
                count: self.work_intervals_per_set,
                max: MAX_WORK_INTERVALS_PER_SET,
            });
        }
        Ok(())
    }

    /// Short lengths used for manual end-to-end runs
    pub fn test_mode() -> Self {
        Self {
            work_minutes: 0.1,
            short_rest_minutes: 0.1,
            long_rest_minutes: 0.2,
            work_intervals_per_set: 2,
            ..Self::default()
        }
    }
}

fn check_length(phase: Phase, minutes: f64) -> Result<(), PresetError> {
    if minutes.is_finite() && minutes > 0.0 && minutes <= MAX_INTERVAL_MINUTES {
        Ok(())
    } else {
        Err(PresetError::InvalidLength { phase, minutes, max: MAX_INTERVAL_MINUTES })
    }
}

/// Ordered collection of presets with exactly one current index
#[derive(Debug, Clone, PartialEq)]
pub struct PresetStore {
    presets: [Preset; PRESET_COUNT],
    current: usize,
}

impl Default for PresetStore {
    fn default() -> Self {
        Self {
            presets: std::array::from_fn(|_| Preset::default()),
            current: 0,
        }
    }
}

impl PresetStore {
    /// Build a store from up to four presets; missing slots get defaults
    pub fn from_presets(presets: Vec<Preset>) -> Result<Self, PresetError> {
        let mut store = Self::default();
        for (slot, preset) in store.presets.iter_mut().zip(presets) {
            preset.validate()?;
            *slot = preset;
        }
        Ok(store)
    }

    /// Parse a JSON array of presets
    pub fn from_json(json: &str) -> Result<Self, PresetError> {
        let presets: Vec<Preset> = serde_json::from_str(json)?;
        Self::from_presets(presets)
    }

    pub fn load(path: &Path) -> Result<Self, PresetError> {
        let json = std::fs::read_to_string(path).map_err(|source| PresetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load from a file, falling back to the defaults when it is missing or malformed
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(store) => {
                info!("Loaded presets from {}", path.display());
                store
            }
            Err(e) => {
                warn!("Using default presets: {}", e);
                Self::default()
            }
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &Preset {
        &self.presets[self.current]
    }

    pub fn current_mut(&mut self) -> &mut Preset {
        &mut self.presets[self.current]
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn select(&mut self, index: usize) -> Result<(), PresetError> {
        if index >= PRESET_COUNT {
            return Err(PresetError::IndexOutOfRange { index, len: PRESET_COUNT });
        }
        self.current = index;
        Ok(())
    }

    pub fn replace_current(&mut self, preset: Preset) -> Result<(), PresetError> {
        preset.validate()?;
        self.presets[self.current] = preset;
        Ok(())
    }

    pub fn replace(&mut self, index: usize, preset: Preset) -> Result<(), PresetError> {
        preset.validate()?;
        let slot = self
            .presets
            .get_mut(index)
            .ok_or(PresetError::IndexOutOfRange { index, len: PRESET_COUNT })?;
        *slot = preset;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_preset_is_classic_pomodoro() {
        let preset = Preset::default();
        assert_eq!(preset.seconds_for(Phase::Work), Some(1500.0));
        assert_eq!(preset.seconds_for(Phase::ShortRest), Some(300.0));
        assert_eq!(preset.seconds_for(Phase::LongRest), Some(900.0));
        assert_eq!(preset.seconds_for(Phase::Idle), None);
        assert_eq!(preset.first_phase(), Phase::Work);
        assert!(preset.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut preset = Preset::default();
        assert!(preset.set_minutes(Phase::Work, 0.0).is_err());
        assert!(preset.set_minutes(Phase::Work, 121.0).is_err());
        assert!(preset.set_minutes(Phase::Idle, 5.0).is_err());
        assert_eq!(preset.work_minutes, 25.0);

        preset.work_intervals_per_set = 0;
        assert!(matches!(
            preset.validate(),
            Err(PresetError::InvalidIntervalCount { count: 0, .. })
        ));
    }

    #[test]
    fn rest_start_enters_short_rest() {
        let preset = Preset { start_phase: StartPhase::Rest, ..Preset::default() };
        assert_eq!(preset.first_phase(), Phase::ShortRest);
    }

    #[test]
    fn store_selects_within_bounds() {
        let mut store = PresetStore::default();
        assert_eq!(store.current_index(), 0);
        store.select(3).unwrap();
        assert_eq!(store.current_index(), 3);
        assert!(matches!(
            store.select(4),
            Err(PresetError::IndexOutOfRange { index: 4, len: 4 })
        ));
        assert_eq!(store.current_index(), 3);
    }

    #[test]
    fn store_parses_partial_json() {
        let store = PresetStore::from_json(
            r#"[{"workMinutes": 50, "shortRestMinutes": 10}, {"sessionStopAfter": "work"}]"#,
        )
        .unwrap();
        assert_eq!(store.presets()[0].work_minutes, 50.0);
        assert_eq!(store.presets()[0].long_rest_minutes, 15.0);
        assert_eq!(store.presets()[1].session_stop_after, SessionStopAfter::Work);
        assert_eq!(store.presets()[3], Preset::default());
    }

    #[test]
    fn load_falls_back_on_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(PresetStore::load(file.path()).is_err());
        assert_eq!(PresetStore::load_or_default(file.path()), PresetStore::default());
    }
}
