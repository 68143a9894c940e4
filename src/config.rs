//! Settings for registration and room allocation.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::{
    env,
    sync::{Arc, PoisonError, RwLock},
};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::RoomType;

/// Configuration constants the command processors and read models depend on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// How long a reservation holds a slot before it silently expires.
    pub registration_period_minutes: i64,
    /// Room types whose participants can be paired to share a room.
    pub shareable_room_types: Vec<RoomType>,
    /// How many times a command is run when saving hits a concurrency conflict.
    pub max_save_attempts: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            registration_period_minutes: 30,
            shareable_room_types: vec![RoomType::BedInDouble, RoomType::BedInJunior],
            max_save_attempts: 3,
        }
    }
}

impl Settings {
    /// Load settings from environment variables.
    ///
    /// Absent or unparsable values fall back to [`Settings::default`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            registration_period_minutes: var("REGISTRATION_PERIOD_MINUTES")
                .and_then(|s| s.parse().ok())
                .filter(|minutes: &i64| *minutes > 0 && TimeDelta::try_minutes(*minutes).is_some())
                .unwrap_or(defaults.registration_period_minutes),
            shareable_room_types: var("SHAREABLE_ROOM_TYPES")
                .and_then(|s| parse_room_types(&s))
                .unwrap_or(defaults.shareable_room_types),
            max_save_attempts: var("MAX_SAVE_ATTEMPTS")
                .and_then(|s| s.parse().ok())
                .filter(|attempts: &u32| *attempts > 0)
                .unwrap_or(defaults.max_save_attempts),
        }
    }

    /// Saturates at [`TimeDelta::MAX`] for periods chrono cannot represent.
    pub fn registration_period(&self) -> TimeDelta {
        TimeDelta::try_minutes(self.registration_period_minutes).unwrap_or(TimeDelta::MAX)
    }

    pub fn is_shareable(&self, room_type: RoomType) -> bool {
        self.shareable_room_types.contains(&room_type)
    }
}

fn parse_room_types(raw: &str) -> Option<Vec<RoomType>> {
    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| part.parse().ok())
        .collect()
}

/// Source of the current time for read models and appended events.
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<RwLock<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(RwLock::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: TimeDelta) {
        *self.now.write().unwrap_or_else(PoisonError::into_inner) += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn defaults_share_doubles_and_junior_beds() {
        let settings = Settings::default();

        assert_eq!(settings.registration_period(), TimeDelta::minutes(30));
        assert!(settings.is_shareable(RoomType::BedInDouble));
        assert!(settings.is_shareable(RoomType::BedInJunior));
        assert!(!settings.is_shareable(RoomType::Single));
        assert!(!settings.is_shareable(RoomType::Junior));
    }

    #[test]
    fn room_type_lists_must_be_fully_valid() {
        assert_eq!(
            parse_room_types("single, junior"),
            Some(vec![RoomType::Single, RoomType::Junior])
        );
        assert_eq!(parse_room_types("single,penthouse"), None);
    }

    #[test]
    fn unusable_environment_values_fall_back_to_defaults() {
        let settings = Settings::from_vars(|key| match key {
            "REGISTRATION_PERIOD_MINUTES" => Some("200000000000000".to_string()),
            "SHAREABLE_ROOM_TYPES" => Some("penthouse".to_string()),
            "MAX_SAVE_ATTEMPTS" => Some("0".to_string()),
            _ => None,
        });

        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn environment_values_override_defaults() {
        let settings = Settings::from_vars(|key| match key {
            "REGISTRATION_PERIOD_MINUTES" => Some("45".to_string()),
            "SHAREABLE_ROOM_TYPES" => Some("bed_in_double".to_string()),
            "MAX_SAVE_ATTEMPTS" => Some("5".to_string()),
            _ => None,
        });

        assert_eq!(settings.registration_period(), TimeDelta::minutes(45));
        assert_eq!(settings.shareable_room_types, vec![RoomType::BedInDouble]);
        assert_eq!(settings.max_save_attempts, 5);
    }

    #[test]
    fn huge_periods_saturate_instead_of_panicking() {
        let settings = Settings {
            registration_period_minutes: 200_000_000_000_000,
            ..Settings::default()
        };

        assert_eq!(settings.registration_period(), TimeDelta::MAX);
    }

    #[test]
    fn fixed_clock_survives_a_poisoned_lock() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        let poisoner = clock.clone();

        let _ = std::thread::spawn(move || {
            let _guard = poisoner.now.write().unwrap();
            panic!("poison the clock");
        })
        .join();

        clock.advance(TimeDelta::minutes(5));
        assert_eq!(clock.now(), start + TimeDelta::minutes(5));

        clock.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn fixed_clock_clones_share_time() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        let other = clock.clone();

        clock.advance(TimeDelta::minutes(5));

        assert_eq!(other.now(), start + TimeDelta::minutes(5));
    }
}
