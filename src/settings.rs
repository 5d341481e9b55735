//! Settings aggregate and loader
//!
//! [`Settings`] is the immutable snapshot of every configurable value in
//! the application. It is built either from [`Settings::FALLBACK`] or by
//! [`Settings::load_from`] over a flat key-value preference store; a
//! "change" constructs a whole new instance via [`SettingsPatch`], never a
//! mutation in place.
//!
//! Per-field metadata (group, display ordinal, variant tag) lives in the
//! static [`ENTRIES`] table, in declared field order. Settings-dialog
//! layout code reads it to decide which section a field's control belongs
//! in; the loader reads it to know which parser each key dispatches to.

use crate::constants::{
    NIGHT_LIMIT_FALLBACK_HOUR, NIGHT_LIMIT_FALLBACK_MINUTE, NIGHT_SESSION_FALLBACK_MINUTES,
};
use crate::prefs::PrefStore;
use crate::setting::{
    ActiveOn, BreakSeconds, LocalHmTime, LookAndFeel, SessionMinutes, SettingKind,
    SettingParseError, SettingValue, Toggle, Weekday,
};
use chrono::{DateTime, Datelike, Local, Timelike};
use log::warn;
use thiserror::Error;

pub const KEY_SESSION_DURATION: &str = "sessionDuration";
pub const KEY_BREAK_DURATION: &str = "breakDuration";
pub const KEY_NIGHT_LIMIT_TIME: &str = "nightLimitTime";
pub const KEY_NIGHT_LIMIT_ACTIVE: &str = "nightLimitActive";
pub const KEY_NIGHT_SESSION_DURATION: &str = "nightSessionDuration";
pub const KEY_LOOK_AND_FEEL: &str = "lookAndFeel";
pub const KEY_PLAY_ALERT_SOUND: &str = "playAlertSound";

/// Visual section a setting belongs to. Presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    /// Standard settings, in effect before the night limit is reached.
    Day,
    /// Settings controlling behavior after the night limit is reached.
    Night,
    /// General appearance & behavior of the app.
    AppBehavior,
}

/// One row of the settings metadata table.
#[derive(Debug, Clone, Copy)]
pub struct SettingsEntry {
    pub key: &'static str,
    pub group: Group,
    pub ordinal: u8,
    pub kind: SettingKind,
}

/// Static per-field metadata, one row per [`Settings`] field in declared
/// field order. Built once at compile time; the missing-key precheck
/// reports the first absent key in this order.
pub static ENTRIES: [SettingsEntry; 7] = [
    SettingsEntry {
        key: KEY_SESSION_DURATION,
        group: Group::Day,
        ordinal: 1,
        kind: SettingKind::SessionMinutes,
    },
    SettingsEntry {
        key: KEY_BREAK_DURATION,
        group: Group::Day,
        ordinal: 2,
        kind: SettingKind::BreakSeconds,
    },
    SettingsEntry {
        key: KEY_NIGHT_LIMIT_TIME,
        group: Group::Night,
        ordinal: 1,
        kind: SettingKind::LocalHmTime,
    },
    SettingsEntry {
        key: KEY_NIGHT_LIMIT_ACTIVE,
        group: Group::Night,
        ordinal: 2,
        kind: SettingKind::ActiveOn,
    },
    SettingsEntry {
        key: KEY_NIGHT_SESSION_DURATION,
        group: Group::Night,
        ordinal: 3,
        kind: SettingKind::SessionMinutes,
    },
    SettingsEntry {
        key: KEY_LOOK_AND_FEEL,
        group: Group::AppBehavior,
        ordinal: 1,
        kind: SettingKind::LookAndFeel,
    },
    SettingsEntry {
        key: KEY_PLAY_ALERT_SOUND,
        group: Group::AppBehavior,
        ordinal: 2,
        kind: SettingKind::Toggle,
    },
];

/// Why a load attempt failed. Both variants are recoverable at the call
/// site: the documented caller behavior is to log, apply
/// [`Settings::FALLBACK`] and proceed, never to abort.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The store lacks a required key entirely. Reported once per load
    /// attempt, for the first missing key in [`ENTRIES`] order.
    #[error("missing entry in preferences: {0}")]
    MissingKey(&'static str),
    /// A present key's stored value failed its variant parser.
    #[error("invalid stored value for {key}")]
    Parse {
        key: &'static str,
        #[source]
        source: SettingParseError,
    },
}

impl SettingsError {
    /// The preference key the failure is about.
    pub fn key(&self) -> &'static str {
        match self {
            SettingsError::MissingKey(key) => key,
            SettingsError::Parse { key, .. } => key,
        }
    }
}

/// The full immutable settings aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub session_duration: SessionMinutes,
    pub break_duration: BreakSeconds,
    pub night_limit_time: LocalHmTime,
    pub night_limit_active: ActiveOn,
    pub night_session_duration: SessionMinutes,
    pub look_and_feel: LookAndFeel,
    pub play_alert_sound: Toggle,
}

impl Settings {
    /// Hardcoded always-valid settings, applied when no stored preferences
    /// exist or a load fails. The night limit is off by default (empty day
    /// set), and the cross-platform look and feel always works.
    pub const FALLBACK: Settings = Settings {
        session_duration: SessionMinutes::MAX,
        break_duration: BreakSeconds::MIN,
        night_limit_time: LocalHmTime::at(NIGHT_LIMIT_FALLBACK_HOUR, NIGHT_LIMIT_FALLBACK_MINUTE),
        night_limit_active: ActiveOn::NONE,
        night_session_duration: SessionMinutes::of(NIGHT_SESSION_FALLBACK_MINUTES),
        look_and_feel: LookAndFeel::CrossPlatform,
        play_alert_sound: Toggle(false),
    };

    /// Load settings from a preference store.
    ///
    /// First checks that every key in [`ENTRIES`] is listed by the store;
    /// any absent key fails the whole call with
    /// [`SettingsError::MissingKey`] before anything is parsed. Then each
    /// key is read and parsed through its variant's parser; a malformed
    /// value fails the call with [`SettingsError::Parse`].
    ///
    /// A key that is listed but reads back `None` is tolerated: some store
    /// backends list keys inconsistently with reads, and crashing on that
    /// would throw away every other stored value. The hole is filled from
    /// [`Settings::FALLBACK`] and logged, so the returned aggregate is
    /// always complete. Suspect behavior, kept for backend compatibility.
    pub fn load_from(store: &dyn PrefStore) -> Result<Settings, SettingsError> {
        let listed = store.keys();
        if let Some(entry) = ENTRIES.iter().find(|e| !listed.iter().any(|k| k == e.key)) {
            return Err(SettingsError::MissingKey(entry.key));
        }

        let mut patch = SettingsPatch::default();
        for entry in &ENTRIES {
            match store.get(entry.key) {
                Some(raw) => {
                    let value = SettingValue::parse_as(entry.kind, &raw)
                        .map_err(|source| SettingsError::Parse {
                            key: entry.key,
                            source,
                        })?;
                    patch.put(entry.key, value);
                }
                None => warn!(
                    "Preference key '{}' is listed but reads back empty; keeping fallback value",
                    entry.key
                ),
            }
        }
        Ok(patch.apply_to(&Settings::FALLBACK))
    }

    /// Write every field's canonical string form back to the store.
    pub fn store_to(&self, store: &mut dyn PrefStore) {
        for entry in &ENTRIES {
            if let Some(value) = self.value_of(entry.key) {
                store.put(entry.key, &value.to_string());
            }
        }
    }

    /// The value stored under `key`, or `None` for a key not present in
    /// [`ENTRIES`].
    pub fn value_of(&self, key: &str) -> Option<SettingValue> {
        Some(match key {
            KEY_SESSION_DURATION => SettingValue::SessionMinutes(self.session_duration),
            KEY_BREAK_DURATION => SettingValue::BreakSeconds(self.break_duration),
            KEY_NIGHT_LIMIT_TIME => SettingValue::LocalHmTime(self.night_limit_time),
            KEY_NIGHT_LIMIT_ACTIVE => SettingValue::ActiveOn(self.night_limit_active),
            KEY_NIGHT_SESSION_DURATION => SettingValue::SessionMinutes(self.night_session_duration),
            KEY_LOOK_AND_FEEL => SettingValue::LookAndFeel(self.look_and_feel),
            KEY_PLAY_ALERT_SOUND => SettingValue::Toggle(self.play_alert_sound),
            _ => return None,
        })
    }

    /// Whether the night limit is in effect at `now`: today's weekday is in
    /// the active set and the clock has reached the limit time.
    pub fn night_limit_applies(&self, now: DateTime<Local>) -> bool {
        let today = Weekday::from(now.weekday());
        self.night_limit_active.contains(today)
            && now.hour() * 60 + now.minute() >= self.night_limit_time.minutes_of_day()
    }

    /// The session length to schedule at `now`: the night session length
    /// once the night limit applies, the day session length otherwise.
    pub fn effective_session_duration(&self, now: DateTime<Local>) -> SessionMinutes {
        if self.night_limit_applies(now) {
            self.night_session_duration
        } else {
            self.session_duration
        }
    }
}

/// A partial field set for constructing a new [`Settings`] from an old
/// one. Fields left `None` keep the base aggregate's value, so the applied
/// configuration is never left undefined.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsPatch {
    pub session_duration: Option<SessionMinutes>,
    pub break_duration: Option<BreakSeconds>,
    pub night_limit_time: Option<LocalHmTime>,
    pub night_limit_active: Option<ActiveOn>,
    pub night_session_duration: Option<SessionMinutes>,
    pub look_and_feel: Option<LookAndFeel>,
    pub play_alert_sound: Option<Toggle>,
}

impl SettingsPatch {
    /// Set the field stored under `key`. The key and the value's variant
    /// are statically paired through [`ENTRIES`]; a mismatch means the
    /// table and this struct drifted apart.
    fn put(&mut self, key: &str, value: SettingValue) {
        match (key, value) {
            (KEY_SESSION_DURATION, SettingValue::SessionMinutes(v)) => {
                self.session_duration = Some(v);
            }
            (KEY_BREAK_DURATION, SettingValue::BreakSeconds(v)) => {
                self.break_duration = Some(v);
            }
            (KEY_NIGHT_LIMIT_TIME, SettingValue::LocalHmTime(v)) => {
                self.night_limit_time = Some(v);
            }
            (KEY_NIGHT_LIMIT_ACTIVE, SettingValue::ActiveOn(v)) => {
                self.night_limit_active = Some(v);
            }
            (KEY_NIGHT_SESSION_DURATION, SettingValue::SessionMinutes(v)) => {
                self.night_session_duration = Some(v);
            }
            (KEY_LOOK_AND_FEEL, SettingValue::LookAndFeel(v)) => {
                self.look_and_feel = Some(v);
            }
            (KEY_PLAY_ALERT_SOUND, SettingValue::Toggle(v)) => {
                self.play_alert_sound = Some(v);
            }
            (key, value) => unreachable!("mismatched entry {key} / {:?}", value.kind()),
        }
    }

    /// Construct a complete aggregate: set fields from the patch, the rest
    /// from `base`.
    pub fn apply_to(&self, base: &Settings) -> Settings {
        Settings {
            session_duration: self.session_duration.unwrap_or(base.session_duration),
            break_duration: self.break_duration.unwrap_or(base.break_duration),
            night_limit_time: self.night_limit_time.unwrap_or(base.night_limit_time),
            night_limit_active: self.night_limit_active.unwrap_or(base.night_limit_active),
            night_session_duration: self
                .night_session_duration
                .unwrap_or(base.night_session_duration),
            look_and_feel: self.look_and_feel.unwrap_or(base.look_and_feel),
            play_alert_sound: self.play_alert_sound.unwrap_or(base.play_alert_sound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_entries_cover_every_field_once() {
        assert_eq!(ENTRIES.len(), 7);
        for (i, a) in ENTRIES.iter().enumerate() {
            for b in &ENTRIES[i + 1..] {
                assert_ne!(a.key, b.key, "Duplicate key in ENTRIES");
                assert!(
                    a.group != b.group || a.ordinal != b.ordinal,
                    "Duplicate (group, ordinal) for {} and {}",
                    a.key,
                    b.key
                );
            }
        }
        // Every entry resolves against a Settings instance
        for entry in &ENTRIES {
            assert_eq!(
                Settings::FALLBACK.value_of(entry.key).unwrap().kind(),
                entry.kind
            );
        }
        assert_eq!(
            Settings::FALLBACK.value_of("noSuchKey"),
            None,
            "Unknown keys resolve to nothing, not a panic"
        );
    }

    #[test]
    fn test_fallback_round_trips_through_its_own_parsers() {
        for entry in &ENTRIES {
            let value = Settings::FALLBACK.value_of(entry.key).unwrap();
            let reparsed = SettingValue::parse_as(entry.kind, &value.to_string())
                .unwrap_or_else(|e| panic!("fallback {} does not re-parse: {e}", entry.key));
            assert_eq!(reparsed, value);
        }
    }

    #[test]
    fn test_patch_keeps_base_values_for_unset_fields() {
        let patch = SettingsPatch {
            break_duration: Some(BreakSeconds::MAX),
            ..Default::default()
        };
        let updated = patch.apply_to(&Settings::FALLBACK);
        assert_eq!(updated.break_duration, BreakSeconds::MAX);
        assert_eq!(updated.session_duration, Settings::FALLBACK.session_duration);
        assert_eq!(updated.look_and_feel, Settings::FALLBACK.look_and_feel);
    }

    #[test]
    fn test_night_limit_requires_active_day() {
        // 2026-08-31 is a Monday
        let monday_late = Local.with_ymd_and_hms(2026, 8, 31, 22, 0, 0).unwrap();

        let mut settings = Settings::FALLBACK;
        assert!(
            !settings.night_limit_applies(monday_late),
            "Empty day set keeps the limit off"
        );

        settings.night_limit_active = ActiveOn::new([Weekday::Monday]);
        assert!(settings.night_limit_applies(monday_late));
        assert_eq!(
            settings.effective_session_duration(monday_late),
            settings.night_session_duration
        );

        settings.night_limit_active = ActiveOn::new([Weekday::Tuesday]);
        assert!(!settings.night_limit_applies(monday_late));
    }

    #[test]
    fn test_night_limit_requires_limit_time_reached() {
        let monday_noon = Local.with_ymd_and_hms(2026, 8, 31, 12, 0, 0).unwrap();
        let monday_2100 = Local.with_ymd_and_hms(2026, 8, 31, 21, 0, 0).unwrap();

        let mut settings = Settings::FALLBACK;
        settings.night_limit_active = ActiveOn::new([Weekday::Monday]);

        assert!(!settings.night_limit_applies(monday_noon));
        assert_eq!(
            settings.effective_session_duration(monday_noon),
            settings.session_duration
        );
        // Boundary: the limit time itself is already "night"
        assert!(settings.night_limit_applies(monday_2100));
    }
}
