use twenty::prefs::{MemoryPrefStore, PrefStore};
use twenty::setting::{ActiveOn, BreakSeconds, LookAndFeel, SessionMinutes, Weekday};
use twenty::settings::{Settings, SettingsError, ENTRIES};

/// A store holding a canonical value for every settings key.
fn full_store() -> MemoryPrefStore {
    let mut store = MemoryPrefStore::new();
    store.put("breakDuration", "20s");
    store.put("sessionDuration", "20min");
    store.put("nightLimitTime", "21:00");
    store.put("nightLimitActive", "{}");
    store.put("nightSessionDuration", "5min");
    store.put("playAlertSound", "false");
    store.put("lookAndFeel", "CROSS_PLATFORM");
    store
}

#[test]
fn test_load_full_store() {
    // Scenario A: every key present with a legal value
    let settings = Settings::load_from(&full_store()).expect("Load should succeed");

    assert!(settings.night_limit_active.is_empty());
    assert_eq!(settings.break_duration.to_string(), "20s");
    assert_eq!(settings.session_duration, SessionMinutes::MAX);
    assert_eq!(settings.night_limit_time.to_string(), "21:00");
    assert_eq!(settings.look_and_feel, LookAndFeel::CrossPlatform);
    assert!(!settings.play_alert_sound.get());
}

#[test]
fn test_load_rejects_out_of_range_value() {
    // Scenario B: well-formed text whose value breaks the range invariant
    let mut store = full_store();
    store.put("sessionDuration", "25min");

    let err = Settings::load_from(&store).expect_err("25min must fail the 20min maximum");
    match err {
        SettingsError::Parse { key, .. } => assert_eq!(key, "sessionDuration"),
        other => panic!("Expected a parse failure, got {other:?}"),
    }
}

#[test]
fn test_load_reports_missing_key() {
    // Scenario C: one key absent entirely
    let mut store = MemoryPrefStore::new();
    for entry in &ENTRIES {
        if entry.key != "lookAndFeel" {
            let value = Settings::FALLBACK.value_of(entry.key).unwrap();
            store.put(entry.key, &value.to_string());
        }
    }

    let err = Settings::load_from(&store).expect_err("Missing key must fail the load");
    match err {
        SettingsError::MissingKey(key) => assert_eq!(key, "lookAndFeel"),
        other => panic!("Expected MissingKey, got {other:?}"),
    }
}

#[test]
fn test_missing_key_check_is_all_or_nothing() {
    // Even with every other value malformed, key presence is checked first
    // and the load fails before any parsing happens
    let mut store = MemoryPrefStore::new();
    store.put("breakDuration", "garbage");

    let err = Settings::load_from(&store).expect_err("Load must fail");
    match err {
        SettingsError::MissingKey(key) => {
            // First missing key in declared field order
            assert_eq!(key, "sessionDuration");
        }
        other => panic!("Expected MissingKey, got {other:?}"),
    }
}

#[test]
fn test_load_tolerates_listed_but_unreadable_key() {
    // A key the backend lists but cannot read back is not an error: the
    // field comes from the fallback aggregate and everything else loads
    let mut store = full_store();
    store.put("sessionDuration", "15min");
    store.put_listed_only("nightLimitTime");

    let settings = Settings::load_from(&store).expect("Unreadable key must not fail the load");
    assert_eq!(
        settings.night_limit_time,
        Settings::FALLBACK.night_limit_time
    );
    assert_eq!(settings.session_duration, SessionMinutes::new(15).unwrap());
}

#[test]
fn test_load_fails_fast_on_malformed_value() {
    let mut store = full_store();
    store.put("sessionDuration", "not-a-number");

    let err = Settings::load_from(&store).expect_err("Malformed value must fail the load");
    assert_eq!(err.key(), "sessionDuration");
}

#[test]
fn test_load_day_set() {
    // Scenario D: a two-element day set parses and round-trips
    let mut store = full_store();
    store.put("nightLimitActive", "{MONDAY,WEDNESDAY}");

    let settings = Settings::load_from(&store).expect("Load should succeed");
    let set = settings.night_limit_active;
    assert_eq!(set.len(), 2);
    assert!(set.contains(Weekday::Monday));
    assert!(set.contains(Weekday::Wednesday));
    assert_eq!(set.to_string().parse::<ActiveOn>().unwrap(), set);
}

#[test]
fn test_store_load_round_trip() {
    let mut settings = Settings::FALLBACK;
    settings.break_duration = BreakSeconds::new(30).unwrap();
    settings.night_limit_active = ActiveOn::new([Weekday::Friday, Weekday::Saturday]);

    let mut store = MemoryPrefStore::new();
    settings.store_to(&mut store);

    let reloaded = Settings::load_from(&store).expect("Stored settings must reload");
    assert_eq!(reloaded, settings);
}

#[test]
fn test_entries_order_drives_missing_key_reporting() {
    // Empty store: the first declared field is the one reported
    let err = Settings::load_from(&MemoryPrefStore::new()).unwrap_err();
    match err {
        SettingsError::MissingKey(key) => assert_eq!(key, ENTRIES[0].key),
        other => panic!("Expected MissingKey, got {other:?}"),
    }
}
