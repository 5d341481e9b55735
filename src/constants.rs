//! Centralized constants for the Twenty application
//!
//! This module contains all configurable numerical values used throughout
//! the application. Each constant includes documentation on its purpose,
//! unit, and recommended value range.

// ============================================================================
// BREAK DURATION CONFIGURATION
// ============================================================================

/// Minimum break duration allowed (the "20 seconds" of 20-20-20).
/// Unit: seconds
/// Range: Fixed minimum, do not change without updating UI validation
pub const BREAK_MIN_SECONDS: u32 = 20;

/// Maximum break duration allowed.
/// Unit: seconds
/// Range: Fixed maximum (1 minute)
pub const BREAK_MAX_SECONDS: u32 = 60;

// ============================================================================
// SESSION DURATION CONFIGURATION
// ============================================================================

/// Minimum screen session length between interrupts.
/// Unit: minutes
/// Range: Fixed minimum, prevents interrupt storms
pub const SESSION_MIN_MINUTES: u32 = 5;

/// Maximum screen session length between interrupts (the "20 minutes").
/// Unit: minutes
/// Range: Fixed maximum, do not change without updating UI validation
pub const SESSION_MAX_MINUTES: u32 = 20;

/// Session length applied after the night limit is reached, in the
/// fallback configuration.
/// Unit: minutes
/// Recommended range: 5-10 (shorter sessions late at night)
pub const NIGHT_SESSION_FALLBACK_MINUTES: u32 = 5;

/// Clock time at which the night limit kicks in, in the fallback
/// configuration (21:00).
pub const NIGHT_LIMIT_FALLBACK_HOUR: u8 = 21;
pub const NIGHT_LIMIT_FALLBACK_MINUTE: u8 = 0;

// ============================================================================
// SCHEDULER & THREAD INTERVALS
// ============================================================================

/// Scheduler wakeup granularity while waiting out a delay. Cancellation
/// and rescheduling take effect within this interval.
/// Unit: milliseconds
/// Recommended range: 100-1000 (lower = more responsive, higher = less CPU)
pub const SCHEDULER_POLL_INTERVAL_MS: u64 = 250;

/// Tray app state-watch interval for icon/menu updates.
/// Unit: milliseconds
/// Recommended range: 100-1000
pub const TRAY_WATCH_INTERVAL_MS: u64 = 500;

// ============================================================================
// NOTIFICATION TIMEOUTS
// ============================================================================

/// Standard notification display duration (state changes, settings reset).
/// Unit: milliseconds
/// Recommended range: 2000-5000 (long enough to read, short enough to not annoy)
pub const NOTIFICATION_TIMEOUT_MS: u32 = 3000;

// ============================================================================
// FILE PERMISSIONS
// ============================================================================

/// Preference file permissions (user read/write only).
/// Unit: Unix permission bits (octal)
pub const PREFS_FILE_PERMISSIONS: u32 = 0o600;

/// Permission mask to check for group/other access.
/// Unit: Unix permission bits (octal)
/// Range: Fixed, used for the permissive-mode warning
pub const PREFS_PERMISSION_MASK_GROUP_OTHER: u32 = 0o077;
