//! Environment-variable overrides for Twenty
//!
//! The primary configuration source is the preference store (see the
//! prefs module). These variables optionally override individual durations
//! for one run, without touching stored preferences:
//!
//! - TWENTY_SESSION_MINUTES: Override the session length (5-20)
//! - TWENTY_BREAK_SECONDS: Override the break length (20-60)

use crate::setting::{BreakSeconds, SessionMinutes};
use log::{debug, info, warn};
use std::env;

/// Parse the TWENTY_SESSION_MINUTES environment variable
///
/// Returns Some if a valid session length is configured (5-20 minutes)
/// Returns None if not set or invalid
pub fn parse_session_override() -> Option<SessionMinutes> {
    match env::var("TWENTY_SESSION_MINUTES") {
        Ok(val) => match val.parse::<u32>().map(SessionMinutes::new) {
            Ok(Ok(minutes)) => {
                info!(
                    "Session duration set via environment variable: {}",
                    minutes
                );
                Some(minutes)
            }
            Ok(Err(e)) => {
                warn!("Invalid TWENTY_SESSION_MINUTES: {}. Using stored settings.", e);
                None
            }
            Err(e) => {
                warn!(
                    "Failed to parse TWENTY_SESSION_MINUTES: {}. Using stored settings.",
                    e
                );
                None
            }
        },
        Err(_) => {
            debug!("TWENTY_SESSION_MINUTES not set.");
            None
        }
    }
}

/// Parse the TWENTY_BREAK_SECONDS environment variable
///
/// Returns Some if a valid break length is configured (20-60 seconds)
/// Returns None if not set or invalid
pub fn parse_break_override() -> Option<BreakSeconds> {
    match env::var("TWENTY_BREAK_SECONDS") {
        Ok(val) => match val.parse::<u32>().map(BreakSeconds::new) {
            Ok(Ok(seconds)) => {
                info!("Break duration set via environment variable: {}", seconds);
                Some(seconds)
            }
            Ok(Err(e)) => {
                warn!("Invalid TWENTY_BREAK_SECONDS: {}. Using stored settings.", e);
                None
            }
            Err(e) => {
                warn!(
                    "Failed to parse TWENTY_BREAK_SECONDS: {}. Using stored settings.",
                    e
                );
                None
            }
        },
        Err(_) => {
            debug!("TWENTY_BREAK_SECONDS not set.");
            None
        }
    }
}
