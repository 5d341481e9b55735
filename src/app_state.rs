//! Shared application context
//!
//! One [`AppState`] handle is created at startup and cloned into every
//! thread that needs it. The process start timestamp and the developer
//! mode flag are set exactly once at construction and read-only
//! thereafter; everything mutable lives behind a single mutex.

use crate::settings::Settings;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Application state shared across modules
#[derive(Clone)]
pub struct AppState {
    shared: Arc<Shared>,
}

struct Shared {
    /// When the process started, for total screen time display.
    start_time: Instant,
    /// Whether the app runs with developer extras (test interrupt, debug
    /// title). Decided once from the CLI flag.
    developer_mode: bool,
    inner: Mutex<AppStateInner>,
}

struct AppStateInner {
    /// The active settings snapshot
    settings: Settings,
    /// Whether interrupt scheduling is paused
    paused: bool,
    /// Whether an interrupt is currently showing (re-entrancy guard)
    interrupt_visible: bool,
    /// How many interrupts have been delivered this session
    interrupts_delivered: u64,
}

impl AppState {
    pub fn new(developer_mode: bool) -> Self {
        Self {
            shared: Arc::new(Shared {
                start_time: Instant::now(),
                developer_mode,
                inner: Mutex::new(AppStateInner {
                    settings: Settings::FALLBACK,
                    paused: false,
                    interrupt_visible: false,
                    interrupts_delivered: 0,
                }),
            }),
        }
    }

    pub fn is_developer_mode(&self) -> bool {
        self.shared.developer_mode
    }

    /// Total screen time since the process started.
    pub fn time_since_start(&self) -> Duration {
        self.shared.start_time.elapsed()
    }

    pub fn settings(&self) -> Settings {
        self.shared.inner.lock().settings
    }

    pub fn set_settings(&self, settings: Settings) {
        self.shared.inner.lock().settings = settings;
    }

    pub fn is_paused(&self) -> bool {
        self.shared.inner.lock().paused
    }

    pub fn set_paused(&self, paused: bool) {
        self.shared.inner.lock().paused = paused;
        log::info!("Interrupts {}", if paused { "paused" } else { "resumed" });
    }

    /// Try to claim the interrupt slot. Returns false when an interrupt is
    /// already showing or scheduling is paused; the caller must skip the
    /// interrupt in that case and call [`AppState::end_interrupt`] only
    /// after a successful claim.
    pub fn begin_interrupt(&self) -> bool {
        let mut state = self.shared.inner.lock();
        if state.paused || state.interrupt_visible {
            return false;
        }
        state.interrupt_visible = true;
        state.interrupts_delivered += 1;
        true
    }

    pub fn end_interrupt(&self) {
        self.shared.inner.lock().interrupt_visible = false;
    }

    pub fn is_interrupt_visible(&self) -> bool {
        self.shared.inner.lock().interrupt_visible
    }

    pub fn interrupts_delivered(&self) -> u64 {
        self.shared.inner.lock().interrupts_delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = AppState::new(false);
        assert!(!state.is_developer_mode());
        assert!(!state.is_paused());
        assert!(!state.is_interrupt_visible());
        assert_eq!(state.interrupts_delivered(), 0);
        assert_eq!(state.settings(), Settings::FALLBACK);
    }

    #[test]
    fn test_developer_mode_set_once() {
        let state = AppState::new(true);
        assert!(state.is_developer_mode());
        // Clones observe the same flag
        assert!(state.clone().is_developer_mode());
    }

    #[test]
    fn test_interrupt_guard_blocks_reentry() {
        let state = AppState::new(false);

        assert!(state.begin_interrupt(), "First claim should succeed");
        assert!(state.is_interrupt_visible());
        assert!(
            !state.begin_interrupt(),
            "Second claim while visible should fail"
        );
        assert_eq!(state.interrupts_delivered(), 1, "Skipped interrupt not counted");

        state.end_interrupt();
        assert!(state.begin_interrupt(), "Claim after end should succeed");
        assert_eq!(state.interrupts_delivered(), 2);
    }

    #[test]
    fn test_paused_blocks_interrupts() {
        let state = AppState::new(false);
        state.set_paused(true);
        assert!(!state.begin_interrupt(), "Paused state should skip interrupts");
        assert_eq!(state.interrupts_delivered(), 0);

        state.set_paused(false);
        assert!(state.begin_interrupt());
    }

    #[test]
    fn test_settings_swap_is_whole_instance() {
        let state = AppState::new(false);
        let mut updated = Settings::FALLBACK;
        updated.play_alert_sound = crate::setting::Toggle(true);

        state.set_settings(updated);
        assert_eq!(state.settings(), updated);
        assert_ne!(state.settings(), Settings::FALLBACK);
    }

    #[test]
    fn test_time_since_start_advances() {
        let state = AppState::new(false);
        let first = state.time_since_start();
        std::thread::sleep(Duration::from_millis(10));
        assert!(state.time_since_start() > first);
    }
}
