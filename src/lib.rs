// Library interface for Twenty
// This allows tests and both binaries to access the crate's functionality

pub mod app_state;
pub mod config;
pub mod constants;
pub mod prefs;
pub mod scheduler;
pub mod setting;
pub mod settings;

use anyhow::{Context, Result};
use app_state::AppState;
use chrono::Local;
use log::{debug, info, warn};
use parking_lot::Mutex;
use prefs::PrefStore;
use scheduler::{Scheduled, Schedulator};
use settings::Settings;
use std::sync::Arc;
use std::time::Duration;

/// Core Twenty functionality shared between CLI and Tray App
pub struct TwentyCore {
    pub state: AppState,
    store: Mutex<Box<dyn PrefStore + Send>>,
    schedulator: Schedulator,
    schedule: Mutex<Option<Scheduled>>,
}

impl TwentyCore {
    /// Create a new TwentyCore over the given preference store.
    pub fn new(developer_mode: bool, store: Box<dyn PrefStore + Send>) -> Self {
        Self {
            state: AppState::new(developer_mode),
            store: Mutex::new(store),
            schedulator: Schedulator::new(),
            schedule: Mutex::new(None),
        }
    }

    /// Load stored settings into the active snapshot.
    ///
    /// On any load failure the hardcoded fallback settings are applied and
    /// written back to the store, so the user can recognize the reset next
    /// time they open the settings. A load failure is never fatal.
    ///
    /// Returns true if the stored settings were used, false if the
    /// fallback had to be applied.
    pub fn load_settings(&self) -> bool {
        let loaded = {
            let store = self.store.lock();
            Settings::load_from(&**store)
        };
        match loaded {
            Ok(settings) => {
                info!("Loaded stored settings");
                self.state.set_settings(settings);
                true
            }
            Err(e) => {
                warn!("Could not load stored settings ({e}); applying fallback settings");
                self.state.set_settings(Settings::FALLBACK);
                if let Err(e) = self.persist_settings(&Settings::FALLBACK) {
                    warn!("Could not write fallback settings back to the store: {e:#}");
                }
                false
            }
        }
    }

    /// Replace the active settings with a wholly new instance, persist
    /// them, and reschedule the interrupt with the new session length.
    pub fn apply_settings(self: &Arc<Self>, new: Settings) -> Result<()> {
        self.state.set_settings(new);
        // Stored after every change: a fallback may have been substituted
        // somewhere, and the user should see what is actually in effect.
        self.persist_settings(&new)?;
        self.resync_schedule();
        Ok(())
    }

    fn persist_settings(&self, settings: &Settings) -> Result<()> {
        let mut store = self.store.lock();
        settings.store_to(&mut **store);
        store.persist().context("Failed to persist settings")
    }

    /// Start the periodic interrupt schedule.
    pub fn start(self: &Arc<Self>) {
        let delay = self.current_session_delay();
        let core = Arc::downgrade(self);
        let command: Arc<dyn Fn() + Send + Sync> = Arc::new(move || {
            if let Some(core) = core.upgrade() {
                core.deliver_interrupt();
                // The effective session length can flip when the night
                // limit kicks in; pick it up for the next cycle.
                core.resync_schedule();
            }
        });
        let scheduled = self.schedulator.schedule(delay, command);
        info!("Interrupt scheduled every {} seconds", delay.as_secs());
        *self.schedule.lock() = Some(scheduled);
    }

    /// Pause interrupt delivery and stop the schedule thread.
    pub fn pause(&self) {
        self.state.set_paused(true);
        if let Some(scheduled) = self.schedule.lock().as_ref() {
            scheduled.cancel();
        }
    }

    /// Resume interrupt delivery with a fresh full session.
    pub fn resume(&self) {
        self.state.set_paused(false);
        self.resync_schedule();
    }

    /// Fire an interrupt immediately, subject to the usual visibility
    /// guard. Used by the developer-mode "Test Interrupt" action.
    pub fn interrupt_now(&self) {
        self.deliver_interrupt();
    }

    /// The session delay currently in effect (day or night).
    pub fn current_session_delay(&self) -> Duration {
        self.state
            .settings()
            .effective_session_duration(Local::now())
            .as_duration()
    }

    /// Cancel and restart the schedule if its delay no longer matches the
    /// effective session duration, or if it was cancelled by a pause.
    fn resync_schedule(&self) {
        let delay = self.current_session_delay();
        let mut slot = self.schedule.lock();
        match slot.take() {
            Some(scheduled) => {
                if scheduled.is_cancelled() || scheduled.delay() != delay {
                    *slot = Some(self.schedulator.reschedule(scheduled, delay));
                    info!("Interrupt rescheduled every {} seconds", delay.as_secs());
                } else {
                    *slot = Some(scheduled);
                }
            }
            None => debug!("No schedule to resync; call start() first"),
        }
    }

    /// Deliver one break interrupt: claim the visibility slot, show the
    /// reminder for the configured break length, release the slot.
    fn deliver_interrupt(&self) {
        if !self.state.begin_interrupt() {
            debug!("Skipping interrupt: paused or previous interrupt still visible");
            return;
        }

        let settings = self.state.settings();
        let break_duration = settings.break_duration;
        info!(
            "Break time: look at something 20 feet away for {break_duration} (interrupt #{})",
            self.state.interrupts_delivered()
        );

        let mut notification = notify_rust::Notification::new();
        notification
            .summary("Twenty - Time for a break")
            .body(&format!(
                "Look at something 20 feet away for {break_duration}."
            ))
            .timeout(notify_rust::Timeout::Milliseconds(
                break_duration.get() * 1000,
            ));
        if settings.play_alert_sound.get() {
            notification.sound_name("default");
        }
        if let Err(e) = notification.show() {
            warn!("Failed to show break notification: {e}");
        }

        // The interrupt stays "visible" for the whole break; another tick
        // arriving meanwhile is skipped by the guard.
        std::thread::sleep(break_duration.as_duration());
        self.state.end_interrupt();
    }
}
