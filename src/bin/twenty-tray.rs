// Twenty Tray App - system tray flavor of the 20-20-20 screen-break reminder
// Lives in the tray; break reminders arrive as desktop notifications

use anyhow::{Context, Result};
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;
use tao::event_loop::{ControlFlow, EventLoopBuilder};
use tray_icon::menu::{Menu, MenuItem, MenuEvent, PredefinedMenuItem};
use tray_icon::TrayIconBuilder;
use twenty::constants::{NOTIFICATION_TIMEOUT_MS, TRAY_WATCH_INTERVAL_MS};
use twenty::prefs::FilePrefStore;
use twenty::TwentyCore;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let developer_mode = std::env::args().any(|arg| arg == "--dev");
    let title = if developer_mode {
        "Twenty (Developer Mode)"
    } else {
        "Twenty"
    };
    info!("Starting {title} v{VERSION}");

    // Open the preference store and load stored settings; any load failure
    // falls back to the built-in settings and is never fatal
    let store = FilePrefStore::open_or_empty();
    let core = Arc::new(TwentyCore::new(developer_mode, Box::new(store)));
    core.load_settings();
    core.start();

    // Create event loop for tray app
    let event_loop = EventLoopBuilder::new().build();

    // Build tray menu
    let info_item = MenuItem::new("Info", true, None);
    let pause_item = MenuItem::new("Pause", true, None);
    let test_item = MenuItem::new("Test Interrupt", true, None);
    let separator = PredefinedMenuItem::separator();
    let version_item = MenuItem::new(format!("Version {VERSION}"), true, None);
    let quit_item = MenuItem::new("Quit", true, None);

    let menu = Menu::new();
    menu.append(&info_item).context("Failed to add info menu item")?;
    menu.append(&pause_item).context("Failed to add pause menu item")?;
    if developer_mode {
        menu.append(&test_item)
            .context("Failed to add test menu item")?;
    }
    menu.append(&separator).context("Failed to add separator")?;
    menu.append(&version_item)
        .context("Failed to add version menu item")?;
    menu.append(&quit_item).context("Failed to add quit menu item")?;

    // Create tray icon
    let icon = create_icon_active();
    let tray = TrayIconBuilder::new()
        .with_menu(Box::new(menu))
        .with_tooltip(title)
        .with_icon(icon)
        .build()
        .context("Failed to create tray icon")?;

    info!("Tray icon created, running event loop");

    // Clone IDs for event handling
    let info_id = info_item.id().clone();
    let pause_id = pause_item.id().clone();
    let test_id = test_item.id().clone();
    let version_id = version_item.id().clone();
    let quit_id = quit_item.id().clone();

    // Spawn thread to monitor paused state and update menu/icon
    let tray_handle = tray.clone();
    let core_for_watch = core.clone();
    std::thread::spawn(move || {
        let mut was_paused = false;
        loop {
            std::thread::sleep(Duration::from_millis(TRAY_WATCH_INTERVAL_MS));

            let is_paused = core_for_watch.state.is_paused();
            if is_paused != was_paused {
                was_paused = is_paused;

                // Update icon
                let icon = if is_paused {
                    create_icon_paused()
                } else {
                    create_icon_active()
                };
                if let Err(e) = tray_handle.set_icon(Some(icon)) {
                    error!("Failed to update tray icon: {e}");
                }

                // Update menu item text
                let label = if is_paused { "Resume" } else { "Pause" };
                pause_item.set_text(label);
            }
        }
    });

    // Run event loop
    event_loop.run(move |_event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        // Handle menu events
        if let Ok(event) = MenuEvent::receiver().try_recv() {
            let event_id = event.id;

            if event_id == info_id {
                show_info(&core);
            } else if event_id == pause_id {
                handle_pause_toggle(&core);
            } else if event_id == test_id {
                info!("Test interrupt requested from menu");
                let core = core.clone();
                // Delivery blocks for the break length; keep the loop live
                std::thread::spawn(move || core.interrupt_now());
            } else if event_id == version_id {
                show_version();
            } else if event_id == quit_id {
                info!("Quit menu item clicked, exiting");
                *control_flow = ControlFlow::Exit;
            }
        }
    });
}

/// Handle pause/resume from the menu
fn handle_pause_toggle(core: &Arc<TwentyCore>) {
    if core.state.is_paused() {
        core.resume();
        info!("Interrupts resumed via menu");
    } else {
        core.pause();
        info!("Interrupts paused via menu");
    }
}

/// Show session info: total screen time and interrupt count
fn show_info(core: &Arc<TwentyCore>) {
    let minutes = core.state.time_since_start().as_secs() / 60;
    let settings = core.state.settings();
    let body = format!(
        "Screen time: {} h {} min\nBreaks delivered: {}\nSession length: {}, break length: {}",
        minutes / 60,
        minutes % 60,
        core.state.interrupts_delivered(),
        settings.session_duration,
        settings.break_duration,
    );
    show_notification("Twenty - Info", &body);
}

/// Show version information
fn show_version() {
    show_notification(
        "Twenty",
        &format!("Twenty Tray App\nVersion {VERSION}\n\nA 20-20-20 screen-break reminder."),
    );
}

fn show_notification(summary: &str, body: &str) {
    if let Err(e) = notify_rust::Notification::new()
        .summary(summary)
        .body(body)
        .timeout(notify_rust::Timeout::Milliseconds(NOTIFICATION_TIMEOUT_MS))
        .show()
    {
        error!("Failed to show notification: {e}");
    }
}

/// Create the active icon (solid green square)
fn create_icon_active() -> tray_icon::Icon {
    create_solid_icon([46, 160, 67, 255])
}

/// Create the paused icon (solid gray square)
fn create_icon_paused() -> tray_icon::Icon {
    create_solid_icon([128, 128, 128, 255])
}

/// Create a 32x32 solid-color RGBA icon.
/// This is a simple implementation. For production, load PNG/ICNS files.
fn create_solid_icon(color: [u8; 4]) -> tray_icon::Icon {
    let size = 32;
    let mut rgba = vec![0u8; (size * size * 4) as usize];

    for i in 0..(size * size) as usize {
        rgba[i * 4..i * 4 + 4].copy_from_slice(&color);
    }

    tray_icon::Icon::from_rgba(rgba, size, size).expect("Failed to create icon")
}
