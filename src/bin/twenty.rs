// Twenty CLI - terminal flavor of the 20-20-20 screen-break reminder
// Runs headless: break reminders arrive as desktop notifications

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use twenty::prefs::FilePrefStore;
use twenty::setting::{BreakSeconds, SessionMinutes, Toggle};
use twenty::settings::{Settings, SettingsPatch};
use twenty::{config, TwentyCore};

/// Desktop 20-20-20 screen-break reminder
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Desktop 20-20-20 screen-break reminder",
    long_about = "Desktop 20-20-20 screen-break reminder.

Every 20 minutes of screen time, Twenty interrupts you with a reminder to
look at something 20 feet (6 meters) away for 20 seconds, an eye-strain
mitigation recommended by optometrists.

SETUP:
  Stored preferences live at (Linux) ~/.config/twenty/prefs.toml.
  Run 'twenty --setup' to write them interactively; without stored
  preferences Twenty runs on its built-in fallback settings.

OVERRIDES (this run only, not persisted):
  --session N               Session length in minutes (5-20)
  TWENTY_SESSION_MINUTES    Same, via environment
  TWENTY_BREAK_SECONDS      Break length in seconds (20-60)"
)]
struct Args {
    /// Run in developer mode (extra diagnostics, test interrupt fires at startup)
    #[arg(long)]
    dev: bool,

    /// Session length override in minutes (5-20, overrides stored settings)
    #[arg(long)]
    session: Option<u32>,

    /// Run interactive setup to write stored preferences
    #[arg(long)]
    setup: bool,
}

/// Helper function to prompt for a number with a default value
fn prompt_number(prompt: &str, default: u32) -> Result<u32> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    if input.is_empty() {
        Ok(default)
    } else {
        input
            .parse::<u32>()
            .with_context(|| format!("Invalid number: {}", input))
    }
}

/// Run interactive setup to write the preference file
fn run_setup() -> Result<()> {
    println!("Twenty Setup");
    println!("============\n");

    let session = prompt_number("Session length in minutes (default: 20): ", 20)?;
    let session = SessionMinutes::new(session).context("Invalid session length")?;

    let break_secs = prompt_number("Break length in seconds (default: 20): ", 20)?;
    let break_secs = BreakSeconds::new(break_secs).context("Invalid break length")?;

    print!("Play alert sound with reminders? [y/N]: ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    let alert = matches!(answer.trim(), "y" | "Y" | "yes");

    let settings = SettingsPatch {
        session_duration: Some(session),
        break_duration: Some(break_secs),
        play_alert_sound: Some(Toggle(alert)),
        ..Default::default()
    }
    .apply_to(&Settings::FALLBACK);

    // An unreadable file is no obstacle here: setup rewrites it anyway
    let mut store = FilePrefStore::open_or_empty();
    settings.store_to(&mut store);
    store.save().context("Failed to save preferences")?;

    println!("\nPreferences saved to: {}", store.path().display());
    println!("Setup complete!");
    println!("\nYou can now run 'twenty' to start the reminder.");

    Ok(())
}

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Handle setup command
    if args.setup {
        return run_setup();
    }

    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting Twenty{}", if args.dev { " (Developer Mode)" } else { "" });

    // Open the preference store and load stored settings (fallback on any
    // load failure - a broken store must never prevent startup)
    let store = FilePrefStore::open_or_empty();
    let core = Arc::new(TwentyCore::new(args.dev, Box::new(store)));
    core.load_settings();

    // Session length precedence: CLI arg > env var > stored settings.
    // Overrides apply to this run only and are not persisted.
    let session_override = match args.session {
        Some(minutes) => match SessionMinutes::new(minutes) {
            Ok(session) => {
                info!("Session length set via --session argument: {}", session);
                Some(session)
            }
            Err(e) => {
                warn!("Invalid --session value: {e}. Using environment variable or stored settings.");
                config::parse_session_override()
            }
        },
        None => config::parse_session_override(),
    };
    let overrides = SettingsPatch {
        session_duration: session_override,
        break_duration: config::parse_break_override(),
        ..Default::default()
    };
    core.state
        .set_settings(overrides.apply_to(&core.state.settings()));

    // Start the periodic interrupt schedule
    core.start();

    let settings = core.state.settings();
    info!(
        "Twenty is running - break of {} every {} (press Ctrl+C to quit)",
        settings.break_duration, settings.session_duration
    );

    if args.dev {
        info!("Developer mode: delivering a test interrupt");
        core.interrupt_now();
    }

    // Park the main thread; all work happens on the schedulator thread
    loop {
        std::thread::sleep(Duration::from_secs(60));
        let elapsed = core.state.time_since_start();
        log::debug!(
            "Screen time: {} min, interrupts delivered: {}",
            elapsed.as_secs() / 60,
            core.state.interrupts_delivered()
        );
    }
}
