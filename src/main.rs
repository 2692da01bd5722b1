//! Looprec - record pointer input and replay it in a loop
//!
//! Run with `looprec` or `looprec daemon` to start the daemon.
//! Use `looprec toggle` to toggle from a compositor keybinding or script.
//! Use `looprec settings` to change the saved speed and hotkey.

use anyhow::{anyhow, Context};
use clap::Parser;
use looprec::cli::{Cli, Commands};
use looprec::config::{self, Config};
use looprec::daemon::Daemon;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use nix::sys::signal::Signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("looprec={},warn", log_level))),
        )
        .with_target(false)
        .init();

    // Load configuration
    let mut config = config::load_config(cli.config.as_deref());

    // Apply CLI overrides
    if let Some(speed) = cli.speed {
        config.speed_multiplier = speed;
    }
    if let Some(ref hotkey) = cli.hotkey {
        config.hotkey_key = hotkey.clone();
    }
    let config = config.validated();

    // Run the appropriate command
    match cli.command.unwrap_or(Commands::Daemon { dry_run: false }) {
        Commands::Daemon { dry_run } => {
            let mut daemon = Daemon::new(config, cli.config.clone()).with_dry_run(dry_run);
            daemon.run().await?;
        }

        Commands::Toggle => {
            signal_daemon(Signal::SIGUSR1)?;
        }

        Commands::Status { follow, format } => {
            run_status(follow, &format)?;
        }

        Commands::Config => {
            show_config(&config, cli.config.as_deref());
        }

        Commands::Settings {
            speed,
            hotkey,
            ctrl,
            no_ctrl,
            alt,
            no_alt,
            shift,
            no_shift,
        } => {
            let path = cli
                .config
                .clone()
                .or_else(Config::default_path)
                .ok_or_else(|| anyhow!("Could not determine the settings file location"))?;

            let mut settings = read_saved_settings(&path)?;
            let before = settings.clone();

            if let Some(speed) = speed {
                settings.speed_multiplier = speed;
            }
            if let Some(hotkey) = hotkey {
                settings.hotkey_key = hotkey;
            }
            if let Some(ctrl) = flag_pair(ctrl, no_ctrl) {
                settings.hotkey_modifiers.ctrl = ctrl;
            }
            if let Some(alt) = flag_pair(alt, no_alt) {
                settings.hotkey_modifiers.alt = alt;
            }
            if let Some(shift) = flag_pair(shift, no_shift) {
                settings.hotkey_modifiers.shift = shift;
            }
            let settings = settings.validated();

            if settings != before {
                config::save_config(&settings, &path)?;
                println!("Settings saved to {:?}", path);

                // A running daemon applies the new values without a restart
                if let Err(e) = signal_daemon(Signal::SIGHUP) {
                    tracing::debug!("Daemon not reloaded: {}", e);
                } else {
                    println!("Running daemon reloaded");
                }
            }

            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }

    Ok(())
}

/// Resolve a `--flag` / `--no-flag` pair into an optional override
fn flag_pair(set: bool, clear: bool) -> Option<bool> {
    match (set, clear) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

/// Read the settings file as saved, without environment or CLI overrides
fn read_saved_settings(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    // Refuse to overwrite a file we can't parse
    Ok(config::parse_config(&contents)?)
}

/// Read the daemon PID from its PID file
fn daemon_pid() -> anyhow::Result<i32> {
    let pid_file = Config::pid_file();
    let contents = std::fs::read_to_string(&pid_file)
        .map_err(|_| anyhow!("Looprec daemon is not running (no PID file at {:?})", pid_file))?;
    contents
        .trim()
        .parse()
        .map_err(|_| anyhow!("Invalid PID file {:?}", pid_file))
}

/// Send a control signal to the running daemon
#[cfg(unix)]
fn signal_daemon(signal: Signal) -> anyhow::Result<()> {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let pid = daemon_pid()?;
    kill(Pid::from_raw(pid), signal)
        .map_err(|e| anyhow!("Failed to signal looprec daemon (pid {}): {}", pid, e))?;
    tracing::debug!("Sent {:?} to pid {}", signal, pid);
    Ok(())
}

/// Read the daemon state, "stopped" if it isn't running
fn read_state(state_path: &Path) -> String {
    std::fs::read_to_string(state_path)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|_| "stopped".to_string())
}

fn print_state(state: &str, format: &str) {
    if format == "json" {
        println!("{}", format_state_json(state));
    } else {
        println!("{}", state);
    }
}

/// Run the status command - show current daemon state
fn run_status(follow: bool, format: &str) -> anyhow::Result<()> {
    let state_path = Config::state_file();

    // Print current state
    let state = read_state(&state_path);
    print_state(&state, format);

    if !follow {
        return Ok(());
    }

    // Follow mode: watch for changes using inotify
    use notify::{Config as NotifyConfig, RecommendedWatcher, RecursiveMode, Watcher};
    use std::sync::mpsc::channel;
    use std::time::Duration;

    // Set up file watcher
    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = tx.send(res);
        },
        NotifyConfig::default().with_poll_interval(Duration::from_millis(100)),
    )?;

    // Watch the state file's parent directory (file may not exist yet)
    if let Some(parent) = state_path.parent() {
        std::fs::create_dir_all(parent)?;
        watcher.watch(parent, RecursiveMode::NonRecursive)?;
    }

    let mut last_state = state;

    loop {
        match rx.recv_timeout(Duration::from_millis(500)) {
            Ok(Ok(_event)) => {
                let new_state = read_state(&state_path);
                if new_state != last_state {
                    print_state(&new_state, format);
                    last_state = new_state;
                }
            }
            Ok(Err(e)) => {
                tracing::warn!("Watch error: {:?}", e);
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                // Check if file was deleted (daemon stopped)
                if !state_path.exists() && last_state != "stopped" {
                    print_state("stopped", format);
                    last_state = "stopped".to_string();
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }

    Ok(())
}

/// Format state as JSON for Waybar consumption
///
/// Looping states carry progress ("looping 40%"), exposed as `percentage`.
fn format_state_json(state: &str) -> String {
    let (name, percent) = match state.split_once(' ') {
        Some((name, rest)) => (name, rest.trim_end_matches('%').parse::<u8>().ok()),
        None => (state, None),
    };

    let (text, class, tooltip) = match name {
        "idle" => (
            "○".to_string(),
            "idle",
            "Looprec ready - press the hotkey to record",
        ),
        "recording" => (
            "●".to_string(),
            "recording",
            "Recording - press the hotkey to start looping",
        ),
        "looping" => (
            match percent {
                Some(p) => format!("⟳ {}%", p),
                None => "⟳".to_string(),
            },
            "looping",
            "Looping - press the hotkey to stop",
        ),
        "stopped" => (String::new(), "stopped", "Looprec not running"),
        _ => ("?".to_string(), "unknown", "Unknown state"),
    };

    serde_json::json!({
        "text": text,
        "class": class,
        "tooltip": tooltip,
        "percentage": percent.unwrap_or(0),
    })
    .to_string()
}

/// Show current configuration
fn show_config(config: &Config, config_path: Option<&Path>) {
    println!("Current Configuration\n");
    println!("=====================\n");

    println!("[replay]");
    println!("  speed_multiplier = {}", config.speed_multiplier);

    println!("\n[hotkey]");
    println!("  key = {:?}", config.hotkey_key);
    println!("  ctrl = {}", config.hotkey_modifiers.ctrl);
    println!("  alt = {}", config.hotkey_modifiers.alt);
    println!("  shift = {}", config.hotkey_modifiers.shift);
    println!("  (matches {})", config.hotkey_spec());

    println!("\n---");
    println!(
        "Settings file: {:?}",
        config_path
            .map(PathBuf::from)
            .or_else(Config::default_path)
            .unwrap_or_else(|| PathBuf::from("(not found)"))
    );
    println!("State file: {:?}", Config::state_file());
    println!("PID file: {:?}", Config::pid_file());
}
