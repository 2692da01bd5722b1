// Command-line interface definitions for looprec
//
// This module is separate so it can be used by both the binary (main.rs)
// and build.rs for generating man pages.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "looprec")]
#[command(author, version, about = "Record pointer input and replay it in a loop")]
#[command(long_about = "
Looprec records mouse movement, clicks and scrolling, then replays the
recording over and over at an adjustable speed until you stop it.

USAGE:
  Press F3 (default) to start recording.
  Press F3 again to stop recording and start looping.
  Press F3 a third time to stop looping and discard the recording.

REQUIREMENTS:
  Linux: an X11 session (DISPLAY must be set)
  macOS: Accessibility permission for the terminal running looprec
")]
pub struct Cli {
    /// Path to settings file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<std::path::PathBuf>,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Override replay speed multiplier (e.g., 0.5, 2, 4)
    #[arg(long, value_name = "MULTIPLIER")]
    pub speed: Option<f64>,

    /// Override hotkey key (F1-F12 or a single character)
    #[arg(long, value_name = "KEY")]
    pub hotkey: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as daemon (default if no command specified)
    Daemon {
        /// Log replayed actions instead of injecting them
        #[arg(long)]
        dry_run: bool,
    },

    /// Toggle the running daemon (send SIGUSR1), for compositor keybindings
    Toggle,

    /// Show daemon status (for Waybar/polybar integration)
    Status {
        /// Continuously output status changes
        #[arg(long)]
        follow: bool,

        /// Output format: "text" (default) or "json" (for Waybar)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show current configuration
    Config,

    /// Change saved settings (a running daemon picks them up on SIGHUP)
    Settings {
        /// Replay speed multiplier
        #[arg(long, value_name = "MULTIPLIER")]
        speed: Option<f64>,

        /// Hotkey key (F1-F12 or a single character)
        #[arg(long, value_name = "KEY")]
        hotkey: Option<String>,

        /// Require Ctrl with the hotkey
        #[arg(long, overrides_with = "no_ctrl")]
        ctrl: bool,

        /// Don't require Ctrl with the hotkey
        #[arg(long)]
        no_ctrl: bool,

        /// Set the Alt modifier flag
        #[arg(long, overrides_with = "no_alt")]
        alt: bool,

        /// Clear the Alt modifier flag
        #[arg(long)]
        no_alt: bool,

        /// Set the Shift modifier flag
        #[arg(long, overrides_with = "no_shift")]
        shift: bool,

        /// Clear the Shift modifier flag
        #[arg(long)]
        no_shift: bool,
    },
}
