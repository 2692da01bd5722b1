//! Configuration loading and types for looprec
//!
//! Configuration is loaded in layers:
//! 1. Built-in defaults
//! 2. Settings file (~/.config/looprec/settings.json)
//! 3. Environment variables (LOOPREC_*)
//! 4. CLI arguments (highest priority)
//!
//! Bad values never stop the daemon from starting: they are logged and
//! replaced with the defaults below.

use crate::error::LooprecError;
use crate::hotkey::{HotkeySpec, KeyIdentifier};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Default replay speed (2 = twice as fast as recorded)
pub const DEFAULT_SPEED: f64 = 2.0;

/// Default hotkey key
pub const DEFAULT_HOTKEY_KEY: &str = "f3";

/// Root configuration structure
///
/// Serialized as JSON with exactly these top-level keys.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Config {
    /// Replay speed multiplier, must be positive
    #[serde(default = "default_speed")]
    pub speed_multiplier: f64,

    /// Hotkey key: "f1".."f12" or a single character
    #[serde(default = "default_hotkey_key")]
    pub hotkey_key: String,

    /// Modifier keys for the hotkey
    #[serde(default)]
    pub hotkey_modifiers: HotkeyModifiers,
}

/// Hotkey modifier flags
///
/// Only `ctrl` takes part in matching; `alt` and `shift` are kept so the
/// settings round-trip.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct HotkeyModifiers {
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
}

fn default_speed() -> f64 {
    DEFAULT_SPEED
}

fn default_hotkey_key() -> String {
    DEFAULT_HOTKEY_KEY.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            speed_multiplier: DEFAULT_SPEED,
            hotkey_key: default_hotkey_key(),
            hotkey_modifiers: HotkeyModifiers::default(),
        }
    }
}

/// Check a speed multiplier, falling back to the default
pub fn sanitize_speed(speed: f64) -> f64 {
    if speed.is_finite() && speed > 0.0 {
        speed
    } else {
        DEFAULT_SPEED
    }
}

impl Config {
    /// File name of the daemon state file inside the runtime directory
    pub const STATE_FILE_NAME: &'static str = "state";

    /// File name of the daemon PID file inside the runtime directory
    pub const PID_FILE_NAME: &'static str = "pid";

    /// Replace invalid values with defaults, logging each substitution
    pub fn validated(mut self) -> Self {
        let speed = sanitize_speed(self.speed_multiplier);
        if speed != self.speed_multiplier {
            tracing::warn!(
                "Invalid speed_multiplier {}, using {}",
                self.speed_multiplier,
                DEFAULT_SPEED
            );
            self.speed_multiplier = speed;
        }

        match KeyIdentifier::parse(&self.hotkey_key) {
            Ok(key) => self.hotkey_key = key.to_string(),
            Err(e) => {
                tracing::warn!("{}, using {:?}", e, DEFAULT_HOTKEY_KEY);
                self.hotkey_key = default_hotkey_key();
            }
        }

        self
    }

    /// Hotkey as used by the matcher
    pub fn hotkey_spec(&self) -> HotkeySpec {
        let key = KeyIdentifier::parse(&self.hotkey_key).unwrap_or(KeyIdentifier::Function(3));
        HotkeySpec {
            key,
            modifiers: self.hotkey_modifiers,
        }
    }

    /// Get the default settings file path
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "looprec")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Get the runtime directory for ephemeral files (state, pid, lock)
    pub fn runtime_dir() -> PathBuf {
        // Use XDG_RUNTIME_DIR if available, otherwise fall back to /tmp
        std::env::var("XDG_RUNTIME_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir())
            .join("looprec")
    }

    /// State file written by the daemon for `looprec status`
    pub fn state_file() -> PathBuf {
        Self::runtime_dir().join(Self::STATE_FILE_NAME)
    }

    /// PID file written by the daemon for `looprec toggle`
    pub fn pid_file() -> PathBuf {
        Self::runtime_dir().join(Self::PID_FILE_NAME)
    }
}

/// Read one settings field, keeping `current` when it is absent or mistyped
fn field<T: DeserializeOwned>(fields: &Map<String, Value>, name: &str, current: T) -> T {
    match fields.get(name) {
        None => current,
        Some(value) => match T::deserialize(value) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Ignoring settings field {:?}: {}", name, e);
                current
            }
        },
    }
}

/// Parse settings JSON, defaulting what is missing and fixing what is invalid
///
/// Fields are read one at a time, so a mistyped field only loses itself.
/// Only text that is not a JSON object at all is an error.
pub fn parse_config(contents: &str) -> Result<Config, LooprecError> {
    let value: Value = serde_json::from_str(contents)
        .map_err(|e| LooprecError::Config(format!("Invalid settings: {}", e)))?;
    let fields = value.as_object().ok_or_else(|| {
        LooprecError::Config("Invalid settings: expected a JSON object".to_string())
    })?;

    let defaults = Config::default();
    let mut config = Config {
        speed_multiplier: field(fields, "speed_multiplier", defaults.speed_multiplier),
        hotkey_key: field(fields, "hotkey_key", defaults.hotkey_key),
        hotkey_modifiers: defaults.hotkey_modifiers,
    };

    match fields.get("hotkey_modifiers") {
        None => {}
        Some(Value::Object(mods)) => {
            let m = &mut config.hotkey_modifiers;
            m.ctrl = field(mods, "ctrl", m.ctrl);
            m.alt = field(mods, "alt", m.alt);
            m.shift = field(mods, "shift", m.shift);
        }
        Some(other) => {
            tracing::warn!(
                "Ignoring settings field \"hotkey_modifiers\": expected an object, found {}",
                other
            );
        }
    }

    Ok(config.validated())
}

/// Load configuration from file, with defaults for missing values
///
/// An unreadable or malformed file is reported and replaced by defaults.
pub fn load_config(path: Option<&Path>) -> Config {
    // Start with defaults
    let mut config = Config::default();

    // Determine settings file path
    let config_path = path.map(PathBuf::from).or_else(Config::default_path);

    // Load from file if it exists
    if let Some(ref path) = config_path {
        if path.exists() {
            tracing::debug!("Loading settings from {:?}", path);
            match std::fs::read_to_string(path)
                .map_err(|e| LooprecError::Config(format!("Failed to read settings: {}", e)))
                .and_then(|contents| parse_config(&contents))
            {
                Ok(loaded) => config = loaded,
                Err(e) => tracing::warn!("{}; using defaults", e),
            }
        } else {
            tracing::debug!("Settings file not found at {:?}, using defaults", path);
        }
    }

    // Override from environment variables
    if let Ok(speed) = std::env::var("LOOPREC_SPEED") {
        match speed.parse::<f64>() {
            Ok(speed) => config.speed_multiplier = speed,
            Err(_) => tracing::warn!("Ignoring LOOPREC_SPEED={:?}: not a number", speed),
        }
    }
    if let Ok(key) = std::env::var("LOOPREC_HOTKEY") {
        config.hotkey_key = key;
    }

    config.validated()
}

/// Save configuration to file
pub fn save_config(config: &Config, path: &Path) -> Result<(), LooprecError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| LooprecError::Config(format!("Failed to create config dir: {}", e)))?;
    }

    let contents = serde_json::to_string_pretty(config)
        .map_err(|e| LooprecError::Config(format!("Failed to serialize settings: {}", e)))?;

    std::fs::write(path, contents)
        .map_err(|e| LooprecError::Config(format!("Failed to write settings: {}", e)))?;

    tracing::debug!("Settings saved to {:?}", path);
    Ok(())
}
