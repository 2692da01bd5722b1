//! Daemon module - main event loop orchestration
//!
//! Coordinates the input source, hotkey matching, the record/replay session
//! and external control. Everything that changes session state runs on this
//! one task:
//! - captured input (pointer events, hotkey presses)
//! - SIGUSR1 from `looprec toggle`
//! - SIGHUP to reload settings
//! - SIGINT/SIGTERM to shut down

use crate::capture::{self, CaptureRouter, InputSource};
use crate::config::{load_config, Config};
use crate::error::{CaptureError, LooprecError, Result};
use crate::event_log::EventLog;
use crate::hotkey::HotkeyMatcher;
use crate::output::{self, InputSink};
use crate::progress::ProgressObserver;
use crate::replay::SpeedControl;
use crate::session::{Session, Transition};
use pidlock::Pidlock;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;

/// Write state to file for external integrations (status, bars)
fn write_state_file(path: &Path, state: &str) {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::warn!("Failed to create state file directory: {}", e);
            return;
        }
    }

    if let Err(e) = std::fs::write(path, state) {
        tracing::warn!("Failed to write state file: {}", e);
    } else {
        tracing::trace!("State file updated: {}", state);
    }
}

/// Write PID file for external control via signals
fn write_pid_file(runtime_dir: &Path) -> Option<PathBuf> {
    let pid_path = runtime_dir.join(Config::PID_FILE_NAME);

    if let Err(e) = std::fs::create_dir_all(runtime_dir) {
        tracing::warn!("Failed to create PID file directory: {}", e);
        return None;
    }

    let pid = std::process::id();
    if let Err(e) = std::fs::write(&pid_path, pid.to_string()) {
        tracing::warn!("Failed to write PID file: {}", e);
        return None;
    }

    tracing::debug!("PID file written: {:?} (pid={})", pid_path, pid);
    Some(pid_path)
}

/// Remove a runtime file on shutdown
fn cleanup_file(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!("Failed to remove {:?}: {}", path, e);
        }
    }
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() -> Result<()> {
    let mut sigterm = signal(SignalKind::terminate()).map_err(|e| {
        LooprecError::Config(format!("Failed to set up SIGTERM handler: {}", e))
    })?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("Received SIGINT, shutting down..."),
        _ = sigterm.recv() => tracing::info!("Received SIGTERM, shutting down..."),
    }
    Ok(())
}

/// Main daemon that orchestrates all components
pub struct Daemon {
    config: Config,
    config_path: Option<PathBuf>,
    dry_run: bool,
    runtime_dir: PathBuf,
    state_file_path: PathBuf,
    pid_file_path: Option<PathBuf>,
    /// Last progress decile written to the state file
    last_decile: u8,
}

impl Daemon {
    /// Create a new daemon with the given configuration
    ///
    /// `config_path` is re-read on SIGHUP.
    pub fn new(config: Config, config_path: Option<PathBuf>) -> Self {
        let runtime_dir = Config::runtime_dir();
        Self {
            config,
            config_path,
            dry_run: false,
            state_file_path: runtime_dir.join(Config::STATE_FILE_NAME),
            runtime_dir,
            pid_file_path: None,
            last_decile: 0,
        }
    }

    /// Log replayed actions instead of injecting them
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Put the state, PID and lock files somewhere else
    pub fn with_runtime_dir(mut self, dir: PathBuf) -> Self {
        self.state_file_path = dir.join(Config::STATE_FILE_NAME);
        self.runtime_dir = dir;
        self
    }

    /// Update the state file
    fn update_state(&self, state_name: &str) {
        write_state_file(&self.state_file_path, state_name);
    }

    /// Toggle the session and publish the new state
    async fn toggle(&mut self, session: &mut Session) {
        match session.toggle().await {
            Transition::NothingRecorded => {}
            Transition::StartedRecording => {
                tracing::info!(
                    "Press {} again to stop recording and start looping",
                    self.config.hotkey_spec()
                );
                self.update_state(session.state().name());
            }
            Transition::StoppedLooping { .. } => {
                self.last_decile = 0;
                self.update_state(session.state().name());
            }
            _ => self.update_state(session.state().name()),
        }
    }

    /// Publish replay progress, once per decile
    fn on_progress(&mut self, session: &Session, percent: u8) {
        tracing::trace!("Replay progress: {}%", percent);
        let decile = percent / 10;
        if session.state().is_looping() && decile != self.last_decile {
            self.last_decile = decile;
            self.update_state(&format!("looping {}%", percent));
        }
    }

    /// Re-read the settings file and apply speed and hotkey live
    fn reload_settings(&mut self, speed: &SpeedControl, matcher: &HotkeyMatcher) {
        let config = load_config(self.config_path.as_deref());
        speed.set(config.speed_multiplier);
        matcher.set_spec(config.hotkey_spec());
        tracing::info!(
            "Settings reloaded: speed {}x, hotkey {}",
            speed.get(),
            matcher.spec()
        );
        self.config = config;
    }

    /// Run the daemon with the platform input source and sink
    pub async fn run(&mut self) -> Result<()> {
        tracing::info!("Starting looprec daemon");

        // Single instance check
        std::fs::create_dir_all(&self.runtime_dir)?;
        let lock_path = self.runtime_dir.join("looprec.lock");
        let mut pidlock = Pidlock::new(&lock_path.to_string_lossy());
        if pidlock.acquire().is_err() {
            return Err(LooprecError::AlreadyRunning);
        }

        let source = capture::create_source();
        let sink: Arc<dyn InputSink> = Arc::from(output::create_sink(self.dry_run));

        let result = self
            .run_with(source, sink, async {
                if let Err(e) = shutdown_signal().await {
                    tracing::error!("{}", e);
                    std::future::pending::<()>().await;
                }
            })
            .await;

        if pidlock.release().is_err() {
            tracing::warn!("Failed to release lock {:?}", lock_path);
        }
        result
    }

    /// Run the main loop until `shutdown` resolves
    pub async fn run_with<F>(
        &mut self,
        mut source: Box<dyn InputSource>,
        sink: Arc<dyn InputSink>,
        shutdown: F,
    ) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        // Set up signal handlers for external control
        let mut sigusr1 = signal(SignalKind::user_defined1()).map_err(|e| {
            LooprecError::Config(format!("Failed to set up SIGUSR1 handler: {}", e))
        })?;
        let mut sighup = signal(SignalKind::hangup()).map_err(|e| {
            LooprecError::Config(format!("Failed to set up SIGHUP handler: {}", e))
        })?;

        let log = Arc::new(EventLog::new());
        let speed = Arc::new(SpeedControl::new(self.config.speed_multiplier));
        let matcher = Arc::new(HotkeyMatcher::new(self.config.hotkey_spec()));
        let (progress_tx, mut progress_rx) = watch::channel(0u8);
        let progress: Arc<dyn ProgressObserver> = Arc::new(progress_tx);

        tracing::info!("Replay output: {}", sink.name());
        let mut session = Session::new(log.clone(), speed.clone(), sink, progress);
        let mut router = CaptureRouter::new(log, matcher.clone());

        // Global hooks are required; without them the daemon can do nothing
        let mut input_rx = source.start().await?;
        tracing::info!("Capturing input via {}", source.name());

        // Write PID file for external control via signals
        self.pid_file_path = write_pid_file(&self.runtime_dir);
        tracing::info!(
            "Press {} to start recording (replay speed {}x)",
            matcher.spec(),
            speed.get()
        );

        // Write initial state
        self.update_state("idle");

        tokio::pin!(shutdown);
        self.last_decile = 0;
        let mut result = Ok(());

        // Main event loop
        loop {
            tokio::select! {
                captured = input_rx.recv() => {
                    match captured {
                        Some(captured) => {
                            if router.route(captured) {
                                self.toggle(&mut session).await;
                            }
                        }
                        None => {
                            tracing::error!("Input source closed");
                            result = Err(CaptureError::ListenerGone.into());
                            break;
                        }
                    }
                }

                Ok(()) = progress_rx.changed() => {
                    let percent = *progress_rx.borrow_and_update();
                    self.on_progress(&session, percent);
                }

                // Handle SIGUSR1 - toggle (from `looprec toggle` or keybindings)
                _ = sigusr1.recv() => {
                    tracing::debug!("Received SIGUSR1 (toggle)");
                    self.toggle(&mut session).await;
                }

                // Handle SIGHUP - reload settings
                _ = sighup.recv() => {
                    tracing::debug!("Received SIGHUP (reload settings)");
                    self.reload_settings(&speed, &matcher);
                }

                _ = &mut shutdown => {
                    break;
                }
            }
        }

        // Cleanup
        session.shutdown().await;
        if let Err(e) = source.stop().await {
            tracing::warn!("Failed to stop input source: {}", e);
        }

        // Remove state file on shutdown
        cleanup_file(&self.state_file_path);

        // Remove PID file on shutdown
        if let Some(ref path) = self.pid_file_path {
            cleanup_file(path);
        }

        tracing::info!("Daemon stopped");

        result
    }
}
