//! Time-lapse playback over the month list.
//!
//! [`PlaybackScheduler`] drives an [`Explorer`](crate::explorer::Explorer)
//! through its months in chronological order, one month per tick:
//!
//! - **Start**: forces the slider to the first month and arms a timer
//! - **Tick**: advances one month; at the last month the loop returns to idle
//! - **Stop**: cancels the timer; a tick already in flight is discarded
//! - **Speed**: changes the interval, keeping the current month when playing
//!
//! At most one timer exists per scheduler. Each timer carries the
//! generation it was started with, and the explorer ignores ticks from any
//! other generation, so a cancelled timer can never advance the slider.

use std::sync::TryLockError;
use std::time::Duration;

use quakescope_types::PlaybackStatus;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::PlaybackConfig;
use crate::explorer::{Explorer, SharedExplorer};
use crate::range::RangeError;

/// Errors that can occur while controlling playback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    /// The dataset has no months to play.
    #[error("no calendar months to play")]
    NoMonths,

    /// A playback loop is already running.
    #[error("playback is already running")]
    AlreadyPlaying,

    /// The requested interval is below the configured minimum.
    #[error("tick interval {requested_ms}ms is below the minimum of {min_ms}ms")]
    IntervalTooShort {
        /// Interval that was requested.
        requested_ms: u64,
        /// Smallest accepted interval.
        min_ms: u64,
    },

    /// No Tokio runtime is available to drive the timer.
    #[error("playback requires a running tokio runtime")]
    NoRuntime,

    /// Another thread panicked while holding the explorer lock.
    #[error("explorer lock poisoned")]
    Poisoned,

    /// The range selector rejected a month.
    #[error("range error: {source}")]
    Range {
        /// The underlying range error.
        #[from]
        source: RangeError,
    },
}

/// Playback state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaybackState {
    /// No loop running.
    #[default]
    Idle,
    /// The loop is running and showing `current_index`.
    Playing {
        /// Month index currently shown.
        current_index: usize,
        /// Milliseconds between ticks.
        tick_interval_ms: u64,
    },
}

/// Result of a single playback tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The slider moved to `index`.
    Advanced {
        /// Month index now shown.
        index: usize,
    },
    /// The last month had been reached; playback is idle.
    Finished,
    /// The tick belonged to a cancelled timer and was ignored.
    Stale,
}

/// Owns the playback timer for one shared explorer.
#[derive(Debug)]
pub struct PlaybackScheduler {
    /// Explorer advanced by the timer.
    explorer: SharedExplorer,
    /// The single active timer task, if any.
    timer: Option<JoinHandle<()>>,
    /// Runtime the timer was spawned on, reused when the speed changes.
    runtime: Option<Handle>,
    /// Smallest interval accepted by [`set_speed`](Self::set_speed).
    min_tick_interval_ms: u64,
}

impl PlaybackScheduler {
    /// Create an idle scheduler for `explorer`.
    pub fn new(explorer: SharedExplorer, config: &PlaybackConfig) -> Self {
        Self {
            explorer,
            timer: None,
            runtime: None,
            min_tick_interval_ms: config.min_tick_interval_ms,
        }
    }

    /// The explorer this scheduler drives.
    pub const fn explorer(&self) -> &SharedExplorer {
        &self.explorer
    }

    /// Start playback from the first month.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::NoRuntime`] outside a Tokio runtime
    /// - [`PlaybackError::AlreadyPlaying`] if a loop is running
    /// - [`PlaybackError::NoMonths`] if the dataset is empty
    ///
    /// No timer is armed when an error is returned.
    pub fn start(&mut self) -> Result<(), PlaybackError> {
        let runtime = Handle::try_current().map_err(|_err| PlaybackError::NoRuntime)?;
        let (generation, interval_ms) = self.lock()?.start_playback()?;
        self.abort_timer();
        self.timer = Some(runtime.spawn(run_timer(
            SharedExplorer::clone(&self.explorer),
            generation,
            interval_ms,
        )));
        self.runtime = Some(runtime);
        Ok(())
    }

    /// Stop playback. Calling this while idle does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::Poisoned`] if the explorer lock is poisoned.
    pub fn stop(&mut self) -> Result<(), PlaybackError> {
        let was_playing = self.lock()?.stop_playback();
        self.abort_timer();
        if was_playing {
            info!("Playback stopped");
        }
        Ok(())
    }

    /// Change the tick interval.
    ///
    /// While playing, the loop continues from the current month at the new
    /// interval. While idle, the interval applies to the next start.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::IntervalTooShort`] below the configured
    /// minimum; the interval is left unchanged.
    pub fn set_speed(&mut self, tick_interval_ms: u64) -> Result<(), PlaybackError> {
        if tick_interval_ms < self.min_tick_interval_ms {
            return Err(PlaybackError::IntervalTooShort {
                requested_ms: tick_interval_ms,
                min_ms: self.min_tick_interval_ms,
            });
        }

        let restart = self.lock()?.set_playback_interval(tick_interval_ms);
        info!(tick_interval_ms, playing = restart.is_some(), "Playback speed changed");

        if let Some(generation) = restart {
            self.abort_timer();
            let runtime = match self.runtime.clone() {
                Some(runtime) => runtime,
                None => Handle::try_current().map_err(|_err| PlaybackError::NoRuntime)?,
            };
            self.timer = Some(runtime.spawn(run_timer(
                SharedExplorer::clone(&self.explorer),
                generation,
                tick_interval_ms,
            )));
        }
        Ok(())
    }

    /// State for the animate/stop button.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::Poisoned`] if the explorer lock is poisoned.
    pub fn status(&self) -> Result<PlaybackStatus, PlaybackError> {
        Ok(self.lock()?.playback_status())
    }

    /// Whether the loop is running.
    pub fn is_playing(&self) -> bool {
        self.status().is_ok_and(|status| status.is_playing)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Explorer>, PlaybackError> {
        self.explorer.lock().map_err(|_err| PlaybackError::Poisoned)
    }

    fn abort_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for PlaybackScheduler {
    fn drop(&mut self) {
        self.abort_timer();
        // Never block here: the dropping thread may hold the explorer lock.
        match self.explorer.try_lock() {
            Ok(mut explorer) => {
                explorer.stop_playback();
            }
            Err(TryLockError::Poisoned(poisoned)) => {
                poisoned.into_inner().stop_playback();
            }
            Err(TryLockError::WouldBlock) => {
                warn!("Explorer locked while dropping scheduler; playback state left as is");
            }
        }
    }
}

/// Timer loop for one playback generation.
///
/// The explorer lock is taken only inside [`tick_once`] and never held
/// across an `.await`.
async fn run_timer(explorer: SharedExplorer, generation: u64, interval_ms: u64) {
    let interval = Duration::from_millis(interval_ms);
    loop {
        tokio::time::sleep(interval).await;

        match tick_once(&explorer, generation) {
            Ok(TickOutcome::Advanced { index }) => {
                debug!(index, generation, "Playback advanced");
            }
            Ok(TickOutcome::Finished) => {
                info!(generation, "Playback finished");
                return;
            }
            Ok(TickOutcome::Stale) => {
                debug!(generation, "Playback timer superseded");
                return;
            }
            Err(err) => {
                warn!(error = %err, generation, "Playback tick failed");
                return;
            }
        }
    }
}

fn tick_once(explorer: &SharedExplorer, generation: u64) -> Result<TickOutcome, PlaybackError> {
    explorer
        .lock()
        .map_err(|_err| PlaybackError::Poisoned)?
        .playback_tick(generation)
}
