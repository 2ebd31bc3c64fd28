//! Stopwatch state machine and its display refresh loop.
//!
//! [`Timer`] is a plain value that takes the current instant as an argument,
//! so it can be driven by any [`Clock`]. The UI shares one instance behind a
//! mutex with the [`Ticker`] thread, which only ever reads it and pushes the
//! formatted time through a channel.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use log::{debug, trace};
use std::{
    sync::{mpsc::Sender, Arc, Mutex, MutexGuard},
    thread::{self, JoinHandle},
    time::Duration,
};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: ChronoDuration) {
        let mut now = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *now += by;
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance(ChronoDuration::seconds(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Idle,
    Running { started_at: DateTime<Utc> },
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    accumulated_seconds: u64,
    state: RunState,
    // Bumped on every start so a refresh loop can tell it has been superseded.
    generation: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub fn new() -> Self {
        Self {
            accumulated_seconds: 0,
            state: RunState::Idle,
            generation: 0,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        match self.state {
            RunState::Idle => TimerPhase::Idle,
            RunState::Running { .. } => TimerPhase::Running,
            RunState::Stopped => TimerPhase::Stopped,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, RunState::Running { .. })
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        match self.state {
            RunState::Running { started_at } => Some(started_at),
            _ => None,
        }
    }

    pub fn accumulated_seconds(&self) -> u64 {
        self.accumulated_seconds
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `false` without touching anything when already running.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = RunState::Running { started_at: now };
        self.generation += 1;
        debug!(
            "event=timer_start generation={} accumulated={}",
            self.generation, self.accumulated_seconds
        );
        true
    }

    /// Folds the running interval, truncated to whole seconds, into the
    /// accumulated total.
    pub fn stop(&mut self, now: DateTime<Utc>) -> bool {
        let RunState::Running { started_at } = self.state else {
            return false;
        };
        self.accumulated_seconds += whole_seconds_between(started_at, now);
        self.state = RunState::Stopped;
        debug!("event=timer_stop accumulated={}", self.accumulated_seconds);
        true
    }

    pub fn reset(&mut self) {
        self.accumulated_seconds = 0;
        self.state = RunState::Idle;
        debug!("event=timer_reset");
    }

    /// Accumulated total plus the in-progress interval, if any.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        match self.state {
            RunState::Running { started_at } => {
                self.accumulated_seconds + whole_seconds_between(started_at, now)
            }
            _ => self.accumulated_seconds,
        }
    }

    pub fn display(&self, now: DateTime<Utc>) -> String {
        format_hms(self.elapsed_seconds(now))
    }
}

fn whole_seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    // A clock stepping backwards counts as zero, not as negative time.
    u64::try_from((to - from).num_seconds()).unwrap_or(0)
}

/// `HH:MM:SS`, zero padded. Hours keep growing past 99.
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

pub type SharedTimer = Arc<Mutex<Timer>>;

pub fn lock_timer(timer: &SharedTimer) -> MutexGuard<'_, Timer> {
    timer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Background refresh loop for one run of the timer.
///
/// The loop exits on its own once the timer stops running or a newer run has
/// started, at most one period after the change.
pub struct Ticker {
    timer: SharedTimer,
    clock: Arc<dyn Clock>,
    period: Duration,
    updates: Sender<String>,
}

impl Ticker {
    pub fn new(
        timer: SharedTimer,
        clock: Arc<dyn Clock>,
        period: Duration,
        updates: Sender<String>,
    ) -> Self {
        Self {
            timer,
            clock,
            period,
            updates,
        }
    }

    /// Spawns the loop for the run identified by `generation`.
    pub fn spawn(self, generation: u64) -> JoinHandle<()> {
        thread::spawn(move || self.run(generation))
    }

    fn run(self, generation: u64) {
        debug!("event=ticker_start generation={generation}");
        loop {
            {
                // Sending under the lock means a stop or reset that drains the
                // channel afterwards can never be overtaken by a stale tick.
                let timer = lock_timer(&self.timer);
                if !timer.is_running() || timer.generation() != generation {
                    break;
                }
                let display = timer.display(self.clock.now());
                trace!("event=tick generation={generation} display={display}");
                if self.updates.send(display).is_err() {
                    break;
                }
            }
            thread::sleep(self.period);
        }
        debug!("event=ticker_exit generation={generation}");
    }
}
