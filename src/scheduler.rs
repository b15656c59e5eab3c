use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::cleaner::{DryRunRemover, FsRemover, Remover};
use crate::config::{Config, ConfigError, MonitorConfig, DEFAULT_SCAN_INTERVAL_MINUTES};
use crate::monitor::{self, CycleSummary};

/// Longest single sleep in the wait phase, and so the worst-case stop latency.
pub const SLEEP_SLICE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SchedulerState {
    Idle = 0,
    Running = 1,
    Stopping = 2,
}

impl SchedulerState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Running,
            2 => Self::Stopping,
            _ => Self::Idle,
        }
    }
}

/// Requests shutdown of a running [`Scheduler`]. Cheap to clone and safe to use
/// from any thread.
#[derive(Debug, Clone)]
pub struct StopHandle {
    state: Arc<AtomicU8>,
}

impl StopHandle {
    /// Idempotent. A stop that arrives before `run` starts makes `run` return at once.
    pub fn stop(&self) {
        self.state.store(SchedulerState::Stopping as u8, Ordering::SeqCst);
    }
}

pub struct Scheduler {
    interval: Duration,
    monitors: Vec<MonitorConfig>,
    remover: Box<dyn Remover + Send + Sync>,
    sleep_slice: Duration,
    state: Arc<AtomicU8>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            interval: minutes(DEFAULT_SCAN_INTERVAL_MINUTES),
            monitors: Vec::new(),
            remover: Box::new(FsRemover),
            sleep_slice: SLEEP_SLICE,
            state: Arc::new(AtomicU8::new(SchedulerState::Idle as u8)),
        }
    }
}

fn minutes(m: u64) -> Duration {
    Duration::from_secs(m.saturating_mul(60))
}

impl Scheduler {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let mut scheduler = Self::default();
        scheduler.load(config)?;
        Ok(scheduler)
    }

    /// Replace the interval and the whole set of watched directories.
    ///
    /// Takes `&mut self`, so it can never overlap a cycle running under `run`.
    pub fn load(&mut self, config: Config) -> Result<(), ConfigError> {
        if config.scan_interval_minutes == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        self.interval = minutes(config.scan_interval_minutes);
        self.monitors = config.monitors;
        Ok(())
    }

    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.remover = if enabled {
            Box::new(DryRunRemover)
        } else {
            Box::new(FsRemover)
        };
        self
    }

    pub fn with_sleep_slice(mut self, slice: Duration) -> Self {
        self.sleep_slice = slice;
        self
    }

    #[cfg(test)]
    fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            state: Arc::clone(&self.state),
        }
    }

    pub fn stop(&self) {
        self.stop_handle().stop();
    }

    pub fn state(&self) -> SchedulerState {
        SchedulerState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn is_running(&self) -> bool {
        self.state() == SchedulerState::Running
    }

    /// One pass over every watched directory.
    pub fn run_once(&self) -> CycleSummary {
        info!("Starting scan cycle...");
        let summary = monitor::scan_cycle(&self.monitors, self.remover.as_ref());
        info!(
            "Scan cycle completed. Paths: {}, skipped: {}, failed: {}, removed: {}",
            summary.visited, summary.skipped, summary.failed, summary.removed
        );
        summary
    }

    /// Scan, wait, repeat until stopped. Returns the number of completed cycles.
    pub fn run(&self) -> usize {
        if self.monitors.is_empty() {
            error!("No monitor configurations loaded");
            return 0;
        }

        if self
            .state
            .compare_exchange(
                SchedulerState::Idle as u8,
                SchedulerState::Running as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            info!("Stop requested before start, not scanning");
            self.state.store(SchedulerState::Idle as u8, Ordering::SeqCst);
            return 0;
        }
        info!("Scheduler started");

        let mut cycles = 0;
        while self.is_running() {
            let started = Instant::now();
            self.run_once();
            cycles += 1;
            self.wait_for_next_scan(started);
        }

        self.state.store(SchedulerState::Idle as u8, Ordering::SeqCst);
        info!("Scheduler stopped after {cycles} cycles");
        cycles
    }

    fn wait_for_next_scan(&self, cycle_started: Instant) {
        if !self.is_running() {
            return;
        }
        info!("Wait for the next scan...");
        while self.is_running() {
            let elapsed = cycle_started.elapsed();
            if elapsed >= self.interval {
                break;
            }
            thread::sleep((self.interval - elapsed).min(self.sleep_slice));
        }
    }
}
