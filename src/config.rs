use std::time::Duration;

use crate::error::{Error, Result};

/// Timing knobs shared by every worker in a run.
///
/// All lengths are counted in `unit`s so that tests can shrink a run from
/// seconds to milliseconds without touching the worker logic.
#[derive(Debug, Clone)]
pub struct TimingConfig {
    /// Length of one time unit.
    pub unit: Duration,
    /// How many units a worker waits for a queue-state change before giving up.
    pub deadline_units: u32,
    /// Job durations are drawn uniformly from `1..=max_job_duration`.
    pub max_job_duration: u32,
    /// Producer pause between jobs, drawn from `1..=max_think_time`; 0 disables it.
    pub max_think_time: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            unit: Duration::from_secs(1),
            deadline_units: 20,
            max_job_duration: 10,
            max_think_time: 5,
        }
    }
}

impl TimingConfig {
    pub fn deadline(&self) -> Duration {
        self.units(self.deadline_units)
    }

    pub fn units(&self, n: u32) -> Duration {
        self.unit * n
    }

    pub fn with_unit(mut self, unit: Duration) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_deadline(mut self, units: u32) -> Self {
        self.deadline_units = units;
        self
    }

    pub fn with_max_job_duration(mut self, units: u32) -> Self {
        self.max_job_duration = units;
        self
    }

    pub fn with_max_think_time(mut self, units: u32) -> Self {
        self.max_think_time = units;
        self
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub capacity: usize,
    pub jobs_per_producer: usize,
    pub producers: usize,
    pub consumers: usize,
    pub timing: TimingConfig,
}

impl RunConfig {
    pub fn new(
        capacity: usize,
        jobs_per_producer: usize,
        producers: usize,
        consumers: usize,
    ) -> Self {
        Self {
            capacity,
            jobs_per_producer,
            producers,
            consumers,
            timing: TimingConfig::default(),
        }
    }

    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Rejects settings that would make the run meaningless before anything is allocated.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        if self.timing.deadline().is_zero() {
            return Err(Error::ZeroDeadline);
        }
        if self.timing.max_job_duration == 0 {
            return Err(Error::ZeroJobDuration);
        }
        Ok(())
    }
}
