use std::time::Duration;

use log::*;

use super::PipelineError;

pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
pub const DEFAULT_WORKER_COUNT: usize = 5;
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_LEASE_TIMEOUT: Duration = Duration::from_secs(180);
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_millis(1_000);
pub const DEFAULT_FETCH_INTERVAL: Duration = Duration::from_millis(500);

/// Tuning knobs for the accrual pipeline. These are fixed once the pipeline has started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Maximum number of orders leased per fetch tick
    pub batch_size: usize,
    /// Capacity of the queue between the fetch loop and the workers
    pub queue_capacity: usize,
    pub worker_count: usize,
    /// Upper bound on a single accrual system call
    pub lookup_timeout: Duration,
    /// Leases older than this are considered abandoned and are reclaimed by the sweep
    pub lease_timeout: Duration,
    pub sweep_interval: Duration,
    pub fetch_interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            worker_count: DEFAULT_WORKER_COUNT,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            lease_timeout: DEFAULT_LEASE_TIMEOUT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            fetch_interval: DEFAULT_FETCH_INTERVAL,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        let counts = [
            ("batch_size", self.batch_size),
            ("queue_capacity", self.queue_capacity),
            ("worker_count", self.worker_count),
        ];
        for (name, value) in counts {
            if value == 0 {
                return Err(PipelineError::InvalidConfiguration(format!("{name} must be greater than zero")));
            }
        }
        let durations = [
            ("lookup_timeout", self.lookup_timeout),
            ("lease_timeout", self.lease_timeout),
            ("sweep_interval", self.sweep_interval),
            ("fetch_interval", self.fetch_interval),
        ];
        for (name, value) in durations {
            if value.is_zero() {
                return Err(PipelineError::InvalidConfiguration(format!("{name} must be greater than zero")));
            }
        }
        if self.lookup_timeout >= self.lease_timeout {
            return Err(PipelineError::InvalidConfiguration(format!(
                "lookup_timeout ({:?}) must be shorter than lease_timeout ({:?}), or leases expire mid-lookup",
                self.lookup_timeout, self.lease_timeout
            )));
        }
        if self.sweep_interval >= self.lease_timeout {
            return Err(PipelineError::InvalidConfiguration(format!(
                "sweep_interval ({:?}) must be shorter than lease_timeout ({:?})",
                self.sweep_interval, self.lease_timeout
            )));
        }
        self.lease_age()?;
        if self.leases_may_expire_in_queue() {
            warn!(
                "🚦️ With {} workers, a full queue of {} orders and {:?} lookups, an order can wait longer than the \
                 lease timeout ({:?}). The sweep may then reclaim orders that are still queued, and they will be \
                 looked up twice.",
                self.worker_count, self.queue_capacity, self.lookup_timeout, self.lease_timeout
            );
        }
        Ok(())
    }

    /// How old a lease can get before its order is written back: a full queue ahead of it is shared among the
    /// workers, and every lookup may take the whole `lookup_timeout`. `None` if that does not fit in a `Duration`.
    pub fn worst_case_lease_age(&self) -> Option<Duration> {
        let rounds = self.queue_capacity / self.worker_count.max(1) + 1;
        self.lookup_timeout.checked_mul(u32::try_from(rounds).ok()?)
    }

    pub fn leases_may_expire_in_queue(&self) -> bool {
        self.worst_case_lease_age().map_or(true, |age| age >= self.lease_timeout)
    }

    /// The lease timeout as the store understands it.
    pub fn lease_age(&self) -> Result<chrono::Duration, PipelineError> {
        chrono::Duration::from_std(self.lease_timeout)
            .map_err(|e| PipelineError::InvalidConfiguration(format!("lease_timeout is out of range: {e}")))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.lease_age().unwrap(), chrono::Duration::minutes(3));
    }

    #[test]
    fn zero_values_are_rejected() {
        let config = PipelineConfig { worker_count: 0, ..Default::default() };
        let err = config.validate();
        assert!(matches!(err, Err(PipelineError::InvalidConfiguration(m)) if m.contains("worker_count")));
        let config = PipelineConfig { fetch_interval: Duration::ZERO, ..Default::default() };
        let err = config.validate();
        assert!(matches!(err, Err(PipelineError::InvalidConfiguration(m)) if m.contains("fetch_interval")));
    }

    #[test]
    fn queue_wait_counts_towards_lease_age() {
        let config = PipelineConfig::default();
        assert_eq!(config.worst_case_lease_age(), Some(Duration::from_secs(210)));
        assert!(config.leases_may_expire_in_queue());
        assert!(config.validate().is_ok(), "A long queue wait is a warning, not an error");

        let config = PipelineConfig { queue_capacity: 20, ..Default::default() };
        assert_eq!(config.worst_case_lease_age(), Some(Duration::from_secs(50)));
        assert!(!config.leases_may_expire_in_queue());

        let config = PipelineConfig { lookup_timeout: Duration::from_secs(u64::MAX / 2), ..Default::default() };
        assert_eq!(config.worst_case_lease_age(), None);
        assert!(config.leases_may_expire_in_queue());
    }

    #[test]
    fn lease_timeout_must_dominate() {
        let config = PipelineConfig { lookup_timeout: Duration::from_secs(180), ..Default::default() };
        assert!(config.validate().is_err());
        let config = PipelineConfig { sweep_interval: Duration::from_secs(200), ..Default::default() };
        assert!(config.validate().is_err());
        let config = PipelineConfig {
            lookup_timeout: Duration::from_millis(100),
            lease_timeout: Duration::from_millis(500),
            sweep_interval: Duration::from_millis(50),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
