use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Process-wide counters, exposed at `/metrics`.
#[derive(Clone)]
pub struct Metrics {
    pub configs_loaded: Arc<AtomicU64>,
    pub configs_saved: Arc<AtomicU64>,
    pub backups_created: Arc<AtomicU64>,
    pub validation_failures: Arc<AtomicU64>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            configs_loaded: Arc::new(AtomicU64::new(0)),
            configs_saved: Arc::new(AtomicU64::new(0)),
            backups_created: Arc::new(AtomicU64::new(0)),
            validation_failures: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_configs_loaded(&self) {
        self.configs_loaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_configs_saved(&self) {
        self.configs_saved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_backups_created(&self) {
        self.backups_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_validation_failures(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            configs_loaded: self.configs_loaded.load(Ordering::Relaxed),
            configs_saved: self.configs_saved.load(Ordering::Relaxed),
            backups_created: self.backups_created.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
pub struct MetricsSnapshot {
    pub configs_loaded: u64,
    pub configs_saved: u64,
    pub backups_created: u64,
    pub validation_failures: u64,
    pub uptime_seconds: u64,
}
