//! Validation counters
//!
//! - Counters only
//! - Monotonic increase
//! - Thread-safe, lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for one validator instance
///
/// Relaxed ordering: counters are exact once all callers have returned.
#[derive(Debug, Default)]
pub struct ValidationMetrics {
    documents_validated: AtomicU64,
    documents_accepted: AtomicU64,
    documents_rejected: AtomicU64,
    violations: AtomicU64,
    lookups: AtomicU64,
    lookup_failures: AtomicU64,
}

impl ValidationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_validated(&self) {
        self.documents_validated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_accepted(&self) {
        self.documents_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rejected(&self) {
        self.documents_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_violations(&self, count: u64) {
        self.violations.fetch_add(count, Ordering::Relaxed);
    }

    /// One existence or uniqueness query issued
    pub fn increment_lookups(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_lookup_failures(&self) {
        self.lookup_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_validated: self.documents_validated.load(Ordering::Relaxed),
            documents_accepted: self.documents_accepted.load(Ordering::Relaxed),
            documents_rejected: self.documents_rejected.load(Ordering::Relaxed),
            violations: self.violations.load(Ordering::Relaxed),
            lookups: self.lookups.load(Ordering::Relaxed),
            lookup_failures: self.lookup_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of all counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub documents_validated: u64,
    pub documents_accepted: u64,
    pub documents_rejected: u64,
    pub violations: u64,
    pub lookups: u64,
    pub lookup_failures: u64,
}
