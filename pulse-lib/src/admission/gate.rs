use tokio::sync::{Semaphore, SemaphorePermit};

use crate::{Domain, ErrorKind, Result};

/// Default number of probes allowed in flight against one domain
pub const DEFAULT_MAX_CONCURRENCY_PER_DOMAIN: usize = 10;

/// Bounds the number of simultaneous in-flight probes to a single domain.
///
/// The capacity is fixed at construction time. Waiting for a permit has no
/// timeout: if the probe volume of a domain exceeds its capacity for long
/// enough, probes queue up behind each other.
#[derive(Debug)]
pub struct AdmissionGate {
    /// The domain this gate admits probes for
    domain: Domain,

    /// Available permits, one per allowed in-flight probe
    semaphore: Semaphore,

    capacity: usize,
}

impl AdmissionGate {
    /// Create a gate admitting at most `capacity` concurrent probes.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidCapacity`] if `capacity` is 0, since such
    /// a gate would never admit anything.
    pub fn new(domain: Domain, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(ErrorKind::InvalidCapacity(capacity));
        }

        Ok(Self {
            domain,
            semaphore: Semaphore::new(capacity),
            capacity,
        })
    }

    /// Wait until a permit is available and take it.
    ///
    /// The permit is given back when the returned [`GatePermit`] is dropped
    /// (or explicitly [released](GatePermit::release)), on every exit path.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::GateClosed`] if the gate was closed while
    /// waiting. Gates are never closed during normal operation.
    pub async fn acquire(&self) -> Result<GatePermit<'_>> {
        let permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ErrorKind::GateClosed(self.domain.to_string()))?;
        Ok(GatePermit { _permit: permit })
    }

    /// The domain this gate belongs to
    #[must_use]
    pub const fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Maximum number of concurrently held permits
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of permits that can currently be acquired without waiting
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// A permit held on an [`AdmissionGate`].
#[derive(Debug)]
#[must_use = "the permit is released as soon as it is dropped"]
pub struct GatePermit<'a> {
    _permit: SemaphorePermit<'a>,
}

impl GatePermit<'_> {
    /// Return the permit to its gate, waking up one waiter if any
    pub fn release(self) {
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_zero_capacity_is_rejected() {
        let result = AdmissionGate::new(Domain::from("example.com"), 0);
        assert!(matches!(result, Err(ErrorKind::InvalidCapacity(0))));
    }

    #[tokio::test]
    async fn test_acquire_and_release() {
        let gate = AdmissionGate::new(Domain::from("example.com"), 2).unwrap();
        assert_eq!(gate.capacity(), 2);
        assert_eq!(gate.available_permits(), 2);

        let first = gate.acquire().await.unwrap();
        let second = gate.acquire().await.unwrap();
        assert_eq!(gate.available_permits(), 0);

        first.release();
        assert_eq!(gate.available_permits(), 1);
        drop(second);
        assert_eq!(gate.available_permits(), 2);
    }

    #[tokio::test]
    async fn test_acquire_waits_for_release() {
        let gate = Arc::new(AdmissionGate::new(Domain::from("example.com"), 1).unwrap());
        let permit = gate.acquire().await.unwrap();

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move {
                let _permit = gate.acquire().await.unwrap();
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        permit.release();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should be admitted after release")
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_never_exceeds_capacity_under_load() {
        const CAPACITY: usize = 3;

        let gate = Arc::new(AdmissionGate::new(Domain::from("example.com"), CAPACITY).unwrap());
        let held = Arc::new(AtomicUsize::new(0));
        let max_held = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..64u64)
            .map(|i| {
                let gate = gate.clone();
                let held = held.clone();
                let max_held = max_held.clone();
                tokio::spawn(async move {
                    let permit = gate.acquire().await.unwrap();
                    let now = held.fetch_add(1, Ordering::SeqCst) + 1;
                    assert!(now <= CAPACITY, "{now} permits held at once");
                    max_held.fetch_max(now, Ordering::SeqCst);

                    tokio::time::sleep(Duration::from_millis(1 + i % 5)).await;

                    held.fetch_sub(1, Ordering::SeqCst);
                    permit.release();
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        assert!(max_held.load(Ordering::SeqCst) <= CAPACITY);
        assert!(max_held.load(Ordering::SeqCst) >= 1);
        assert_eq!(held.load(Ordering::SeqCst), 0);
        assert_eq!(gate.available_permits(), CAPACITY);
    }
}
