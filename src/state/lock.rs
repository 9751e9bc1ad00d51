//! Process-wide, non-blocking mutual exclusion for court mutations.
//!
//! The lock never queues: `acquire` either succeeds immediately or reports [`LockBusy`].
//! A holder older than the configured timeout is treated as dead and reclaimed; the
//! reclaimed holder keeps running, so its writes may still interleave with the new holder's.

use std::{
    fmt,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use thiserror::Error;
use tracing::{debug, warn};

/// Source of monotonic time for lock staleness checks.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

/// [`Clock`] backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// The lock is held by an operation that has not yet timed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("another update is in progress, please retry")]
pub struct LockBusy;

#[derive(Debug, Clone, Copy)]
struct Holder {
    generation: u64,
    acquired_at: Instant,
}

/// Single global lock guarding every mutating scoreboard operation.
pub struct GlobalLock {
    holder: Mutex<Option<Holder>>,
    timeout: Duration,
    clock: Arc<dyn Clock>,
    generations: AtomicU64,
}

impl fmt::Debug for GlobalLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalLock")
            .field("held", &self.is_held())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GlobalLock {
    pub fn new(timeout: Duration) -> Self {
        Self::with_clock(timeout, Arc::new(SystemClock))
    }

    pub fn with_clock(timeout: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            holder: Mutex::new(None),
            timeout,
            clock,
            generations: AtomicU64::new(0),
        }
    }

    /// Try to take the lock without waiting, reclaiming it when the current holder is stale.
    ///
    /// The returned guard releases the lock on drop unless the lock was reclaimed in the meantime.
    pub fn acquire(self: &Arc<Self>) -> Result<LockGuard, LockBusy> {
        let now = self.clock.now();
        let mut holder = self.holder.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(current) = *holder {
            let held_for = now.saturating_duration_since(current.acquired_at);
            if held_for <= self.timeout {
                return Err(LockBusy);
            }
            warn!(
                generation = current.generation,
                held_ms = held_for.as_millis() as u64,
                timeout_ms = self.timeout.as_millis() as u64,
                "reclaiming stale scoreboard lock"
            );
        }

        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        *holder = Some(Holder {
            generation,
            acquired_at: now,
        });
        debug!(generation, "scoreboard lock acquired");

        Ok(LockGuard {
            lock: Arc::clone(self),
            generation,
        })
    }

    /// Unconditionally unlock, whoever holds the lock.
    pub fn release(&self) {
        let mut holder = self.holder.lock().unwrap_or_else(PoisonError::into_inner);
        holder.take();
    }

    /// Whether the lock is currently held, stale or not.
    pub fn is_held(&self) -> bool {
        self.holder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Whether the lock is held for longer than the timeout and would be reclaimed.
    pub fn is_stale(&self) -> bool {
        let now = self.clock.now();
        self.holder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some_and(|current| now.saturating_duration_since(current.acquired_at) > self.timeout)
    }

    fn release_generation(&self, generation: u64) {
        let mut holder = self.holder.lock().unwrap_or_else(PoisonError::into_inner);
        match *holder {
            Some(current) if current.generation == generation => {
                holder.take();
                debug!(generation, "scoreboard lock released");
            }
            Some(current) => {
                debug!(
                    generation,
                    holder = current.generation,
                    "lock was reclaimed; leaving the new holder in place"
                );
            }
            None => {}
        }
    }
}

/// Proof of lock ownership; releases the lock when dropped.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct LockGuard {
    lock: Arc<GlobalLock>,
    generation: u64,
}

impl LockGuard {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockGuard")
            .field("generation", &self.generation)
            .finish()
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.lock.release_generation(self.generation);
    }
}

/// Hand-driven clock for exercising staleness.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct ManualClock {
    now: Mutex<Instant>,
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Instant::now()),
        })
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn manual_lock() -> (Arc<GlobalLock>, Arc<ManualClock>) {
        let clock = ManualClock::new();
        let lock = Arc::new(GlobalLock::with_clock(TIMEOUT, clock.clone()));
        (lock, clock)
    }

    #[test]
    fn second_acquire_is_busy_until_release() {
        let (lock, _clock) = manual_lock();
        let guard = lock.acquire().unwrap();
        assert!(lock.is_held());
        assert_eq!(lock.acquire().unwrap_err(), LockBusy);

        drop(guard);
        assert!(!lock.is_held());
        assert!(lock.acquire().is_ok());
    }

    #[test]
    fn lock_at_exact_timeout_is_not_stale() {
        let (lock, clock) = manual_lock();
        let _guard = lock.acquire().unwrap();
        clock.advance(TIMEOUT);
        assert!(!lock.is_stale());
        assert!(lock.acquire().is_err());
    }

    #[test]
    fn stale_lock_is_reclaimed() {
        let (lock, clock) = manual_lock();
        let first = lock.acquire().unwrap();
        clock.advance(TIMEOUT + Duration::from_millis(1));
        assert!(lock.is_stale());

        let second = lock.acquire().unwrap();
        assert!(second.generation() > first.generation());
        assert!(!lock.is_stale());
    }

    #[test]
    fn reclaimed_guard_does_not_release_new_holder() {
        let (lock, clock) = manual_lock();
        let first = lock.acquire().unwrap();
        clock.advance(TIMEOUT * 2);
        let second = lock.acquire().unwrap();

        drop(first);
        assert!(lock.is_held());
        assert!(lock.acquire().is_err());

        drop(second);
        assert!(!lock.is_held());
    }

    #[test]
    fn release_is_unconditional() {
        let (lock, _clock) = manual_lock();
        let guard = lock.acquire().unwrap();
        lock.release();
        assert!(!lock.is_held());

        let next = lock.acquire().unwrap();
        drop(guard);
        assert!(lock.is_held(), "stale guard must not free the next holder");
        drop(next);
    }
}
