//! Progress tracking shared between render workers and the orchestrator.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};

/// Countdown of outstanding work units (rows or buckets).
///
/// Workers only ever decrement; the orchestrator only ever reads.
#[derive(Debug)]
pub struct Progress {
    remaining: AtomicUsize,
    total: usize,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(total),
            total,
        }
    }

    /// Record one finished unit. Extra calls saturate at zero.
    pub fn mark_complete(&self) {
        let _ = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }

    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_done(&self) -> bool {
        self.remaining() == 0
    }
}

/// One-shot countdown latch: `wait` blocks until `count_down` has been
/// called `count` times.
#[derive(Debug)]
pub struct StartLatch {
    count: Mutex<usize>,
    released: Condvar,
}

impl StartLatch {
    pub fn new(count: usize) -> Self {
        Self {
            count: Mutex::new(count),
            released: Condvar::new(),
        }
    }

    /// Announce one arrival; the last one wakes every waiter.
    pub fn count_down(&self) {
        // The counter stays consistent even if a holder panicked
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.released.notify_all();
        }
    }

    /// Block until every expected arrival has counted down.
    pub fn wait(&self) {
        let count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        let _released = self
            .released
            .wait_while(count, |count| *count > 0)
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Arrivals still outstanding.
    pub fn pending(&self) -> usize {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Receives progress snapshots from the render orchestrator.
///
/// Called only from the orchestrating thread, never from workers.
pub trait ProgressMonitor {
    /// `remaining` of `total` units are still outstanding.
    fn update(&mut self, remaining: usize, total: usize);

    /// The render finished (successfully or not).
    fn finish(&mut self) {}
}

/// Logs a line whenever the remaining count changes.
#[derive(Debug, Default)]
pub struct LogProgress {
    last: Option<usize>,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressMonitor for LogProgress {
    fn update(&mut self, remaining: usize, total: usize) {
        if self.last != Some(remaining) {
            log::info!("Remaining: {remaining} / {total}");
            self.last = Some(remaining);
        }
    }

    fn finish(&mut self) {
        log::info!("Done.");
    }
}

/// Ignores all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressMonitor for NoProgress {
    fn update(&mut self, _remaining: usize, _total: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_progress_counts_down_across_threads() {
        let progress = Arc::new(Progress::new(400));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let progress = Arc::clone(&progress);
                thread::spawn(move || {
                    for _ in 0..100 {
                        progress.mark_complete();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(progress.remaining(), 0);
        assert_eq!(progress.total(), 400);
        assert!(progress.is_done());

        progress.mark_complete();
        assert_eq!(progress.remaining(), 0);
    }

    #[test]
    fn test_latch_releases_after_last_arrival() {
        let latch = Arc::new(StartLatch::new(3));

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let latch = Arc::clone(&latch);
                thread::spawn(move || latch.count_down())
            })
            .collect();

        latch.wait();
        assert_eq!(latch.pending(), 0);

        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_latch_with_zero_count_never_blocks() {
        StartLatch::new(0).wait();
    }

    #[derive(Default)]
    struct Recorder(Vec<(usize, usize)>);

    impl ProgressMonitor for Recorder {
        fn update(&mut self, remaining: usize, total: usize) {
            self.0.push((remaining, total));
        }
    }

    #[test]
    fn test_monitor_default_finish_is_noop() {
        let mut recorder = Recorder::default();
        recorder.update(3, 4);
        recorder.finish();
        assert_eq!(recorder.0, vec![(3, 4)]);

        let mut log_progress = LogProgress::new();
        log_progress.update(2, 4);
        log_progress.update(2, 4);
        assert_eq!(log_progress.last, Some(2));
    }
}
