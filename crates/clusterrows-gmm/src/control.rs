//! Cancellation and progress reporting for training runs
//!
//! [`StopToken`] lets a caller end a long search early, either explicitly
//! or once a deadline passes. Training polls it between EM iterations and
//! keeps the best model found so far.
//!
//! [`TrainingObserver`] receives progress events. Every method has an empty
//! default body, so implementors override only what they need. Observers
//! must be `Send + Sync` because candidate cluster counts may be trained on
//! worker threads.

use crate::error::GmmError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared cancellation flag with an optional deadline
///
/// Clones share the same flag.
///
/// # Examples
///
/// ```
/// use clusterrows_gmm::StopToken;
///
/// let token = StopToken::new();
/// let handle = token.clone();
/// assert!(!token.should_stop());
///
/// handle.cancel();
/// assert!(token.should_stop());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl StopToken {
    /// Token that stops only when cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that also stops at `deadline`
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    /// Token that also stops `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested explicitly
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether training should stop now
    pub fn should_stop(&self) -> bool {
        self.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Receives progress events during training
///
/// `clusters` identifies the candidate cluster count in every callback.
pub trait TrainingObserver: Send + Sync {
    /// Training of a candidate begins
    fn on_candidate_start(&self, _clusters: usize) {}

    /// An E-step finished with `score`
    fn on_iteration(&self, _clusters: usize, _epoch: usize, _iteration: usize, _score: f64) {}

    /// An epoch finished; `improved` is true if it is the candidate's best so far
    fn on_epoch_end(&self, _clusters: usize, _epoch: usize, _score: f64, _improved: bool) {}

    /// An epoch was abandoned
    fn on_epoch_failed(&self, _clusters: usize, _epoch: usize, _error: &GmmError) {}

    /// A candidate finished with its best score, or the error that sank it
    fn on_candidate_end(&self, _clusters: usize, _result: Result<f64, &GmmError>) {}

    /// The search picked `clusters`
    fn on_selected(&self, _clusters: usize, _score: f64) {}
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl TrainingObserver for NoopObserver {}

/// Observer that forwards events to the `log` facade
///
/// Iterations go to `trace`, epochs to `debug`, candidate results and the
/// final selection to `info`, failures to `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl TrainingObserver for LogObserver {
    fn on_candidate_start(&self, clusters: usize) {
        log::info!("training {} clusters", clusters);
    }

    fn on_iteration(&self, clusters: usize, epoch: usize, iteration: usize, score: f64) {
        log::trace!(
            "k={} epoch={} iteration={} score={:.6}",
            clusters,
            epoch,
            iteration,
            score
        );
    }

    fn on_epoch_end(&self, clusters: usize, epoch: usize, score: f64, improved: bool) {
        log::debug!(
            "k={} epoch={} score={:.6}{}",
            clusters,
            epoch,
            score,
            if improved { " (best)" } else { "" }
        );
    }

    fn on_epoch_failed(&self, clusters: usize, epoch: usize, error: &GmmError) {
        log::warn!("k={} epoch={} abandoned: {}", clusters, epoch, error);
    }

    fn on_candidate_end(&self, clusters: usize, result: Result<f64, &GmmError>) {
        match result {
            Ok(score) => log::info!("k={} best score {:.6}", clusters, score),
            Err(e) => log::warn!("k={} failed: {}", clusters, e),
        }
    }

    fn on_selected(&self, clusters: usize, score: f64) {
        log::info!("selected {} clusters (score {:.6})", clusters, score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_clones_share_flag() {
        let token = StopToken::new();
        let other = token.clone();
        other.cancel();
        assert!(token.is_cancelled());
        assert!(token.should_stop());
    }

    #[test]
    fn test_deadline() {
        let past = StopToken::with_deadline(Instant::now());
        assert!(past.should_stop());
        assert!(!past.is_cancelled());

        let future = StopToken::with_timeout(Duration::from_secs(3600));
        assert!(!future.should_stop());
        assert!(future.deadline().is_some());
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl TrainingObserver for Recorder {
        fn on_selected(&self, clusters: usize, _score: f64) {
            self.events
                .lock()
                .unwrap()
                .push(format!("selected {}", clusters));
        }
    }

    #[test]
    fn test_default_methods_are_noops() {
        let recorder = Recorder::default();
        recorder.on_candidate_start(3);
        recorder.on_iteration(3, 0, 0, 1.0);
        recorder.on_selected(3, 1.0);
        assert_eq!(*recorder.events.lock().unwrap(), vec!["selected 3"]);

        // Trait objects are shareable across threads
        let shared: Arc<dyn TrainingObserver> = Arc::new(LogObserver);
        let handle = std::thread::spawn(move || shared.on_candidate_start(2));
        handle.join().unwrap();
    }
}
