use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use super::domain::IssueId;

/// Delay queue for automatic dispatch attempts, keyed by issue id.
///
/// Each scheduled attempt is a tokio task that sleeps for the configured window
/// and then runs its callback. An attempt can be cancelled until it fires;
/// scheduling the same issue again replaces the earlier attempt. The callback
/// is expected to re-validate the issue, the queue itself gives no guarantee
/// that nothing changed during the window.
#[derive(Debug)]
pub(crate) struct DispatchQueue {
    delay: Duration,
    pending: Mutex<HashMap<IssueId, AbortHandle>>,
}

impl DispatchQueue {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns `false` when no tokio runtime is available to host the timer.
    pub(crate) fn schedule<F>(&self, issue_id: IssueId, fire: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!(issue_id = %issue_id, "no async runtime, automatic dispatch skipped");
                return false;
            }
        };

        let delay = self.delay;
        // Hold the lock across spawn so a zero-delay task cannot settle before it is tracked.
        let mut pending = self.lock();
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            fire();
        });
        if let Some(previous) = pending.insert(issue_id.clone(), task.abort_handle()) {
            previous.abort();
        }
        debug!(issue_id = %issue_id, delay_ms = delay.as_millis() as u64, "dispatch scheduled");
        true
    }

    /// Aborts a scheduled attempt that has not fired yet.
    pub(crate) fn cancel(&self, issue_id: &IssueId) -> bool {
        match self.lock().remove(issue_id) {
            Some(handle) => {
                handle.abort();
                debug!(issue_id = %issue_id, "scheduled dispatch cancelled");
                true
            }
            None => false,
        }
    }

    /// Forgets an attempt that is firing now.
    pub(crate) fn settle(&self, issue_id: &IssueId) {
        self.lock().remove(issue_id);
    }

    pub(crate) fn is_pending(&self, issue_id: &IssueId) -> bool {
        self.lock().contains_key(issue_id)
    }

    pub(crate) fn pending_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<IssueId, AbortHandle>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
