// ── Bounded blocking worker pool ──
//
// Device clients are synchronous. Every call is shipped to tokio's
// blocking pool, gated by a semaphore so a fleet of unresponsive plugs
// cannot occupy more than `size` blocking threads at once.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::trace;

use crate::error::CoreError;

/// Cloneable handle to a bounded pool of blocking workers.
///
/// Clones share the same permits.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    /// Create a pool allowing `size` concurrent jobs. A size of zero is
    /// bumped to one.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Permits not currently held by a running job.
    pub fn idle(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `job` on a blocking thread once a permit is free.
    ///
    /// Waiting for a permit is a cooperative suspension. The permit moves
    /// into the job, so it stays held until the job returns even if the
    /// caller stops awaiting.
    pub async fn run<F, T>(&self, job: F) -> Result<T, CoreError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| CoreError::Worker {
                reason: e.to_string(),
            })?;
        trace!(idle = self.idle(), "dispatching blocking job");

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        })
        .await
        .map_err(|e| CoreError::Worker {
            reason: e.to_string(),
        })
    }

    /// Refuse all further jobs. Jobs already running finish normally.
    pub fn close(&self) {
        self.permits.close();
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_WORKERS)
    }
}
