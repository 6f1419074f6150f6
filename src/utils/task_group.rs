use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};

/// A set of spawned tasks joined together at one barrier.
///
/// With a limit, at most that many tasks run their body at once; the rest
/// are spawned immediately and wait for a permit inside the runtime, so
/// `spawn` itself never blocks the caller.
pub struct TaskGroup<T> {
    semaphore: Option<Arc<Semaphore>>,
    handles: Vec<JoinHandle<T>>,
}

impl<T: Send + 'static> TaskGroup<T> {
    pub fn new(max_concurrent: Option<usize>) -> Self {
        Self {
            semaphore: max_concurrent.map(|n| Arc::new(Semaphore::new(n))),
            handles: Vec::new(),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn spawn<F>(&mut self, f: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        let semaphore = self.semaphore.clone();
        let handle = tokio::spawn(async move {
            // the semaphore is never closed, so acquire only fails if it is dropped
            let _permit = match semaphore {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };
            f.await
        });
        self.handles.push(handle);
    }

    /// Waits for every task. Results come back in spawn order; a task that
    /// panicked yields its `JoinError` without affecting the others.
    pub async fn join_all(self) -> Vec<Result<T, JoinError>> {
        let mut results = Vec::with_capacity(self.handles.len());
        for handle in self.handles {
            results.push(handle.await);
        }
        results
    }
}
