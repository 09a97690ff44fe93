//! Single-slot debounce timer over the tokio runtime

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// A cancellable, replaceable scheduled task.
///
/// At most one task is pending at a time: scheduling a new one aborts the
/// previous (reset, never stacked), and dropping the handle aborts whatever
/// is left so nothing fires after teardown. Tests drive it deterministically
/// with tokio's paused clock.
#[derive(Debug, Default)]
pub struct Debounce {
    handle: Option<JoinHandle<()>>,
}

impl Debounce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` after `delay`, replacing any pending task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    /// Abort the pending task, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Whether a scheduled task has not yet run to completion.
    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debounce {
    fn drop(&mut self) {
        self.cancel();
    }
}
