use std::time::Duration;
use tokio::task::JoinHandle;

/// A cancellable delayed task. Re-arming aborts whatever was scheduled, so at
/// most one invocation is ever pending and only the last one can fire.
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self { Self { delay, pending: None } }

    /// Run `task` after the quiet period unless re-armed or cancelled first.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        }));
    }

    /// Drop the pending invocation. Returns true if one had not fired yet.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool { self.pending.as_ref().is_some_and(|h| !h.is_finished()) }
}

impl Drop for Debouncer {
    fn drop(&mut self) { self.cancel(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn only_the_last_value_fires() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let mut debouncer = Debouncer::new(Duration::from_millis(200));

        for value in ["r", "ru", "rus", "rust"] {
            let fired = fired.clone();
            debouncer.schedule(move || fired.lock().push(value));
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(fired.lock().is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(*fired.lock(), vec!["rust"]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_the_call() {
        let fired = Arc::new(Mutex::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        let counter = fired.clone();
        debouncer.schedule(move || *counter.lock() += 1);
        assert!(debouncer.cancel());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(*fired.lock(), 0);
    }
}
