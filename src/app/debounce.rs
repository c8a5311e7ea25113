use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Trailing-edge debouncer: rapid triggers collapse into a single send
/// carrying the latest value, fired after the quiet period.
///
/// Each trigger aborts the pending timer task and starts a fresh one, the
/// timer-reset pattern with a stored cancellable handle.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::Sender<T>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, tx: mpsc::Sender<T>) -> Self {
        Self {
            delay,
            tx,
            pending: None,
        }
    }

    /// Schedules `value` to be sent after the quiet period, cancelling any
    /// previously scheduled send.
    pub fn trigger(&mut self, value: T) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        let tx = self.tx.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(value).await;
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[tokio::test(start_paused = true)]
    async fn rapid_triggers_collapse_into_one_send() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut debouncer = Debouncer::new(DELAY, tx);

        debouncer.trigger(1);
        debouncer.trigger(2);
        debouncer.trigger(3);

        assert_eq!(rx.recv().await, Some(3));
        tokio::time::sleep(DELAY * 2).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn triggers_outside_the_quiet_window_all_fire() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut debouncer = Debouncer::new(DELAY, tx);

        debouncer.trigger(1);
        tokio::time::sleep(DELAY * 2).await;
        debouncer.trigger(2);

        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_fires_before_the_quiet_period_ends() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut debouncer = Debouncer::new(DELAY, tx);

        debouncer.trigger(1);
        tokio::time::sleep(DELAY / 2).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(DELAY).await;
        assert_eq!(rx.try_recv().ok(), Some(1));
    }
}
