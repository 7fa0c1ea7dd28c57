//! Trailing-edge debounce for free-text search input.

use std::time::Duration;
use tokio::sync::mpsc;

/// Quiet period before a typed query is applied.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Emits the last value of each burst once input has been quiet for `delay`.
///
/// Dropping the debouncer flushes any pending value and closes the output.
#[derive(Debug, Clone)]
pub struct Debouncer<V> {
    tx: mpsc::UnboundedSender<V>,
}

impl<V: Send + 'static> Debouncer<V> {
    /// Spawn the timer task on the current tokio runtime.
    pub fn spawn(delay: Duration) -> (Self, mpsc::UnboundedReceiver<V>) {
        let (tx, mut input) = mpsc::unbounded_channel::<V>();
        let (output, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut pending: Option<V> = None;
            loop {
                tokio::select! {
                    next = input.recv() => match next {
                        Some(value) => pending = Some(value),
                        None => break,
                    },
                    _ = tokio::time::sleep(delay), if pending.is_some() => {
                        if let Some(value) = pending.take() {
                            let _ = output.send(value);
                        }
                    }
                    // Stop as soon as nobody listens, so `push` reports it.
                    _ = output.closed() => {
                        tracing::trace!("debouncer output dropped");
                        return;
                    }
                }
            }
            if let Some(value) = pending {
                let _ = output.send(value);
            }
            tracing::trace!("debouncer closed");
        });

        (Self { tx }, rx)
    }

    /// Record a new value and restart the quiet period.
    ///
    /// Returns false once the output receiver has gone away.
    pub fn push(&self, value: V) -> bool {
        self.tx.send(value).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, Instant};

    #[tokio::test(start_paused = true)]
    async fn test_burst_emits_last_value_once() {
        let (debouncer, mut out) = Debouncer::spawn(DEFAULT_DEBOUNCE);
        let start = Instant::now();

        for query in ["p", "pa", "par", "pari", "paris"] {
            debouncer.push(query.to_string());
            sleep(Duration::from_millis(100)).await;
        }

        assert_eq!(out.recv().await.as_deref(), Some("paris"));
        assert!(start.elapsed() >= Duration::from_millis(400) + DEFAULT_DEBOUNCE);
        assert!(out.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts() {
        let (debouncer, mut out) = Debouncer::spawn(DEFAULT_DEBOUNCE);

        debouncer.push(1);
        sleep(Duration::from_millis(600)).await;
        debouncer.push(2);

        assert_eq!(out.recv().await, Some(1));
        assert_eq!(out.recv().await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_flushes_pending() {
        let (debouncer, mut out) = Debouncer::spawn(DEFAULT_DEBOUNCE);
        let start = Instant::now();

        debouncer.push("rome");
        drop(debouncer);

        assert_eq!(out.recv().await, Some("rome"));
        assert!(start.elapsed() < DEFAULT_DEBOUNCE);
        assert_eq!(out.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_fails_after_receiver_dropped() {
        let (debouncer, out) = Debouncer::spawn(DEFAULT_DEBOUNCE);
        assert!(debouncer.push("oslo"));

        drop(out);
        sleep(Duration::from_millis(1)).await;

        assert!(!debouncer.push("bergen"));
    }
}
