//! Bounded queue of scoped re-evaluations.
//!
//! Write handlers and the manual trigger submit a [`SweepScope`]; a single
//! worker drains the queue and runs the passes one after another. Submitting
//! never blocks: when the queue is full the request is dropped.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::notification_engine::{NotificationEngine, SweepScope};
use crate::middleware::metrics::record_recheck_dropped;

#[derive(Clone)]
pub struct RecheckQueue {
    tx: mpsc::Sender<SweepScope>,
}

impl RecheckQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<SweepScope>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Enqueues a pass. Returns false when the request was dropped.
    pub fn submit(&self, scope: SweepScope) -> bool {
        match self.tx.try_send(scope) {
            Ok(()) => {
                debug!(scope = scope.as_str(), "Recheck queued");
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                record_recheck_dropped(scope.as_str());
                warn!(scope = scope.as_str(), "Recheck queue full, dropping request");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                record_recheck_dropped(scope.as_str());
                warn!(scope = scope.as_str(), "Recheck worker stopped, dropping request");
                false
            }
        }
    }
}

/// Spawns the worker. It stops when `shutdown` flips to true or every sender
/// is gone.
pub fn spawn_recheck_worker(
    engine: Arc<NotificationEngine>,
    mut rx: mpsc::Receiver<SweepScope>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Recheck worker started");
        loop {
            tokio::select! {
                next = rx.recv() => match next {
                    Some(scope) => {
                        engine.run(scope).await;
                    }
                    None => break,
                },
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Recheck worker stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_submit_drops_when_full() {
        let (queue, mut rx) = RecheckQueue::new(2);

        assert!(queue.submit(SweepScope::Weight));
        assert!(queue.submit(SweepScope::Therapy));
        assert!(!queue.submit(SweepScope::Full));

        assert_eq!(rx.recv().await, Some(SweepScope::Weight));
        assert_eq!(rx.recv().await, Some(SweepScope::Therapy));
        assert!(queue.submit(SweepScope::MissingWeighing));
    }

    #[tokio::test]
    async fn test_submit_after_receiver_dropped() {
        let (queue, rx) = RecheckQueue::new(4);
        drop(rx);
        assert!(!queue.submit(SweepScope::Full));
    }
}
