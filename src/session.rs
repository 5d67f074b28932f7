use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Cancellation signal for one generation attempt.
///
/// Cancelled explicitly when a newer attempt starts or the owner tears down,
/// and implicitly when the registry that issued it is dropped.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Resolves once the token is cancelled
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // An error means the sender is gone, which counts as cancellation
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Identity of one generation attempt, handed to everything that acts on
/// its behalf.
///
/// Callbacks check [`is_current`](AttemptContext::is_current) before touching
/// shared output so a superseded stream can never overwrite a newer one.
#[derive(Debug, Clone)]
pub struct AttemptContext {
    id: u64,
    latest: Arc<AtomicU64>,
    token: CancelToken,
}

impl AttemptContext {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// True while no newer attempt has started and this one is not cancelled
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.id && !self.token.is_cancelled()
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

/// Issues attempt ids and owns the cancellation switch of the current attempt
#[derive(Debug, Default)]
pub struct AttemptRegistry {
    latest: Arc<AtomicU64>,
    current: Mutex<Option<watch::Sender<bool>>>,
}

impl AttemptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new attempt, cancelling the previous one
    pub fn begin(&self) -> AttemptContext {
        let (tx, rx) = watch::channel(false);

        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = current.replace(tx) {
            previous.send_replace(true);
        }

        tracing::debug!(attempt_id = id, "Began generation attempt");

        AttemptContext {
            id,
            latest: self.latest.clone(),
            token: CancelToken { rx },
        }
    }

    /// Invalidate the current attempt without starting another (teardown)
    pub fn invalidate(&self) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        let id = self.latest.fetch_add(1, Ordering::SeqCst);
        if let Some(previous) = current.take() {
            previous.send_replace(true);
            tracing::debug!(attempt_id = id, "Invalidated generation attempt");
        }
    }

    /// Id of the most recently started attempt (0 before the first)
    pub fn current_id(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}
