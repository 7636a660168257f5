//! # Stream Cancellation
//!
//! Cooperative cancellation for the subscription pipeline. The inactivity
//! timer, the result-count ceiling and any external deadline all cancel a
//! stream through [`AbortController::abort`]. The first cause recorded wins.

use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Why a stream was cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortCause {
    /// No frame arrived within the inactivity window.
    Timeout,
    /// The result-count ceiling was reached.
    LimitReached,
    /// Cancelled by the caller, with a human-readable cause.
    External(String),
}

impl AbortCause {
    /// Whether this cause ends the stream normally rather than fatally.
    pub fn is_normal_closure(&self) -> bool {
        matches!(self, AbortCause::Timeout | AbortCause::LimitReached)
    }
}

impl fmt::Display for AbortCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortCause::Timeout => write!(f, "Timeout"),
            AbortCause::LimitReached => write!(f, "Limit"),
            AbortCause::External(cause) => write!(f, "{}", cause),
        }
    }
}

/// Owner side of an abort signal. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AbortController {
    tx: Arc<watch::Sender<Option<AbortCause>>>,
}

impl AbortController {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Record `cause` unless a cause is already set.
    ///
    /// Returns `true` if this call performed the abort.
    pub fn abort(&self, cause: AbortCause) -> bool {
        self.tx.send_if_modified(|current| {
            if current.is_none() {
                *current = Some(cause);
                true
            } else {
                false
            }
        })
    }

    /// The recorded cause, if aborted.
    pub fn cause(&self) -> Option<AbortCause> {
        self.tx.borrow().clone()
    }

    /// A listener for this controller.
    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}

/// Listener side of an abort signal.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    rx: watch::Receiver<Option<AbortCause>>,
}

impl AbortSignal {
    /// Resolves with the cause once aborted. Pends forever if every
    /// controller is dropped without aborting.
    pub async fn aborted(&mut self) -> AbortCause {
        loop {
            if let Some(cause) = self.rx.borrow_and_update().clone() {
                return cause;
            }
            if self.rx.changed().await.is_err() {
                return std::future::pending().await;
            }
        }
    }
}
