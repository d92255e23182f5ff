//! One-shot shutdown trigger and lifecycle state.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

/// Where a service is in its life. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    Created,
    Listening,
    ShuttingDown,
    Stopped,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Shared handle to stop a running service and watch its state.
///
/// Clones observe the same trigger. Triggering is irrevocable; only the
/// first call has an effect.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    triggered: Arc<watch::Sender<bool>>,
    state: Arc<watch::Sender<LifecycleState>>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        let (triggered, _) = watch::channel(false);
        let (state, _) = watch::channel(LifecycleState::Created);
        Self {
            triggered: Arc::new(triggered),
            state: Arc::new(state),
        }
    }

    /// Request shutdown. Returns `true` for the call that actually fired.
    pub fn trigger(&self) -> bool {
        self.triggered.send_if_modified(|fired| {
            if *fired {
                false
            } else {
                *fired = true;
                true
            }
        })
    }

    pub fn is_triggered(&self) -> bool {
        *self.triggered.borrow()
    }

    /// Resolves once [`trigger`](Self::trigger) has been called.
    pub async fn triggered(&self) {
        let mut rx = self.triggered.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|fired| *fired).await;
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Resolves once the service has reached `target` or a later state.
    pub async fn reached(&self, target: LifecycleState) {
        let mut rx = self.state.subscribe();
        let _ = rx.wait_for(|state| *state >= target).await;
    }

    pub(crate) fn advance(&self, next: LifecycleState) {
        self.state.send_if_modified(|state| {
            if next > *state {
                *state = next;
                true
            } else {
                false
            }
        });
    }
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}
