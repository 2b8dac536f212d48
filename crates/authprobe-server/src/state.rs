use crate::CallbackParams;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Shared state for the callback router: a single-acceptance latch.
///
/// The first request to the callback path takes the sender and fires it;
/// every later request finds the latch empty and gets a fixed "already
/// handled" page. This is what makes the listener one-shot even though the
/// browser may issue extra requests (favicon probes, refreshes).
#[derive(Clone)]
pub struct AppState {
    latch: Arc<Mutex<Option<oneshot::Sender<CallbackParams>>>>,
}

impl AppState {
    pub fn new() -> (Self, oneshot::Receiver<CallbackParams>) {
        let (tx, rx) = oneshot::channel();
        let state = Self {
            latch: Arc::new(Mutex::new(Some(tx))),
        };
        (state, rx)
    }

    /// Take the sender, leaving the latch empty. Returns `None` once a
    /// callback has already been accepted.
    pub fn take_sender(&self) -> Option<oneshot::Sender<CallbackParams>> {
        self.latch
            .lock()
            .expect("latch mutex is never poisoned: holders do not panic")
            .take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sender_can_only_be_taken_once() {
        let (state, _rx) = AppState::new();
        assert!(state.take_sender().is_some());
        assert!(state.take_sender().is_none());
        assert!(state.take_sender().is_none());
    }

    #[tokio::test]
    async fn clones_share_the_latch() {
        let (state, _rx) = AppState::new();
        let clone = state.clone();
        assert!(clone.take_sender().is_some());
        assert!(state.take_sender().is_none());
    }
}
