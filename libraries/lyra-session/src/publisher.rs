//! Observable holder of the current snapshot
//!
//! One writer, many readers, built on `tokio::sync::watch`. Readers never see
//! a partial update: each write swaps a whole [`PlayerState`] in.

use tokio::sync::watch;

use crate::state::PlayerState;

/// Single-writer side of the snapshot channel
#[derive(Debug)]
pub struct StatePublisher {
    tx: watch::Sender<PlayerState>,
}

impl Default for StatePublisher {
    fn default() -> Self {
        Self::new(PlayerState::default())
    }
}

impl StatePublisher {
    /// Create a publisher holding an initial snapshot
    pub fn new(initial: PlayerState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Replace the snapshot with `update(current)`
    ///
    /// Readers are only woken when the result differs from the current
    /// snapshot. Returns whether it did.
    pub fn update(&self, update: impl FnOnce(&PlayerState) -> PlayerState) -> bool {
        self.tx.send_if_modified(|current| {
            let next = update(current);
            if next == *current {
                return false;
            }
            *current = next;
            true
        })
    }

    /// Copy of the current snapshot
    pub fn snapshot(&self) -> PlayerState {
        self.tx.borrow().clone()
    }

    /// New reader
    pub fn subscribe(&self) -> StateSubscriber {
        StateSubscriber {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read side of the snapshot channel
#[derive(Debug, Clone)]
pub struct StateSubscriber {
    rx: watch::Receiver<PlayerState>,
}

/// The publisher was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("state publisher closed")]
pub struct PublisherClosed;

impl StateSubscriber {
    /// Copy of the latest snapshot, marking it seen
    pub fn snapshot(&mut self) -> PlayerState {
        self.rx.borrow_and_update().clone()
    }

    /// Copy of the latest snapshot without marking it seen
    pub fn peek(&self) -> PlayerState {
        self.rx.borrow().clone()
    }

    /// Wait for the next snapshot this reader has not seen
    pub async fn changed(&mut self) -> Result<PlayerState, PublisherClosed> {
        self.rx.changed().await.map_err(|_| PublisherClosed)?;
        Ok(self.snapshot())
    }

    /// Wait until a snapshot satisfies `predicate`
    ///
    /// Returns immediately if the current snapshot already does.
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&PlayerState) -> bool,
    ) -> Result<PlayerState, PublisherClosed> {
        let state = self
            .rx
            .wait_for(|state| predicate(state))
            .await
            .map_err(|_| PublisherClosed)?;
        Ok(state.clone())
    }
}
