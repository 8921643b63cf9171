//! Write-once identity slot shared between the sign-in task and a widget.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use super::models::{Identity, IdentityState};
use crate::kernel::BaseIdentityProvider;

/// Owner side of a session's identity. Transitions out of `Pending` once.
#[derive(Debug, Clone)]
pub struct IdentitySlot {
    sender: Arc<watch::Sender<IdentityState>>,
}

/// Read side handed to the analyzer widget.
#[derive(Debug, Clone)]
pub struct IdentityWatch {
    receiver: watch::Receiver<IdentityState>,
}

impl IdentitySlot {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(IdentityState::Pending);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// A slot that is already established (tests, pre-authenticated callers).
    pub fn ready(identity: Identity) -> Self {
        let slot = Self::new();
        slot.establish(identity);
        slot
    }

    pub fn watch(&self) -> IdentityWatch {
        IdentityWatch {
            receiver: self.sender.subscribe(),
        }
    }

    /// Record a completed sign-in. Returns false if the slot was already settled.
    pub fn establish(&self, identity: Identity) -> bool {
        self.settle(IdentityState::Ready(identity))
    }

    /// Record a failed sign-in. Returns false if the slot was already settled.
    pub fn fail(&self, reason: impl Into<String>) -> bool {
        self.settle(IdentityState::Failed(reason.into()))
    }

    fn settle(&self, next: IdentityState) -> bool {
        self.sender.send_if_modified(|state| {
            if matches!(state, IdentityState::Pending) {
                *state = next;
                true
            } else {
                false
            }
        })
    }

    pub fn state(&self) -> IdentityState {
        self.sender.borrow().clone()
    }

    /// Run anonymous sign-in in the background and settle the slot with the outcome.
    pub fn spawn_sign_in(
        &self,
        provider: Arc<dyn BaseIdentityProvider>,
    ) -> tokio::task::JoinHandle<()> {
        let slot = self.clone();
        tokio::spawn(async move {
            match provider.sign_in_anonymously().await {
                Ok(identity) => {
                    info!(user_id = %identity.user_id, "Anonymous sign-in completed");
                    slot.establish(identity);
                }
                Err(e) => {
                    warn!(error = %e, "Anonymous sign-in failed");
                    slot.fail(e.to_string());
                }
            }
        })
    }
}

impl Default for IdentitySlot {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityWatch {
    /// The identity, if sign-in has completed.
    pub fn current(&self) -> Option<Identity> {
        self.receiver.borrow().identity().cloned()
    }

    pub fn state(&self) -> IdentityState {
        self.receiver.borrow().clone()
    }

    /// Wait until the slot leaves `Pending`.
    pub async fn settled(&mut self) -> IdentityState {
        let settled = self
            .receiver
            .wait_for(|state| !matches!(state, IdentityState::Pending))
            .await
            .map(|state| state.clone());

        match settled {
            Ok(state) => state,
            // Slot dropped while pending
            Err(_) => self.state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::identity::models::UserId;
    use crate::kernel::test_dependencies::MockIdentityProvider;

    #[test]
    fn test_slot_starts_pending() {
        let slot = IdentitySlot::new();
        assert_eq!(slot.state(), IdentityState::Pending);
        assert!(slot.watch().current().is_none());
    }

    #[test]
    fn test_establish_is_write_once() {
        let slot = IdentitySlot::new();
        let watch = slot.watch();

        assert!(slot.establish(Identity::new(UserId::new("first"))));
        assert!(!slot.establish(Identity::new(UserId::new("second"))));
        assert!(!slot.fail("late failure"));

        assert_eq!(watch.current().unwrap().user_id, UserId::new("first"));
    }

    #[tokio::test]
    async fn test_spawn_sign_in_settles_slot() {
        let slot = IdentitySlot::new();
        let mut watch = slot.watch();
        let provider = Arc::new(MockIdentityProvider::new("anon-42"));

        slot.spawn_sign_in(provider.clone()).await.unwrap();

        let state = watch.settled().await;
        assert_eq!(state.identity().unwrap().user_id, UserId::new("anon-42"));
        assert_eq!(provider.sign_in_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_sign_in_is_representable() {
        let slot = IdentitySlot::new();
        let provider = Arc::new(MockIdentityProvider::failing("identity toolkit down"));

        slot.spawn_sign_in(provider).await.unwrap();

        match slot.state() {
            IdentityState::Failed(reason) => assert!(reason.contains("identity toolkit down")),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert!(slot.watch().current().is_none());
    }
}
