//! Notification permission gate
//!
//! Asks the gateway for authorization at most once per process and
//! remembers the answer. A denial puts scheduling into a silent no-op mode
//! for the rest of the session.

use super::gateway::NotificationGateway;
use std::sync::Arc;
use tokio::sync::OnceCell;

pub struct PermissionGate {
    gateway: Arc<dyn NotificationGateway>,
    decision: OnceCell<bool>,
}

impl PermissionGate {
    pub fn new(gateway: Arc<dyn NotificationGateway>) -> Self {
        Self {
            gateway,
            decision: OnceCell::new(),
        }
    }

    /// Whether notifications may be posted. The first call prompts;
    /// concurrent first callers share that single prompt.
    pub async fn ensure_authorized(&self) -> bool {
        *self
            .decision
            .get_or_init(|| async {
                match self.gateway.request_authorization().await {
                    Ok(granted) => {
                        tracing::info!("Notification authorization granted: {}", granted);
                        granted
                    }
                    Err(e) => {
                        tracing::warn!("Notification authorization request failed: {}", e);
                        false
                    }
                }
            })
            .await
    }

    /// Cached decision, `None` until the first request completed
    pub fn decision(&self) -> Option<bool> {
        self.decision.get().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::InMemoryGateway;

    #[tokio::test]
    async fn test_authorization_requested_once() {
        let gateway = Arc::new(InMemoryGateway::new());
        let gate = PermissionGate::new(gateway.clone());

        assert_eq!(gate.decision(), None);
        assert!(gate.ensure_authorized().await);
        assert!(gate.ensure_authorized().await);
        assert_eq!(gate.decision(), Some(true));
        assert_eq!(gateway.authorization_requests(), 1);
    }

    #[tokio::test]
    async fn test_denial_is_remembered() {
        let gateway = Arc::new(InMemoryGateway::denied());
        let gate = PermissionGate::new(gateway.clone());

        assert!(!gate.ensure_authorized().await);
        assert!(!gate.ensure_authorized().await);
        assert_eq!(gateway.authorization_requests(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_calls_share_one_prompt() {
        let gateway = Arc::new(InMemoryGateway::new());
        let gate = Arc::new(PermissionGate::new(gateway.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = Arc::clone(&gate);
                tokio::spawn(async move { gate.ensure_authorized().await })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap());
        }
        assert_eq!(gateway.authorization_requests(), 1);
    }
}
