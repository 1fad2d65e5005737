//! In-memory notification gateway
//!
//! Keeps registrations in a map instead of handing them to an alarm
//! facility. Used for dry runs of the scheduling engine and by tests, which
//! can inspect what was registered and inject rejections.

use super::gateway::{NotificationGateway, TriggerSpec};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

pub struct InMemoryGateway {
    authorized: bool,
    capacity: Option<usize>,
    registered: RwLock<BTreeMap<String, TriggerSpec>>,
    rejected: RwLock<HashSet<String>>,
    authorization_requests: AtomicUsize,
    schedule_calls: AtomicUsize,
}

impl InMemoryGateway {
    /// Gateway that grants authorization and has no ceiling of its own
    pub fn new() -> Self {
        Self {
            authorized: true,
            capacity: None,
            registered: RwLock::new(BTreeMap::new()),
            rejected: RwLock::new(HashSet::new()),
            authorization_requests: AtomicUsize::new(0),
            schedule_calls: AtomicUsize::new(0),
        }
    }

    /// Gateway whose user declined notifications; `schedule` is a no-op
    pub fn denied() -> Self {
        Self {
            authorized: false,
            ..Self::new()
        }
    }

    /// Reject registrations beyond `capacity`, like a platform would
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Make every future `schedule` of `identifier` fail
    pub async fn reject(&self, identifier: &str) {
        self.rejected.write().await.insert(identifier.to_string());
    }

    /// Registered specs ordered by identifier
    pub async fn registered(&self) -> Vec<TriggerSpec> {
        self.registered.read().await.values().cloned().collect()
    }

    pub async fn get(&self, identifier: &str) -> Option<TriggerSpec> {
        self.registered.read().await.get(identifier).cloned()
    }

    pub fn authorization_requests(&self) -> usize {
        self.authorization_requests.load(Ordering::SeqCst)
    }

    /// Number of `schedule` calls received, including rejected ones
    pub fn schedule_calls(&self) -> usize {
        self.schedule_calls.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationGateway for InMemoryGateway {
    async fn request_authorization(&self) -> Result<bool> {
        self.authorization_requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.authorized)
    }

    async fn schedule(&self, spec: &TriggerSpec) -> Result<()> {
        self.schedule_calls.fetch_add(1, Ordering::SeqCst);

        if !self.authorized {
            return Ok(());
        }

        if self.rejected.read().await.contains(&spec.identifier) {
            return Err(AppError::Gateway(format!(
                "Trigger rejected: {}",
                spec.identifier
            )));
        }

        let mut registered = self.registered.write().await;
        if let Some(capacity) = self.capacity {
            if registered.len() >= capacity && !registered.contains_key(&spec.identifier) {
                return Err(AppError::Gateway(format!(
                    "Pending notification limit {} reached",
                    capacity
                )));
            }
        }

        registered.insert(spec.identifier.clone(), spec.clone());
        Ok(())
    }

    async fn cancel(&self, identifiers: &[String]) -> Result<()> {
        let mut registered = self.registered.write().await;
        for identifier in identifiers {
            registered.remove(identifier);
        }
        Ok(())
    }

    async fn list_pending(&self) -> Result<Vec<String>> {
        Ok(self.registered.read().await.keys().cloned().collect())
    }
}
