//! Reconciler
//!
//! Brings a list's registered triggers in line with its current plan.
//! Every pass cancels whatever the gateway holds for the list and
//! resubmits the full plan: adding, removing or reordering reminders shifts
//! the spreading offsets of their neighbours, so an incremental diff would
//! have to touch most triggers anyway.

use super::gateway::NotificationGateway;
use super::permission::PermissionGate;
use super::planner::{list_prefix, plan};
use crate::domain::ReminderList;
use crate::error::Result;
use std::collections::HashMap;
use std::ops::AddAssign;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Counts reported by a reconcile pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileResult {
    pub scheduled: usize,
    pub skipped: usize,
    pub cancelled: usize,
}

impl AddAssign for ReconcileResult {
    fn add_assign(&mut self, other: Self) {
        self.scheduled += other.scheduled;
        self.skipped += other.skipped;
        self.cancelled += other.cancelled;
    }
}

pub struct Reconciler {
    gateway: Arc<dyn NotificationGateway>,
    permission: PermissionGate,
    capacity: usize,
    list_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl Reconciler {
    pub fn new(gateway: Arc<dyn NotificationGateway>, capacity: usize) -> Self {
        Self {
            permission: PermissionGate::new(Arc::clone(&gateway)),
            gateway,
            capacity,
            list_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn gateway(&self) -> &Arc<dyn NotificationGateway> {
        &self.gateway
    }

    pub fn permission(&self) -> &PermissionGate {
        &self.permission
    }

    /// Global ceiling on pending registrations
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Serialize passes for one list. Passes queue in lock order.
    pub async fn lock_list(&self, list_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.list_locks.lock().await;
            Arc::clone(locks.entry(list_id).or_default())
        };
        lock.lock_owned().await
    }

    /// Replace every registered trigger of `list` with its current plan
    pub async fn reconcile(&self, list: &ReminderList) -> Result<ReconcileResult> {
        let _guard = self.lock_list(list.id).await;
        self.reconcile_locked(list).await
    }

    /// Same as `reconcile`; the caller already holds `lock_list(list.id)`
    pub(crate) async fn reconcile_locked(&self, list: &ReminderList) -> Result<ReconcileResult> {
        let desired = plan(list);

        let prefix = list_prefix(list.id);
        let (stale, others): (Vec<String>, Vec<String>) = self
            .gateway
            .list_pending()
            .await?
            .into_iter()
            .partition(|identifier| identifier.starts_with(&prefix));

        if !stale.is_empty() {
            self.gateway.cancel(&stale).await?;
        }

        let mut result = ReconcileResult {
            cancelled: stale.len(),
            ..ReconcileResult::default()
        };

        if desired.is_empty() {
            tracing::debug!(
                "List {} has no triggers to schedule ({} cancelled)",
                list.id,
                result.cancelled
            );
            return Ok(result);
        }

        if !self.permission.ensure_authorized().await {
            result.skipped = desired.len();
            tracing::debug!(
                "Notifications not authorized, skipping {} triggers for list {}",
                result.skipped,
                list.id
            );
            return Ok(result);
        }

        // Cancelled identifiers are already excluded from the estimate
        let mut pending = others.len();

        for (index, spec) in desired.iter().enumerate() {
            if pending >= self.capacity {
                result.skipped += desired.len() - index;
                tracing::warn!(
                    "Pending notification limit {} reached, skipping {} triggers for list {}",
                    self.capacity,
                    desired.len() - index,
                    list.id
                );
                break;
            }

            match self.gateway.schedule(spec).await {
                Ok(()) => {
                    pending += 1;
                    result.scheduled += 1;
                    tracing::debug!("Scheduled {} at {}", spec.identifier, spec.trigger);
                }
                Err(e) => {
                    result.skipped += 1;
                    tracing::warn!("Failed to schedule {}: {}", spec.identifier, e);
                }
            }
        }

        tracing::info!(
            "Reconciled list {}: {} scheduled, {} skipped, {} cancelled",
            list.id,
            result.scheduled,
            result.skipped,
            result.cancelled
        );

        Ok(result)
    }

    /// Drop every registered trigger of a list that no longer exists
    pub async fn cancel_list(&self, list_id: Uuid) -> Result<usize> {
        let _guard = self.lock_list(list_id).await;
        self.cancel_list_locked(list_id).await
    }

    pub(crate) async fn cancel_list_locked(&self, list_id: Uuid) -> Result<usize> {
        let prefix = list_prefix(list_id);
        let stale: Vec<String> = self
            .gateway
            .list_pending()
            .await?
            .into_iter()
            .filter(|identifier| identifier.starts_with(&prefix))
            .collect();

        if !stale.is_empty() {
            self.gateway.cancel(&stale).await?;
            tracing::info!("Cancelled {} triggers of removed list {}", stale.len(), list_id);
        }

        self.list_locks.lock().await.remove(&list_id);

        Ok(stale.len())
    }

    /// Reconcile lists one after another. A failing list is logged and
    /// does not stop the others.
    pub async fn reconcile_all(&self, lists: &[ReminderList]) -> ReconcileResult {
        let mut total = ReconcileResult::default();

        for list in lists {
            match self.reconcile(list).await {
                Ok(result) => total += result,
                Err(e) => tracing::error!("Failed to reconcile list {}: {}", list.id, e),
            }
        }

        total
    }
}
