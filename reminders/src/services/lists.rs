//! Lists service
//!
//! Single owner of the reminder collection. Every mutation is serialized,
//! persisted before it returns, and then hands the touched list to the
//! reconciler in the background. Scheduling never blocks or fails an edit.
//!
//! Invalid edits (unknown ids, blank titles, a second default list, deleting
//! the default list while others exist) leave the collection unchanged and
//! report `Ok(false)` / `Ok(None)`.

use super::migration::{load_collection, save_lists, save_selection};
use crate::domain::{Collection, ListRemoval, NotificationSettings, Reminder, ReminderList};
use crate::error::Result;
use crate::notifications::{ReconcileResult, Reconciler};
use crate::storage::Store;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Partial reminder edit; `None` fields stay as they are
#[derive(Debug, Clone, Default)]
pub struct ReminderUpdate {
    pub title: Option<String>,
    /// `Some(None)` clears the due date
    pub due_date: Option<Option<DateTime<Utc>>>,
}

/// Service for managing reminder lists
#[derive(Clone)]
pub struct ListsService {
    store: Arc<dyn Store>,
    reconciler: Arc<Reconciler>,
    collection: Arc<Mutex<Collection>>,
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl ListsService {
    /// Load (migrating legacy data first) and take ownership of the collection
    pub async fn load(store: Arc<dyn Store>, reconciler: Arc<Reconciler>) -> Result<Self> {
        let collection = load_collection(store.as_ref()).await?;

        Ok(Self {
            store,
            reconciler,
            collection: Arc::new(Mutex::new(collection)),
            tasks: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Copy of the whole collection
    pub async fn snapshot(&self) -> Collection {
        self.collection.lock().await.clone()
    }

    /// All lists in display order
    pub async fn lists(&self) -> Vec<ReminderList> {
        self.collection.lock().await.lists().to_vec()
    }

    pub async fn get_list(&self, id: Uuid) -> Option<ReminderList> {
        self.collection.lock().await.find(id).cloned()
    }

    pub async fn selected_list(&self) -> ReminderList {
        self.collection.lock().await.selected_list().clone()
    }

    /// Create a new list
    pub async fn create_list(&self, name: &str) -> Result<Option<ReminderList>> {
        let mut collection = self.collection.lock().await;

        let list = match ReminderList::new(name) {
            Ok(list) => list,
            Err(e) => return Ok(rejected(&e.to_string())),
        };

        let mut next = collection.clone();
        if !next.add_list(list.clone()) {
            return Ok(rejected(&format!("a list named {} already exists", list.name)));
        }

        self.commit(&mut collection, next).await?;
        tracing::info!("Created list {} ({})", list.name, list.id);

        Ok(Some(list))
    }

    /// Rename a list
    pub async fn rename_list(&self, id: Uuid, name: &str) -> Result<bool> {
        let mut collection = self.collection.lock().await;

        if collection.conflicts_with_default(name, Some(id)) {
            return Ok(rejected_flag(&format!("a list named {} already exists", name.trim())));
        }

        let mut next = collection.clone();
        let Some(list) = next.find_mut(id) else {
            return Ok(rejected_flag(&format!("list {} not found", id)));
        };
        if let Err(e) = list.set_name(name) {
            return Ok(rejected_flag(&e.to_string()));
        }

        self.commit(&mut collection, next).await?;
        self.spawn_reconcile(id).await;

        Ok(true)
    }

    /// Delete a list and cancel its notifications.
    ///
    /// Deleting the only list leaves a fresh default list behind.
    pub async fn delete_list(&self, id: Uuid) -> Result<bool> {
        let mut collection = self.collection.lock().await;

        let mut next = collection.clone();
        match next.remove_list(id) {
            ListRemoval::NotFound => Ok(rejected_flag(&format!("list {} not found", id))),
            ListRemoval::DefaultProtected => Ok(rejected_flag(
                "the default list cannot be deleted while other lists exist",
            )),
            ListRemoval::Removed { replacement } => {
                self.commit(&mut collection, next).await?;
                if let Some(replacement) = replacement {
                    tracing::info!("Last list deleted, created default list {}", replacement);
                }
                tracing::info!("Deleted list {}", id);

                self.spawn_reconcile(id).await;
                Ok(true)
            }
        }
    }

    /// Point the selection (shared with the widget) at a list
    pub async fn select_list(&self, id: Uuid) -> Result<bool> {
        let mut collection = self.collection.lock().await;

        let mut next = collection.clone();
        if !next.select(id) {
            return Ok(rejected_flag(&format!("list {} not found", id)));
        }

        self.commit(&mut collection, next).await?;
        Ok(true)
    }

    /// Add a reminder at the end of a list
    pub async fn add_reminder(
        &self,
        list_id: Uuid,
        title: &str,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<Option<Reminder>> {
        let mut collection = self.collection.lock().await;

        let reminder = match Reminder::new(title) {
            Ok(reminder) => reminder.with_due_date(due_date),
            Err(e) => return Ok(rejected(&e.to_string())),
        };

        let mut next = collection.clone();
        let Some(list) = next.find_mut(list_id) else {
            return Ok(rejected(&format!("list {} not found", list_id)));
        };
        list.reminders.push(reminder.clone());

        self.commit(&mut collection, next).await?;
        tracing::info!("Added reminder {} to list {}", reminder.id, list_id);
        self.spawn_reconcile(list_id).await;

        Ok(Some(reminder))
    }

    /// Edit a reminder's title and/or due date
    pub async fn update_reminder(
        &self,
        list_id: Uuid,
        reminder_id: Uuid,
        update: ReminderUpdate,
    ) -> Result<bool> {
        self.edit_reminder(list_id, reminder_id, |reminder| {
            if let Some(title) = &update.title {
                reminder.set_title(title)?;
            }
            if let Some(due_date) = update.due_date {
                reminder.due_date = due_date;
            }
            Ok(())
        })
        .await
    }

    /// Mark a reminder done or open
    pub async fn set_completed(
        &self,
        list_id: Uuid,
        reminder_id: Uuid,
        completed: bool,
    ) -> Result<bool> {
        self.edit_reminder(list_id, reminder_id, |reminder| {
            reminder.is_completed = completed;
            Ok(())
        })
        .await
    }

    pub async fn toggle_completed(&self, list_id: Uuid, reminder_id: Uuid) -> Result<bool> {
        self.edit_reminder(list_id, reminder_id, |reminder| {
            reminder.is_completed = !reminder.is_completed;
            Ok(())
        })
        .await
    }

    pub async fn delete_reminder(&self, list_id: Uuid, reminder_id: Uuid) -> Result<bool> {
        let mut collection = self.collection.lock().await;

        let mut next = collection.clone();
        let removed = next
            .find_mut(list_id)
            .and_then(|list| list.remove_reminder(reminder_id));
        if removed.is_none() {
            return Ok(rejected_flag(&format!(
                "reminder {} not found in list {}",
                reminder_id, list_id
            )));
        }

        self.commit(&mut collection, next).await?;
        tracing::info!("Deleted reminder {} from list {}", reminder_id, list_id);
        self.spawn_reconcile(list_id).await;

        Ok(true)
    }

    /// Move a reminder to another display position
    pub async fn move_reminder(&self, list_id: Uuid, reminder_id: Uuid, to: usize) -> Result<bool> {
        let mut collection = self.collection.lock().await;

        let mut next = collection.clone();
        let moved = next
            .find_mut(list_id)
            .is_some_and(|list| list.move_reminder(reminder_id, to));
        if !moved {
            return Ok(rejected_flag(&format!(
                "reminder {} not found in list {}",
                reminder_id, list_id
            )));
        }

        self.commit(&mut collection, next).await?;
        self.spawn_reconcile(list_id).await;

        Ok(true)
    }

    /// Replace (or remove, with `None`) a list's notification policy
    pub async fn update_notification_settings(
        &self,
        list_id: Uuid,
        settings: Option<NotificationSettings>,
    ) -> Result<bool> {
        let mut collection = self.collection.lock().await;

        let mut next = collection.clone();
        let Some(list) = next.find_mut(list_id) else {
            return Ok(rejected_flag(&format!("list {} not found", list_id)));
        };
        list.notification_settings = settings;

        self.commit(&mut collection, next).await?;
        tracing::info!("Updated notification settings of list {}", list_id);
        self.spawn_reconcile(list_id).await;

        Ok(true)
    }

    /// Reconcile every list, e.g. at process start
    pub async fn reconcile_all(&self) -> ReconcileResult {
        let lists = self.lists().await;
        self.reconciler.reconcile_all(&lists).await
    }

    /// Wait for every background reconcile pass started so far
    pub async fn settle(&self) {
        loop {
            let handles = std::mem::take(&mut *self.tasks.lock().await);
            if handles.is_empty() {
                return;
            }
            for handle in handles {
                if let Err(e) = handle.await {
                    tracing::error!("Reconcile task failed: {}", e);
                }
            }
        }
    }

    async fn edit_reminder<F>(&self, list_id: Uuid, reminder_id: Uuid, edit: F) -> Result<bool>
    where
        F: FnOnce(&mut Reminder) -> Result<()>,
    {
        let mut collection = self.collection.lock().await;

        let mut next = collection.clone();
        let Some(reminder) = next
            .find_mut(list_id)
            .and_then(|list| list.reminder_mut(reminder_id))
        else {
            return Ok(rejected_flag(&format!(
                "reminder {} not found in list {}",
                reminder_id, list_id
            )));
        };

        if let Err(e) = edit(reminder) {
            return Ok(rejected_flag(&e.to_string()));
        }

        self.commit(&mut collection, next).await?;
        tracing::debug!("Updated reminder {} in list {}", reminder_id, list_id);
        self.spawn_reconcile(list_id).await;

        Ok(true)
    }

    /// Persist `next` and make it the current collection.
    ///
    /// Memory follows the saved lists: a failed lists write leaves both
    /// unchanged, and once the lists are written memory takes them even if
    /// the selection write then fails. A stale saved selection is repaired
    /// by the next commit and the widget falls back to the first list.
    async fn commit(
        &self,
        collection: &mut MutexGuard<'_, Collection>,
        next: Collection,
    ) -> Result<()> {
        save_lists(self.store.as_ref(), &next).await?;
        **collection = next;
        save_selection(self.store.as_ref(), &**collection).await
    }

    /// Reconcile a list in the background.
    ///
    /// The task reads the list only after it holds the list's reconcile
    /// lock, so whichever pass runs last sees the latest edit. A list that
    /// is gone by then gets its triggers cancelled.
    async fn spawn_reconcile(&self, list_id: Uuid) {
        let reconciler = Arc::clone(&self.reconciler);
        let collection = Arc::clone(&self.collection);

        let handle = tokio::spawn(async move {
            let _guard = reconciler.lock_list(list_id).await;
            let list = collection.lock().await.find(list_id).cloned();

            let outcome = match list {
                Some(list) => reconciler.reconcile_locked(&list).await.map(|_| ()),
                None => reconciler.cancel_list_locked(list_id).await.map(|_| ()),
            };

            if let Err(e) = outcome {
                tracing::error!("Failed to reconcile list {}: {}", list_id, e);
            }
        });

        let mut tasks = self.tasks.lock().await;
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }
}

fn rejected<T>(reason: &str) -> Option<T> {
    tracing::warn!("Rejected edit: {}", reason);
    None
}

fn rejected_flag(reason: &str) -> bool {
    tracing::warn!("Rejected edit: {}", reason);
    false
}
