//! Widget snapshot
//!
//! Read-only view of the shared store for the home-screen widget process.
//! Nothing here writes: the widget may run while the application is
//! mid-mutation and must never race it.

use super::migration::{read_lists, read_selected_id};
use crate::config::DEFAULT_LIST_NAME;
use crate::domain::{Reminder, ReminderList};
use crate::error::Result;
use crate::storage::Store;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One row rendered by the widget
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetItem {
    pub id: Uuid,
    pub title: String,
    pub is_completed: bool,
    pub due_date: Option<DateTime<Utc>>,
}

impl From<&Reminder> for WidgetItem {
    fn from(reminder: &Reminder) -> Self {
        Self {
            id: reminder.id,
            title: reminder.title.clone(),
            is_completed: reminder.is_completed,
            due_date: reminder.due_date,
        }
    }
}

/// Everything the widget needs to draw one list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSnapshot {
    /// `None` when nothing has been saved yet
    pub list_id: Option<Uuid>,
    pub list_name: String,
    pub items: Vec<WidgetItem>,
    pub remaining: usize,
    pub total: usize,
}

impl WidgetSnapshot {
    /// Placeholder shown before the application saved anything
    pub fn empty() -> Self {
        Self {
            list_id: None,
            list_name: DEFAULT_LIST_NAME.to_string(),
            items: Vec::new(),
            remaining: 0,
            total: 0,
        }
    }

    /// Build the snapshot for the selected list, or the first list when
    /// the pointer is missing or stale
    pub fn from_lists(lists: &[ReminderList], selected: Option<Uuid>, display_limit: usize) -> Self {
        let Some(list) = selected
            .and_then(|id| lists.iter().find(|list| list.id == id))
            .or_else(|| lists.first())
        else {
            return Self::empty();
        };

        let (open, done): (Vec<&Reminder>, Vec<&Reminder>) =
            list.reminders.iter().partition(|r| !r.is_completed);

        Self {
            list_id: Some(list.id),
            list_name: list.name.clone(),
            remaining: open.len(),
            total: list.reminders.len(),
            items: open
                .into_iter()
                .chain(done)
                .take(display_limit)
                .map(WidgetItem::from)
                .collect(),
        }
    }
}

/// Read the shared store and build the widget snapshot
pub async fn load_widget_snapshot(store: &dyn Store, display_limit: usize) -> Result<WidgetSnapshot> {
    let lists = read_lists(store).await?;
    let selected = read_selected_id(store).await?;

    let snapshot = WidgetSnapshot::from_lists(&lists, selected, display_limit);
    tracing::debug!(
        "Widget snapshot for {}: {} of {} items",
        snapshot.list_name,
        snapshot.items.len(),
        snapshot.total
    );

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LISTS_KEY, SELECTED_LIST_KEY};
    use crate::storage::{write_json, MemoryStore};

    fn list(name: &str, items: &[(&str, bool)]) -> ReminderList {
        let mut list = ReminderList::new(name).unwrap();
        for (title, done) in items {
            let mut reminder = Reminder::new(title).unwrap();
            reminder.is_completed = *done;
            list.reminders.push(reminder);
        }
        list
    }

    fn titles(snapshot: &WidgetSnapshot) -> Vec<&str> {
        snapshot.items.iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn test_incomplete_first_then_completed() {
        let lists = vec![list(
            "Errands",
            &[("a", true), ("b", false), ("c", true), ("d", false)],
        )];

        let snapshot = WidgetSnapshot::from_lists(&lists, None, 10);

        assert_eq!(titles(&snapshot), vec!["b", "d", "a", "c"]);
        assert_eq!(snapshot.remaining, 2);
        assert_eq!(snapshot.total, 4);
    }

    #[test]
    fn test_items_capped_at_display_limit() {
        let lists = vec![list(
            "Errands",
            &[("a", true), ("b", false), ("c", false), ("d", false)],
        )];

        let snapshot = WidgetSnapshot::from_lists(&lists, None, 2);

        assert_eq!(titles(&snapshot), vec!["b", "c"]);
        assert_eq!(snapshot.total, 4);
    }

    #[test]
    fn test_selected_list_is_used() {
        let lists = vec![list("Work", &[("w", false)]), list("Home", &[("h", false)])];

        let snapshot = WidgetSnapshot::from_lists(&lists, Some(lists[1].id), 5);
        assert_eq!(snapshot.list_name, "Home");

        let snapshot = WidgetSnapshot::from_lists(&lists, Some(Uuid::new_v4()), 5);
        assert_eq!(snapshot.list_name, "Work");
    }

    #[tokio::test]
    async fn test_load_from_store_never_writes() {
        let store = MemoryStore::new();
        let lists = vec![list("Work", &[("w", false)]), list("Home", &[("h", true)])];
        write_json(&store, LISTS_KEY, &lists).await.unwrap();
        store
            .set(SELECTED_LIST_KEY, lists[1].id.to_string().as_bytes())
            .await
            .unwrap();
        let before = store.get(LISTS_KEY).await.unwrap();

        let snapshot = load_widget_snapshot(&store, 5).await.unwrap();

        assert_eq!(snapshot.list_id, Some(lists[1].id));
        assert_eq!(snapshot.remaining, 0);
        assert_eq!(store.get(LISTS_KEY).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_empty_or_corrupt_store_gives_placeholder() {
        let store = MemoryStore::new();
        assert_eq!(
            load_widget_snapshot(&store, 5).await.unwrap(),
            WidgetSnapshot::empty()
        );

        store.set(LISTS_KEY, b"garbage").await.unwrap();
        assert_eq!(
            load_widget_snapshot(&store, 5).await.unwrap(),
            WidgetSnapshot::empty()
        );
        assert!(!store.contains(SELECTED_LIST_KEY).await);
    }
}
