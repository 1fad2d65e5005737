//! Collection persistence and legacy import
//!
//! Loading always runs the one-time import of the pre-multi-list format
//! first, then reads the collection or falls back to a fresh default list.

use crate::config::{LEGACY_REMINDERS_KEY, LISTS_KEY, SELECTED_LIST_KEY};
use crate::domain::{Collection, Reminder, ReminderList};
use crate::error::{AppError, Result};
use crate::storage::{read_json, write_json, Store};
use uuid::Uuid;

/// Import legacy reminders into a single default list.
///
/// Returns true when reminders were imported. Once lists exist the legacy
/// key is only removed: a previous import already carried its reminders.
pub async fn migrate_legacy(store: &dyn Store) -> Result<bool> {
    let Some(bytes) = store.get(LEGACY_REMINDERS_KEY).await? else {
        return Ok(false);
    };

    if store.get(LISTS_KEY).await?.is_some() {
        tracing::info!("Reminder lists already saved, removing legacy reminders");
        store.remove(LEGACY_REMINDERS_KEY).await?;
        return Ok(false);
    }

    let reminders: Vec<Reminder> = match serde_json::from_slice(&bytes) {
        Ok(reminders) => reminders,
        Err(e) => {
            tracing::error!("Failed to decode legacy reminders, leaving them untouched: {}", e);
            return Ok(false);
        }
    };

    let mut list = ReminderList::default_list();
    list.reminders = reminders
        .into_iter()
        .filter_map(|mut reminder| {
            let title = reminder.title.clone();
            match reminder.set_title(&title) {
                Ok(()) => Some(reminder),
                Err(_) => {
                    tracing::warn!("Dropping legacy reminder {} with an empty title", reminder.id);
                    None
                }
            }
        })
        .collect();

    write_json(store, LISTS_KEY, std::slice::from_ref(&list)).await?;
    store
        .set(SELECTED_LIST_KEY, list.id.to_string().as_bytes())
        .await?;
    store.remove(LEGACY_REMINDERS_KEY).await?;

    tracing::info!(
        "Migrated {} legacy reminders into list {}",
        list.reminders.len(),
        list.name
    );

    Ok(true)
}

/// Read the selection pointer; unreadable values count as missing
pub async fn read_selected_id(store: &dyn Store) -> Result<Option<Uuid>> {
    let Some(bytes) = store.get(SELECTED_LIST_KEY).await? else {
        return Ok(None);
    };

    let id = std::str::from_utf8(&bytes)
        .ok()
        .and_then(|text| Uuid::parse_str(text.trim()).ok());

    if id.is_none() {
        tracing::warn!("Ignoring unreadable selected list id");
    }

    Ok(id)
}

/// Read saved lists. Corrupt data is logged and treated as no lists.
pub async fn read_lists(store: &dyn Store) -> Result<Vec<ReminderList>> {
    match read_json::<Vec<ReminderList>>(store, LISTS_KEY).await {
        Ok(lists) => Ok(lists.unwrap_or_default()),
        Err(AppError::Serialization(e)) => {
            tracing::error!("Failed to decode saved reminder lists, starting fresh: {}", e);
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

/// Migrate, then load the collection or synthesize a default one.
/// Repairs (new default list, stale selection) are written back.
pub async fn load_collection(store: &dyn Store) -> Result<Collection> {
    migrate_legacy(store).await?;

    let lists = read_lists(store).await?;
    let had_lists = !lists.is_empty();
    let selected = read_selected_id(store).await?;

    let collection = Collection::from_parts(lists, selected);

    if !had_lists || selected != Some(collection.selected_id()) {
        save_collection(store, &collection).await?;
    }

    tracing::info!("Loaded {} reminder lists", collection.len());

    Ok(collection)
}

/// Write-through persistence of the whole collection
pub async fn save_collection(store: &dyn Store, collection: &Collection) -> Result<()> {
    save_lists(store, collection).await?;
    save_selection(store, collection).await
}

pub async fn save_lists(store: &dyn Store, collection: &Collection) -> Result<()> {
    write_json(store, LISTS_KEY, collection.lists()).await
}

pub async fn save_selection(store: &dyn Store, collection: &Collection) -> Result<()> {
    store
        .set(
            SELECTED_LIST_KEY,
            collection.selected_id().to_string().as_bytes(),
        )
        .await
}
