//! Integration tests for the reminders crate
//!
//! These tests verify end-to-end functionality including:
//! - Legacy migration through the file store
//! - List and reminder edits driving notification reconciliation
//! - The widget reading what the application wrote
//! - Capacity-limited scheduling across lists

use chrono::NaiveTime;
use reminders::config::{DEFAULT_LIST_NAME, LEGACY_REMINDERS_KEY, LISTS_KEY};
use reminders::domain::{NotificationSettings, NotificationType, Reminder, ScheduleType};
use reminders::notifications::{InMemoryGateway, NotificationGateway, Reconciler};
use reminders::services::{load_widget_snapshot, ListsService};
use reminders::storage::{write_json, FileStore, Store};
use std::sync::Arc;
use tempfile::TempDir;

/// Helper to create a file store in a temp directory
async fn create_test_store() -> (FileStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::new(temp_dir.path().join("store"));
    store.initialize().await.unwrap();

    (store, temp_dir)
}

/// Helper to build a lists service on top of a store and gateway
async fn create_service(
    store: &FileStore,
    gateway: Arc<InMemoryGateway>,
    capacity: usize,
) -> ListsService {
    let reconciler = Arc::new(Reconciler::new(gateway, capacity));
    ListsService::load(Arc::new(store.clone()), reconciler)
        .await
        .unwrap()
}

fn policy(
    notification_type: NotificationType,
    schedule_type: ScheduleType,
    weekdays: Vec<u8>,
) -> NotificationSettings {
    NotificationSettings::new(
        true,
        notification_type,
        NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        schedule_type,
        weekdays,
    )
}

#[tokio::test]
async fn test_legacy_migration_through_file_store() {
    let (store, _temp) = create_test_store().await;

    let legacy: Vec<Reminder> = ["Water plants", "Pay rent", "Book dentist"]
        .iter()
        .map(|title| Reminder::new(title).unwrap())
        .collect();
    write_json(&store, LEGACY_REMINDERS_KEY, &legacy)
        .await
        .unwrap();

    let service = create_service(&store, Arc::new(InMemoryGateway::new()), 64).await;

    let lists = service.lists().await;
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].name, DEFAULT_LIST_NAME);
    assert_eq!(lists[0].reminders, legacy);
    assert!(store.get(LEGACY_REMINDERS_KEY).await.unwrap().is_none());
    assert!(store.get(LISTS_KEY).await.unwrap().is_some());
}

#[tokio::test]
async fn test_edit_flow_keeps_triggers_reconciled() {
    let (store, _temp) = create_test_store().await;
    let gateway = Arc::new(InMemoryGateway::new());
    let service = create_service(&store, gateway.clone(), 64).await;

    let groceries = service.create_list("Groceries").await.unwrap().unwrap();
    let milk = service
        .add_reminder(groceries.id, "Milk", None)
        .await
        .unwrap()
        .unwrap();
    service
        .add_reminder(groceries.id, "Bread", None)
        .await
        .unwrap();
    service
        .update_notification_settings(
            groceries.id,
            Some(policy(NotificationType::PerItem, ScheduleType::Weekdays, vec![2, 6])),
        )
        .await
        .unwrap();
    service.settle().await;

    let pending = gateway.list_pending().await.unwrap();
    assert_eq!(pending.len(), 4);
    assert!(pending
        .iter()
        .all(|id| id.starts_with(&groceries.id.to_string())));

    // Switching to a digest replaces the per-item triggers
    service
        .update_notification_settings(
            groceries.id,
            Some(policy(NotificationType::ListDigest, ScheduleType::Daily, vec![])),
        )
        .await
        .unwrap();
    service.settle().await;

    let registered = gateway.registered().await;
    assert_eq!(registered.len(), 1);
    assert_eq!(
        registered[0].identifier,
        format!("{}_list_reminder", groceries.id)
    );
    assert_eq!(
        registered[0].content.body,
        "Don't forget to check the list Groceries"
    );

    // Completing items does not affect the digest
    service
        .set_completed(groceries.id, milk.id, true)
        .await
        .unwrap();
    service.settle().await;
    assert_eq!(gateway.list_pending().await.unwrap().len(), 1);

    // Deleting the list removes its digest
    service.delete_list(groceries.id).await.unwrap();
    service.settle().await;
    assert!(gateway.list_pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_widget_reads_application_state() {
    let (store, temp) = create_test_store().await;
    let service = create_service(&store, Arc::new(InMemoryGateway::new()), 64).await;

    let home = service.create_list("Home").await.unwrap().unwrap();
    let dishes = service
        .add_reminder(home.id, "Dishes", None)
        .await
        .unwrap()
        .unwrap();
    service.add_reminder(home.id, "Laundry", None).await.unwrap();
    service.add_reminder(home.id, "Vacuum", None).await.unwrap();
    service.set_completed(home.id, dishes.id, true).await.unwrap();
    service.select_list(home.id).await.unwrap();
    service.settle().await;

    // The widget opens its own store over the same directory
    let widget_store = FileStore::new(temp.path().join("store"));
    let snapshot = load_widget_snapshot(&widget_store, 2).await.unwrap();

    assert_eq!(snapshot.list_id, Some(home.id));
    assert_eq!(snapshot.list_name, "Home");
    assert_eq!(snapshot.remaining, 2);
    assert_eq!(snapshot.total, 3);
    let titles: Vec<&str> = snapshot.items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["Laundry", "Vacuum"]);
}

#[tokio::test]
async fn test_capacity_shared_across_lists() {
    let (store, _temp) = create_test_store().await;
    let gateway = Arc::new(InMemoryGateway::new());
    let service = create_service(&store, gateway.clone(), 10).await;

    let mut list_ids = Vec::new();
    for name in ["Work", "Home"] {
        let list = service.create_list(name).await.unwrap().unwrap();
        for i in 0..4 {
            service
                .add_reminder(list.id, &format!("{} task {}", name, i), None)
                .await
                .unwrap();
        }
        list_ids.push(list.id);
    }
    for id in &list_ids {
        service
            .update_notification_settings(
                *id,
                Some(policy(NotificationType::PerItem, ScheduleType::Weekdays, vec![2, 4])),
            )
            .await
            .unwrap();
        service.settle().await;
    }

    // 16 desired triggers, ceiling of 10
    let pending = gateway.list_pending().await.unwrap();
    assert_eq!(pending.len(), 10);

    let totals = service.reconcile_all().await;
    assert_eq!(totals.scheduled + totals.skipped, 16);
    assert_eq!(totals.scheduled, 10);
    assert_eq!(gateway.list_pending().await.unwrap().len(), 10);
}

#[tokio::test]
async fn test_state_survives_restart() {
    let (store, _temp) = create_test_store().await;
    let gateway = Arc::new(InMemoryGateway::new());

    let list_id = {
        let service = create_service(&store, gateway.clone(), 64).await;
        let list = service.create_list("Errands").await.unwrap().unwrap();
        service.add_reminder(list.id, "Post office", None).await.unwrap();
        service
            .update_notification_settings(
                list.id,
                Some(policy(NotificationType::PerItem, ScheduleType::Daily, vec![])),
            )
            .await
            .unwrap();
        service.settle().await;
        list.id
    };
    let before: Vec<String> = gateway.list_pending().await.unwrap();

    let restarted = create_service(&store, gateway.clone(), 64).await;
    let list = restarted.get_list(list_id).await.unwrap();
    assert_eq!(list.reminders[0].title, "Post office");
    assert!(list.notifications_enabled());

    // Reconciling on start recreates the same identifiers
    restarted.reconcile_all().await;
    assert_eq!(gateway.list_pending().await.unwrap(), before);
}

#[tokio::test]
async fn test_denied_permission_keeps_edits_working() {
    let (store, _temp) = create_test_store().await;
    let gateway = Arc::new(InMemoryGateway::denied());
    let service = create_service(&store, gateway.clone(), 64).await;

    let list_id = service.lists().await[0].id;
    service.add_reminder(list_id, "Stretch", None).await.unwrap();
    service
        .update_notification_settings(
            list_id,
            Some(policy(NotificationType::PerItem, ScheduleType::Daily, vec![])),
        )
        .await
        .unwrap();
    service.add_reminder(list_id, "Hydrate", None).await.unwrap();
    service.settle().await;

    assert_eq!(service.get_list(list_id).await.unwrap().reminders.len(), 2);
    assert!(gateway.list_pending().await.unwrap().is_empty());
    assert_eq!(gateway.authorization_requests(), 1);
}
