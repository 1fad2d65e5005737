//! Trigger planner
//!
//! Turns a list and its notification policy into the exact set of
//! registrations it should have. Pure and deterministic: the same list
//! content always yields the same specs, which is what lets the reconciler
//! cancel and resubmit without accumulating duplicates.

use super::gateway::{NotificationContent, Trigger, TriggerSpec};
use crate::config::{DIGEST_BODY_TEMPLATE, SPREAD_INTERVAL_SECS};
use crate::domain::{NotificationType, ReminderList, ScheduleType, ALL_WEEKDAYS};
use uuid::Uuid;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Prefix shared by every identifier that belongs to a list
pub fn list_prefix(list_id: Uuid) -> String {
    format!("{}_", list_id)
}

fn weekday_suffix(weekday: Option<u8>) -> String {
    weekday.map(|wd| format!("_wd{}", wd)).unwrap_or_default()
}

pub fn digest_identifier(list_id: Uuid, weekday: Option<u8>) -> String {
    format!("{}_list_reminder{}", list_id, weekday_suffix(weekday))
}

pub fn item_identifier(list_id: Uuid, reminder_id: Uuid, weekday: Option<u8>) -> String {
    format!("{}_item_{}{}", list_id, reminder_id, weekday_suffix(weekday))
}

/// Wall-clock time of the `slot`-th trigger after `hour:minute`.
///
/// Each slot adds `SPREAD_INTERVAL_SECS`; seconds carry into minutes and
/// minutes into hours, wrapping at midnight.
pub fn spread_time(hour: u32, minute: u32, slot: usize) -> (u32, u32, u32) {
    let total = u64::from(hour) * 3600
        + u64::from(minute) * 60
        + slot as u64 * u64::from(SPREAD_INTERVAL_SECS);
    let total = total % SECONDS_PER_DAY;

    (
        (total / 3600) as u32,
        ((total / 60) % 60) as u32,
        (total % 60) as u32,
    )
}

/// Compute every trigger the list should currently have registered.
///
/// Order is weekday-major, then reminder display order.
pub fn plan(list: &ReminderList) -> Vec<TriggerSpec> {
    let Some(settings) = list
        .notification_settings
        .as_ref()
        .filter(|settings| settings.is_enabled)
    else {
        return Vec::new();
    };

    let passes: Vec<Option<u8>> = match settings.schedule_type {
        ScheduleType::Daily => vec![None],
        ScheduleType::Weekdays if settings.selected_weekdays.is_empty() => {
            ALL_WEEKDAYS.iter().copied().map(Some).collect()
        }
        ScheduleType::Weekdays => settings.selected_weekdays.iter().copied().map(Some).collect(),
    };

    let (hour, minute) = (settings.hour(), settings.minute());
    let mut specs = Vec::new();

    for weekday in passes {
        match settings.notification_type {
            NotificationType::ListDigest => specs.push(TriggerSpec {
                identifier: digest_identifier(list.id, weekday),
                trigger: Trigger {
                    hour,
                    minute,
                    second: 0,
                    weekday,
                    repeats: true,
                },
                content: NotificationContent {
                    title: list.name.clone(),
                    body: DIGEST_BODY_TEMPLATE.replace("{name}", &list.name),
                },
            }),
            NotificationType::PerItem => {
                for (slot, reminder) in list.incomplete_reminders().enumerate() {
                    let (hour, minute, second) = spread_time(hour, minute, slot);
                    specs.push(TriggerSpec {
                        identifier: item_identifier(list.id, reminder.id, weekday),
                        trigger: Trigger {
                            hour,
                            minute,
                            second,
                            weekday,
                            repeats: true,
                        },
                        content: NotificationContent {
                            title: list.name.clone(),
                            body: reminder.title.clone(),
                        },
                    });
                }
            }
        }
    }

    specs
}
