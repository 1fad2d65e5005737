//! Domain models
//!
//! Value types for reminders, lists and notification policies.
//! All models use serde; field names are camelCase on the wire so the
//! widget process and older blobs decode the same documents.

use crate::config::DEFAULT_LIST_NAME;
use crate::error::{AppError, Result};
use chrono::{DateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Weekday numbers accepted by the alarm facility, 1 = Sunday
pub const ALL_WEEKDAYS: [u8; 7] = [1, 2, 3, 4, 5, 6, 7];

/// Trim a display string and reject it when nothing is left
fn validated_text(value: &str, what: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", what)));
    }
    Ok(trimmed.to_string())
}

/// A single reminder item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    pub created_date: DateTime<Utc>,
}

impl Reminder {
    pub fn new(title: &str) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            title: validated_text(title, "Reminder title")?,
            is_completed: false,
            due_date: None,
            created_date: Utc::now(),
        })
    }

    pub fn with_due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = due_date;
        self
    }

    /// Replace the title, keeping the old one when the new one is blank
    pub fn set_title(&mut self, title: &str) -> Result<()> {
        self.title = validated_text(title, "Reminder title")?;
        Ok(())
    }
}

/// How a list is announced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationType {
    /// One notification per incomplete reminder
    PerItem,
    /// One "check this list" notification
    ListDigest,
}

/// Which days the notification recurs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScheduleType {
    Daily,
    Weekdays,
}

/// Notification policy for one list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub is_enabled: bool,
    pub notification_type: NotificationType,
    /// Only hour and minute are meaningful
    pub daily_time: NaiveTime,
    pub schedule_type: ScheduleType,
    #[serde(default = "default_weekdays", deserialize_with = "deserialize_weekdays")]
    pub selected_weekdays: BTreeSet<u8>,
}

/// Weekday sets are stored as-is; an empty set means every day.
/// Values outside 1..=7 are kept so the alarm facility decides what to do
/// with them.
fn normalize_weekdays(weekdays: impl IntoIterator<Item = u8>) -> BTreeSet<u8> {
    let set: BTreeSet<u8> = weekdays.into_iter().collect();
    if set.is_empty() {
        default_weekdays()
    } else {
        set
    }
}

fn default_weekdays() -> BTreeSet<u8> {
    ALL_WEEKDAYS.iter().copied().collect()
}

fn deserialize_weekdays<'de, D>(deserializer: D) -> std::result::Result<BTreeSet<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<u8>>::deserialize(deserializer)?;
    Ok(normalize_weekdays(raw.unwrap_or_default()))
}

impl NotificationSettings {
    pub fn new(
        is_enabled: bool,
        notification_type: NotificationType,
        daily_time: NaiveTime,
        schedule_type: ScheduleType,
        selected_weekdays: impl IntoIterator<Item = u8>,
    ) -> Self {
        // Seconds are dropped so spreading always starts on the minute
        let daily_time =
            NaiveTime::from_hms_opt(daily_time.hour(), daily_time.minute(), 0).unwrap_or(daily_time);

        Self {
            is_enabled,
            notification_type,
            daily_time,
            schedule_type,
            selected_weekdays: normalize_weekdays(selected_weekdays),
        }
    }

    pub fn hour(&self) -> u32 {
        self.daily_time.hour()
    }

    pub fn minute(&self) -> u32 {
        self.daily_time.minute()
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self::new(
            false,
            NotificationType::PerItem,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            ScheduleType::Daily,
            ALL_WEEKDAYS,
        )
    }
}

/// A named, ordered group of reminders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderList {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub reminders: Vec<Reminder>,
    pub created_date: DateTime<Utc>,
    #[serde(default)]
    pub notification_settings: Option<NotificationSettings>,
}

impl ReminderList {
    pub fn new(name: &str) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: validated_text(name, "List name")?,
            reminders: Vec::new(),
            created_date: Utc::now(),
            notification_settings: None,
        })
    }

    /// The list every collection falls back to
    pub fn default_list() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: DEFAULT_LIST_NAME.to_string(),
            reminders: Vec::new(),
            created_date: Utc::now(),
            notification_settings: None,
        }
    }

    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_LIST_NAME
    }

    pub fn set_name(&mut self, name: &str) -> Result<()> {
        self.name = validated_text(name, "List name")?;
        Ok(())
    }

    pub fn reminder(&self, id: Uuid) -> Option<&Reminder> {
        self.reminders.iter().find(|r| r.id == id)
    }

    pub fn reminder_mut(&mut self, id: Uuid) -> Option<&mut Reminder> {
        self.reminders.iter_mut().find(|r| r.id == id)
    }

    /// Remove a reminder, returning it when it existed
    pub fn remove_reminder(&mut self, id: Uuid) -> Option<Reminder> {
        let index = self.reminders.iter().position(|r| r.id == id)?;
        Some(self.reminders.remove(index))
    }

    /// Move a reminder to a new display position (clamped to the end)
    pub fn move_reminder(&mut self, id: Uuid, to: usize) -> bool {
        let Some(from) = self.reminders.iter().position(|r| r.id == id) else {
            return false;
        };
        let reminder = self.reminders.remove(from);
        let to = to.min(self.reminders.len());
        self.reminders.insert(to, reminder);
        true
    }

    /// Incomplete reminders in display order
    pub fn incomplete_reminders(&self) -> impl Iterator<Item = &Reminder> {
        self.reminders.iter().filter(|r| !r.is_completed)
    }

    /// Whether this list currently wants notifications at all
    pub fn notifications_enabled(&self) -> bool {
        self.notification_settings
            .as_ref()
            .is_some_and(|settings| settings.is_enabled)
    }
}
