//! Notification gateway capability
//!
//! The alarm facility the reconciler drives. Implementations may suspend on
//! every call; callers treat the registered set as eventually consistent
//! with their schedule and cancel requests.

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

/// Wall-clock recurrence of a single registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Trigger {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// 1 = Sunday; `None` fires every day
    pub weekday: Option<u8>,
    pub repeats: bool,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)?;
        if let Some(weekday) = self.weekday {
            write!(f, " on weekday {}", weekday)?;
        }
        if self.repeats {
            write!(f, " (repeating)")?;
        }
        Ok(())
    }
}

/// What the user sees when the trigger fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
}

/// One desired registration, recomputed on every reconcile pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerSpec {
    /// Derived from list/reminder ids and weekday, never random
    pub identifier: String,
    pub trigger: Trigger,
    pub content: NotificationContent,
}

#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Ask the user for permission to post notifications
    async fn request_authorization(&self) -> Result<bool>;

    /// Register (or replace) a trigger under `spec.identifier`
    async fn schedule(&self, spec: &TriggerSpec) -> Result<()>;

    /// Drop registrations. Unknown identifiers are ignored.
    async fn cancel(&self, identifiers: &[String]) -> Result<()>;

    /// Snapshot of every registered identifier
    async fn list_pending(&self) -> Result<Vec<String>>;
}
