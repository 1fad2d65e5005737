//! Application configuration constants
//!
//! Central location for store keys, scheduling limits, and validation
//! boundaries used throughout the application.

// ===== Store Keys =====

/// Serialized list collection (JSON array of reminder lists)
pub const LISTS_KEY: &str = "SavedReminderLists";

/// String form of the currently selected list identifier
pub const SELECTED_LIST_KEY: &str = "SelectedListID";

/// Pre-multi-list format: a bare JSON array of reminders.
/// Imported once into the default list, then removed.
pub const LEGACY_REMINDERS_KEY: &str = "SavedReminders";

// ===== Lists =====

/// Name of the default list. At most one list may carry it.
pub const DEFAULT_LIST_NAME: &str = "Reminders";

// ===== Notification Scheduling =====

/// Offset between consecutive per-item triggers.
/// Triggers inside the same minute are coalesced by the alarm facility,
/// so every incomplete reminder gets its own second slot.
pub const SPREAD_INTERVAL_SECS: u32 = 30;

/// Default ceiling on pending trigger registrations
pub const DEFAULT_PENDING_CAPACITY: usize = 64;

/// Minimum configurable pending capacity
pub const MIN_PENDING_CAPACITY: usize = 1;

/// Maximum configurable pending capacity
pub const MAX_PENDING_CAPACITY: usize = 512;

/// Digest body; `{name}` is replaced by the list name
pub const DIGEST_BODY_TEMPLATE: &str = "Don't forget to check the list {name}";

// ===== Widget =====

/// Default number of reminders the widget renders
pub const DEFAULT_WIDGET_DISPLAY_LIMIT: usize = 5;

/// Minimum widget display count
pub const MIN_WIDGET_DISPLAY_LIMIT: usize = 1;

/// Maximum widget display count (large widget family)
pub const MAX_WIDGET_DISPLAY_LIMIT: usize = 20;
