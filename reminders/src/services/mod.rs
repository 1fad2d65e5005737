//! Services module
//!
//! Business logic that coordinates the domain, the store and the
//! notification engine.

pub mod lists;
pub mod migration;
pub mod settings;
pub mod widget;

pub use lists::{ListsService, ReminderUpdate};
pub use migration::{load_collection, migrate_legacy, save_collection};
pub use settings::{AppSettings, SchedulingSettings, SettingsService, WidgetSettings};
pub use widget::{load_widget_snapshot, WidgetItem, WidgetSnapshot};
