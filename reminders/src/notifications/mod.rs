//! Notifications module
//!
//! The scheduling engine: planning triggers from list policies and
//! reconciling them against a notification gateway.

pub mod cron;
pub mod gateway;
pub mod memory;
pub mod permission;
pub mod planner;
pub mod reconciler;

pub use cron::{CronGateway, Delivery};
pub use gateway::{NotificationContent, NotificationGateway, Trigger, TriggerSpec};
pub use memory::InMemoryGateway;
pub use permission::PermissionGate;
pub use planner::plan;
pub use reconciler::{ReconcileResult, Reconciler};
