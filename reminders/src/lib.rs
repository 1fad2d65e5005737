//! Reminders library
//!
//! Reminder lists with scheduled local notifications. Exposes the domain,
//! the notification scheduling engine and the shared store for the
//! application host, the widget renderer and tests.

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod notifications;
pub mod services;
pub mod storage;
