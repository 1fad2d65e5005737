//! Settings service
//!
//! Manages application settings persistence using JSON file storage.

use crate::config::{
    DEFAULT_PENDING_CAPACITY, DEFAULT_WIDGET_DISPLAY_LIMIT, MAX_PENDING_CAPACITY,
    MAX_WIDGET_DISPLAY_LIMIT, MIN_PENDING_CAPACITY, MIN_WIDGET_DISPLAY_LIMIT,
};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

/// Notification scheduling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingSettings {
    /// Ceiling on pending trigger registrations across all lists
    #[serde(default = "default_pending_capacity")]
    pub pending_capacity: usize,
    /// Answer to the notification permission prompt on hosts that cannot
    /// show one
    #[serde(default = "default_true")]
    pub notifications_allowed: bool,
}

fn default_pending_capacity() -> usize {
    DEFAULT_PENDING_CAPACITY
}

fn default_true() -> bool {
    true
}

impl Default for SchedulingSettings {
    fn default() -> Self {
        Self {
            pending_capacity: default_pending_capacity(),
            notifications_allowed: true,
        }
    }
}

/// Home-screen widget configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetSettings {
    /// Number of reminders rendered
    #[serde(default = "default_widget_display_limit")]
    pub display_limit: usize,
}

fn default_widget_display_limit() -> usize {
    DEFAULT_WIDGET_DISPLAY_LIMIT
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            display_limit: default_widget_display_limit(),
        }
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppSettings {
    #[serde(default)]
    pub scheduling: SchedulingSettings,
    #[serde(default)]
    pub widget: WidgetSettings,
}

impl AppSettings {
    /// Check every value against its configured bounds
    pub fn validate(&self) -> Result<()> {
        let capacity = self.scheduling.pending_capacity;
        if !(MIN_PENDING_CAPACITY..=MAX_PENDING_CAPACITY).contains(&capacity) {
            return Err(AppError::Validation(format!(
                "Pending capacity must be between {} and {}, got {}",
                MIN_PENDING_CAPACITY, MAX_PENDING_CAPACITY, capacity
            )));
        }

        let limit = self.widget.display_limit;
        if !(MIN_WIDGET_DISPLAY_LIMIT..=MAX_WIDGET_DISPLAY_LIMIT).contains(&limit) {
            return Err(AppError::Validation(format!(
                "Widget display limit must be between {} and {}, got {}",
                MIN_WIDGET_DISPLAY_LIMIT, MAX_WIDGET_DISPLAY_LIMIT, limit
            )));
        }

        Ok(())
    }
}

/// Service for managing application settings
#[derive(Clone)]
pub struct SettingsService {
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new(app_data_dir: PathBuf) -> Self {
        Self {
            settings_path: app_data_dir.join("settings.json"),
        }
    }

    /// Load settings from disk or create default if not exists
    pub async fn load(&self) -> Result<AppSettings> {
        if !self.settings_path.exists() {
            tracing::info!("Settings file not found, creating default settings");
            let default = AppSettings::default();
            self.save(&default).await?;
            return Ok(default);
        }

        let content = fs::read_to_string(&self.settings_path).await?;
        let settings: AppSettings = serde_json::from_str(&content)
            .map_err(|e| AppError::Generic(format!("Failed to parse settings: {}", e)))?;

        if let Err(e) = settings.validate() {
            tracing::warn!("Invalid settings on disk, using defaults: {}", e);
            return Ok(AppSettings::default());
        }

        Ok(settings)
    }

    /// Read settings without creating the file, for read-only processes
    pub async fn load_existing(&self) -> Result<AppSettings> {
        if !self.settings_path.exists() {
            return Ok(AppSettings::default());
        }
        self.load().await
    }

    /// Save settings to disk
    pub async fn save(&self, settings: &AppSettings) -> Result<()> {
        settings.validate()?;

        let content = serde_json::to_string_pretty(settings)
            .map_err(|e| AppError::Generic(format!("Failed to serialize settings: {}", e)))?;

        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.settings_path, content).await?;
        tracing::info!("Settings saved to {:?}", self.settings_path);

        Ok(())
    }

    /// Get scheduling settings
    pub async fn get_scheduling(&self) -> Result<SchedulingSettings> {
        let settings = self.load().await?;
        Ok(settings.scheduling)
    }

    /// Update scheduling settings
    /// Note: the new capacity applies to reconcile passes started afterwards
    pub async fn update_scheduling(&self, scheduling: SchedulingSettings) -> Result<()> {
        let mut settings = self.load().await?;
        settings.scheduling = scheduling;
        self.save(&settings).await?;
        Ok(())
    }

    /// Get widget settings
    pub async fn get_widget(&self) -> Result<WidgetSettings> {
        let settings = self.load().await?;
        Ok(settings.widget)
    }

    /// Update widget settings
    pub async fn update_widget(&self, widget: WidgetSettings) -> Result<()> {
        let mut settings = self.load().await?;
        settings.widget = widget;
        self.save(&settings).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_service() -> (SettingsService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let service = SettingsService::new(temp_dir.path().to_path_buf());
        (service, temp_dir)
    }

    #[tokio::test]
    async fn test_default_settings_created_on_load() {
        let (service, temp) = create_test_service();

        let settings = service.load().await.unwrap();

        assert_eq!(settings.scheduling.pending_capacity, 64);
        assert_eq!(settings.widget.display_limit, 5);
        assert!(temp.path().join("settings.json").exists());
    }

    #[tokio::test]
    async fn test_load_existing_does_not_create_file() {
        let (service, temp) = create_test_service();

        let settings = service.load_existing().await.unwrap();

        assert_eq!(settings, AppSettings::default());
        assert!(!temp.path().join("settings.json").exists());
    }

    #[tokio::test]
    async fn test_scheduling_settings_get_and_update() {
        let (service, _temp) = create_test_service();

        service
            .update_scheduling(SchedulingSettings {
                pending_capacity: 20,
                notifications_allowed: false,
            })
            .await
            .unwrap();

        let loaded = service.get_scheduling().await.unwrap();
        assert_eq!(loaded.pending_capacity, 20);
        assert!(!loaded.notifications_allowed);
    }

    #[tokio::test]
    async fn test_out_of_bounds_values_rejected() {
        let (service, _temp) = create_test_service();

        let result = service
            .update_scheduling(SchedulingSettings {
                pending_capacity: 0,
                ..SchedulingSettings::default()
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = service
            .update_widget(WidgetSettings { display_limit: 500 })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        assert_eq!(service.load().await.unwrap(), AppSettings::default());
    }

    #[tokio::test]
    async fn test_missing_fields_use_defaults() {
        let (service, temp) = create_test_service();
        std::fs::write(
            temp.path().join("settings.json"),
            r#"{"widget": {"display_limit": 8}}"#,
        )
        .unwrap();

        let settings = service.load().await.unwrap();
        assert_eq!(settings.widget.display_limit, 8);
        assert_eq!(settings.scheduling.pending_capacity, 64);
        assert!(settings.scheduling.notifications_allowed);
    }

    #[tokio::test]
    async fn test_widget_update_preserves_scheduling() {
        let temp_dir = TempDir::new().unwrap();
        let settings_path = temp_dir.path().to_path_buf();

        {
            let service = SettingsService::new(settings_path.clone());
            service
                .update_scheduling(SchedulingSettings {
                    pending_capacity: 32,
                    ..SchedulingSettings::default()
                })
                .await
                .unwrap();
            service
                .update_widget(WidgetSettings { display_limit: 3 })
                .await
                .unwrap();
        }

        {
            let service = SettingsService::new(settings_path);
            let loaded = service.load().await.unwrap();
            assert_eq!(loaded.scheduling.pending_capacity, 32);
            assert_eq!(loaded.widget.display_limit, 3);
        }
    }
}
