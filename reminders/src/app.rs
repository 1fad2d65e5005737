//! Application state and initialization
//!
//! This module manages the central application state and lifecycle.
//! All services are initialized here and made available through AppState.

use crate::error::Result;
use crate::notifications::{CronGateway, Reconciler};
use crate::services::{load_widget_snapshot, AppSettings, ListsService, SettingsService, WidgetSnapshot};
use crate::storage::FileStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub app_data_dir: PathBuf,
    pub settings: AppSettings,
    pub gateway: Arc<CronGateway>,
    pub lists_service: ListsService,
}

/// Directory shared by the application and the widget
pub fn store_dir(app_data_dir: &Path) -> PathBuf {
    app_data_dir.join("store")
}

/// Application setup - called once on startup
pub async fn setup(app_data_dir: PathBuf) -> Result<AppState> {
    tracing::info!("Initializing application");
    tracing::info!("App data directory: {:?}", app_data_dir);

    tokio::fs::create_dir_all(&app_data_dir).await?;

    let settings = SettingsService::new(app_data_dir.clone()).load().await?;

    let store = FileStore::new(store_dir(&app_data_dir));
    store.initialize().await?;

    let gateway = Arc::new(
        CronGateway::new(
            settings.scheduling.pending_capacity,
            settings.scheduling.notifications_allowed,
        )
        .await?,
    );
    gateway.start().await?;

    let reconciler = Arc::new(Reconciler::new(
        gateway.clone(),
        settings.scheduling.pending_capacity,
    ));
    let lists_service = ListsService::load(Arc::new(store), reconciler).await?;

    tracing::info!("Application initialized successfully");

    Ok(AppState {
        app_data_dir,
        settings,
        gateway,
        lists_service,
    })
}

/// Widget entry point. Reads the shared store and never writes to it.
pub async fn widget_snapshot(app_data_dir: &Path) -> Result<WidgetSnapshot> {
    let settings = SettingsService::new(app_data_dir.to_path_buf())
        .load_existing()
        .await?;
    let store = FileStore::new(store_dir(app_data_dir));

    load_widget_snapshot(&store, settings.widget.display_limit).await
}
