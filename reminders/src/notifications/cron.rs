/// Cron-backed notification gateway
/// Registers triggers as jobs on a local cron scheduler evaluated in local
/// wall-clock time and publishes fired notifications on a broadcast channel
use super::gateway::{NotificationGateway, Trigger, TriggerSpec};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, Local, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio_cron_scheduler::{Job, JobScheduler};
use uuid::Uuid;

/// Buffered deliveries per subscriber before old ones are dropped
const DELIVERY_CHANNEL_CAPACITY: usize = 64;

/// A notification that fired
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub identifier: String,
    pub title: String,
    pub body: String,
}

/// Day-of-week names indexed by weekday number - 1 (1 = Sunday)
const WEEKDAY_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// Cron expression (seconds resolution) for a repeating trigger.
/// Weekdays are emitted by name since the numeric day-of-week field starts
/// at 0 = Sunday. Weekdays outside 1..=7 are rejected.
pub fn cron_expression(trigger: &Trigger) -> Result<String> {
    let weekday = match trigger.weekday {
        None => "*",
        Some(wd) => usize::from(wd)
            .checked_sub(1)
            .and_then(|index| WEEKDAY_NAMES.get(index))
            .copied()
            .ok_or_else(|| AppError::Gateway(format!("Weekday {} is out of range", wd)))?,
    };

    Ok(format!(
        "{} {} {} * * {}",
        trigger.second, trigger.minute, trigger.hour, weekday
    ))
}

/// Next wall-clock instant strictly after `now` that matches `trigger`
pub fn next_occurrence<Tz: TimeZone>(trigger: &Trigger, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let today = now.date_naive();

    // A week plus one day covers "later today" through "same weekday next week"
    (0..=7).find_map(|offset| {
        let date = today + Duration::days(offset);
        if let Some(weekday) = trigger.weekday {
            if date.weekday().number_from_sunday() != u32::from(weekday) {
                return None;
            }
        }

        let naive = date.and_hms_opt(trigger.hour, trigger.minute, trigger.second)?;
        let candidate = now.timezone().from_local_datetime(&naive).earliest()?;
        (candidate > *now).then_some(candidate)
    })
}

/// Local alarm facility for headless hosts
pub struct CronGateway {
    scheduler: Arc<RwLock<JobScheduler>>,
    jobs: Arc<RwLock<HashMap<String, Uuid>>>,
    /// Held from the capacity check until the job id is recorded
    registration: Mutex<()>,
    deliveries: broadcast::Sender<Delivery>,
    capacity: usize,
    authorized: bool,
}

impl CronGateway {
    /// Create new gateway. `authorized` stands in for the user's answer to
    /// the permission prompt, which headless hosts cannot show.
    pub async fn new(capacity: usize, authorized: bool) -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::Scheduler(format!("Failed to create scheduler: {}", e)))?;
        let (deliveries, _) = broadcast::channel(DELIVERY_CHANNEL_CAPACITY);

        Ok(Self {
            scheduler: Arc::new(RwLock::new(scheduler)),
            jobs: Arc::new(RwLock::new(HashMap::new())),
            registration: Mutex::new(()),
            deliveries,
            capacity,
            authorized,
        })
    }

    /// Start firing registered jobs
    pub async fn start(&self) -> Result<()> {
        let scheduler = self.scheduler.read().await;
        scheduler
            .start()
            .await
            .map_err(|e| AppError::Scheduler(format!("Failed to start scheduler: {}", e)))?;
        tracing::info!("Notification scheduler started");
        Ok(())
    }

    /// Receive every notification fired from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Delivery> {
        self.deliveries.subscribe()
    }

    /// Shutdown scheduler gracefully
    pub async fn shutdown(&self) -> Result<()> {
        let mut scheduler = self.scheduler.write().await;
        scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::Scheduler(format!("Failed to shutdown scheduler: {}", e)))?;
        tracing::info!("Notification scheduler shutdown");
        Ok(())
    }

    /// When the job registered under `identifier` fires next
    pub async fn next_fire(&self, identifier: &str) -> Result<Option<DateTime<Utc>>> {
        let Some(job_id) = self.jobs.read().await.get(identifier).copied() else {
            return Ok(None);
        };

        let mut scheduler = self.scheduler.write().await;
        scheduler
            .next_tick_for_job(job_id)
            .await
            .map_err(|e| AppError::Scheduler(format!("Failed to read next tick: {}", e)))
    }

    fn build_job(&self, spec: &TriggerSpec) -> Result<Job> {
        let delivery = Delivery {
            identifier: spec.identifier.clone(),
            title: spec.content.title.clone(),
            body: spec.content.body.clone(),
        };
        let sender = self.deliveries.clone();
        let jobs = Arc::clone(&self.jobs);
        let repeats = spec.trigger.repeats;

        let run = move |job_id: Uuid, _l: JobScheduler| {
            let delivery = delivery.clone();
            let sender = sender.clone();
            let jobs = Arc::clone(&jobs);
            Box::pin(async move {
                tracing::info!("Notification: {} - {}", delivery.title, delivery.body);

                if !repeats {
                    let mut jobs = jobs.write().await;
                    if jobs.get(&delivery.identifier) == Some(&job_id) {
                        jobs.remove(&delivery.identifier);
                    }
                }

                if sender.send(delivery).is_err() {
                    tracing::debug!("No delivery subscribers");
                }
            }) as std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
        };

        if repeats {
            let expression = cron_expression(&spec.trigger)?;
            Job::new_async_tz(expression.clone(), Local, run).map_err(|e| {
                AppError::Scheduler(format!("Invalid schedule '{}': {}", expression, e))
            })
        } else {
            let now = Local::now();
            let fire_at = next_occurrence(&spec.trigger, &now).ok_or_else(|| {
                AppError::Gateway(format!("No upcoming time matches {}", spec.trigger))
            })?;
            let delay = (fire_at - now)
                .to_std()
                .map_err(|e| AppError::Scheduler(format!("Invalid delay: {}", e)))?;
            Job::new_one_shot_async(delay, run)
                .map_err(|e| AppError::Scheduler(format!("Failed to create job: {}", e)))
        }
    }

    async fn remove_job(&self, job_id: &Uuid) -> Result<()> {
        let scheduler = self.scheduler.read().await;
        scheduler
            .remove(job_id)
            .await
            .map_err(|e| AppError::Scheduler(format!("Failed to remove job: {}", e)))
    }
}

#[async_trait]
impl NotificationGateway for CronGateway {
    async fn request_authorization(&self) -> Result<bool> {
        Ok(self.authorized)
    }

    async fn schedule(&self, spec: &TriggerSpec) -> Result<()> {
        if !self.authorized {
            tracing::debug!("Notifications not authorized, ignoring {}", spec.identifier);
            return Ok(());
        }

        let _registration = self.registration.lock().await;

        let previous = {
            let jobs = self.jobs.read().await;
            if jobs.len() >= self.capacity && !jobs.contains_key(&spec.identifier) {
                return Err(AppError::Gateway(format!(
                    "Pending notification limit {} reached",
                    self.capacity
                )));
            }
            jobs.get(&spec.identifier).copied()
        };

        let job = self.build_job(spec)?;

        if let Some(previous) = previous {
            self.remove_job(&previous).await?;
        }

        let job_id = {
            let scheduler = self.scheduler.read().await;
            scheduler
                .add(job)
                .await
                .map_err(|e| AppError::Scheduler(format!("Failed to schedule job: {}", e)))?
        };

        self.jobs
            .write()
            .await
            .insert(spec.identifier.clone(), job_id);

        tracing::debug!("Registered {} at {}", spec.identifier, spec.trigger);
        Ok(())
    }

    async fn cancel(&self, identifiers: &[String]) -> Result<()> {
        let _registration = self.registration.lock().await;

        let removed: Vec<Uuid> = {
            let mut jobs = self.jobs.write().await;
            identifiers
                .iter()
                .filter_map(|identifier| jobs.remove(identifier))
                .collect()
        };

        for job_id in &removed {
            self.remove_job(job_id).await?;
        }

        Ok(())
    }

    async fn list_pending(&self) -> Result<Vec<String>> {
        Ok(self.jobs.read().await.keys().cloned().collect())
    }
}
