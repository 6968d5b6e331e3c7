use anyhow::Result;
use chrono::Local;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, interval};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::SchedulerConfig;
use crate::services::sweeper::NoShowSweeper;

pub struct Scheduler {
    sweeper: Arc<NoShowSweeper>,
    config: SchedulerConfig,
    running: Arc<RwLock<bool>>,
}

impl Scheduler {
    pub fn new(sweeper: Arc<NoShowSweeper>, config: SchedulerConfig) -> Self {
        Self {
            sweeper,
            config,
            running: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn start(&self) -> Result<()> {
        if !self.config.enabled {
            info!("Scheduler is disabled in config");
            return Ok(());
        }

        *self.running.write().await = true;
        info!("Starting background scheduler");

        if let Some(cron_expr) = &self.config.cron_expression {
            self.run_with_cron(cron_expr).await
        } else {
            self.run_with_interval().await
        }
    }

    async fn run_with_cron(&self, cron_expr: &str) -> Result<()> {
        let mut sched = JobScheduler::new().await?;

        let sweeper = Arc::clone(&self.sweeper);
        let running = Arc::clone(&self.running);

        let job = Job::new_async(cron_expr, move |_uuid, _lock| {
            let sweeper = Arc::clone(&sweeper);
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                run_sweep(&sweeper).await;
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        info!("Scheduler running with cron: {}", cron_expr);

        loop {
            if !*self.running.read().await {
                break;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        sched.shutdown().await?;
        Ok(())
    }

    async fn run_with_interval(&self) -> Result<()> {
        let interval_mins = self.config.sweep_interval_minutes.max(1);
        info!("Scheduler running: no-show sweep every {}m", interval_mins);

        let mut sweep_interval = interval(Duration::from_secs(u64::from(interval_mins) * 60));

        loop {
            sweep_interval.tick().await;
            if !*self.running.read().await {
                break;
            }
            run_sweep(&self.sweeper).await;
        }

        Ok(())
    }

    pub async fn stop(&self) {
        info!("Stopping scheduler...");
        *self.running.write().await = false;
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    pub async fn run_once(&self) -> Result<usize> {
        info!("Running manual sweep...");
        let count = self.sweeper.sweep(Local::now().naive_local()).await?;
        Ok(count)
    }
}

async fn run_sweep(sweeper: &NoShowSweeper) {
    let start = std::time::Instant::now();
    info!(event = "job_started", job_name = "no_show_sweep", "Starting scheduled no-show sweep");

    match sweeper.sweep(Local::now().naive_local()).await {
        Ok(transitioned) => info!(
            event = "job_finished",
            job_name = "no_show_sweep",
            transitioned,
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Scheduled no-show sweep finished"
        ),
        Err(e) => error!(
            event = "job_failed",
            job_name = "no_show_sweep",
            error = %e,
            "Scheduled no-show sweep failed"
        ),
    }
}
