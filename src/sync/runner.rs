use super::context::{self, SyncContext};
use super::error::SyncError;
use super::queue::FangJobQueue;
use super::reader::Fetcher;
use super::refresh_all_feeds_job::RefreshAllFeedsJob;
use super::scheduler::Scheduler;
use crate::config::Config;
use crate::db::{self, Pool};
use crate::http_client;
use crate::lock::{LockError, RedisLockStore};
use crate::store::PgFeedStore;
use fang::Queue;
use fang::Queueable;
use fang::WorkerPool;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error("failed to build database pool: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("failed to build http client: {0}")]
    Http(#[from] isahc::Error),
    #[error("failed to connect to lock store: {0}")]
    Lock(#[from] LockError),
    #[error("failed to schedule periodic refresh: {0}")]
    Schedule(String),
    #[error("failed to start workers: {0}")]
    Workers(String),
    #[error("sync context is already installed")]
    ContextAlreadyInstalled,
}

#[derive(Debug, thiserror::Error)]
pub enum ForceRefreshError {
    #[error(transparent)]
    Start(#[from] StartError),
    #[error(transparent)]
    Sync(#[from] SyncError),
}

pub fn build_context(config: &Config, pool: Pool) -> Result<SyncContext, StartError> {
    let fetcher = Fetcher::new(http_client::build(config)?);
    let locks = RedisLockStore::new(
        &config.redis_url,
        config.lock_ttl,
        config.database_pool_size,
    )?;

    Ok(SyncContext::builder()
        .config(Arc::new(config.clone()))
        .store(Arc::new(PgFeedStore::new(pool)))
        .locks(Arc::new(locks))
        .reader(Arc::new(fetcher))
        .build())
}

pub fn start(config: Config) -> Result<WorkerPool<Queue>, StartError> {
    let pool = db::create_connection_pool(&config)?;
    let context = build_context(&config, pool.clone())?;

    context::install(context).map_err(|_| StartError::ContextAlreadyInstalled)?;

    let queue = Queue::builder().connection_pool(pool).build();

    queue
        .schedule_task(&RefreshAllFeedsJob::new(config.refresh_cron_pattern.clone()))
        .map_err(|error| StartError::Schedule(format!("{error:?}")))?;

    log::info!(
        "Starting {} refresh workers, dispatching on {:?}",
        config.workers_number,
        config.refresh_cron_pattern
    );

    let mut worker_pool = WorkerPool::<Queue>::builder()
        .queue(queue)
        .number_of_workers(config.workers_number)
        .task_type(super::JOB_TYPE.to_string())
        .build();

    worker_pool
        .start()
        .map_err(|error| StartError::Workers(format!("{error:?}")))?;

    Ok(worker_pool)
}

pub fn force_refresh(config: Config, feed_id: Uuid) -> Result<(), ForceRefreshError> {
    let pool = db::create_connection_pool(&config).map_err(StartError::from)?;
    let context = build_context(&config, pool.clone())?;
    let queue = Queue::builder().connection_pool(pool).build();

    Scheduler::new(context).force_refresh(feed_id, &FangJobQueue::new(&queue))?;

    Ok(())
}
