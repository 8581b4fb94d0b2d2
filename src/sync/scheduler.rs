use super::context::SyncContext;
use super::error::SyncError;
use super::queue::{JobQueue, RefreshRequest};
use crate::lock::lock_key;
use crate::models::Feed;
use log::{error, info};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub enqueued: usize,
    pub locked: usize,
    pub skipped_suspended: usize,
    pub failed: usize,
}

impl DispatchReport {
    pub fn total(&self) -> usize {
        self.enqueued + self.locked + self.skipped_suspended + self.failed
    }
}

pub struct Scheduler {
    context: SyncContext,
}

impl Scheduler {
    pub fn new(context: SyncContext) -> Self {
        Self { context }
    }

    pub fn refresh_all(&self, queue: &dyn JobQueue) -> Result<DispatchReport, SyncError> {
        let feeds_per_page = self.context.config.feeds_per_page;
        let mut report = DispatchReport::default();
        let mut page = 1;

        info!("Started enqueuing feeds for refresh");

        loop {
            let feeds = self.context.store.list_feeds(page, feeds_per_page)?;

            page += 1;

            if feeds.is_empty() {
                break;
            }

            for feed in &feeds {
                self.dispatch(feed, queue, &mut report);
            }
        }

        info!(
            "Finished enqueuing feeds for refresh. Enqueued {}, locked {}, suspended {}, failed {}",
            report.enqueued, report.locked, report.skipped_suspended, report.failed
        );

        Ok(report)
    }

    pub fn force_refresh(&self, feed_id: Uuid, queue: &dyn JobQueue) -> Result<(), SyncError> {
        let feed = self.context.store.get_feed(feed_id)?;

        self.context.store.set_should_retry(feed.id, true)?;
        queue.submit(RefreshRequest::forced(feed.id), None)?;

        info!("Enqueued forced refresh of feed {}", feed.id);

        Ok(())
    }

    fn dispatch(&self, feed: &Feed, queue: &dyn JobQueue, report: &mut DispatchReport) {
        if self.context.config.skip_suspended_at_dispatch && !feed.should_retry {
            report.skipped_suspended += 1;
            return;
        }

        let key = lock_key(feed.id);

        let token = match self.context.locks.acquire(&key) {
            Ok(Some(token)) => token,
            Ok(None) => {
                info!("Feed {} refresh job is already running", feed.id);

                report.locked += 1;
                return;
            }
            Err(error) => {
                error!("Failed to acquire lock {}: {:?}", key, error);

                report.failed += 1;
                return;
            }
        };

        let request = RefreshRequest::scheduled(feed.id, token.clone());

        match queue.submit(request, None) {
            Ok(()) => report.enqueued += 1,
            Err(error) => {
                error!("Failed to enqueue refresh of feed {}: {:?}", feed.id, error);

                if let Err(error) = self.context.locks.release(&key, &token) {
                    error!("Failed to release lock {}: {:?}", key, error);
                }

                report.failed += 1;
            }
        }
    }
}
