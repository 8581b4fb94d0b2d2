use super::context::SyncContext;
use super::error::SyncError;
use super::queue::{JobQueue, RefreshRequest};
use super::reconcile;
use crate::db;
use crate::lock::lock_key;
use crate::models::Feed;
use log::{debug, error, info, warn};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Pending,
    Fetching,
    Reconciling,
    Persisting,
    Succeeded,
    Retrying,
    Suspended,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    FeedNotFound,
    FeedSuspended,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub feed_updated: bool,
    pub created_entries: usize,
    pub updated_entries: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Succeeded(RefreshSummary),
    Retry {
        delay: Duration,
        next: RefreshRequest,
    },
    Suspended,
    Aborted(AbortReason),
}

impl RefreshOutcome {
    pub fn state(&self) -> RefreshState {
        match self {
            RefreshOutcome::Succeeded(_) => RefreshState::Succeeded,
            RefreshOutcome::Retry { .. } => RefreshState::Retrying,
            RefreshOutcome::Suspended => RefreshState::Suspended,
            RefreshOutcome::Aborted(_) => RefreshState::Aborted,
        }
    }
}

pub struct Refresher {
    context: SyncContext,
}

impl Refresher {
    pub fn new(context: SyncContext) -> Self {
        Self { context }
    }

    pub fn execute(
        &self,
        request: &RefreshRequest,
        queue: &dyn JobQueue,
    ) -> Result<RefreshOutcome, SyncError> {
        let outcome = self.refresh(request);

        if let RefreshOutcome::Retry { delay, next } = &outcome {
            info!(
                "Retrying refresh of feed {} in {:?} (attempt {})",
                next.feed_id, delay, next.attempt
            );

            if let Err(error) = queue.submit(next.clone(), Some(*delay)) {
                error!(
                    "Failed to enqueue retry for feed {}: {:?}",
                    request.feed_id, error
                );

                self.release_lock(request);

                return Err(error.into());
            }
        }

        Ok(outcome)
    }

    pub fn refresh(&self, request: &RefreshRequest) -> RefreshOutcome {
        self.transition(request, RefreshState::Pending);

        let feed = match self.context.store.get_feed(request.feed_id) {
            Ok(feed) => feed,
            Err(error) if error.is_not_found() => {
                error!("Feed {} not found, aborting refresh", request.feed_id);

                return self.finish(request, RefreshOutcome::Aborted(AbortReason::FeedNotFound));
            }
            Err(error) => return self.retry_or_suspend(request, error.into()),
        };

        if !feed.should_retry {
            info!(
                "Feed {} is suspended after failed refreshes, skipping",
                feed.id
            );

            return self.finish(request, RefreshOutcome::Aborted(AbortReason::FeedSuspended));
        }

        match self.attempt(request, feed) {
            Ok(summary) => {
                info!(
                    "Refreshed feed {}: feed updated {}, {} new entries, {} updated entries",
                    request.feed_id,
                    summary.feed_updated,
                    summary.created_entries,
                    summary.updated_entries
                );

                self.finish(request, RefreshOutcome::Succeeded(summary))
            }
            Err(error) => self.retry_or_suspend(request, error),
        }
    }

    fn attempt(&self, request: &RefreshRequest, feed: Feed) -> Result<RefreshSummary, SyncError> {
        self.transition(request, RefreshState::Fetching);

        let fetched_feed = self.context.reader.read(&feed.url)?;

        self.transition(request, RefreshState::Reconciling);

        let now = db::current_time();
        let feed_mutation = reconcile::reconcile_feed(&feed, &fetched_feed, now)?;

        let guids: Vec<String> = fetched_feed
            .items
            .iter()
            .filter_map(|item| item.guid.clone())
            .collect();
        let stored_entries = self.context.store.get_entries_by_guid(feed.id, &guids)?;
        let entry_mutations =
            reconcile::reconcile_entries(feed.id, &stored_entries, &fetched_feed.items, now)?;

        let updated_feed = feed_mutation.map(|mutation| {
            let mut updated_feed = feed;
            mutation.apply_to(&mut updated_feed);
            updated_feed
        });

        let summary = RefreshSummary {
            feed_updated: updated_feed.is_some(),
            created_entries: entry_mutations.iter().filter(|m| m.is_create()).count(),
            updated_entries: entry_mutations.iter().filter(|m| !m.is_create()).count(),
        };

        if updated_feed.is_none() && entry_mutations.is_empty() {
            return Ok(summary);
        }

        self.transition(request, RefreshState::Persisting);

        self.context
            .store
            .persist_refresh(updated_feed.as_ref(), &entry_mutations)?;

        Ok(summary)
    }

    fn retry_or_suspend(&self, request: &RefreshRequest, error: SyncError) -> RefreshOutcome {
        let retry_delays = &self.context.config.retry_delays;

        match retry_delays.get(request.attempt as usize) {
            Some(delay) => {
                warn!(
                    "Failed to refresh feed {} (attempt {}): {}",
                    request.feed_id, request.attempt, error
                );

                let outcome = RefreshOutcome::Retry {
                    delay: *delay,
                    next: request.next_attempt(),
                };
                self.transition(request, outcome.state());

                outcome
            }
            None => {
                error!(
                    "Failed to refresh feed {} after {} retries, suspending it: {}",
                    request.feed_id,
                    retry_delays.len(),
                    error
                );

                if let Err(error) = self
                    .context
                    .store
                    .set_should_retry(request.feed_id, false)
                {
                    error!(
                        "Failed to suspend feed {}: {:?}",
                        request.feed_id, error
                    );
                }

                self.finish(request, RefreshOutcome::Suspended)
            }
        }
    }

    fn finish(&self, request: &RefreshRequest, outcome: RefreshOutcome) -> RefreshOutcome {
        self.transition(request, outcome.state());
        self.release_lock(request);

        outcome
    }

    // forced refreshes hold no lock, so there is nothing to release
    fn release_lock(&self, request: &RefreshRequest) {
        let Some(token) = &request.lock_token else {
            return;
        };

        let key = lock_key(request.feed_id);

        match self.context.locks.release(&key, token) {
            Ok(true) => debug!("Released lock {}", key),
            Ok(false) => warn!("Lock {} was not held by this refresh", key),
            Err(error) => error!("Failed to release lock {}: {:?}", key, error),
        }
    }

    fn transition(&self, request: &RefreshRequest, state: RefreshState) {
        debug!(
            "Refresh of feed {} (attempt {}) -> {:?}",
            request.feed_id, request.attempt, state
        );
    }
}
