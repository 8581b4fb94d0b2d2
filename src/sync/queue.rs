use super::refresh_feed_job::RefreshFeedJob;
use crate::db;
use crate::lock::LockToken;
use fang::Queueable;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("failed to enqueue refresh of feed {feed_id}: {msg}")]
    Enqueue { feed_id: Uuid, msg: String },
    #[error("retry delay {0:?} is out of range")]
    InvalidDelay(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub feed_id: Uuid,
    pub attempt: u32,
    /// Token of the lock taken by the dispatcher; forced refreshes have none.
    pub lock_token: Option<LockToken>,
}

impl RefreshRequest {
    pub fn scheduled(feed_id: Uuid, lock_token: LockToken) -> Self {
        Self {
            feed_id,
            attempt: 0,
            lock_token: Some(lock_token),
        }
    }

    pub fn forced(feed_id: Uuid) -> Self {
        Self {
            feed_id,
            attempt: 0,
            lock_token: None,
        }
    }

    pub fn is_forced(&self) -> bool {
        self.lock_token.is_none()
    }

    pub fn next_attempt(&self) -> Self {
        Self {
            feed_id: self.feed_id,
            attempt: self.attempt + 1,
            lock_token: self.lock_token.clone(),
        }
    }
}

pub trait JobQueue {
    fn submit(&self, request: RefreshRequest, delay: Option<Duration>) -> Result<(), QueueError>;
}

pub struct FangJobQueue<'a, Q: Queueable + ?Sized> {
    queue: &'a Q,
}

impl<'a, Q: Queueable + ?Sized> FangJobQueue<'a, Q> {
    pub fn new(queue: &'a Q) -> Self {
        Self { queue }
    }
}

impl<'a, Q: Queueable + ?Sized> JobQueue for FangJobQueue<'a, Q> {
    fn submit(&self, request: RefreshRequest, delay: Option<Duration>) -> Result<(), QueueError> {
        let feed_id = request.feed_id;

        let result = match delay {
            None => self.queue.insert_task(&RefreshFeedJob::new(request)),
            Some(delay) => {
                let delay =
                    chrono::Duration::from_std(delay).map_err(|_| QueueError::InvalidDelay(delay))?;
                let job = RefreshFeedJob::new(request).run_at(db::current_time() + delay);

                self.queue.schedule_task(&job)
            }
        };

        result.map(|_| ()).map_err(|error| QueueError::Enqueue {
            feed_id,
            msg: format!("{error:?}"),
        })
    }
}

#[derive(Default)]
pub struct InMemoryJobQueue {
    submitted: Mutex<VecDeque<(RefreshRequest, Option<Duration>)>>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pop(&self) -> Option<(RefreshRequest, Option<Duration>)> {
        self.submitted().ok()?.pop_front()
    }

    pub fn len(&self) -> usize {
        self.submitted().map(|submitted| submitted.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn submitted(
        &self,
    ) -> Result<MutexGuard<'_, VecDeque<(RefreshRequest, Option<Duration>)>>, String> {
        self.submitted
            .lock()
            .map_err(|_| "job queue mutex is poisoned".to_string())
    }
}

impl JobQueue for InMemoryJobQueue {
    fn submit(&self, request: RefreshRequest, delay: Option<Duration>) -> Result<(), QueueError> {
        let feed_id = request.feed_id;

        self.submitted()
            .map_err(|msg| QueueError::Enqueue { feed_id, msg })?
            .push_back((request, delay));

        Ok(())
    }
}
