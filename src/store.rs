use crate::models::{Feed, FeedEntry};
use crate::sync::reconcile::EntryMutation;
use std::collections::HashMap;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryFeedStore;
pub use postgres::PgFeedStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("feed {0} not found")]
    NotFound(Uuid),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("failed to get a database connection: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("feed store is unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

pub trait FeedStore: Send + Sync {
    fn get_feed(&self, id: Uuid) -> Result<Feed, StoreError>;

    fn list_feeds(&self, page: i64, count: i64) -> Result<Vec<Feed>, StoreError>;

    /// Writes metadata, content hash, raw document and `updated_at`.
    /// `should_retry` is only ever changed through `set_should_retry`.
    fn save_feed(&self, feed: &Feed) -> Result<(), StoreError>;

    fn set_should_retry(&self, id: Uuid, should_retry: bool) -> Result<(), StoreError>;

    fn get_entries_by_guid(
        &self,
        feed_id: Uuid,
        guids: &[String],
    ) -> Result<HashMap<String, FeedEntry>, StoreError>;

    fn save_entries(&self, mutations: &[EntryMutation]) -> Result<(), StoreError>;

    /// Saves the outcome of one refresh. Stores that support transactions
    /// commit the feed and its entries together.
    fn persist_refresh(
        &self,
        feed: Option<&Feed>,
        mutations: &[EntryMutation],
    ) -> Result<(), StoreError> {
        if let Some(feed) = feed {
            self.save_feed(feed)?;
        }

        self.save_entries(mutations)
    }
}
