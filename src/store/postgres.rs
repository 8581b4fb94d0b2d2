use super::{FeedStore, StoreError};
use crate::db::{feed_entries, feeds, Pool};
use crate::models::{Feed, FeedEntry};
use crate::sync::reconcile::EntryMutation;
use diesel::connection::Connection;
use std::collections::HashMap;
use uuid::Uuid;

pub struct PgFeedStore {
    pool: Pool,
}

impl PgFeedStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

impl FeedStore for PgFeedStore {
    fn get_feed(&self, id: Uuid) -> Result<Feed, StoreError> {
        let mut connection = self.pool.get()?;

        feeds::find(&mut connection, id)?.ok_or(StoreError::NotFound(id))
    }

    fn list_feeds(&self, page: i64, count: i64) -> Result<Vec<Feed>, StoreError> {
        let mut connection = self.pool.get()?;

        Ok(feeds::load_feeds(&mut connection, page, count)?)
    }

    fn save_feed(&self, feed: &Feed) -> Result<(), StoreError> {
        let mut connection = self.pool.get()?;

        match feeds::update_metadata(&mut connection, feed)? {
            0 => Err(StoreError::NotFound(feed.id)),
            _ => Ok(()),
        }
    }

    fn set_should_retry(&self, id: Uuid, should_retry: bool) -> Result<(), StoreError> {
        let mut connection = self.pool.get()?;

        match feeds::set_should_retry(&mut connection, id, should_retry)? {
            0 => Err(StoreError::NotFound(id)),
            _ => Ok(()),
        }
    }

    fn get_entries_by_guid(
        &self,
        feed_id: Uuid,
        guids: &[String],
    ) -> Result<HashMap<String, FeedEntry>, StoreError> {
        let mut connection = self.pool.get()?;

        let entries = feed_entries::find_by_guids(&mut connection, feed_id, guids)?
            .into_iter()
            .filter_map(|entry| entry.guid.clone().map(|guid| (guid, entry)))
            .collect();

        Ok(entries)
    }

    fn save_entries(&self, mutations: &[EntryMutation]) -> Result<(), StoreError> {
        let mut connection = self.pool.get()?;

        connection.transaction::<_, StoreError, _>(|connection| {
            feed_entries::apply(connection, mutations)?;

            Ok(())
        })
    }

    fn persist_refresh(
        &self,
        feed: Option<&Feed>,
        mutations: &[EntryMutation],
    ) -> Result<(), StoreError> {
        let mut connection = self.pool.get()?;

        connection.transaction::<_, StoreError, _>(|connection| {
            if let Some(feed) = feed {
                if feeds::update_metadata(connection, feed)? == 0 {
                    return Err(StoreError::NotFound(feed.id));
                }
            }

            feed_entries::apply(connection, mutations)?;

            Ok(())
        })
    }
}
