use super::{FeedStore, StoreError};
use crate::models::{Feed, FeedEntry};
use crate::sync::reconcile::EntryMutation;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryFeedStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    feeds: HashMap<Uuid, Feed>,
    entries: HashMap<Uuid, FeedEntry>,
}

impl InMemoryFeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_feed(&self, feed: Feed) -> Result<(), StoreError> {
        self.state()?.feeds.insert(feed.id, feed);

        Ok(())
    }

    pub fn remove_feed(&self, id: Uuid) -> Result<Option<Feed>, StoreError> {
        Ok(self.state()?.feeds.remove(&id))
    }

    pub fn entries(&self, feed_id: Uuid) -> Result<Vec<FeedEntry>, StoreError> {
        let mut entries: Vec<FeedEntry> = self
            .state()?
            .entries
            .values()
            .filter(|entry| entry.feed_id == feed_id)
            .cloned()
            .collect();

        entries.sort_by_key(|entry| (entry.created_at, entry.id));

        Ok(entries)
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("feed store mutex is poisoned".to_string()))
    }
}

impl State {
    fn apply(&mut self, mutations: &[EntryMutation]) {
        for mutation in mutations {
            match mutation.to_new_entry() {
                Some(entry) => {
                    self.entries.insert(entry.id, entry);
                }
                None => {
                    if let Some(entry) = self.entries.get_mut(&mutation.id()) {
                        mutation.apply_to(entry);
                    }
                }
            }
        }
    }

    fn save_feed(&mut self, feed: &Feed) -> Result<(), StoreError> {
        let stored = self
            .feeds
            .get_mut(&feed.id)
            .ok_or(StoreError::NotFound(feed.id))?;

        stored.title = feed.title.clone();
        stored.link = feed.link.clone();
        stored.description = feed.description.clone();
        stored.published_at = feed.published_at;
        stored.content_hash = feed.content_hash.clone();
        stored.raw = feed.raw.clone();
        stored.updated_at = feed.updated_at;

        Ok(())
    }
}

impl FeedStore for InMemoryFeedStore {
    fn get_feed(&self, id: Uuid) -> Result<Feed, StoreError> {
        self.state()?
            .feeds
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn list_feeds(&self, page: i64, count: i64) -> Result<Vec<Feed>, StoreError> {
        let offset = ((page - 1) * count).max(0) as usize;
        let mut feeds: Vec<Feed> = self.state()?.feeds.values().cloned().collect();

        feeds.sort_by_key(|feed| feed.id);

        Ok(feeds
            .into_iter()
            .skip(offset)
            .take(count.max(0) as usize)
            .collect())
    }

    fn save_feed(&self, feed: &Feed) -> Result<(), StoreError> {
        self.state()?.save_feed(feed)
    }

    fn set_should_retry(&self, id: Uuid, should_retry: bool) -> Result<(), StoreError> {
        let mut state = self.state()?;
        let feed = state.feeds.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        feed.should_retry = should_retry;

        Ok(())
    }

    fn get_entries_by_guid(
        &self,
        feed_id: Uuid,
        guids: &[String],
    ) -> Result<HashMap<String, FeedEntry>, StoreError> {
        Ok(self
            .state()?
            .entries
            .values()
            .filter(|entry| entry.feed_id == feed_id)
            .filter_map(|entry| {
                let guid = entry.guid.as_ref()?;

                guids
                    .contains(guid)
                    .then(|| (guid.clone(), entry.clone()))
            })
            .collect())
    }

    fn save_entries(&self, mutations: &[EntryMutation]) -> Result<(), StoreError> {
        self.state()?.apply(mutations);

        Ok(())
    }

    // both writes happen under one lock, the in-memory version of a transaction
    fn persist_refresh(
        &self,
        feed: Option<&Feed>,
        mutations: &[EntryMutation],
    ) -> Result<(), StoreError> {
        let mut state = self.state()?;

        if let Some(feed) = feed {
            state.save_feed(feed)?;
        }

        state.apply(mutations);

        Ok(())
    }
}
