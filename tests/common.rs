use feed_sync::lock::InMemoryLockStore;
use feed_sync::store::InMemoryFeedStore;
use feed_sync::sync::reader::{FeedMetadata, FeedReaderError, FetchedFeed, FetchedFeedItem};
use feed_sync::sync::{InMemoryJobQueue, ReadFeed, RefreshOutcome, Refresher, SyncContext};
use feed_sync::Config;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

// MockReadFeed only exists in the library's own unit tests
#[derive(Default)]
pub struct ScriptedReader {
    responses: Mutex<HashMap<String, Result<FetchedFeed, FeedReaderError>>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedReader {
    pub fn respond(&self, url: &str, response: Result<FetchedFeed, FeedReaderError>) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

impl ReadFeed for ScriptedReader {
    fn read(&self, url: &str) -> Result<FetchedFeed, FeedReaderError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_insert(0) += 1;

        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| {
                Err(FeedReaderError::Status {
                    url: url.to_string(),
                    status: 404,
                })
            })
    }
}

pub struct Backends {
    pub store: Arc<InMemoryFeedStore>,
    pub locks: Arc<InMemoryLockStore>,
    pub reader: Arc<ScriptedReader>,
    pub context: SyncContext,
}

pub fn backends() -> Backends {
    let store = Arc::new(InMemoryFeedStore::new());
    let locks = Arc::new(InMemoryLockStore::new());
    let reader = Arc::new(ScriptedReader::default());

    let config = Config::builder()
        .database_url("postgres://localhost/feed_sync_test")
        .retry_delays(vec![
            Duration::from_secs(120),
            Duration::from_secs(300),
            Duration::from_secs(480),
        ])
        .feeds_per_page(2)
        .build();

    let context = SyncContext::builder()
        .config(Arc::new(config))
        .store(store.clone())
        .locks(locks.clone())
        .reader(reader.clone())
        .build();

    Backends {
        store,
        locks,
        reader,
        context,
    }
}

pub fn fetched_feed(title: &str, items: &[(&str, &str)]) -> FetchedFeed {
    FetchedFeed {
        metadata: FeedMetadata {
            title: Some(title.to_string()),
            link: Some("https://example.com/".to_string()),
            description: None,
            published_at: None,
        },
        items: items
            .iter()
            .map(|(guid, title)| FetchedFeedItem {
                guid: Some(guid.to_string()),
                title: Some(title.to_string()),
                ..Default::default()
            })
            .collect(),
    }
}

pub fn unreachable(url: &str) -> FeedReaderError {
    FeedReaderError::Timeout {
        url: url.to_string(),
    }
}

pub fn drain(refresher: &Refresher, queue: &InMemoryJobQueue) -> Vec<(Uuid, RefreshOutcome)> {
    let mut outcomes = Vec::new();

    while let Some((request, _delay)) = queue.pop() {
        let outcome = refresher.execute(&request, queue).unwrap();

        outcomes.push((request.feed_id, outcome));
    }

    outcomes
}
