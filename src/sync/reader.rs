use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

pub mod fetcher;

pub use fetcher::Fetcher;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedReaderError {
    #[error("invalid url {url}")]
    InvalidUrl { url: String },
    #[error("failed to request {url}: {msg}")]
    Request { url: String, msg: String },
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },
    #[error("{url} is not a valid feed: {msg}")]
    Malformed { url: String, msg: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedMetadata {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedFeedItem {
    pub guid: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedFeed {
    pub metadata: FeedMetadata,
    pub items: Vec<FetchedFeedItem>,
}

#[cfg_attr(test, automock)]
pub trait ReadFeed: Send + Sync {
    fn read(&self, url: &str) -> Result<FetchedFeed, FeedReaderError>;
}
