pub mod feed;
pub mod feed_entry;

pub use feed::Feed;
pub use feed_entry::FeedEntry;
