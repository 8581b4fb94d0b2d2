pub mod context;
pub mod error;
pub mod queue;
pub mod reader;
pub mod reconcile;
pub mod refresh_all_feeds_job;
pub mod refresh_feed_job;
pub mod refresher;
pub mod runner;
pub mod scheduler;

pub use context::SyncContext;
pub use error::SyncError;
pub use queue::{FangJobQueue, InMemoryJobQueue, JobQueue, QueueError, RefreshRequest};
pub use reader::{FetchedFeed, FetchedFeedItem, ReadFeed};
pub use refresh_all_feeds_job::RefreshAllFeedsJob;
pub use refresh_feed_job::RefreshFeedJob;
pub use refresher::{AbortReason, RefreshOutcome, RefreshState, RefreshSummary, Refresher};
pub use scheduler::{DispatchReport, Scheduler};

pub const JOB_TYPE: &str = "refresh";
