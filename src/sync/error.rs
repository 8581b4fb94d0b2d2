use crate::lock::LockError;
use crate::store::StoreError;
use crate::sync::queue::QueueError;
use crate::sync::reader::FeedReaderError;
use fang::FangError;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Fetch(#[from] FeedReaderError),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error("failed to serialize fetched content: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::Store(error) if error.is_not_found())
    }
}

impl From<SyncError> for FangError {
    fn from(error: SyncError) -> Self {
        let description = format!("{error}");

        FangError { description }
    }
}
