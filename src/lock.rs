use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod memory;
pub mod redis_store;

pub use memory::InMemoryLockStore;
pub use redis_store::RedisLockStore;

const LOCK_NAMESPACE: &str = "refresh";

pub fn lock_key(feed_id: Uuid) -> String {
    format!("{LOCK_NAMESPACE}:{feed_id}")
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockToken(String);

impl LockToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("failed to get a redis connection: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("lock store is unavailable: {0}")]
    Unavailable(String),
}

pub trait LockStore: Send + Sync {
    /// `Some` only if this call created the key.
    fn acquire(&self, key: &str) -> Result<Option<LockToken>, LockError>;

    /// Deletes the key if it still holds `token`. Returns whether anything was
    /// deleted; releasing a free lock is not an error.
    fn release(&self, key: &str, token: &LockToken) -> Result<bool, LockError>;
}
