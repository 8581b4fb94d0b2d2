use super::{LockError, LockStore, LockToken};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
pub struct InMemoryLockStore {
    locks: Mutex<HashMap<String, LockToken>>,
}

impl InMemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self, key: &str) -> Result<bool, LockError> {
        Ok(self.locks()?.contains_key(key))
    }

    fn locks(&self) -> Result<MutexGuard<'_, HashMap<String, LockToken>>, LockError> {
        self.locks
            .lock()
            .map_err(|_| LockError::Unavailable("lock store mutex is poisoned".to_string()))
    }
}

impl LockStore for InMemoryLockStore {
    fn acquire(&self, key: &str) -> Result<Option<LockToken>, LockError> {
        let mut locks = self.locks()?;

        if locks.contains_key(key) {
            return Ok(None);
        }

        let token = LockToken::generate();
        locks.insert(key.to_string(), token.clone());

        Ok(Some(token))
    }

    fn release(&self, key: &str, token: &LockToken) -> Result<bool, LockError> {
        let mut locks = self.locks()?;

        match locks.get(key) {
            Some(stored) if stored == token => {
                locks.remove(key);

                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
