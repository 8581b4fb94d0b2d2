use super::{LockError, LockStore, LockToken};
use redis::{Client, Script};
use std::time::Duration;

// deletes the key only if it still holds the caller's token
const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

pub struct RedisLockStore {
    pool: r2d2::Pool<Client>,
    ttl: Option<Duration>,
}

impl RedisLockStore {
    pub fn new(url: &str, ttl: Option<Duration>, pool_size: u32) -> Result<Self, LockError> {
        let client = Client::open(url)?;
        let pool = r2d2::Pool::builder()
            .max_size(pool_size)
            .build_unchecked(client);

        Ok(Self {
            pool,
            ttl: ttl.filter(|ttl| !ttl.is_zero()),
        })
    }
}

impl LockStore for RedisLockStore {
    fn acquire(&self, key: &str) -> Result<Option<LockToken>, LockError> {
        let mut connection = self.pool.get()?;
        let token = LockToken::generate();

        let mut command = redis::cmd("SET");
        command.arg(key).arg(token.as_str()).arg("NX");

        if let Some(ttl) = self.ttl {
            command.arg("PX").arg(ttl.as_millis() as u64);
        }

        // "OK" when the key was set, nil when someone else holds it
        let reply: Option<String> = command.query(&mut *connection)?;

        log::debug!("Acquired lock {}: {}", key, reply.is_some());

        Ok(reply.map(|_| token))
    }

    fn release(&self, key: &str, token: &LockToken) -> Result<bool, LockError> {
        let mut connection = self.pool.get()?;

        let deleted: i64 = Script::new(RELEASE_SCRIPT)
            .key(key)
            .arg(token.as_str())
            .invoke(&mut *connection)?;

        Ok(deleted == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::RedisLockStore;
    use crate::lock::{lock_key, LockStore, LockToken};
    use std::time::Duration;
    use uuid::Uuid;

    fn store() -> RedisLockStore {
        dotenv::dotenv().ok();

        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/0".to_string());

        RedisLockStore::new(&url, Some(Duration::from_secs(60)), 2).unwrap()
    }

    #[test]
    fn zero_ttl_means_no_expiry() {
        let store =
            RedisLockStore::new("redis://127.0.0.1:6379/0", Some(Duration::ZERO), 1).unwrap();

        assert_eq!(store.ttl, None);
    }

    #[test]
    #[ignore]
    fn it_acquires_and_releases_lock() {
        let store = store();
        let key = lock_key(Uuid::new_v4());

        let token = store.acquire(&key).unwrap().unwrap();

        assert_eq!(store.acquire(&key).unwrap(), None);
        assert!(!store.release(&key, &LockToken::generate()).unwrap());
        assert!(store.release(&key, &token).unwrap());
        assert!(!store.release(&key, &token).unwrap());

        let token = store.acquire(&key).unwrap().unwrap();
        store.release(&key, &token).unwrap();
    }
}
