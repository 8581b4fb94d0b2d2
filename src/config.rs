use std::env;
use std::str::FromStr;
use std::time::Duration;
use typed_builder::TypedBuilder;

const DEFAULT_RETRY_DELAYS_SECONDS: [u64; 3] = [120, 300, 480];

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is not set")]
    Missing(&'static str),
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct Config {
    #[builder(setter(into))]
    pub database_url: String,
    #[builder(default = 5)]
    pub database_pool_size: u32,
    #[builder(setter(into), default = "redis://127.0.0.1:6379/0".to_string())]
    pub redis_url: String,
    #[builder(default = default_retry_delays())]
    pub retry_delays: Vec<Duration>,
    #[builder(setter(into), default = "0 */5 * * * *".to_string())]
    pub refresh_cron_pattern: String,
    #[builder(default = Duration::from_secs(30))]
    pub fetch_timeout: Duration,
    #[builder(default = Some(Duration::from_secs(3600)))]
    pub lock_ttl: Option<Duration>,
    #[builder(default = 100)]
    pub feeds_per_page: i64,
    #[builder(default = false)]
    pub skip_suspended_at_dispatch: bool,
    #[builder(default = 4)]
    pub workers_number: u32,
    #[builder(setter(into), default = "feed_sync".to_string())]
    pub user_agent: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let mut config = Config::builder().database_url(database_url).build();

        if let Some(value) = lookup("DATABASE_POOL_SIZE") {
            config.database_pool_size = parse("DATABASE_POOL_SIZE", &value)?;
        }

        if let Some(value) = lookup("REDIS_URL") {
            config.redis_url = value;
        }

        if let Some(value) = lookup("REFRESH_RETRY_DELAYS_SECONDS") {
            config.retry_delays = parse_delays("REFRESH_RETRY_DELAYS_SECONDS", &value)?;
        }

        if let Some(value) = lookup("REFRESH_CRON_PATTERN") {
            config.refresh_cron_pattern = value;
        }

        if let Some(value) = lookup("FETCH_TIMEOUT_SECONDS") {
            config.fetch_timeout = Duration::from_secs(parse("FETCH_TIMEOUT_SECONDS", &value)?);
        }

        if let Some(value) = lookup("LOCK_TTL_SECONDS") {
            config.lock_ttl = match parse::<u64>("LOCK_TTL_SECONDS", &value)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            };
        }

        if let Some(value) = lookup("FEEDS_PER_PAGE") {
            config.feeds_per_page = parse("FEEDS_PER_PAGE", &value)?;

            if config.feeds_per_page <= 0 {
                return Err(ConfigError::Invalid {
                    name: "FEEDS_PER_PAGE",
                    value,
                });
            }
        }

        if let Some(value) = lookup("SKIP_SUSPENDED_AT_DISPATCH") {
            config.skip_suspended_at_dispatch = parse("SKIP_SUSPENDED_AT_DISPATCH", &value)?;
        }

        if let Some(value) = lookup("SYNC_WORKERS_NUMBER") {
            config.workers_number = parse("SYNC_WORKERS_NUMBER", &value)?;
        }

        if let Some(value) = lookup("FETCH_USER_AGENT") {
            config.user_agent = value;
        }

        config.lock_ttl = config.lock_ttl.filter(|ttl| !ttl.is_zero());

        // a retry keeps the dispatcher's lock, so it must outlive every attempt
        if let Some(ttl) = config.lock_ttl {
            if ttl <= config.retry_window() {
                return Err(ConfigError::Invalid {
                    name: "LOCK_TTL_SECONDS",
                    value: ttl.as_secs().to_string(),
                });
            }
        }

        Ok(config)
    }

    pub fn retry_window(&self) -> Duration {
        let attempts = self.retry_delays.len() as u32 + 1;

        self.retry_delays.iter().sum::<Duration>() + self.fetch_timeout * attempts
    }
}

fn default_retry_delays() -> Vec<Duration> {
    DEFAULT_RETRY_DELAYS_SECONDS
        .iter()
        .map(|secs| Duration::from_secs(*secs))
        .collect()
}

fn parse<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

// "120,300,480" -> [2m, 5m, 8m]; an empty string disables retries
fn parse_delays(name: &'static str, value: &str) -> Result<Vec<Duration>, ConfigError> {
    if value.trim().is_empty() {
        return Ok(vec![]);
    }

    value
        .split(',')
        .map(|secs| parse::<u64>(name, secs).map(Duration::from_secs))
        .collect()
}
