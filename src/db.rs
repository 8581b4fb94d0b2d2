use crate::config::Config;
use chrono::prelude::*;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::r2d2;

#[cfg(test)]
use diesel::connection::Connection;

#[cfg(test)]
use dotenv::dotenv;

pub mod feed_entries;
pub mod feeds;

pub type Pool = r2d2::Pool<r2d2::ConnectionManager<PgConnection>>;

#[cfg(test)]
pub fn establish_test_connection() -> PgConnection {
    dotenv().ok();

    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for db tests");

    PgConnection::establish(&url).unwrap_or_else(|_| panic!("Error connecting to {}", url))
}

pub fn current_time() -> DateTime<Utc> {
    Utc::now().round_subsecs(0)
}

pub fn create_connection_pool(config: &Config) -> Result<Pool, r2d2::PoolError> {
    let manager = r2d2::ConnectionManager::<PgConnection>::new(config.database_url.clone());

    r2d2::Pool::builder()
        .max_size(config.database_pool_size)
        .build(manager)
}
