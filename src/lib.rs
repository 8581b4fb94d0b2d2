#[macro_use]
extern crate diesel;

pub mod config;
pub mod db;
pub mod http_client;
pub mod lock;
pub mod models;
pub mod schema;
pub mod store;
pub mod sync;

pub use config::Config;
