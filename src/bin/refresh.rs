use dotenv::dotenv;
use feed_sync::sync::runner;
use feed_sync::Config;
use uuid::Uuid;

fn main() {
    dotenv().ok();
    env_logger::init();

    let feed_id = match std::env::args().nth(1).map(|arg| Uuid::parse_str(&arg)) {
        Some(Ok(feed_id)) => feed_id,
        _ => {
            eprintln!("Usage: feed_sync_refresh <feed_id>");
            std::process::exit(2);
        }
    };

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            log::error!("Invalid configuration: {}", error);
            std::process::exit(1);
        }
    };

    if let Err(error) = runner::force_refresh(config, feed_id) {
        log::error!("Failed to force refresh of feed {}: {}", feed_id, error);
        std::process::exit(1);
    }
}
