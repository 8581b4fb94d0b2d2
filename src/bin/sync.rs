use dotenv::dotenv;
use feed_sync::sync::runner;
use feed_sync::Config;

fn main() {
    dotenv().ok();
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            log::error!("Invalid configuration: {}", error);
            std::process::exit(1);
        }
    };

    let _worker_pool = match runner::start(config) {
        Ok(worker_pool) => worker_pool,
        Err(error) => {
            log::error!("Failed to start feed sync: {}", error);
            std::process::exit(1);
        }
    };

    std::thread::park();
}
