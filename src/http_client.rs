use crate::config::Config;
use isahc::config::RedirectPolicy;
use isahc::prelude::*;
use isahc::HttpClient;

pub fn build(config: &Config) -> Result<HttpClient, isahc::Error> {
    HttpClient::builder()
        .redirect_policy(RedirectPolicy::Limit(10))
        .timeout(config.fetch_timeout)
        .default_header("User-Agent", config.user_agent.as_str())
        .build()
}
