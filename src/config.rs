use anyhow::Result;
use std::env;
use std::time::Duration;

/// Runtime configuration, read from the environment (a `.env` file is
/// honored when present).
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the cleanup service.
    pub server_url: String,
    /// Period between status polls.
    pub poll_interval: Duration,
    /// Per-request timeout for submissions and polls.
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server_url: env::var("CLARITY_SERVER_URL")
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),
            poll_interval: match env::var("CLARITY_POLL_INTERVAL_MS") {
                Ok(value) => Duration::from_millis(value.parse()?),
                Err(_) => crate::poller::DEFAULT_POLL_INTERVAL,
            },
            request_timeout: Duration::from_secs(
                env::var("CLARITY_REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()?,
            ),
        })
    }
}
