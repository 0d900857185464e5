//! Configuration for upgrading responses and consuming streams.
//!
//! Both types use the builder pattern.
//!
//! ```ignore
//! use std::time::Duration;
//! use ssewire::config::UpgraderConfig;
//!
//! let config = UpgraderConfig::default()
//!     .with_retry(Duration::from_secs(3))
//!     .with_queue_capacity(64);
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::ReqwestHttpClient;
use crate::sse::constants::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WRITE_RETRY_INTERVAL};
use crate::traits::{Headers, HttpClient};

/// Environment variable overriding [`UpgraderConfig::retry`], in milliseconds.
pub const ENV_RETRY_MS: &str = "SSEWIRE_RETRY_MS";
/// Environment variable overriding [`UpgraderConfig::queue_capacity`].
pub const ENV_QUEUE_CAPACITY: &str = "SSEWIRE_QUEUE_CAPACITY";

/// Settings applied to every connection an upgrader creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgraderConfig {
    /// Reconnection delay announced to the peer with a `retry:` frame
    /// (default: none)
    pub retry: Option<Duration>,
    /// Capacity of each connection's outbound queue (default: 16, minimum 1)
    pub queue_capacity: usize,
    /// Pause between enqueue attempts while the queue is full (default: 1ms)
    pub write_retry_interval: Duration,
}

impl Default for UpgraderConfig {
    fn default() -> Self {
        Self {
            retry: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            write_retry_interval: DEFAULT_WRITE_RETRY_INTERVAL,
        }
    }
}

impl UpgraderConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `SSEWIRE_RETRY_MS` and `SSEWIRE_QUEUE_CAPACITY`.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_RETRY_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config = config.with_retry(Duration::from_millis(ms)),
                Err(e) => tracing::warn!("Ignoring {}={:?}: {}", ENV_RETRY_MS, raw, e),
            }
        }

        if let Some(raw) = lookup(ENV_QUEUE_CAPACITY) {
            match raw.trim().parse::<usize>() {
                Ok(capacity) => config = config.with_queue_capacity(capacity),
                Err(e) => tracing::warn!("Ignoring {}={:?}: {}", ENV_QUEUE_CAPACITY, raw, e),
            }
        }

        config
    }

    /// Announce `retry` to peers. A zero duration disables the frame.
    pub fn with_retry(mut self, retry: Duration) -> Self {
        self.retry = (!retry.is_zero()).then_some(retry);
        self
    }

    /// Set the outbound queue capacity. Values below 1 are raised to 1.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Set the pause between enqueue attempts while the queue is full.
    pub fn with_write_retry_interval(mut self, interval: Duration) -> Self {
        self.write_retry_interval = interval;
        self
    }
}

/// Hook run on every notifier request before `Accept` is forced.
pub type RequestHook = Arc<dyn Fn(&mut Headers) + Send + Sync>;

/// Transport and request customization used by a
/// [`Notifier`](crate::client::Notifier).
#[derive(Clone)]
pub struct NotifierConfig {
    /// Client used to open streams
    pub client: Arc<dyn HttpClient>,
    /// Optional hook to add headers such as `Authorization`
    pub request_hook: Option<RequestHook>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            client: Arc::new(ReqwestHttpClient::new()),
            request_hook: None,
        }
    }
}

impl fmt::Debug for NotifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifierConfig")
            .field("request_hook", &self.request_hook.is_some())
            .finish_non_exhaustive()
    }
}

impl NotifierConfig {
    /// Create a config using a default reqwest client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific HTTP client.
    pub fn with_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.client = client;
        self
    }

    /// Customize each request's headers.
    pub fn with_request_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Headers) + Send + Sync + 'static,
    {
        self.request_hook = Some(Arc::new(hook));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_upgrader_config_defaults() {
        let config = UpgraderConfig::default();
        assert_eq!(config.retry, None);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.write_retry_interval, DEFAULT_WRITE_RETRY_INTERVAL);
    }

    #[test]
    fn test_upgrader_config_builder() {
        let config = UpgraderConfig::new()
            .with_retry(Duration::from_secs(2))
            .with_queue_capacity(0)
            .with_write_retry_interval(Duration::from_micros(50));
        assert_eq!(config.retry, Some(Duration::from_secs(2)));
        assert_eq!(config.queue_capacity, 1);
        assert_eq!(config.write_retry_interval, Duration::from_micros(50));

        let config = config.with_retry(Duration::ZERO);
        assert_eq!(config.retry, None);
    }

    #[test]
    fn test_upgrader_config_from_lookup() {
        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_RETRY_MS, "1500"), (ENV_QUEUE_CAPACITY, " 32 ")]);
        let config = UpgraderConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.retry, Some(Duration::from_millis(1500)));
        assert_eq!(config.queue_capacity, 32);
    }

    #[test]
    fn test_upgrader_config_ignores_bad_values() {
        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_RETRY_MS, "soon"), (ENV_QUEUE_CAPACITY, "-1")]);
        let config = UpgraderConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config, UpgraderConfig::default());
    }

    #[test]
    fn test_notifier_config_hook() {
        let config = NotifierConfig::new().with_request_hook(|headers| {
            headers.insert("Authorization".to_string(), "Bearer t".to_string());
        });
        let mut headers = Headers::new();
        (config.request_hook.as_ref().unwrap())(&mut headers);
        assert_eq!(headers.get("Authorization").map(String::as_str), Some("Bearer t"));
        assert!(format!("{:?}", config).contains("request_hook: true"));
    }
}
