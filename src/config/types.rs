use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Substrings that mark placeholder or tracking addresses
pub const DEFAULT_DENYLIST: &[&str] = &[
    "example",
    "test",
    "domain",
    "email",
    "@sentry",
    "wixpress",
    "automattic",
];

/// Main configuration structure for the email crawler
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub http: HttpConfig,
    pub retry: RetryConfig,
    pub checkpoint: CheckpointConfig,
    pub scrapability: ScrapabilityConfig,
    pub filter: FilterConfig,
}

/// HTTP client configuration shared by every fetching component
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    /// Total time allowed for one request (seconds)
    pub timeout_secs: u64,

    /// Time allowed to establish a connection (seconds), capped at
    /// `timeout_secs`
    pub connect_timeout_secs: u64,

    /// Whether TLS certificates are verified
    pub verify_tls: bool,

    /// User agent sent with every request
    pub user_agent: String,

    /// Redirects followed before a request is abandoned
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            connect_timeout_secs: 5,
            verify_tls: true,
            user_agent: "*".to_string(),
            max_redirects: 30,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Effective connect timeout, never longer than the request timeout
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.min(self.timeout_secs))
    }
}

/// Retry behavior for connection-class failures
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Fixed delay between attempts (milliseconds)
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 1000,
        }
    }
}

impl RetryConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

/// Which durable format checkpoints are written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointBackend {
    /// Single SQLite database
    Sqlite,
    /// Three JSON files
    Json,
}

/// Checkpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CheckpointConfig {
    pub backend: CheckpointBackend,

    /// Directory the checkpoint artifacts are written to
    pub directory: String,

    /// Number of origins processed between checkpoints
    pub interval: usize,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            backend: CheckpointBackend::Sqlite,
            directory: ".".to_string(),
            interval: 100,
        }
    }
}

impl CheckpointConfig {
    pub fn directory(&self) -> &Path {
        Path::new(&self.directory)
    }

    /// Path of the SQLite checkpoint database
    pub fn database_path(&self) -> PathBuf {
        self.directory().join("checkpoint.db")
    }
}

/// Batch scrapability checker configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScrapabilityConfig {
    /// Worker count; defaults to the available hardware parallelism
    pub workers: Option<usize>,

    /// Time a single check may run before it is recorded as timed out (seconds)
    pub task_timeout_secs: u64,

    /// User agent matched against robots.txt groups
    pub robots_user_agent: String,
}

impl Default for ScrapabilityConfig {
    fn default() -> Self {
        Self {
            workers: None,
            task_timeout_secs: 30,
            robots_user_agent: "*".to_string(),
        }
    }
}

impl ScrapabilityConfig {
    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }

    /// Resolves the worker count, falling back to hardware parallelism
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

/// Post-processing filter for aggregated emails
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FilterConfig {
    /// An email containing any of these substrings is dropped
    pub denylist: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            denylist: DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}
