//! Email Crawler: finds contact addresses on organization websites
//!
//! This crate checks robots.txt policy for a list of organization websites,
//! fetches each homepage and its "contact"/"about" pages, extracts email
//! addresses from the page text and aggregates them back per organization,
//! checkpointing progress so long runs survive interruption.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod state;
pub mod storage;
pub mod table;
pub mod url;

use thiserror::Error;

/// Main error type for crawler operations
///
/// Only input, configuration and storage problems surface here. Failures
/// while fetching an individual URL are recorded as sentinel values instead.
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::OriginState,
        to: state::OriginState,
    },

    #[error("Failed to write output table: {0}")]
    Output(#[from] OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Aborted: {0}")]
    Aborted(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Empty URL")]
    Empty,
}

/// Errors raised while reading the input table
#[derive(Debug, Error)]
pub enum InputError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Unsupported file format, please provide a .csv or .xlsx file: {0}")]
    UnsupportedFormat(String),

    #[error("Error parsing the file {path}: {source}")]
    Parse { path: String, source: csv::Error },

    #[error("Error reading the workbook {path}: {message}")]
    Workbook { path: String, message: String },

    #[error("The file must contain a '{0}' column")]
    MissingColumn(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while writing the output table
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Unsupported output format, please use a .csv or .xlsx path: {0}")]
    UnsupportedFormat(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Table does not fit in a worksheet: {0}")]
    TooLarge(String),
}

/// Broad class of a failed network request
///
/// Retry policies decide what to retry by kind, never by message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Connection refused, reset, or name resolution failure
    Connect,
    /// The connection was not established within the connect timeout
    ConnectTimeout,
    /// The request did not complete within the client timeout
    Timeout,
    /// TLS handshake or certificate failure
    Tls,
    /// The URL could not be parsed or used for a request
    Malformed,
    /// Redirect loop or redirect limit exceeded
    Redirect,
    /// Anything else (body decoding, protocol errors)
    Other,
}

/// A classified failure of one HTTP request
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Connect timeout for {url}")]
    ConnectTimeout { url: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("TLS failure for {url}: {message}")]
    Tls { url: String, message: String },

    #[error("Malformed URL {url}: {message}")]
    Malformed { url: String, message: String },

    #[error("Too many redirects from {url}")]
    RedirectLimit { url: String },

    #[error("HTTP error for {url}: {message}")]
    Other { url: String, message: String },
}

impl FetchError {
    /// Returns the failure class of this error
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Connect { .. } => FailureKind::Connect,
            Self::ConnectTimeout { .. } => FailureKind::ConnectTimeout,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::Tls { .. } => FailureKind::Tls,
            Self::Malformed { .. } => FailureKind::Malformed,
            Self::RedirectLimit { .. } => FailureKind::Redirect,
            Self::Other { .. } => FailureKind::Other,
        }
    }

    /// Returns the URL the failed request was sent to
    pub fn url(&self) -> &str {
        match self {
            Self::Connect { url, .. }
            | Self::ConnectTimeout { url }
            | Self::Timeout { url }
            | Self::Tls { url, .. }
            | Self::Malformed { url, .. }
            | Self::RedirectLimit { url }
            | Self::Other { url, .. } => url,
        }
    }
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, EmailExtractor, EmailSet, PageFetcher};
pub use robots::{ScrapabilityChecker, ScrapeDecision};
pub use state::{ExtractionRecord, OriginMapping, OriginState};
pub use url::{normalize_origin, Origin};
