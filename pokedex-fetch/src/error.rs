use pokedex_lib::WriteError;

/// Failure reported by a [`Transport`](crate::transport::Transport) before any
/// HTTP status was received (DNS, connect, TLS, timeout, truncated body).
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub timed_out: bool,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: true,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        Self {
            timed_out: e.is_timeout(),
            message: e.to_string(),
        }
    }
}

/// Terminal outcome of a single URL fetch, after retries.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error fetching {url} (gave up after {attempts} attempts): {source}")]
    Transient {
        url: String,
        attempts: u32,
        source: TransportError,
    },

    #[error("Rate limited fetching {url} (gave up after {attempts} attempts)")]
    RateLimited { url: String, attempts: u32 },

    #[error("HTTP {status} fetching {url}")]
    Status { status: u16, url: String },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("HTTP client setup failed: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Fetcher was shut down")]
    Closed,
}

impl FetchError {
    /// HTTP status for terminal status errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure to obtain any image for an entity.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Failed to fetch details for #{id}: {source}")]
    Detail { id: u32, source: FetchError },

    #[error("No image candidates for #{id} {name}")]
    NoCandidates { id: u32, name: String },

    #[error("All {tried} image candidates failed for #{id}: {last_error}")]
    Exhausted {
        id: u32,
        tried: usize,
        last_error: FetchError,
    },
}

/// Per-entity failure inside the download pass. Recorded in the run summary,
/// never propagated to the run.
#[derive(Debug, thiserror::Error)]
pub enum EntityError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Failed to save artifacts: {0}")]
    Write(#[from] WriteError),

    #[error("Processing task failed: {0}")]
    Task(String),
}

/// Fatal setup errors for the download pass.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("Invalid id range {start}..={end} (ids start at 1 and start must not exceed end)")]
    InvalidRange { start: u32, end: u32 },

    #[error("Concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("Output directory setup failed: {0}")]
    Setup(#[from] WriteError),
}
