//! Upstream access for the download pass: retry policy, bounded fetching,
//! the catalog API client, candidate resolution and the orchestrator that
//! ties them to the artifact writer.

pub mod backoff;
pub mod client;
pub mod download;
pub mod error;
pub mod fetcher;
pub mod resolver;
pub mod transport;
pub mod types;

pub use backoff::{BackoffPolicy, RetryHint, RetryKind, parse_retry_after};
pub use client::PokeApiClient;
pub use download::{
    CANCELLED, CancellationFlag, DownloadEvent, DownloadOptions, DownloadReport, run_download,
};
pub use error::{DownloadError, EntityError, FetchError, ResolveError, TransportError};
pub use fetcher::Fetcher;
pub use resolver::{AssetResolver, CandidatePause, ResolvedAsset};
pub use transport::{HttpResponse, ReqwestTransport, Transport};
pub use types::{ListPage, NamedResource, PokemonDetail};
