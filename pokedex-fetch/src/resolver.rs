//! Pick the first image URL that actually downloads.

use tokio::time::Duration;

use pokedex_core::{EntityDescriptor, FetchedAsset};
use pokedex_lib::sniff_mime;

use crate::backoff::jitter;
use crate::client::PokeApiClient;
use crate::error::{FetchError, ResolveError};
use crate::transport::Transport;

/// Pause between a failed candidate and the next one.
#[derive(Debug, Clone, Copy)]
pub struct CandidatePause {
    pub base: Duration,
    pub jitter: Duration,
}

impl Default for CandidatePause {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(200),
            jitter: Duration::from_millis(200),
        }
    }
}

impl CandidatePause {
    pub fn none() -> Self {
        Self {
            base: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }
}

/// An entity with the bytes of its first working image.
#[derive(Debug, Clone)]
pub struct ResolvedAsset {
    pub descriptor: EntityDescriptor,
    pub source_url: String,
    pub asset: FetchedAsset,
}

pub struct AssetResolver<T> {
    client: PokeApiClient<T>,
    pause: CandidatePause,
}

impl<T: Transport> AssetResolver<T> {
    pub fn new(client: PokeApiClient<T>) -> Self {
        Self {
            client,
            pause: CandidatePause::default(),
        }
    }

    pub fn with_pause(mut self, pause: CandidatePause) -> Self {
        self.pause = pause;
        self
    }

    pub fn client(&self) -> &PokeApiClient<T> {
        &self.client
    }

    /// Fetch the detail record for `id` and turn it into a descriptor.
    pub async fn describe(&self, id: u32) -> Result<EntityDescriptor, ResolveError> {
        let detail = self
            .client
            .detail(id)
            .await
            .map_err(|source| ResolveError::Detail { id, source })?;

        Ok(EntityDescriptor {
            id: detail.id,
            source_candidates: detail.image_candidates(),
            types: detail.type_names(),
            name: detail.name,
        })
    }

    /// Describe `id`, then download its first working candidate.
    pub async fn resolve(&self, id: u32) -> Result<ResolvedAsset, ResolveError> {
        let descriptor = self.describe(id).await?;
        self.fetch_first(descriptor).await
    }

    /// Try candidates in order and stop at the first success. Later
    /// candidates are never requested once one succeeds.
    pub async fn fetch_first(
        &self,
        descriptor: EntityDescriptor,
    ) -> Result<ResolvedAsset, ResolveError> {
        let total = descriptor.source_candidates.len();
        if total == 0 {
            return Err(ResolveError::NoCandidates {
                id: descriptor.id,
                name: descriptor.name,
            });
        }

        let candidates = descriptor.source_candidates.clone();
        let mut last_error: Option<FetchError> = None;
        for (i, url) in candidates.into_iter().enumerate() {
            match self.client.fetcher().fetch(&url).await {
                Ok(bytes) => {
                    let (mime, _) = sniff_mime(&bytes);
                    log::debug!(
                        "#{} {}: got {} bytes ({}) from {}",
                        descriptor.id,
                        descriptor.name,
                        bytes.len(),
                        mime,
                        url
                    );
                    return Ok(ResolvedAsset {
                        asset: FetchedAsset::new(bytes, mime),
                        source_url: url,
                        descriptor,
                    });
                }
                Err(e) => {
                    log::warn!(
                        "#{} {}: candidate {}/{} failed: {}",
                        descriptor.id,
                        descriptor.name,
                        i + 1,
                        total,
                        e
                    );
                    last_error = Some(e);
                    if i + 1 < total {
                        let wait = self.pause.base + jitter(self.pause.jitter);
                        if !wait.is_zero() {
                            tokio::time::sleep(wait).await;
                        }
                    }
                }
            }
        }

        Err(ResolveError::Exhausted {
            id: descriptor.id,
            tried: total,
            last_error: last_error.unwrap_or(FetchError::Closed),
        })
    }
}
