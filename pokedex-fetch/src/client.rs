use crate::error::FetchError;
use crate::fetcher::Fetcher;
use crate::transport::Transport;
use crate::types::{ListPage, NamedResource, PokemonDetail};

/// Typed access to the upstream catalog API.
pub struct PokeApiClient<T> {
    fetcher: Fetcher<T>,
    base_url: String,
}

impl<T: Transport> PokeApiClient<T> {
    pub fn new(fetcher: Fetcher<T>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn fetcher(&self) -> &Fetcher<T> {
        &self.fetcher
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn detail_url(&self, id: u32) -> String {
        format!("{}/pokemon/{}/", self.base_url, id)
    }

    pub fn list_url(&self, limit: u32, offset: u32) -> String {
        format!("{}/pokemon?limit={}&offset={}", self.base_url, limit, offset)
    }

    pub async fn detail(&self, id: u32) -> Result<PokemonDetail, FetchError> {
        self.fetcher.fetch_json(&self.detail_url(id)).await
    }

    pub async fn list_page(&self, limit: u32, offset: u32) -> Result<ListPage, FetchError> {
        self.fetcher.fetch_json(&self.list_url(limit, offset)).await
    }

    /// Every entry, following `next` links until the last page.
    pub async fn list_all(&self, page_size: u32) -> Result<Vec<NamedResource>, FetchError> {
        let first = self.list_page(page_size.max(1), 0).await?;
        let mut out = Vec::with_capacity(first.count as usize);
        out.extend(first.results);
        let mut next = first.next;

        while let Some(url) = next {
            let page: ListPage = self.fetcher.fetch_json(&url).await?;
            if page.results.is_empty() {
                break;
            }
            out.extend(page.results);
            next = page.next;
        }

        log::debug!("Listed {} entries from {}", out.len(), self.base_url);
        Ok(out)
    }
}
