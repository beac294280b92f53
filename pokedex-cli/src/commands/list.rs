use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use pokedex_core::Config;
use pokedex_fetch::{BackoffPolicy, Fetcher, NamedResource, PokeApiClient, ReqwestTransport};

use crate::error::CliError;

/// List entity names from the API, one page or all of them.
pub(crate) fn run_list(
    config: &Config,
    limit: u32,
    offset: u32,
    all: bool,
    base_url: Option<String>,
) -> Result<(), CliError> {
    if limit == 0 {
        return Err(CliError::invalid_args("--limit must be at least 1"));
    }
    let mut fetch = config.fetch.clone();
    if let Some(url) = base_url {
        fetch.base_url = url;
    }

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {}", e)))?;

    let fetcher = Fetcher::new(
        ReqwestTransport::new(&fetch)?,
        fetch.concurrency,
        BackoffPolicy::from_settings(&fetch),
    );
    let client = PokeApiClient::new(fetcher, fetch.base_url.as_str());

    let (count, results) = rt.block_on(async {
        if all {
            let results = client.list_all(fetch.list_page_size).await?;
            Ok::<_, CliError>((results.len() as u32, results))
        } else {
            let page = client.list_page(limit, offset).await?;
            Ok((page.count, page.results))
        }
    })?;

    for resource in &results {
        let id = resource_id(resource)
            .map(|id| format!("#{:>4}", id))
            .unwrap_or_else(|| "    -".to_string());
        log::info!(
            "  {} {}",
            id.if_supports_color(Stdout, |t| t.dimmed()),
            resource.name
        );
    }
    log::info!("");
    log::info!(
        "{} of {} shown",
        results.len().if_supports_color(Stdout, |t| t.bold()),
        count
    );
    Ok(())
}

/// Numeric id from a resource URL like `.../pokemon/25/`.
fn resource_id(resource: &NamedResource) -> Option<u32> {
    resource
        .url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_comes_from_last_path_segment() {
        let r = NamedResource {
            name: "pikachu".into(),
            url: "https://pokeapi.co/api/v2/pokemon/25/".into(),
        };
        assert_eq!(resource_id(&r), Some(25));

        let r = NamedResource {
            name: "odd".into(),
            url: "https://pokeapi.co/api/v2/pokemon/odd".into(),
        };
        assert_eq!(resource_id(&r), None);
    }
}
