//! Catalog client wrapper around a plain reqwest client.

use std::fmt::Debug;
use std::num::NonZeroU32;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::CatalogClientConfig;
use crate::error::CatalogClientError;
use crate::types::{wire, EvolutionChainResource, PokemonDetail, PokemonPage, SpeciesResource};

/// The complete catalog API interface.
///
/// This trait is the seam between the view-model core and the transport:
/// consumers hold a `C: ClientTrait` so tests can point the real client at a
/// mock server (or substitute another implementation) instead of patching
/// process-wide state.
///
/// These are the only request shapes the core ever issues; species and chain
/// resources are always reached by following URLs the catalog handed out.
#[allow(async_fn_in_trait)]
pub trait ClientTrait {
    /// Fetch one listing page: `GET {base}/pokemon?limit={limit}&offset={offset}`.
    async fn page(&self, limit: NonZeroU32, offset: u64)
        -> Result<PokemonPage, CatalogClientError>;

    /// Fetch a detail entry by id or name: `GET {base}/pokemon/{id_or_name}`.
    async fn pokemon(&self, id_or_name: &str) -> Result<PokemonDetail, CatalogClientError>;

    /// Fetch a detail entry by following a listing URL verbatim.
    async fn pokemon_by_url(&self, url: &str) -> Result<PokemonDetail, CatalogClientError>;

    /// Fetch a species resource by following a detail's species URL.
    async fn species(&self, url: &str) -> Result<SpeciesResource, CatalogClientError>;

    /// Fetch an evolution chain by following a species' chain URL.
    async fn evolution_chain(
        &self,
        url: &str,
    ) -> Result<EvolutionChainResource, CatalogClientError>;
}

/// A client for the catalog service.
///
/// Thin wrapper around `reqwest::Client`; cheap to clone, so each consumer
/// can own its own handle.
#[derive(Clone)]
pub struct PokeApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl Debug for PokeApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PokeApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl PokeApiClient {
    /// Create a new catalog client from configuration.
    ///
    /// No timeouts are applied; failures are only ever detected via a
    /// transport error or a non-success status.
    pub fn new(config: CatalogClientConfig) -> Result<Self, CatalogClientError> {
        let mut base_url =
            Url::parse(&config.base_url).map_err(CatalogClientError::InvalidUrl)?;
        // Url::join drops the last path segment unless the base ends in '/'.
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(ref user_agent) = config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let http = builder.build().map_err(CatalogClientError::Build)?;

        debug!(base_url = %base_url, "built catalog HTTP client");

        Ok(Self { http, base_url })
    }

    /// Get the configured catalog base URL.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogClientError> {
        self.base_url
            .join(path)
            .map_err(CatalogClientError::InvalidUrl)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogClientError> {
        debug!(url = %url, "fetching catalog resource");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(CatalogClientError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogClientError::Http { status });
        }
        response.json().await.map_err(CatalogClientError::Decode)
    }

    async fn get_json_at<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogClientError> {
        let url = Url::parse(url).map_err(CatalogClientError::InvalidUrl)?;
        self.get_json(url).await
    }
}

impl ClientTrait for PokeApiClient {
    #[instrument(skip_all, fields(limit = %limit, offset = offset))]
    async fn page(
        &self,
        limit: NonZeroU32,
        offset: u64,
    ) -> Result<PokemonPage, CatalogClientError> {
        let mut url = self.endpoint("pokemon")?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        let page: PokemonPage = self.get_json(url).await?;
        debug!(
            count = page.count,
            on_page = page.results.len(),
            "received listing page"
        );
        Ok(page)
    }

    #[instrument(skip_all, fields(id_or_name = %id_or_name))]
    async fn pokemon(&self, id_or_name: &str) -> Result<PokemonDetail, CatalogClientError> {
        let url = self.endpoint(&format!("pokemon/{id_or_name}"))?;
        let raw: wire::Pokemon = self.get_json(url).await?;
        Ok(raw.into())
    }

    async fn pokemon_by_url(&self, url: &str) -> Result<PokemonDetail, CatalogClientError> {
        let raw: wire::Pokemon = self.get_json_at(url).await?;
        Ok(raw.into())
    }

    async fn species(&self, url: &str) -> Result<SpeciesResource, CatalogClientError> {
        self.get_json_at(url).await
    }

    async fn evolution_chain(
        &self,
        url: &str,
    ) -> Result<EvolutionChainResource, CatalogClientError> {
        self.get_json_at(url).await
    }
}
