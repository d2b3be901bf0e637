//! Shared HTTP client infrastructure for the public creature-catalog API.
//!
//! This crate provides:
//! - HTTP client construction from a [`CatalogClientConfig`]
//! - Wire and domain types for listing, detail, species and chain resources
//! - Common error handling for catalog API operations
//! - The [`ClientTrait`] seam that consumers depend on, so the transport can
//!   be substituted per test without mutating process-wide state
//!
//! ## Usage
//!
//! ```ignore
//! use pokedex_catalog::{CatalogClientConfig, PokeApiClient};
//!
//! let config = CatalogClientConfig::default();
//! let client = PokeApiClient::new(config)?;
//! let page = client.page(limit, 0).await?;
//! ```

mod client;
mod config;
mod error;
mod types;

pub use client::{ClientTrait, PokeApiClient};
pub use config::CatalogClientConfig;
pub use error::CatalogClientError;
pub use types::{
    ChainLink,
    EvolutionChainResource,
    NamedResource,
    PokemonDetail,
    PokemonPage,
    ResourceRef,
    SpeciesResource,
};
