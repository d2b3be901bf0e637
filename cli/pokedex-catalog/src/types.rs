//! Catalog interaction types.
//!
//! The `wire` module mirrors the JSON the catalog actually returns; the
//! public types are the domain model consumers work with, converted via
//! `From` impls so the nesting quirks of the API stay in one place.

use serde::{Deserialize, Serialize};

/// A named link to a full resource, as returned by listing calls.
///
/// Exists only to drive a follow-up detail fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

/// One listing page plus the catalog-wide total count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonPage {
    pub count: u64,
    pub results: Vec<NamedResource>,
}

/// A bare link to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub url: String,
}

/// Species metadata; only the chain link matters to this crate.
///
/// A species legitimately may carry no `evolution_chain` reference, so the
/// field is optional rather than a decode error.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeciesResource {
    pub evolution_chain: Option<ResourceRef>,
}

/// The chain resource: a tree of species names rooted at the base form.
#[derive(Debug, Clone, Deserialize)]
pub struct EvolutionChainResource {
    pub chain: ChainLink,
}

/// One node of the evolution tree.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainLink {
    pub species: NamedResource,
    #[serde(default)]
    pub evolves_to: Vec<ChainLink>,
}

/// A fully resolved catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonDetail {
    pub id: u64,
    pub name: String,
    pub weight: u32,
    pub height: u32,
    /// Type names in the order the catalog returns them.
    pub types: Vec<String>,
    pub sprite_url: Option<String>,
    pub species_url: String,
}

impl From<wire::Pokemon> for PokemonDetail {
    fn from(raw: wire::Pokemon) -> Self {
        let sprite_url = raw
            .sprites
            .other
            .and_then(|other| other.dream_world)
            .and_then(|set| set.front_default)
            .or(raw.sprites.front_default);
        Self {
            id: raw.id,
            name: raw.name,
            weight: raw.weight,
            height: raw.height,
            types: raw.types.into_iter().map(|slot| slot.type_.name).collect(),
            sprite_url,
            species_url: raw.species.url,
        }
    }
}

pub(crate) mod wire {
    use serde::Deserialize;

    use super::NamedResource;

    /// The detail resource as the catalog returns it.
    #[derive(Debug, Deserialize)]
    pub struct Pokemon {
        pub id: u64,
        pub name: String,
        pub weight: u32,
        pub height: u32,
        #[serde(default)]
        pub types: Vec<TypeSlot>,
        pub sprites: Sprites,
        pub species: NamedResource,
    }

    #[derive(Debug, Deserialize)]
    pub struct TypeSlot {
        #[serde(rename = "type")]
        pub type_: TypeRef,
    }

    #[derive(Debug, Deserialize)]
    pub struct TypeRef {
        pub name: String,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct Sprites {
        pub front_default: Option<String>,
        pub other: Option<OtherSprites>,
    }

    #[derive(Debug, Deserialize)]
    pub struct OtherSprites {
        pub dream_world: Option<SpriteSet>,
    }

    #[derive(Debug, Deserialize)]
    pub struct SpriteSet {
        pub front_default: Option<String>,
    }
}
