//! Lazily resolves an entry's evolution chain into an ordered stage list.

use pokedex_catalog::{ChainLink, ClientTrait, PokemonDetail};
use tracing::{debug, instrument};

/// Outcome of resolving one entry's evolution chain.
///
/// Evolution data is decorative, so nothing here is an error: every failure
/// at the species or chain level degrades to [`ChainResolution::NoChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainResolution {
    /// Root-first stages, one per chain node whose detail fetch succeeded.
    Resolved(Vec<PokemonDetail>),
    /// The species is unreachable or carries no chain reference.
    NoChain,
}

/// Resolves evolution chains on demand, independently of pagination.
///
/// The walk is inherently sequential: each node is only known after fetching
/// its parent, so resolution latency scales with chain depth.
pub struct EvolutionResolver<C> {
    client: C,
    displayed: Option<Vec<PokemonDetail>>,
}

impl<C: ClientTrait> EvolutionResolver<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            displayed: None,
        }
    }

    /// The most recently resolved chain, if any.
    pub fn displayed(&self) -> Option<&[PokemonDetail]> {
        self.displayed.as_deref()
    }

    /// Follow `entry`'s species link to its chain URL.
    ///
    /// Any failure, and a species without a chain reference, yield `None`.
    async fn chain_url(&self, entry: &PokemonDetail) -> Option<String> {
        let species = match self.client.species(&entry.species_url).await {
            Ok(species) => species,
            Err(err) => {
                debug!(species_url = %entry.species_url, %err, "species fetch failed, treating as no chain");
                return None;
            },
        };
        species.evolution_chain.map(|reference| reference.url)
    }

    /// Resolve `entry` into its ordered evolution stages.
    #[instrument(skip_all, fields(name = %entry.name))]
    pub async fn resolve(&self, entry: &PokemonDetail) -> ChainResolution {
        let Some(url) = self.chain_url(entry).await else {
            return ChainResolution::NoChain;
        };
        let root = match self.client.evolution_chain(&url).await {
            Ok(resource) => resource.chain,
            Err(err) => {
                debug!(chain_url = %url, %err, "chain fetch failed, treating as no chain");
                return ChainResolution::NoChain;
            },
        };
        ChainResolution::Resolved(self.linearize(root).await)
    }

    /// Walk the chain tree root-first, following only the first child at
    /// each branch; alternate evolutions are ignored.
    ///
    /// A node whose detail fetch fails is skipped rather than aborting the
    /// walk, so the result may be shorter than the chain depth.
    async fn linearize(&self, root: ChainLink) -> Vec<PokemonDetail> {
        let mut stages = Vec::new();
        let mut node = Some(root);
        while let Some(link) = node {
            match self.client.pokemon(&link.species.name).await {
                Ok(detail) => stages.push(detail),
                Err(err) => {
                    debug!(species = %link.species.name, %err, "skipping unresolvable chain stage")
                },
            }
            node = link.evolves_to.into_iter().next();
        }
        stages
    }

    /// Resolve `entry` and make the result the displayed chain.
    ///
    /// When resolution yields no chain, whatever was displayed before stays
    /// in place rather than being cleared.
    pub async fn resolve_and_display(
        &mut self,
        entry: &PokemonDetail,
    ) -> Option<&[PokemonDetail]> {
        if let ChainResolution::Resolved(stages) = self.resolve(entry).await {
            self.displayed = Some(stages);
        }
        self.displayed.as_deref()
    }
}
