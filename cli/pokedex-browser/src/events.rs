//! Signals emitted to the rendering layer.

use pokedex_catalog::PokemonDetail;

/// A broadcast signal describing the outcome of a paginated load.
///
/// Searches never emit events; they mutate the working set silently (the
/// empty-query case delegates to the paginated load and therefore does emit).
#[derive(Debug, Clone)]
pub enum CatalogEvent {
    /// The working set was replaced with a freshly loaded page.
    Loaded {
        entries: Vec<PokemonDetail>,
        total: u64,
    },
    /// The page load failed; the previous working set is still in place.
    LoadFailed { error: String },
}
