//! View-model core for the catalog browser UI.
//!
//! Two cooperating components, both generic over the transport seam
//! ([`pokedex_catalog::ClientTrait`]):
//!
//! - [`CatalogBrowser`] owns the pagination and search state and produces the
//!   currently visible working set of detail entries. The rendering layer
//!   subscribes to [`CatalogEvent`]s; it is the only thing that needs to know
//!   about a UI framework, and it stays outside this crate.
//! - [`EvolutionResolver`] turns one entry into the ordered list of its
//!   evolutionary stages by following species and chain links.
//!
//! Neither component retries, caches, or cancels anything: each operation is
//! a plain awaited sequence of fetches, and all mutating operations take
//! `&mut self`, so overlapping page changes and searches cannot race.

mod browser;
mod events;
mod evolution;

pub use browser::{CatalogBrowser, PREFIX_SCAN_LIMIT};
pub use events::CatalogEvent;
pub use evolution::{ChainResolution, EvolutionResolver};
