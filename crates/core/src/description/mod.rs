//! Declarative descriptions of what tiles, units, and symbols look like.
//!
//! The `Initial*` types are payloads: they travel inside messages, use
//! integer colors on the 0-255 scale, and are consumed once by a presenter.
//! The `*Description` types are what a presenter actually draws from, after
//! the payload has been resolved against the [Pattern](crate::pattern::Pattern)
//! and its colors converted to floats.

mod symbol;
mod tile;
mod unit;

pub use self::{
    symbol::{
        InitialSymbol, InitialSymbolGlyph, InitialSymbolOutline,
        InitialSymbolSides, OutlineMode, SymbolDescription,
    },
    tile::{InitialTile, TileDescription},
    unit::{InitialUnit, UnitDescription},
};
use fnv::FnvHashSet;

/// Find the first id that appears more than once in a list of id/symbol
/// pairs. Tile items and unit details both need unique ids.
pub(crate) fn find_duplicate_id(pairs: &[(u64, InitialSymbol)]) -> Option<u64> {
    let mut seen = FnvHashSet::default();
    pairs.iter().map(|(id, _)| *id).find(|id| !seen.insert(*id))
}

fn describe_all(
    pairs: &[(u64, InitialSymbol)],
) -> Vec<(u64, SymbolDescription)> {
    pairs
        .iter()
        .map(|(id, symbol)| (*id, symbol.describe()))
        .collect()
}
