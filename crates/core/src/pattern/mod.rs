//! Repeating tiling patterns.
//!
//! A [Pattern] describes a group of tiles that repeats across the plane. Each
//! tile in the group has a shape (a corner polygon), a translation within the
//! group, and tables describing which tiles touch each of its sides and
//! corners. Those tables are **group-relative**: a neighbor is identified by
//! an offset in group coordinates plus an index within that group, so the
//! same table works for every repetition of the group.
//!
//! ## Conventions
//!
//! - Side `i` of a tile runs from corner `i` to corner `i + 1` (wrapping), so
//!   a tile has exactly as many sides as corners.
//! - Positions are integers in a caller-defined fixed-point scale. The tile
//!   center of `Location(gx, gy, i)` is `translate(i) + gx * x_offset + gy *
//!   y_offset`, which is exact.
//! - Rotations are in "radianards", thousandths of a radian, to keep the wire
//!   format integral.
//!
//! Patterns are immutable once built, and validated on construction. There is
//! no useful degraded mode for an inconsistent pattern, so any bad reference
//! or asymmetric adjacency is rejected outright.

mod location;
pub mod presets;

pub use self::location::Location;
use crate::geometry::Vec2;
use log::info;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, convert::TryFrom};
use thiserror::Error;

/// Reference to the tile across one side of a pattern tile
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SideAdjacency {
    pub group_relative_x: i32,
    pub group_relative_y: i32,
    pub tile_index: usize,
    /// The side of the neighbor that we share
    pub side_index: usize,
}

/// Reference to one other tile that shares a corner with a pattern tile
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CornerAdjacency {
    pub group_relative_x: i32,
    pub group_relative_y: i32,
    pub tile_index: usize,
    /// The corner of the neighbor that coincides with ours
    pub corner_index: usize,
}

/// One slot in the repeating group
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternTile {
    pub shape_index: usize,
    pub rotate_radianards: i32,
    pub translate: Vec2,
    pub side_index_to_side_adjacencies: Vec<SideAdjacency>,
    pub corner_index_to_corner_adjacencies: Vec<Vec<CornerAdjacency>>,
}

/// Unvalidated pattern data, exactly as it appears on the wire. Convert to a
/// [Pattern] with [Pattern::new] (or `TryFrom`) to use it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDefinition {
    pub name: String,
    pub shape_index_to_corners: Vec<Vec<Vec2>>,
    pub pattern_tiles: Vec<PatternTile>,
    pub x_offset: Vec2,
    pub y_offset: Vec2,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern has no shapes")]
    NoShapes,
    #[error("pattern has no tiles")]
    NoTiles,
    #[error("shape {shape} has {corners} corners, need at least 3")]
    DegenerateShape { shape: usize, corners: usize },
    #[error("tile {tile} references unknown shape {shape}")]
    UnknownShape { tile: usize, shape: usize },
    #[error(
        "tile {tile} has {actual} {table} adjacency entries, \
        but its shape has {expected} corners"
    )]
    TableLengthMismatch {
        tile: usize,
        table: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error(
        "tile {tile} references tile {target}, but the pattern only has \
        {count} tiles"
    )]
    TileIndexOutOfRange {
        tile: usize,
        target: usize,
        count: usize,
    },
    #[error(
        "tile {tile} references side {side} of tile {target}, which only has \
        {sides} sides"
    )]
    SideIndexOutOfRange {
        tile: usize,
        target: usize,
        side: usize,
        sides: usize,
    },
    #[error(
        "tile {tile} references corner {corner} of tile {target}, which only \
        has {corners} corners"
    )]
    CornerIndexOutOfRange {
        tile: usize,
        target: usize,
        corner: usize,
        corners: usize,
    },
    #[error(
        "side {side} of tile {tile} leads to side {target_side} of tile \
        {target}, which doesn't lead back"
    )]
    AsymmetricSide {
        tile: usize,
        side: usize,
        target: usize,
        target_side: usize,
    },
    #[error(
        "corner {corner} of tile {tile} lists corner {target_corner} of tile \
        {target}, which doesn't list it back"
    )]
    AsymmetricCorner {
        tile: usize,
        corner: usize,
        target: usize,
        target_corner: usize,
    },
    #[error("location {location} is outside a pattern of {count} tiles")]
    LocationOutOfRange { location: Location, count: usize },
    #[error("tile at {location} has no side {side}")]
    NoSuchSide { location: Location, side: usize },
    #[error("coordinates near {location} don't fit in 32 bits")]
    CoordinateOverflow { location: Location },
}

/// A validated tiling pattern. See the module docs for the conventions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PatternDefinition", into = "PatternDefinition")]
pub struct Pattern {
    definition: PatternDefinition,
}

impl Pattern {
    /// Validate a definition and build a pattern from it
    pub fn new(definition: PatternDefinition) -> Result<Self, PatternError> {
        validate_references(&definition)?;
        validate_symmetry(&definition)?;
        info!(
            "Loaded pattern {:?} with {} shapes and {} tiles",
            definition.name,
            definition.shape_index_to_corners.len(),
            definition.pattern_tiles.len()
        );
        Ok(Self { definition })
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn x_offset(&self) -> Vec2 {
        self.definition.x_offset
    }

    pub fn y_offset(&self) -> Vec2 {
        self.definition.y_offset
    }

    /// Number of tiles in one repetition of the group
    pub fn tile_count(&self) -> usize {
        self.definition.pattern_tiles.len()
    }

    pub fn tiles(&self) -> &[PatternTile] {
        &self.definition.pattern_tiles
    }

    pub fn shape_count(&self) -> usize {
        self.definition.shape_index_to_corners.len()
    }

    /// Get the corner polygon for a shape, relative to the tile center and
    /// before rotation
    pub fn shape_corners(&self, shape_index: usize) -> Option<&[Vec2]> {
        self.definition
            .shape_index_to_corners
            .get(shape_index)
            .map(Vec::as_slice)
    }

    pub fn definition(&self) -> &PatternDefinition {
        &self.definition
    }

    /// Get the pattern tile for the slot a location refers to
    pub fn tile(
        &self,
        location: Location,
    ) -> Result<&PatternTile, PatternError> {
        self.definition
            .pattern_tiles
            .get(location.index_in_group())
            .ok_or(PatternError::LocationOutOfRange {
                location,
                count: self.tile_count(),
            })
    }

    pub fn tile_shape_index(
        &self,
        location: Location,
    ) -> Result<usize, PatternError> {
        Ok(self.tile(location)?.shape_index)
    }

    /// Rotation of a tile's shape, converted from radianards to radians
    pub fn tile_rotation_radians(
        &self,
        location: Location,
    ) -> Result<f64, PatternError> {
        Ok(f64::from(self.tile(location)?.rotate_radianards) / 1000.0)
    }

    /// Planar position of a tile's center
    pub fn tile_center(
        &self,
        location: Location,
    ) -> Result<Vec2, PatternError> {
        let tile = self.tile(location)?;
        let def = &self.definition;
        def.x_offset
            .checked_scale(location.group_x())
            .zip(def.y_offset.checked_scale(location.group_y()))
            .and_then(|(x, y)| tile.translate.checked_add(x)?.checked_add(y))
            .ok_or(PatternError::CoordinateOverflow { location })
    }

    /// Get the tile across one side of a tile, along with the index of the
    /// side on the neighbor that leads back to us
    pub fn side_neighbor(
        &self,
        location: Location,
        side: usize,
    ) -> Result<(Location, usize), PatternError> {
        let adjacency = self
            .tile(location)?
            .side_index_to_side_adjacencies
            .get(side)
            .ok_or(PatternError::NoSuchSide { location, side })?;
        let neighbor = resolve(
            location,
            adjacency.group_relative_x,
            adjacency.group_relative_y,
            adjacency.tile_index,
        )?;
        Ok((neighbor, adjacency.side_index))
    }

    /// Get every tile that touches the given one. Tiles sharing a side are
    /// always included; with `include_diagonal`, tiles that only share a
    /// corner are included too. The tile itself is never in the output.
    pub fn adjacent_locations(
        &self,
        location: Location,
        include_diagonal: bool,
    ) -> Result<BTreeSet<Location>, PatternError> {
        let tile = self.tile(location)?;
        let mut adjacents = tile
            .side_index_to_side_adjacencies
            .iter()
            .map(|adj| {
                resolve(
                    location,
                    adj.group_relative_x,
                    adj.group_relative_y,
                    adj.tile_index,
                )
            })
            .collect::<Result<BTreeSet<Location>, PatternError>>()?;
        if include_diagonal {
            for adj in tile.corner_index_to_corner_adjacencies.iter().flatten()
            {
                adjacents.insert(resolve(
                    location,
                    adj.group_relative_x,
                    adj.group_relative_y,
                    adj.tile_index,
                )?);
            }
        }
        adjacents.remove(&location);
        Ok(adjacents)
    }
}

/// [Location::relative], with overflow reported against the starting tile
fn resolve(
    location: Location,
    group_relative_x: i32,
    group_relative_y: i32,
    tile_index: usize,
) -> Result<Location, PatternError> {
    location
        .relative(group_relative_x, group_relative_y, tile_index)
        .ok_or(PatternError::CoordinateOverflow { location })
}

impl TryFrom<PatternDefinition> for Pattern {
    type Error = PatternError;

    fn try_from(definition: PatternDefinition) -> Result<Self, Self::Error> {
        Self::new(definition)
    }
}

impl From<Pattern> for PatternDefinition {
    fn from(pattern: Pattern) -> Self {
        pattern.definition
    }
}

/// Check that every index in the definition points at something that exists.
/// After this passes, all lookups done by [validate_symmetry] are in bounds.
fn validate_references(def: &PatternDefinition) -> Result<(), PatternError> {
    if def.shape_index_to_corners.is_empty() {
        return Err(PatternError::NoShapes);
    }
    if def.pattern_tiles.is_empty() {
        return Err(PatternError::NoTiles);
    }
    for (shape, corners) in def.shape_index_to_corners.iter().enumerate() {
        if corners.len() < 3 {
            return Err(PatternError::DegenerateShape {
                shape,
                corners: corners.len(),
            });
        }
    }

    // Corner count for every tile, which is also its side count
    let corner_counts = def
        .pattern_tiles
        .iter()
        .enumerate()
        .map(|(tile, pattern_tile)| {
            def.shape_index_to_corners
                .get(pattern_tile.shape_index)
                .map(Vec::len)
                .ok_or(PatternError::UnknownShape {
                    tile,
                    shape: pattern_tile.shape_index,
                })
        })
        .collect::<Result<Vec<usize>, PatternError>>()?;
    let count = def.pattern_tiles.len();

    for (tile, pattern_tile) in def.pattern_tiles.iter().enumerate() {
        let expected = corner_counts[tile];
        let sides = &pattern_tile.side_index_to_side_adjacencies;
        let corners = &pattern_tile.corner_index_to_corner_adjacencies;
        if sides.len() != expected {
            return Err(PatternError::TableLengthMismatch {
                tile,
                table: "side",
                expected,
                actual: sides.len(),
            });
        }
        if corners.len() != expected {
            return Err(PatternError::TableLengthMismatch {
                tile,
                table: "corner",
                expected,
                actual: corners.len(),
            });
        }

        for adj in sides {
            let target = adj.tile_index;
            let target_sides = *corner_counts.get(target).ok_or(
                PatternError::TileIndexOutOfRange {
                    tile,
                    target,
                    count,
                },
            )?;
            if adj.side_index >= target_sides {
                return Err(PatternError::SideIndexOutOfRange {
                    tile,
                    target,
                    side: adj.side_index,
                    sides: target_sides,
                });
            }
        }

        for adj in corners.iter().flatten() {
            let target = adj.tile_index;
            let target_corners = *corner_counts.get(target).ok_or(
                PatternError::TileIndexOutOfRange {
                    tile,
                    target,
                    count,
                },
            )?;
            if adj.corner_index >= target_corners {
                return Err(PatternError::CornerIndexOutOfRange {
                    tile,
                    target,
                    corner: adj.corner_index,
                    corners: target_corners,
                });
            }
        }
    }
    Ok(())
}

/// Check that every adjacency is mirrored by its target. If A's side leads to
/// B's side at offset d, then that side of B must lead back to A at offset
/// -d. Same for corners, except a corner lists many tiles so we only need our
/// mirror to be somewhere in the target's list.
fn validate_symmetry(def: &PatternDefinition) -> Result<(), PatternError> {
    let tiles = &def.pattern_tiles;
    for (tile, pattern_tile) in tiles.iter().enumerate() {
        for (side, adj) in
            pattern_tile.side_index_to_side_adjacencies.iter().enumerate()
        {
            let back = tiles[adj.tile_index].side_index_to_side_adjacencies
                [adj.side_index];
            let expected = SideAdjacency {
                group_relative_x: -adj.group_relative_x,
                group_relative_y: -adj.group_relative_y,
                tile_index: tile,
                side_index: side,
            };
            if back != expected {
                return Err(PatternError::AsymmetricSide {
                    tile,
                    side,
                    target: adj.tile_index,
                    target_side: adj.side_index,
                });
            }
        }

        for (corner, adjs) in pattern_tile
            .corner_index_to_corner_adjacencies
            .iter()
            .enumerate()
        {
            for adj in adjs {
                let expected = CornerAdjacency {
                    group_relative_x: -adj.group_relative_x,
                    group_relative_y: -adj.group_relative_y,
                    tile_index: tile,
                    corner_index: corner,
                };
                let back = &tiles[adj.tile_index]
                    .corner_index_to_corner_adjacencies[adj.corner_index];
                if !back.contains(&expected) {
                    return Err(PatternError::AsymmetricCorner {
                        tile,
                        corner,
                        target: adj.tile_index,
                        target_corner: adj.corner_index,
                    });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_definition() -> PatternDefinition {
        presets::square().definition().clone()
    }

    #[test]
    fn test_tile_center_translation() {
        for pattern in [presets::square(), presets::rhombille()] {
            for index in 0..pattern.tile_count() {
                for (gx, gy) in [(0, 0), (5, -3), (-100, 7)] {
                    let here = pattern
                        .tile_center(Location::new(gx, gy, index))
                        .unwrap();
                    let east = pattern
                        .tile_center(Location::new(gx + 1, gy, index))
                        .unwrap();
                    let north = pattern
                        .tile_center(Location::new(gx, gy + 1, index))
                        .unwrap();
                    assert_eq!(east - here, pattern.x_offset());
                    assert_eq!(north - here, pattern.y_offset());
                }
            }
        }
    }

    #[test]
    fn test_tile_center_out_of_range() {
        let pattern = presets::square();
        assert_eq!(
            pattern.tile_center(Location::new(0, 0, 1)),
            Err(PatternError::LocationOutOfRange {
                location: Location::new(0, 0, 1),
                count: 1
            })
        );
    }

    #[test]
    fn test_adjacent_locations_square() {
        let pattern = presets::square();
        let origin = Location::new(10, 20, 0);
        let sides: Vec<Location> = pattern
            .adjacent_locations(origin, false)
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(
            sides,
            vec![
                Location::new(9, 20, 0),
                Location::new(10, 19, 0),
                Location::new(10, 21, 0),
                Location::new(11, 20, 0),
            ]
        );

        let all = pattern.adjacent_locations(origin, true).unwrap();
        assert_eq!(all.len(), 8);
        assert!(!all.contains(&origin));
        assert!(all.contains(&Location::new(9, 19, 0)));
        assert!(all.contains(&Location::new(11, 21, 0)));
    }

    #[test]
    fn test_adjacent_locations_rhombille() {
        let pattern = presets::rhombille();
        let top = Location::new(0, 0, 0);
        let sides = pattern.adjacent_locations(top, false).unwrap();
        assert_eq!(
            sides.into_iter().collect::<Vec<_>>(),
            vec![
                Location::new(-1, 1, 2),
                Location::new(0, 0, 1),
                Location::new(0, 0, 2),
                Location::new(0, 1, 1),
            ]
        );
        // Corners add the rhombi around the far vertices, without duplicating
        // the side neighbors
        let all = pattern.adjacent_locations(top, true).unwrap();
        assert_eq!(all.len(), 10);
    }

    #[test]
    fn test_side_neighbor_round_trip() {
        for pattern in [presets::square(), presets::rhombille()] {
            for index in 0..pattern.tile_count() {
                let here = Location::new(3, -4, index);
                let sides = pattern
                    .tile(here)
                    .unwrap()
                    .side_index_to_side_adjacencies
                    .len();
                for side in 0..sides {
                    let (there, back_side) =
                        pattern.side_neighbor(here, side).unwrap();
                    assert_eq!(
                        pattern.side_neighbor(there, back_side).unwrap(),
                        (here, side)
                    );
                }
            }
        }
    }

    #[test]
    fn test_side_neighbor_no_such_side() {
        let pattern = presets::square();
        let origin = Location::new(0, 0, 0);
        assert_eq!(
            pattern.side_neighbor(origin, 4),
            Err(PatternError::NoSuchSide {
                location: origin,
                side: 4
            })
        );
    }

    #[test]
    fn test_coordinate_overflow() {
        let square = presets::square();
        let far_east = Location::new(i32::MAX, 0, 0);
        let overflow = PatternError::CoordinateOverflow { location: far_east };
        // Offsets are larger than 1, so the multiply overflows
        assert_eq!(square.tile_center(far_east), Err(overflow.clone()));
        assert_eq!(
            square.adjacent_locations(far_east, false),
            Err(overflow.clone())
        );
        // Side 1 leads east, off the edge of the grid; side 3 leads back west
        assert_eq!(square.side_neighbor(far_east, 1), Err(overflow));
        assert_eq!(
            square.side_neighbor(far_east, 3),
            Ok((Location::new(i32::MAX - 1, 0, 0), 1))
        );

        let far_south = Location::new(0, i32::MIN, 0);
        assert_eq!(
            square.adjacent_locations(far_south, true),
            Err(PatternError::CoordinateOverflow {
                location: far_south
            })
        );
        // The last representable neighbor still works
        let almost = Location::new(i32::MAX - 1, 0, 0);
        assert!(square
            .adjacent_locations(almost, false)
            .unwrap()
            .contains(&far_east));
    }

    #[test]
    fn test_rotation() {
        let pattern = presets::rhombille();
        let radians = pattern
            .tile_rotation_radians(Location::new(0, 0, 1))
            .unwrap();
        assert!((radians - 2.094).abs() < 1e-9);
        assert_eq!(pattern.tile_shape_index(Location::new(4, 4, 2)), Ok(0));
    }

    #[test]
    fn test_validate_empty() {
        let mut def = square_definition();
        def.pattern_tiles.clear();
        assert_eq!(Pattern::new(def), Err(PatternError::NoTiles));

        let mut def = square_definition();
        def.shape_index_to_corners.clear();
        assert_eq!(Pattern::new(def), Err(PatternError::NoShapes));
    }

    #[test]
    fn test_validate_unknown_shape() {
        let mut def = square_definition();
        def.pattern_tiles[0].shape_index = 3;
        assert_eq!(
            Pattern::new(def),
            Err(PatternError::UnknownShape { tile: 0, shape: 3 })
        );
    }

    #[test]
    fn test_validate_degenerate_shape() {
        let mut def = square_definition();
        def.shape_index_to_corners[0].truncate(2);
        assert_eq!(
            Pattern::new(def),
            Err(PatternError::DegenerateShape {
                shape: 0,
                corners: 2
            })
        );
    }

    #[test]
    fn test_validate_table_length() {
        let mut def = square_definition();
        def.pattern_tiles[0].side_index_to_side_adjacencies.pop();
        assert_eq!(
            Pattern::new(def),
            Err(PatternError::TableLengthMismatch {
                tile: 0,
                table: "side",
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn test_validate_tile_index_out_of_range() {
        let mut def = square_definition();
        def.pattern_tiles[0].side_index_to_side_adjacencies[1].tile_index = 1;
        assert_eq!(
            Pattern::new(def),
            Err(PatternError::TileIndexOutOfRange {
                tile: 0,
                target: 1,
                count: 1
            })
        );

        let mut def = square_definition();
        def.pattern_tiles[0].corner_index_to_corner_adjacencies[2][0]
            .tile_index = 7;
        assert_eq!(
            Pattern::new(def),
            Err(PatternError::TileIndexOutOfRange {
                tile: 0,
                target: 7,
                count: 1
            })
        );
    }

    #[test]
    fn test_validate_side_index_out_of_range() {
        let mut def = square_definition();
        def.pattern_tiles[0].side_index_to_side_adjacencies[0].side_index = 4;
        assert_eq!(
            Pattern::new(def),
            Err(PatternError::SideIndexOutOfRange {
                tile: 0,
                target: 0,
                side: 4,
                sides: 4
            })
        );
    }

    #[test]
    fn test_validate_asymmetric_side() {
        let mut def = square_definition();
        // Point the bottom side at the wrong group
        def.pattern_tiles[0].side_index_to_side_adjacencies[0]
            .group_relative_x = 1;
        assert_eq!(
            Pattern::new(def),
            Err(PatternError::AsymmetricSide {
                tile: 0,
                side: 0,
                target: 0,
                target_side: 2
            })
        );
    }

    #[test]
    fn test_validate_asymmetric_corner() {
        let mut def = square_definition();
        def.pattern_tiles[0].corner_index_to_corner_adjacencies[0].pop();
        // Corner 3 still lists corner 0 of the tile above, but that corner no
        // longer lists it back
        assert_eq!(
            Pattern::new(def),
            Err(PatternError::AsymmetricCorner {
                tile: 0,
                corner: 3,
                target: 0,
                target_corner: 0
            })
        );
    }

    #[test]
    fn test_pattern_json_round_trip() {
        let pattern = presets::rhombille();
        let json = serde_json::to_value(&pattern).unwrap();
        assert_eq!(json["name"], "rhombille");
        assert_eq!(json["pattern_tiles"].as_array().unwrap().len(), 3);
        let parsed: Pattern = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, pattern);
    }

    #[test]
    fn test_pattern_json_rejects_invalid() {
        let mut json = serde_json::to_value(presets::square()).unwrap();
        json["pattern_tiles"][0]["shape_index"] = 5.into();
        let err = serde_json::from_value::<Pattern>(json).unwrap_err();
        assert!(
            err.to_string().contains("unknown shape 5"),
            "unexpected error: {}",
            err
        );
    }
}
