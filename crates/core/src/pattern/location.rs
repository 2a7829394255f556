use derive_more::Display;
use serde::{Deserialize, Serialize};

/// The position of a single tile in a patterned world. A pattern is a group
/// of tiles that repeats across the plane; `group_x`/`group_y` pick which
/// repetition of the group, and `index_in_group` picks a tile within it.
///
/// Locations order by `group_x`, then `group_y`, then index, so they can key
/// sorted collections. They're plain values: moving something to a new tile
/// means creating a new location.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[display(fmt = "({}, {}, #{})", group_x, group_y, index_in_group)]
pub struct Location {
    group_x: i32,
    group_y: i32,
    index_in_group: usize,
}

impl Location {
    pub const fn new(
        group_x: i32,
        group_y: i32,
        index_in_group: usize,
    ) -> Self {
        Self {
            group_x,
            group_y,
            index_in_group,
        }
    }

    pub fn group_x(&self) -> i32 {
        self.group_x
    }

    pub fn group_y(&self) -> i32 {
        self.group_y
    }

    pub fn index_in_group(&self) -> usize {
        self.index_in_group
    }

    /// Resolve a group-relative reference (as found in a pattern's adjacency
    /// tables) against this location. `None` if the group coordinates would
    /// leave the `i32` range.
    pub fn relative(
        &self,
        group_relative_x: i32,
        group_relative_y: i32,
        tile_index: usize,
    ) -> Option<Location> {
        Some(Location::new(
            self.group_x.checked_add(group_relative_x)?,
            self.group_y.checked_add(group_relative_y)?,
            tile_index,
        ))
    }
}
