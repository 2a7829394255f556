//! Built-in patterns. Coordinates use a scale of 1000 units per tile.

use crate::{
    geometry::Vec2,
    pattern::{
        CornerAdjacency, Pattern, PatternDefinition, PatternTile, SideAdjacency,
    },
};

fn side(
    dx: i32,
    dy: i32,
    tile_index: usize,
    side_index: usize,
) -> SideAdjacency {
    SideAdjacency {
        group_relative_x: dx,
        group_relative_y: dy,
        tile_index,
        side_index,
    }
}

fn corner(
    dx: i32,
    dy: i32,
    tile_index: usize,
    corner_index: usize,
) -> CornerAdjacency {
    CornerAdjacency {
        group_relative_x: dx,
        group_relative_y: dy,
        tile_index,
        corner_index,
    }
}

/// Build a preset. Presets are static data, so failure here is a bug in the
/// table, not something a caller can recover from.
fn build(definition: PatternDefinition) -> Pattern {
    Pattern::new(definition).expect("built-in pattern is invalid")
}

/// A plain grid of squares, one tile per group. Corners run counterclockwise
/// from the bottom-left.
pub fn square() -> Pattern {
    build(PatternDefinition {
        name: "square".into(),
        shape_index_to_corners: vec![vec![
            Vec2::new(-500, -500),
            Vec2::new(500, -500),
            Vec2::new(500, 500),
            Vec2::new(-500, 500),
        ]],
        pattern_tiles: vec![PatternTile {
            shape_index: 0,
            rotate_radianards: 0,
            translate: Vec2::ZERO,
            side_index_to_side_adjacencies: vec![
                side(0, -1, 0, 2),
                side(1, 0, 0, 3),
                side(0, 1, 0, 0),
                side(-1, 0, 0, 1),
            ],
            corner_index_to_corner_adjacencies: vec![
                vec![
                    corner(-1, 0, 0, 1),
                    corner(-1, -1, 0, 2),
                    corner(0, -1, 0, 3),
                ],
                vec![
                    corner(1, 0, 0, 0),
                    corner(1, -1, 0, 3),
                    corner(0, -1, 0, 2),
                ],
                vec![
                    corner(1, 0, 0, 3),
                    corner(1, 1, 0, 0),
                    corner(0, 1, 0, 1),
                ],
                vec![
                    corner(-1, 0, 0, 2),
                    corner(-1, 1, 0, 1),
                    corner(0, 1, 0, 0),
                ],
            ],
        }],
        x_offset: Vec2::new(1000, 0),
        y_offset: Vec2::new(0, 1000),
    })
}

/// Three rhombi that together form a pointy-top hexagon, repeated on a
/// hexagonal lattice ("tumbling blocks"). All three tiles share one shape,
/// rotated by a third of a turn each. Corner 0 of every rhombus is the
/// hexagon center; the others follow counterclockwise.
///
/// Group offsets: `x` steps to the hexagon on the right, `y` steps up and to
/// the right.
pub fn rhombille() -> Pattern {
    build(PatternDefinition {
        name: "rhombille".into(),
        shape_index_to_corners: vec![vec![
            Vec2::new(0, -500),
            Vec2::new(866, 0),
            Vec2::new(0, 500),
            Vec2::new(-866, 0),
        ]],
        pattern_tiles: vec![
            // Top
            PatternTile {
                shape_index: 0,
                rotate_radianards: 0,
                translate: Vec2::new(0, 500),
                side_index_to_side_adjacencies: vec![
                    side(0, 0, 2, 3),
                    side(0, 1, 1, 2),
                    side(-1, 1, 2, 1),
                    side(0, 0, 1, 0),
                ],
                corner_index_to_corner_adjacencies: vec![
                    vec![corner(0, 0, 1, 0), corner(0, 0, 2, 0)],
                    vec![
                        corner(0, 0, 2, 3),
                        corner(1, 0, 0, 3),
                        corner(1, 0, 1, 1),
                        corner(0, 1, 1, 3),
                        corner(0, 1, 2, 1),
                    ],
                    vec![corner(0, 1, 1, 2), corner(-1, 1, 2, 2)],
                    vec![
                        corner(0, 0, 1, 1),
                        corner(-1, 1, 1, 3),
                        corner(-1, 1, 2, 1),
                        corner(-1, 0, 0, 1),
                        corner(-1, 0, 2, 3),
                    ],
                ],
            },
            // Bottom left
            PatternTile {
                shape_index: 0,
                rotate_radianards: 2094,
                translate: Vec2::new(-433, -250),
                side_index_to_side_adjacencies: vec![
                    side(0, 0, 0, 3),
                    side(-1, 0, 2, 2),
                    side(0, -1, 0, 1),
                    side(0, 0, 2, 0),
                ],
                corner_index_to_corner_adjacencies: vec![
                    vec![corner(0, 0, 0, 0), corner(0, 0, 2, 0)],
                    vec![
                        corner(0, 0, 0, 3),
                        corner(-1, 1, 1, 3),
                        corner(-1, 1, 2, 1),
                        corner(-1, 0, 0, 1),
                        corner(-1, 0, 2, 3),
                    ],
                    vec![corner(-1, 0, 2, 2), corner(0, -1, 0, 2)],
                    vec![
                        corner(0, 0, 2, 1),
                        corner(0, -1, 0, 1),
                        corner(0, -1, 2, 3),
                        corner(1, -1, 0, 3),
                        corner(1, -1, 1, 1),
                    ],
                ],
            },
            // Bottom right
            PatternTile {
                shape_index: 0,
                rotate_radianards: 4189,
                translate: Vec2::new(433, -250),
                side_index_to_side_adjacencies: vec![
                    side(0, 0, 1, 3),
                    side(1, -1, 0, 2),
                    side(1, 0, 1, 1),
                    side(0, 0, 0, 0),
                ],
                corner_index_to_corner_adjacencies: vec![
                    vec![corner(0, 0, 0, 0), corner(0, 0, 1, 0)],
                    vec![
                        corner(0, 0, 1, 3),
                        corner(0, -1, 0, 1),
                        corner(0, -1, 2, 3),
                        corner(1, -1, 0, 3),
                        corner(1, -1, 1, 1),
                    ],
                    vec![corner(1, -1, 0, 2), corner(1, 0, 1, 2)],
                    vec![
                        corner(0, 0, 0, 1),
                        corner(1, 0, 0, 3),
                        corner(1, 0, 1, 1),
                        corner(0, 1, 1, 3),
                        corner(0, 1, 2, 1),
                    ],
                ],
            },
        ],
        x_offset: Vec2::new(1732, 0),
        y_offset: Vec2::new(866, 1500),
    })
}
