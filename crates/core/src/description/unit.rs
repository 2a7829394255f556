use crate::{
    animation::{Vec4iAnimation, Vector4Animation},
    description::{
        describe_all, symbol::percent_to_ratio, InitialSymbol,
        SymbolDescription,
    },
    geometry::Vec2,
    pattern::{Location, Pattern, PatternError},
};

/// Everything needed to create a unit
#[derive(Clone, Debug, PartialEq)]
pub struct InitialUnit {
    pub location: Location,
    pub top_color: Vec4iAnimation,
    pub side_color: Vec4iAnimation,
    pub face: InitialSymbol,
    /// Extra symbols drawn on the unit. Ids are unique within a unit.
    pub details: Vec<(u64, InitialSymbol)>,
    pub hp_percent: i32,
    pub mp_percent: i32,
}

/// A unit resolved against its pattern, ready for a presenter. Units stand
/// on the center of their tile.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitDescription {
    pub location: Location,
    pub center: Vec2,
    pub top_color: Vector4Animation,
    pub side_color: Vector4Animation,
    pub face: SymbolDescription,
    pub details: Vec<(u64, SymbolDescription)>,
    pub hp_ratio: f32,
    pub mp_ratio: f32,
}

impl UnitDescription {
    pub fn new(
        pattern: &Pattern,
        unit: &InitialUnit,
    ) -> Result<Self, PatternError> {
        Ok(Self {
            location: unit.location,
            center: pattern.tile_center(unit.location)?,
            top_color: unit.top_color.to_unit_float(),
            side_color: unit.side_color.to_unit_float(),
            face: unit.face.describe(),
            details: describe_all(&unit.details),
            hp_ratio: percent_to_ratio(unit.hp_percent),
            mp_ratio: percent_to_ratio(unit.mp_percent),
        })
    }
}
