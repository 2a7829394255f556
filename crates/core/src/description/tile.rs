use crate::{
    animation::{Vec4iAnimation, Vector4Animation},
    description::{describe_all, InitialSymbol, SymbolDescription},
    geometry::Vec2,
    pattern::{Location, Pattern, PatternError},
};

/// Everything needed to create a tile
#[derive(Clone, Debug, PartialEq)]
pub struct InitialTile {
    pub location: Location,
    /// Height in elevation steps. The size of a step is set by `SetupGame`.
    pub elevation: i32,
    pub top_color: Vec4iAnimation,
    pub side_color: Vec4iAnimation,
    pub overlay: Option<InitialSymbol>,
    pub feature: Option<InitialSymbol>,
    /// Items on the tile, in display order. Ids are unique within a tile.
    pub items: Vec<(u64, InitialSymbol)>,
}

/// A tile resolved against its pattern, ready for a presenter
#[derive(Clone, Debug, PartialEq)]
pub struct TileDescription {
    pub location: Location,
    pub center: Vec2,
    pub shape_index: usize,
    pub rotation_radians: f64,
    pub elevation: i32,
    pub top_color: Vector4Animation,
    pub side_color: Vector4Animation,
    pub overlay: Option<SymbolDescription>,
    pub feature: Option<SymbolDescription>,
    pub items: Vec<(u64, SymbolDescription)>,
}

impl TileDescription {
    /// Resolve a tile payload. Fails if the tile's location doesn't exist in
    /// the pattern.
    pub fn new(
        pattern: &Pattern,
        tile: &InitialTile,
    ) -> Result<Self, PatternError> {
        let location = tile.location;
        Ok(Self {
            location,
            center: pattern.tile_center(location)?,
            shape_index: pattern.tile_shape_index(location)?,
            rotation_radians: pattern.tile_rotation_radians(location)?,
            elevation: tile.elevation,
            top_color: tile.top_color.to_unit_float(),
            side_color: tile.side_color.to_unit_float(),
            overlay: tile.overlay.as_ref().map(InitialSymbol::describe),
            feature: tile.feature.as_ref().map(InitialSymbol::describe),
            items: describe_all(&tile.items),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geometry::{Vec4, Vec4i},
        pattern::presets,
    };

    fn tile(location: Location) -> InitialTile {
        InitialTile {
            location,
            elevation: 3,
            top_color: Vec4i::WHITE.into(),
            side_color: Vec4i::BLACK.into(),
            overlay: None,
            feature: Some(InitialSymbol::plain(
                "font",
                0x25B2,
                Vec4i::RED.into(),
            )),
            items: vec![(
                9,
                InitialSymbol::plain("font", 0x2022, Vec4i::BLUE.into()),
            )],
        }
    }

    #[test]
    fn test_tile_description() {
        let pattern = presets::rhombille();
        let location = Location::new(1, -1, 2);
        let description =
            TileDescription::new(&pattern, &tile(location)).unwrap();

        // Tile translation, plus one x offset, minus one y offset
        assert_eq!(
            description.center,
            Vec2::new(433 + 1732 - 866, -250 - 1500)
        );
        assert_eq!(description.shape_index, 0);
        assert!((description.rotation_radians - 4.189).abs() < 1e-9);
        assert_eq!(description.elevation, 3);
        assert_eq!(description.top_color.evaluate(0), Ok(Vec4::ONE));
        assert_eq!(description.overlay, None);
        assert_eq!(description.feature.unwrap().codepoint, 0x25B2);
        assert_eq!(description.items.len(), 1);
        assert_eq!(description.items[0].0, 9);
    }

    #[test]
    fn test_tile_description_bad_location() {
        let pattern = presets::rhombille();
        let location = Location::new(0, 0, 3);
        assert_eq!(
            TileDescription::new(&pattern, &tile(location)),
            Err(PatternError::LocationOutOfRange { location, count: 3 })
        );
    }
}
