//! Decoding side of the wire format. Everything here tracks the dotted path
//! of the value being read, so errors can point at the exact field.

use crate::{
    animation::{Animation, Vec4iAnimation},
    description::{
        find_duplicate_id, InitialSymbol, InitialSymbolGlyph,
        InitialSymbolOutline, InitialSymbolSides, InitialTile, InitialUnit,
        OutlineMode,
    },
    geometry::{Vec2, Vec4i},
    message::{CommandKind, DominoMessage},
    pattern::{
        CornerAdjacency, Location, Pattern, PatternDefinition, PatternTile,
        SideAdjacency,
    },
    wire::{join, WireError, PERCENT_RANGE},
};
use serde_json::{Map, Value};
use std::{convert::TryFrom, str::FromStr};

const U64: &str = "an unsigned 64-bit integer";
const U32: &str = "an unsigned 32-bit integer";
const I64: &str = "a 64-bit integer";
const I32: &str = "a 32-bit integer";
const USIZE: &str = "an unsigned integer";

fn mismatch(field: impl Into<String>, expected: &'static str) -> WireError {
    WireError::TypeMismatch {
        field: field.into(),
        expected,
    }
}

/// Parse any JSON number with no fractional part into an integer type.
/// Numbers that are fractional, or don't fit in `T`, are a type mismatch.
fn integer<T>(
    value: &Value,
    field: &str,
    expected: &'static str,
) -> Result<T, WireError>
where
    T: TryFrom<u64> + TryFrom<i64>,
{
    let number = match value {
        Value::Number(number) => number,
        _ => return Err(mismatch(field, expected)),
    };
    let parsed = if let Some(n) = number.as_u64() {
        <T as TryFrom<u64>>::try_from(n).ok()
    } else if let Some(n) = number.as_i64() {
        <T as TryFrom<i64>>::try_from(n).ok()
    } else {
        // Floats are fine as long as they're whole numbers that fit in 64
        // bits. The bounds are exactly 2^64 and -2^63.
        number.as_f64().filter(|f| f.fract() == 0.0).and_then(|f| {
            if (0.0..18_446_744_073_709_551_616.0).contains(&f) {
                <T as TryFrom<u64>>::try_from(f as u64).ok()
            } else if (-9_223_372_036_854_775_808.0..0.0).contains(&f) {
                <T as TryFrom<i64>>::try_from(f as i64).ok()
            } else {
                None
            }
        })
    };
    parsed.ok_or_else(|| mismatch(field, expected))
}

/// Read every element of a JSON array, handing each one over with its path
fn elements<'v, T>(
    value: &'v Value,
    field: &str,
    element: impl FnMut(&'v Value, String) -> Result<T, WireError>,
) -> Result<Vec<T>, WireError> {
    let mut element = element;
    value
        .as_array()
        .ok_or_else(|| mismatch(field, "an array"))?
        .iter()
        .enumerate()
        .map(|(i, entry)| element(entry, format!("{}[{}]", field, i)))
        .collect()
}

fn vec2(value: &Value, field: String) -> Result<Vec2, WireError> {
    let fields = ObjectReader::at(value, field, 1)?;
    Ok(Vec2::new(fields.i32("x")?, fields.i32("y")?))
}

fn color(value: &Value, field: &str) -> Result<Vec4i, WireError> {
    match value {
        Value::Array(components) => {
            let mut parsed: [i32; 4] = [0, 0, 0, 255];
            if !(3..=4).contains(&components.len()) {
                return Err(mismatch(field, "a color"));
            }
            for (i, component) in components.iter().enumerate() {
                parsed[i] =
                    integer(component, &format!("{}[{}]", field, i), I32)?;
            }
            Ok(Vec4i::from(parsed))
        }
        Value::Object(map) => {
            let keys = if map.contains_key("x") {
                ["x", "y", "z", "w"]
            } else if map.contains_key("red") {
                ["red", "green", "blue", "alpha"]
            } else {
                return Err(mismatch(field, "a color"));
            };
            let fields = ObjectReader {
                map,
                path: field.to_owned(),
                max_depth: 1,
            };
            Ok(Vec4i::new(
                fields.i32(keys[0])?,
                fields.i32(keys[1])?,
                fields.i32(keys[2])?,
                fields.optional_i32(keys[3])?.unwrap_or(255),
            ))
        }
        _ => Err(mismatch(field, "a color")),
    }
}

fn animation(
    value: &Value,
    field: &str,
    depth: usize,
    max_depth: usize,
) -> Result<Vec4iAnimation, WireError> {
    if depth > max_depth {
        return Err(WireError::MaxDepthExceeded {
            field: field.to_owned(),
            max_depth,
        });
    }

    let map = match value {
        Value::Object(map) if map.contains_key("type") => map,
        // Anything else had better be a plain color
        _ => return Ok(Animation::Constant(color(value, field)?)),
    };
    let type_field = join(field, "type");
    let anim_type = map
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| mismatch(type_field.as_str(), "an animation type"))?;
    let fields = ObjectReader {
        map,
        path: field.to_owned(),
        max_depth,
    };
    let operand = |name: &str| {
        let (value, path) = fields.get(name)?;
        animation(value, &path, depth + 1, max_depth)
    };

    match anim_type {
        "constant" => {
            let (value, path) = fields.get("val")?;
            Ok(Animation::Constant(color(value, &path)?))
        }
        "add" => Ok(Animation::add(operand("left")?, operand("right")?)),
        "multiply" => {
            Ok(Animation::multiply(operand("left")?, operand("right")?))
        }
        "divide" => Ok(Animation::divide(operand("left")?, operand("right")?)),
        _ => Err(mismatch(type_field, "an animation type")),
    }
}

/// A JSON object being decoded, along with its path from the message root
pub(super) struct ObjectReader<'a> {
    map: &'a Map<String, Value>,
    path: String,
    max_depth: usize,
}

impl<'a> ObjectReader<'a> {
    /// Start reading a whole message
    pub fn root(value: &'a Value, max_depth: usize) -> Result<Self, WireError> {
        match value {
            Value::Object(map) => Ok(Self {
                map,
                path: String::new(),
                max_depth,
            }),
            _ => Err(mismatch("(root)", "an object")),
        }
    }

    /// Read a value that has to be an object
    fn at(
        value: &'a Value,
        path: String,
        max_depth: usize,
    ) -> Result<Self, WireError> {
        match value {
            Value::Object(map) => Ok(Self {
                map,
                path,
                max_depth,
            }),
            _ => Err(mismatch(path, "an object")),
        }
    }

    /// Look up a required field. Null counts as missing.
    fn get(&self, name: &str) -> Result<(&'a Value, String), WireError> {
        let path = join(&self.path, name);
        match self.map.get(name) {
            Some(value) if !value.is_null() => Ok((value, path)),
            _ => Err(WireError::MissingField(path)),
        }
    }

    /// Look up an optional field. Absent and null are both `None`.
    fn optional(&self, name: &str) -> Option<(&'a Value, String)> {
        self.get(name).ok()
    }

    fn integer<T: TryFrom<u64> + TryFrom<i64>>(
        &self,
        name: &str,
        expected: &'static str,
    ) -> Result<T, WireError> {
        let (value, path) = self.get(name)?;
        integer(value, &path, expected)
    }

    pub fn u64(&self, name: &str) -> Result<u64, WireError> {
        self.integer(name, U64)
    }

    pub fn i64(&self, name: &str) -> Result<i64, WireError> {
        self.integer(name, I64)
    }

    pub fn i32(&self, name: &str) -> Result<i32, WireError> {
        self.integer(name, I32)
    }

    fn usize(&self, name: &str) -> Result<usize, WireError> {
        self.integer(name, USIZE)
    }

    fn optional_i32(&self, name: &str) -> Result<Option<i32>, WireError> {
        self.optional(name)
            .map(|(value, path)| integer(value, &path, I32))
            .transpose()
    }

    /// An integer percentage that must be within [0, 100]
    pub fn percent(&self, name: &str) -> Result<i32, WireError> {
        let value = self.i32(name)?;
        if PERCENT_RANGE.contains(value) {
            Ok(value)
        } else {
            Err(WireError::OutOfRange {
                field: join(&self.path, name),
                value,
                range: PERCENT_RANGE,
            })
        }
    }

    pub fn string(&self, name: &str) -> Result<String, WireError> {
        let (value, path) = self.get(name)?;
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| mismatch(path, "a string"))
    }

    pub fn object(&self, name: &str) -> Result<ObjectReader<'a>, WireError> {
        let (value, path) = self.get(name)?;
        Self::at(value, path, self.max_depth)
    }

    fn array<T>(
        &self,
        name: &str,
        element: impl FnMut(&'a Value, String) -> Result<T, WireError>,
    ) -> Result<Vec<T>, WireError> {
        let (value, path) = self.get(name)?;
        elements(value, &path, element)
    }

    /// Read each element of an array field as an object
    fn objects<T>(
        &self,
        name: &str,
        mut element: impl FnMut(&ObjectReader<'a>) -> Result<T, WireError>,
    ) -> Result<Vec<T>, WireError> {
        self.array(name, |value, path| {
            element(&Self::at(value, path, self.max_depth)?)
        })
    }

    fn vec2(&self, name: &str) -> Result<Vec2, WireError> {
        let (value, path) = self.get(name)?;
        vec2(value, path)
    }

    fn optional_object(
        &self,
        name: &str,
    ) -> Result<Option<ObjectReader<'a>>, WireError> {
        match self.optional(name) {
            Some(_) => self.object(name).map(Some),
            None => Ok(None),
        }
    }

    pub fn animation(&self, name: &str) -> Result<Vec4iAnimation, WireError> {
        let (value, path) = self.get(name)?;
        animation(value, &path, 1, self.max_depth)
    }

    pub fn location(&self, name: &str) -> Result<Location, WireError> {
        let fields = self.object(name)?;
        Ok(Location::new(
            fields.i32("group_x")?,
            fields.i32("group_y")?,
            fields.usize("index_in_group")?,
        ))
    }

    /// Patterns are read field by field like everything else, then checked
    /// as a whole
    pub fn pattern(&self, name: &str) -> Result<Pattern, WireError> {
        let fields = self.object(name)?;
        let definition = PatternDefinition {
            name: fields.string("name")?,
            shape_index_to_corners: fields
                .array("shape_index_to_corners", |corners, path| {
                    elements(corners, &path, vec2)
                })?,
            pattern_tiles: fields
                .objects("pattern_tiles", ObjectReader::pattern_tile)?,
            x_offset: fields.vec2("x_offset")?,
            y_offset: fields.vec2("y_offset")?,
        };
        Pattern::new(definition).map_err(|source| WireError::InvalidPattern {
            field: fields.path,
            source,
        })
    }

    fn pattern_tile(&self) -> Result<PatternTile, WireError> {
        let corner = |value, path| -> Result<CornerAdjacency, WireError> {
            let adj = Self::at(value, path, self.max_depth)?;
            Ok(CornerAdjacency {
                group_relative_x: adj.i32("group_relative_x")?,
                group_relative_y: adj.i32("group_relative_y")?,
                tile_index: adj.usize("tile_index")?,
                corner_index: adj.usize("corner_index")?,
            })
        };
        Ok(PatternTile {
            shape_index: self.usize("shape_index")?,
            rotate_radianards: self.i32("rotate_radianards")?,
            translate: self.vec2("translate")?,
            side_index_to_side_adjacencies: self.objects(
                "side_index_to_side_adjacencies",
                |adj| {
                    Ok(SideAdjacency {
                        group_relative_x: adj.i32("group_relative_x")?,
                        group_relative_y: adj.i32("group_relative_y")?,
                        tile_index: adj.usize("tile_index")?,
                        side_index: adj.usize("side_index")?,
                    })
                },
            )?,
            corner_index_to_corner_adjacencies: self.array(
                "corner_index_to_corner_adjacencies",
                |corners, path| elements(corners, &path, &corner),
            )?,
        })
    }

    pub fn symbol(&self, name: &str) -> Result<InitialSymbol, WireError> {
        let fields = self.object(name)?;
        let glyph = fields.object("glyph")?;
        let outline = fields
            .optional_object("outline")?
            .map(|outline| -> Result<_, WireError> {
                let (value, path) = outline.get("mode")?;
                let mode = value
                    .as_str()
                    .and_then(|mode| OutlineMode::from_str(mode).ok())
                    .ok_or_else(|| mismatch(path, "an outline mode"))?;
                Ok(InitialSymbolOutline {
                    mode,
                    color: outline.animation("color")?,
                })
            })
            .transpose()?;
        let sides = fields
            .optional_object("sides")?
            .map(|sides| -> Result<_, WireError> {
                Ok(InitialSymbolSides {
                    depth_percent: sides.i32("depth_percent")?,
                    color: sides.animation("color")?,
                })
            })
            .transpose()?;

        Ok(InitialSymbol {
            glyph: InitialSymbolGlyph {
                font: glyph.string("font")?,
                codepoint: glyph.integer("codepoint", U32)?,
                color: glyph.animation("color")?,
            },
            outline,
            sides,
            rotation_percent: fields.i32("rotation_percent")?,
            size_percent: fields.i32("size_percent")?,
        })
    }

    pub fn optional_symbol(
        &self,
        name: &str,
    ) -> Result<Option<InitialSymbol>, WireError> {
        match self.optional(name) {
            Some(_) => self.symbol(name).map(Some),
            None => Ok(None),
        }
    }

    /// A list of `{"id": ..., "symbol": ...}` objects with unique ids
    pub fn symbol_list(
        &self,
        name: &str,
    ) -> Result<Vec<(u64, InitialSymbol)>, WireError> {
        let pairs = self.objects(name, |entry| {
            Ok((entry.u64("id")?, entry.symbol("symbol")?))
        })?;
        match find_duplicate_id(&pairs) {
            Some(id) => Err(WireError::DuplicateId {
                field: join(&self.path, name),
                id,
            }),
            None => Ok(pairs),
        }
    }

    pub fn tile(&self, name: &str) -> Result<InitialTile, WireError> {
        let fields = self.object(name)?;
        Ok(InitialTile {
            location: fields.location("location")?,
            elevation: fields.i32("elevation")?,
            top_color: fields.animation("top_color")?,
            side_color: fields.animation("side_color")?,
            overlay: fields.optional_symbol("overlay")?,
            feature: fields.optional_symbol("feature")?,
            items: fields.symbol_list("items")?,
        })
    }

    pub fn unit(&self, name: &str) -> Result<InitialUnit, WireError> {
        let fields = self.object(name)?;
        Ok(InitialUnit {
            location: fields.location("location")?,
            top_color: fields.animation("top_color")?,
            side_color: fields.animation("side_color")?,
            face: fields.symbol("face")?,
            details: fields.symbol_list("details")?,
            hp_percent: fields.percent("hp_percent")?,
            mp_percent: fields.percent("mp_percent")?,
        })
    }
}

/// Read the fields of a message whose kind is already known
pub(super) fn message(
    kind: CommandKind,
    fields: &ObjectReader<'_>,
) -> Result<DominoMessage, WireError> {
    let message = match kind {
        CommandKind::SetupGame => DominoMessage::SetupGame {
            pattern: fields.pattern("pattern")?,
            elevation_step_height: fields.i32("elevation_step_height")?,
            elevation_step_seconds_ms: fields
                .i32("elevation_step_seconds_ms")?,
        },
        CommandKind::CreateTile => DominoMessage::CreateTile {
            tile_view_id: fields.u64("tile_view_id")?,
            initial_tile: fields.tile("initial_tile")?,
        },
        CommandKind::CreateUnit => DominoMessage::CreateUnit {
            unit_view_id: fields.u64("unit_view_id")?,
            initial_unit: fields.unit("initial_unit")?,
        },
        CommandKind::MakePanel => DominoMessage::MakePanel {
            panel_view_id: fields.u64("panel_view_id")?,
            parent_view_id: fields.u64("parent_view_id")?,
            x: fields.i32("x")?,
            y: fields.i32("y")?,
            width: fields.i32("width")?,
            height: fields.i32("height")?,
            background_color: fields.animation("background_color")?,
        },
        CommandKind::ScheduleClose => DominoMessage::ScheduleClose {
            view_id: fields.u64("view_id")?,
            start_ms_from_now: fields.i64("start_ms_from_now")?,
        },
        CommandKind::RemoveView => DominoMessage::RemoveView {
            view_id: fields.u64("view_id")?,
        },
        CommandKind::SetOpacity => DominoMessage::SetOpacity {
            view_id: fields.u64("view_id")?,
            opacity_percent: fields.percent("opacity_percent")?,
        },
        CommandKind::SetFadeIn => DominoMessage::SetFadeIn {
            view_id: fields.u64("view_id")?,
            fade_in_end_ms_from_now: fields.i64("fade_in_end_ms_from_now")?,
        },
        CommandKind::SetFadeOut => DominoMessage::SetFadeOut {
            view_id: fields.u64("view_id")?,
            fade_out_start_ms_from_now: fields
                .i64("fade_out_start_ms_from_now")?,
            fade_out_end_ms_from_now: fields.i64("fade_out_end_ms_from_now")?,
        },
        CommandKind::AddButton => DominoMessage::AddButton {
            new_view_id: fields.u64("new_view_id")?,
            parent_view_id: fields.u64("parent_view_id")?,
            x: fields.i32("x")?,
            y: fields.i32("y")?,
            width: fields.i32("width")?,
            height: fields.i32("height")?,
            color: fields.animation("color")?,
            on_clicked_event_id: fields.u64("on_clicked_event_id")?,
        },
        CommandKind::AddRectangle => DominoMessage::AddRectangle {
            new_view_id: fields.u64("new_view_id")?,
            parent_view_id: fields.u64("parent_view_id")?,
            x: fields.i32("x")?,
            y: fields.i32("y")?,
            width: fields.i32("width")?,
            height: fields.i32("height")?,
            color: fields.animation("color")?,
        },
        CommandKind::AddSymbol => DominoMessage::AddSymbol {
            new_view_id: fields.u64("new_view_id")?,
            parent_view_id: fields.u64("parent_view_id")?,
            x: fields.i32("x")?,
            y: fields.i32("y")?,
            width: fields.i32("width")?,
            height: fields.i32("height")?,
            symbol: fields.symbol("symbol")?,
        },
        CommandKind::SetOverlay => DominoMessage::SetOverlay {
            tile_view_id: fields.u64("tile_view_id")?,
            overlay: fields.optional_symbol("overlay")?,
        },
        CommandKind::SetFeature => DominoMessage::SetFeature {
            tile_view_id: fields.u64("tile_view_id")?,
            feature: fields.optional_symbol("feature")?,
        },
        CommandKind::SetCliffColor => DominoMessage::SetCliffColor {
            tile_view_id: fields.u64("tile_view_id")?,
            color: fields.animation("color")?,
        },
        CommandKind::SetSurfaceColor => DominoMessage::SetSurfaceColor {
            tile_view_id: fields.u64("tile_view_id")?,
            color: fields.animation("color")?,
        },
        CommandKind::SetElevation => DominoMessage::SetElevation {
            tile_view_id: fields.u64("tile_view_id")?,
            elevation: fields.i32("elevation")?,
        },
        CommandKind::AddItem => DominoMessage::AddItem {
            tile_view_id: fields.u64("tile_view_id")?,
            item_id: fields.u64("item_id")?,
            symbol: fields.symbol("symbol")?,
        },
        CommandKind::RemoveItem => DominoMessage::RemoveItem {
            tile_view_id: fields.u64("tile_view_id")?,
            item_id: fields.u64("item_id")?,
        },
        CommandKind::ClearItems => DominoMessage::ClearItems {
            tile_view_id: fields.u64("tile_view_id")?,
        },
        CommandKind::AddDetail => DominoMessage::AddDetail {
            unit_view_id: fields.u64("unit_view_id")?,
            detail_id: fields.u64("detail_id")?,
            symbol: fields.symbol("symbol")?,
        },
        CommandKind::RemoveDetail => DominoMessage::RemoveDetail {
            unit_view_id: fields.u64("unit_view_id")?,
            detail_id: fields.u64("detail_id")?,
        },
        CommandKind::DestroyTile => DominoMessage::DestroyTile {
            tile_view_id: fields.u64("tile_view_id")?,
        },
        CommandKind::DestroyUnit => DominoMessage::DestroyUnit {
            unit_view_id: fields.u64("unit_view_id")?,
        },
    };
    Ok(message)
}
