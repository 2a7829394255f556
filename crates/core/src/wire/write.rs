//! Encoding side of the wire format. Output always uses the canonical forms:
//! colors are `[r, g, b, a]`, constant animations are bare colors, and
//! absent symbols are `null`.
//!
//! The encoder applies the same checks as the decoder (percent ranges, unique
//! ids, animation depth), with the same errors and field paths, so anything
//! it produces parses back.

use crate::{
    animation::{Animation, Vec4iAnimation},
    description::{find_duplicate_id, InitialSymbol, InitialTile, InitialUnit},
    geometry::Vec4i,
    message::DominoMessage,
    pattern::{Location, Pattern},
    wire::{join, WireError, PERCENT_RANGE},
    WireConfig,
};
use serde_json::{json, Value};

fn color(color: Vec4i) -> Value {
    json!(color.to_array())
}

fn location(location: Location) -> Value {
    json!({
        "group_x": location.group_x(),
        "group_y": location.group_y(),
        "index_in_group": location.index_in_group(),
    })
}

fn pattern(pattern: &Pattern) -> Result<Value, WireError> {
    serde_json::to_value(pattern).map_err(|err| WireError::PatternSchema {
        field: "pattern".into(),
        message: err.to_string(),
    })
}

fn percent(value: i32, field: &str) -> Result<i32, WireError> {
    if PERCENT_RANGE.contains(value) {
        Ok(value)
    } else {
        Err(WireError::OutOfRange {
            field: field.to_owned(),
            value,
            range: PERCENT_RANGE,
        })
    }
}

/// Encodes messages under a given animation depth limit
pub(super) struct Encoder {
    max_depth: usize,
}

impl Encoder {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    fn animation(
        &self,
        animation: &Vec4iAnimation,
        field: &str,
    ) -> Result<Value, WireError> {
        self.animation_at(animation, field, 1)
    }

    fn animation_at(
        &self,
        animation: &Vec4iAnimation,
        field: &str,
        depth: usize,
    ) -> Result<Value, WireError> {
        if depth > self.max_depth {
            return Err(WireError::MaxDepthExceeded {
                field: field.to_owned(),
                max_depth: self.max_depth,
            });
        }
        let (anim_type, left, right) = match animation {
            Animation::Constant(value) => return Ok(color(*value)),
            Animation::Add(left, right) => ("add", left, right),
            Animation::Multiply(left, right) => ("multiply", left, right),
            Animation::Divide(left, right) => ("divide", left, right),
            Animation::Leaf(leaf) => {
                return Err(WireError::UnencodableAnimation(leaf.kind()))
            }
        };
        let left = self.animation_at(left, &join(field, "left"), depth + 1)?;
        let right =
            self.animation_at(right, &join(field, "right"), depth + 1)?;
        Ok(json!({"type": anim_type, "left": left, "right": right}))
    }

    fn symbol(
        &self,
        symbol: &InitialSymbol,
        field: &str,
    ) -> Result<Value, WireError> {
        let outline = match &symbol.outline {
            Some(outline) => json!({
                "mode": <&'static str>::from(outline.mode),
                "color": self.animation(
                    &outline.color,
                    &join(field, "outline.color"),
                )?,
            }),
            None => Value::Null,
        };
        let sides = match &symbol.sides {
            Some(sides) => json!({
                "depth_percent": sides.depth_percent,
                "color": self.animation(
                    &sides.color,
                    &join(field, "sides.color"),
                )?,
            }),
            None => Value::Null,
        };
        Ok(json!({
            "glyph": {
                "font": symbol.glyph.font,
                "codepoint": symbol.glyph.codepoint,
                "color": self.animation(
                    &symbol.glyph.color,
                    &join(field, "glyph.color"),
                )?,
            },
            "outline": outline,
            "sides": sides,
            "rotation_percent": symbol.rotation_percent,
            "size_percent": symbol.size_percent,
        }))
    }

    fn optional_symbol(
        &self,
        optional: &Option<InitialSymbol>,
        field: &str,
    ) -> Result<Value, WireError> {
        match optional {
            Some(symbol) => self.symbol(symbol, field),
            None => Ok(Value::Null),
        }
    }

    fn symbol_list(
        &self,
        pairs: &[(u64, InitialSymbol)],
        field: &str,
    ) -> Result<Value, WireError> {
        let entries = pairs
            .iter()
            .enumerate()
            .map(|(i, (id, sym))| -> Result<Value, WireError> {
                let entry_path = format!("{}[{}]", field, i);
                let symbol = self.symbol(sym, &join(&entry_path, "symbol"))?;
                Ok(json!({"id": id, "symbol": symbol}))
            })
            .collect::<Result<Vec<Value>, WireError>>()?;
        match find_duplicate_id(pairs) {
            Some(id) => Err(WireError::DuplicateId {
                field: field.to_owned(),
                id,
            }),
            None => Ok(Value::Array(entries)),
        }
    }

    fn tile(
        &self,
        tile: &InitialTile,
        field: &str,
    ) -> Result<Value, WireError> {
        let path = |name: &str| join(field, name);
        let top_color = self.animation(&tile.top_color, &path("top_color"))?;
        let side_color =
            self.animation(&tile.side_color, &path("side_color"))?;
        let overlay = self.optional_symbol(&tile.overlay, &path("overlay"))?;
        let feature = self.optional_symbol(&tile.feature, &path("feature"))?;
        Ok(json!({
            "location": location(tile.location),
            "elevation": tile.elevation,
            "top_color": top_color,
            "side_color": side_color,
            "overlay": overlay,
            "feature": feature,
            "items": self.symbol_list(&tile.items, &path("items"))?,
        }))
    }

    fn unit(
        &self,
        unit: &InitialUnit,
        field: &str,
    ) -> Result<Value, WireError> {
        let path = |name: &str| join(field, name);
        let top_color = self.animation(&unit.top_color, &path("top_color"))?;
        let side_color =
            self.animation(&unit.side_color, &path("side_color"))?;
        Ok(json!({
            "location": location(unit.location),
            "top_color": top_color,
            "side_color": side_color,
            "face": self.symbol(&unit.face, &path("face"))?,
            "details": self.symbol_list(&unit.details, &path("details"))?,
            "hp_percent": percent(unit.hp_percent, &path("hp_percent"))?,
            "mp_percent": percent(unit.mp_percent, &path("mp_percent"))?,
        }))
    }

    /// Encode a whole message, `command_type` included
    pub fn message(
        &self,
        message: &DominoMessage,
    ) -> Result<Value, WireError> {
        let mut value = match message {
            DominoMessage::SetupGame {
                pattern: p,
                elevation_step_height,
                elevation_step_seconds_ms,
            } => json!({
                "pattern": pattern(p)?,
                "elevation_step_height": elevation_step_height,
                "elevation_step_seconds_ms": elevation_step_seconds_ms,
            }),
            DominoMessage::CreateTile {
                tile_view_id,
                initial_tile,
            } => json!({
                "tile_view_id": tile_view_id,
                "initial_tile": self.tile(initial_tile, "initial_tile")?,
            }),
            DominoMessage::CreateUnit {
                unit_view_id,
                initial_unit,
            } => json!({
                "unit_view_id": unit_view_id,
                "initial_unit": self.unit(initial_unit, "initial_unit")?,
            }),
            DominoMessage::MakePanel {
                panel_view_id,
                parent_view_id,
                x,
                y,
                width,
                height,
                background_color,
            } => json!({
                "panel_view_id": panel_view_id,
                "parent_view_id": parent_view_id,
                "x": x,
                "y": y,
                "width": width,
                "height": height,
                "background_color": self
                    .animation(background_color, "background_color")?,
            }),
            DominoMessage::ScheduleClose {
                view_id,
                start_ms_from_now,
            } => json!({
                "view_id": view_id,
                "start_ms_from_now": start_ms_from_now,
            }),
            DominoMessage::RemoveView { view_id } => {
                json!({ "view_id": view_id })
            }
            DominoMessage::SetOpacity {
                view_id,
                opacity_percent,
            } => json!({
                "view_id": view_id,
                "opacity_percent": percent(
                    *opacity_percent,
                    "opacity_percent",
                )?,
            }),
            DominoMessage::SetFadeIn {
                view_id,
                fade_in_end_ms_from_now,
            } => json!({
                "view_id": view_id,
                "fade_in_end_ms_from_now": fade_in_end_ms_from_now,
            }),
            DominoMessage::SetFadeOut {
                view_id,
                fade_out_start_ms_from_now,
                fade_out_end_ms_from_now,
            } => json!({
                "view_id": view_id,
                "fade_out_start_ms_from_now": fade_out_start_ms_from_now,
                "fade_out_end_ms_from_now": fade_out_end_ms_from_now,
            }),
            DominoMessage::AddButton {
                new_view_id,
                parent_view_id,
                x,
                y,
                width,
                height,
                color,
                on_clicked_event_id,
            } => json!({
                "new_view_id": new_view_id,
                "parent_view_id": parent_view_id,
                "x": x,
                "y": y,
                "width": width,
                "height": height,
                "color": self.animation(color, "color")?,
                "on_clicked_event_id": on_clicked_event_id,
            }),
            DominoMessage::AddRectangle {
                new_view_id,
                parent_view_id,
                x,
                y,
                width,
                height,
                color,
            } => json!({
                "new_view_id": new_view_id,
                "parent_view_id": parent_view_id,
                "x": x,
                "y": y,
                "width": width,
                "height": height,
                "color": self.animation(color, "color")?,
            }),
            DominoMessage::AddSymbol {
                new_view_id,
                parent_view_id,
                x,
                y,
                width,
                height,
                symbol: sym,
            } => json!({
                "new_view_id": new_view_id,
                "parent_view_id": parent_view_id,
                "x": x,
                "y": y,
                "width": width,
                "height": height,
                "symbol": self.symbol(sym, "symbol")?,
            }),
            DominoMessage::SetOverlay {
                tile_view_id,
                overlay,
            } => json!({
                "tile_view_id": tile_view_id,
                "overlay": self.optional_symbol(overlay, "overlay")?,
            }),
            DominoMessage::SetFeature {
                tile_view_id,
                feature,
            } => json!({
                "tile_view_id": tile_view_id,
                "feature": self.optional_symbol(feature, "feature")?,
            }),
            DominoMessage::SetCliffColor {
                tile_view_id,
                color,
            }
            | DominoMessage::SetSurfaceColor {
                tile_view_id,
                color,
            } => json!({
                "tile_view_id": tile_view_id,
                "color": self.animation(color, "color")?,
            }),
            DominoMessage::SetElevation {
                tile_view_id,
                elevation,
            } => json!({
                "tile_view_id": tile_view_id,
                "elevation": elevation,
            }),
            DominoMessage::AddItem {
                tile_view_id,
                item_id,
                symbol: sym,
            } => json!({
                "tile_view_id": tile_view_id,
                "item_id": item_id,
                "symbol": self.symbol(sym, "symbol")?,
            }),
            DominoMessage::RemoveItem {
                tile_view_id,
                item_id,
            } => json!({
                "tile_view_id": tile_view_id,
                "item_id": item_id,
            }),
            DominoMessage::AddDetail {
                unit_view_id,
                detail_id,
                symbol: sym,
            } => json!({
                "unit_view_id": unit_view_id,
                "detail_id": detail_id,
                "symbol": self.symbol(sym, "symbol")?,
            }),
            DominoMessage::RemoveDetail {
                unit_view_id,
                detail_id,
            } => json!({
                "unit_view_id": unit_view_id,
                "detail_id": detail_id,
            }),
            DominoMessage::ClearItems { tile_view_id }
            | DominoMessage::DestroyTile { tile_view_id } => {
                json!({ "tile_view_id": tile_view_id })
            }
            DominoMessage::DestroyUnit { unit_view_id } => {
                json!({ "unit_view_id": unit_view_id })
            }
        };

        // Every arm above builds an object
        if let Value::Object(map) = &mut value {
            map.insert(
                "command_type".into(),
                Value::from(message.kind().to_string()),
            );
        }
        Ok(value)
    }
}

/// Encode a message into its wire form, checked against the default
/// [WireConfig]. Fails on anything the decoder would reject, and on animations
/// containing an engine-side leaf, since leaves have no wire form. Use
/// [CommandParser::encode_command](super::CommandParser::encode_command) to
/// check against a different config.
pub fn to_wire(message: &DominoMessage) -> Result<Value, WireError> {
    Encoder::new(WireConfig::default().max_animation_depth).message(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::LinearAnimation;

    #[test]
    fn test_canonical_animation() {
        let anim: Vec4iAnimation = Animation::multiply(
            Vec4i::rgb(1, 2, 3).into(),
            Animation::constant(Vec4i::new(4, 5, 6, 7)),
        );
        assert_eq!(
            Encoder::new(8).animation(&anim, "color"),
            Ok(json!({
                "type": "multiply",
                "left": [1, 2, 3, 255],
                "right": [4, 5, 6, 7],
            }))
        );
    }

    #[test]
    fn test_leaf_is_unencodable() {
        let anim = Animation::add(
            Vec4i::BLACK.into(),
            Animation::leaf(LinearAnimation {
                from: Vec4i::BLACK,
                to: Vec4i::WHITE,
                start_ms: 0,
                end_ms: 100,
            }),
        );
        let message = DominoMessage::SetCliffColor {
            tile_view_id: 3,
            color: anim,
        };
        assert_eq!(
            to_wire(&message),
            Err(WireError::UnencodableAnimation("linear"))
        );
    }

    #[test]
    fn test_command_type() {
        let value = to_wire(&DominoMessage::DestroyUnit { unit_view_id: 9 });
        assert_eq!(
            value,
            Ok(json!({"command_type": "DestroyUnit", "unit_view_id": 9}))
        );
    }

    fn symbol() -> InitialSymbol {
        InitialSymbol::plain("f", 65, Vec4i::BLACK.into())
    }

    fn unit(hp_percent: i32, mp_percent: i32) -> DominoMessage {
        DominoMessage::CreateUnit {
            unit_view_id: 1,
            initial_unit: InitialUnit {
                location: Location::new(0, 0, 0),
                top_color: Vec4i::WHITE.into(),
                side_color: Vec4i::BLACK.into(),
                face: symbol(),
                details: vec![],
                hp_percent,
                mp_percent,
            },
        }
    }

    #[test]
    fn test_percent_range() {
        let opacity = |opacity_percent| {
            to_wire(&DominoMessage::SetOpacity {
                view_id: 1,
                opacity_percent,
            })
        };
        assert!(opacity(0).is_ok());
        assert!(opacity(100).is_ok());
        assert_eq!(
            opacity(150),
            Err(WireError::OutOfRange {
                field: "opacity_percent".into(),
                value: 150,
                range: PERCENT_RANGE,
            })
        );
        assert_eq!(
            to_wire(&unit(-1, 50)),
            Err(WireError::OutOfRange {
                field: "initial_unit.hp_percent".into(),
                value: -1,
                range: PERCENT_RANGE,
            })
        );
        assert_eq!(
            to_wire(&unit(100, 101)),
            Err(WireError::OutOfRange {
                field: "initial_unit.mp_percent".into(),
                value: 101,
                range: PERCENT_RANGE,
            })
        );
    }

    #[test]
    fn test_duplicate_ids() {
        let message = DominoMessage::CreateTile {
            tile_view_id: 1,
            initial_tile: InitialTile {
                location: Location::new(0, 0, 0),
                elevation: 0,
                top_color: Vec4i::WHITE.into(),
                side_color: Vec4i::BLACK.into(),
                overlay: None,
                feature: None,
                items: vec![(5, symbol()), (6, symbol()), (5, symbol())],
            },
        };
        assert_eq!(
            to_wire(&message),
            Err(WireError::DuplicateId {
                field: "initial_tile.items".into(),
                id: 5
            })
        );
    }

    #[test]
    fn test_max_depth() {
        let mut anim: Vec4iAnimation = Vec4i::BLACK.into();
        for _ in 1..4 {
            anim = Animation::multiply(anim, Vec4i::ONE.into());
        }
        assert!(Encoder::new(4).animation(&anim, "color").is_ok());
        assert_eq!(
            Encoder::new(3).animation(&anim, "color"),
            Err(WireError::MaxDepthExceeded {
                field: "color.left.left.left".into(),
                max_depth: 3
            })
        );
    }
}
