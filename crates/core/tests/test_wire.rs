use domino::{
    animation::{Animation, Vec4iAnimation},
    geometry::Vec4i,
    pattern::{presets, Location},
    wire::to_wire,
    CommandParser, DominoMessage, InitialSymbol, InitialSymbolOutline,
    InitialSymbolSides, InitialTile, InitialUnit, OutlineMode, WireConfig,
    WireError,
};
use serde_json::{json, Value};

fn parser() -> CommandParser {
    CommandParser::new(WireConfig::default()).unwrap()
}

fn pulse() -> Vec4iAnimation {
    Animation::divide(
        Animation::add(Vec4i::RED.into(), Vec4i::rgb(0, 10, 20).into()),
        Vec4i::new(2, 2, 2, 1).into(),
    )
}

fn fancy_symbol() -> InitialSymbol {
    InitialSymbol {
        outline: Some(InitialSymbolOutline {
            mode: OutlineMode::Centered,
            color: Vec4i::BLACK.into(),
        }),
        sides: Some(InitialSymbolSides {
            depth_percent: 20,
            color: pulse(),
        }),
        rotation_percent: 25,
        size_percent: 80,
        ..InitialSymbol::plain("DejaVuSans", 0x263A, Vec4i::CYAN.into())
    }
}

fn all_messages() -> Vec<DominoMessage> {
    let plain = InitialSymbol::plain("NotoEmoji", 0x1F332, Vec4i::WHITE.into());
    vec![
        DominoMessage::SetupGame {
            pattern: presets::rhombille(),
            elevation_step_height: 250,
            elevation_step_seconds_ms: 400,
        },
        DominoMessage::CreateTile {
            tile_view_id: 0,
            initial_tile: InitialTile {
                location: Location::new(-3, 8, 2),
                elevation: -2,
                top_color: pulse(),
                side_color: Vec4i::BLUE.into(),
                overlay: None,
                feature: Some(plain.clone()),
                items: vec![],
            },
        },
        DominoMessage::CreateTile {
            tile_view_id: u64::MAX,
            initial_tile: InitialTile {
                location: Location::new(0, 0, 0),
                elevation: 0,
                top_color: Vec4i::WHITE.into(),
                side_color: Vec4i::BLACK.into(),
                overlay: Some(fancy_symbol()),
                feature: None,
                items: vec![(1, plain.clone()), (u64::MAX, fancy_symbol())],
            },
        },
        DominoMessage::CreateUnit {
            unit_view_id: 12,
            initial_unit: InitialUnit {
                location: Location::new(1, 1, 1),
                top_color: Vec4i::RED.into(),
                side_color: pulse(),
                face: fancy_symbol(),
                details: vec![],
                hp_percent: 100,
                mp_percent: 0,
            },
        },
        DominoMessage::MakePanel {
            panel_view_id: 20,
            parent_view_id: 0,
            x: -10,
            y: 15,
            width: 300,
            height: 200,
            background_color: Vec4i::new(0, 0, 0, 128).into(),
        },
        DominoMessage::ScheduleClose {
            view_id: 20,
            start_ms_from_now: 1500,
        },
        DominoMessage::RemoveView { view_id: 20 },
        DominoMessage::SetOpacity {
            view_id: 20,
            opacity_percent: 100,
        },
        DominoMessage::SetFadeIn {
            view_id: 20,
            fade_in_end_ms_from_now: 0,
        },
        DominoMessage::SetFadeOut {
            view_id: 20,
            fade_out_start_ms_from_now: 100,
            fade_out_end_ms_from_now: i64::MAX,
        },
        DominoMessage::AddButton {
            new_view_id: 21,
            parent_view_id: 20,
            x: 5,
            y: 5,
            width: 50,
            height: 20,
            color: pulse(),
            on_clicked_event_id: 99,
        },
        DominoMessage::AddRectangle {
            new_view_id: 22,
            parent_view_id: 20,
            x: 0,
            y: 0,
            width: 1,
            height: 1,
            color: Vec4i::ZERO.into(),
        },
        DominoMessage::AddSymbol {
            new_view_id: 23,
            parent_view_id: 0,
            x: 40,
            y: 40,
            width: 32,
            height: 32,
            symbol: fancy_symbol(),
        },
        DominoMessage::SetOverlay {
            tile_view_id: 3,
            overlay: None,
        },
        DominoMessage::SetFeature {
            tile_view_id: 3,
            feature: Some(plain.clone()),
        },
        DominoMessage::SetCliffColor {
            tile_view_id: 3,
            color: pulse(),
        },
        DominoMessage::SetSurfaceColor {
            tile_view_id: 3,
            color: Vec4i::rgb(1, 2, 3).into(),
        },
        DominoMessage::SetElevation {
            tile_view_id: 3,
            elevation: i32::MIN,
        },
        DominoMessage::AddItem {
            tile_view_id: 3,
            item_id: 0,
            symbol: plain.clone(),
        },
        DominoMessage::RemoveItem {
            tile_view_id: 3,
            item_id: 0,
        },
        DominoMessage::ClearItems { tile_view_id: 3 },
        DominoMessage::AddDetail {
            unit_view_id: 12,
            detail_id: 4,
            symbol: plain,
        },
        DominoMessage::RemoveDetail {
            unit_view_id: 12,
            detail_id: 4,
        },
        DominoMessage::DestroyTile { tile_view_id: 3 },
        DominoMessage::DestroyUnit { unit_view_id: 12 },
    ]
}

#[test]
fn test_every_message_round_trips() {
    let parser = parser();
    let messages = all_messages();
    for message in &messages {
        let value = to_wire(message).unwrap();
        assert_eq!(
            &parser.parse_command(&value).unwrap(),
            message,
            "message changed going through {}",
            value
        );
    }

    // Same thing, as one batch
    let batch = messages
        .iter()
        .map(|message| to_wire(message).unwrap())
        .collect::<Vec<_>>();
    assert_eq!(parser.parse_batch(&json!(batch)).unwrap(), messages);
}

#[test]
fn test_lenient_batch_keeps_good_messages() {
    let parser = parser();
    let (messages, errors) = parser.parse_batch_lenient(&json!([
        {"command_type": "RemoveView", "view_id": 1},
        {"command_type": "Explode", "view_id": 2},
        {"command_type": "RemoveView", "view_id": 3},
        {"command_type": "SetOpacity", "view_id": 4, "opacity_percent": 101},
    ]));
    assert_eq!(
        messages,
        vec![
            DominoMessage::RemoveView { view_id: 1 },
            DominoMessage::RemoveView { view_id: 3 },
        ]
    );
    let indexes: Vec<usize> = errors.iter().map(|(index, _)| *index).collect();
    assert_eq!(indexes, vec![1, 3]);
    assert_eq!(errors[0].1, WireError::UnknownCommandKind("Explode".into()));
}

fn unit_with(
    hp_percent: i32,
    mp_percent: i32,
    details: Vec<(u64, InitialSymbol)>,
) -> DominoMessage {
    DominoMessage::CreateUnit {
        unit_view_id: 7,
        initial_unit: InitialUnit {
            location: Location::new(0, 0, 0),
            top_color: Vec4i::WHITE.into(),
            side_color: Vec4i::BLACK.into(),
            face: fancy_symbol(),
            details,
            hp_percent,
            mp_percent,
        },
    }
}

/// Whatever the encoder does with a message, the decoder agrees: either both
/// accept it (and it comes back unchanged) or both reject it the same way
fn assert_codecs_agree(parser: &CommandParser, message: &DominoMessage) {
    match parser.encode_command(message) {
        Ok(value) => {
            assert_eq!(&parser.parse_command(&value).unwrap(), message)
        }
        Err(err) => {
            let value = unchecked_wire(message);
            assert_eq!(parser.parse_command(&value), Err(err));
        }
    }
}

/// Wire forms for the rejected cases below, built by patching a value that
/// encodes fine
fn unchecked_wire(message: &DominoMessage) -> Value {
    match message {
        DominoMessage::SetOpacity {
            view_id,
            opacity_percent,
        } => json!({
            "command_type": "SetOpacity",
            "view_id": view_id,
            "opacity_percent": opacity_percent,
        }),
        DominoMessage::CreateUnit { initial_unit, .. } => {
            // Renumber the details so they're unique, then put the real ids
            // back afterwards
            let details = initial_unit
                .details
                .iter()
                .enumerate()
                .map(|(i, (_, symbol))| (i as u64, symbol.clone()))
                .collect();
            let mut value = to_wire(&unit_with(0, 0, details)).unwrap();
            let unit = &mut value["initial_unit"];
            unit["hp_percent"] = json!(initial_unit.hp_percent);
            unit["mp_percent"] = json!(initial_unit.mp_percent);
            for (i, (id, _)) in initial_unit.details.iter().enumerate() {
                unit["details"][i]["id"] = json!(id);
            }
            value
        }
        other => panic!("no unchecked form for {:?}", other),
    }
}

#[test]
fn test_percent_and_id_boundaries() {
    let parser = parser();
    let plain = || InitialSymbol::plain("f", 65, Vec4i::BLACK.into());
    let mut messages: Vec<DominoMessage> = [-1, 0, 1, 99, 100, 101, 150]
        .iter()
        .map(|&opacity_percent| DominoMessage::SetOpacity {
            view_id: 2,
            opacity_percent,
        })
        .collect();
    messages.extend(vec![
        unit_with(0, 100, vec![]),
        unit_with(100, 0, vec![(1, plain()), (2, plain())]),
        unit_with(101, 50, vec![]),
        unit_with(50, -5, vec![]),
        unit_with(50, 50, vec![(3, plain()), (3, plain())]),
    ]);
    for message in &messages {
        assert_codecs_agree(&parser, message);
    }

    assert_eq!(
        to_wire(&unit_with(50, 50, vec![(3, plain()), (3, plain())])),
        Err(WireError::DuplicateId {
            field: "initial_unit.details".into(),
            id: 3
        })
    );
}

#[test]
fn test_encode_checks_max_depth() {
    let shallow = CommandParser::new(WireConfig {
        max_animation_depth: 2,
    })
    .unwrap();
    let message = DominoMessage::SetCliffColor {
        tile_view_id: 1,
        color: pulse(),
    };
    // pulse() is three levels deep
    assert!(parser().encode_command(&message).is_ok());
    let too_deep = WireError::MaxDepthExceeded {
        field: "color.left.left".into(),
        max_depth: 2,
    };
    assert_eq!(shallow.encode_command(&message), Err(too_deep.clone()));
    let value = to_wire(&message).unwrap();
    assert_eq!(shallow.parse_command(&value), Err(too_deep));
}
