use crate::{
    animation::{TimeMs, Vec4iAnimation},
    description::{InitialSymbol, InitialTile, InitialUnit},
    message::{CommandKind, DominoMessage},
    pattern::Pattern,
    DominoError,
};
use log::warn;

/// The engine side of the protocol. Each message variant has a matching
/// method, called by [dispatch] with the message's fields.
///
/// Every method defaults to failing with
/// [DominoError::UnimplementedVariant], so a presenter can be built up one
/// variant at a time and anything it doesn't handle yet is reported rather
/// than silently dropped.
#[allow(unused_variables)]
pub trait Presenter {
    fn setup_game(
        &mut self,
        pattern: Pattern,
        elevation_step_height: i32,
        elevation_step_seconds_ms: i32,
    ) -> Result<(), DominoError> {
        Err(DominoError::UnimplementedVariant(CommandKind::SetupGame))
    }

    fn create_tile(
        &mut self,
        tile_view_id: u64,
        initial_tile: InitialTile,
    ) -> Result<(), DominoError> {
        Err(DominoError::UnimplementedVariant(CommandKind::CreateTile))
    }

    fn create_unit(
        &mut self,
        unit_view_id: u64,
        initial_unit: InitialUnit,
    ) -> Result<(), DominoError> {
        Err(DominoError::UnimplementedVariant(CommandKind::CreateUnit))
    }

    #[allow(clippy::too_many_arguments)]
    fn make_panel(
        &mut self,
        panel_view_id: u64,
        parent_view_id: u64,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        background_color: Vec4iAnimation,
    ) -> Result<(), DominoError> {
        Err(DominoError::UnimplementedVariant(CommandKind::MakePanel))
    }

    fn schedule_close(
        &mut self,
        view_id: u64,
        start_ms_from_now: TimeMs,
    ) -> Result<(), DominoError> {
        Err(DominoError::UnimplementedVariant(CommandKind::ScheduleClose))
    }

    fn remove_view(&mut self, view_id: u64) -> Result<(), DominoError> {
        Err(DominoError::UnimplementedVariant(CommandKind::RemoveView))
    }

    fn set_opacity(
        &mut self,
        view_id: u64,
        opacity_percent: i32,
    ) -> Result<(), DominoError> {
        Err(DominoError::UnimplementedVariant(CommandKind::SetOpacity))
    }

    fn set_fade_in(
        &mut self,
        view_id: u64,
        fade_in_end_ms_from_now: TimeMs,
    ) -> Result<(), DominoError> {
        Err(DominoError::UnimplementedVariant(CommandKind::SetFadeIn))
    }

    fn set_fade_out(
        &mut self,
        view_id: u64,
        fade_out_start_ms_from_now: TimeMs,
        fade_out_end_ms_from_now: TimeMs,
    ) -> Result<(), DominoError> {
        Err(DominoError::UnimplementedVariant(CommandKind::SetFadeOut))
    }

    #[allow(clippy::too_many_arguments)]
    fn add_button(
        &mut self,
        new_view_id: u64,
        parent_view_id: u64,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        color: Vec4iAnimation,
        on_clicked_event_id: u64,
    ) -> Result<(), DominoError> {
        Err(DominoError::UnimplementedVariant(CommandKind::AddButton))
    }

    #[allow(clippy::too_many_arguments)]
    fn add_rectangle(
        &mut self,
        new_view_id: u64,
        parent_view_id: u64,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        color: Vec4iAnimation,
    ) -> Result<(), DominoError> {
        Err(DominoError::UnimplementedVariant(CommandKind::AddRectangle))
    }

    #[allow(clippy::too_many_arguments)]
    fn add_symbol(
        &mut self,
        new_view_id: u64,
        parent_view_id: u64,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        symbol: InitialSymbol,
    ) -> Result<(), DominoError> {
        Err(DominoError::UnimplementedVariant(CommandKind::AddSymbol))
    }

    fn set_overlay(
        &mut self,
        tile_view_id: u64,
        overlay: Option<InitialSymbol>,
    ) -> Result<(), DominoError> {
        Err(DominoError::UnimplementedVariant(CommandKind::SetOverlay))
    }

    fn set_feature(
        &mut self,
        tile_view_id: u64,
        feature: Option<InitialSymbol>,
    ) -> Result<(), DominoError> {
        Err(DominoError::UnimplementedVariant(CommandKind::SetFeature))
    }

    fn set_cliff_color(
        &mut self,
        tile_view_id: u64,
        color: Vec4iAnimation,
    ) -> Result<(), DominoError> {
        Err(DominoError::UnimplementedVariant(CommandKind::SetCliffColor))
    }

    fn set_surface_color(
        &mut self,
        tile_view_id: u64,
        color: Vec4iAnimation,
    ) -> Result<(), DominoError> {
        Err(DominoError::UnimplementedVariant(
            CommandKind::SetSurfaceColor,
        ))
    }

    fn set_elevation(
        &mut self,
        tile_view_id: u64,
        elevation: i32,
    ) -> Result<(), DominoError> {
        Err(DominoError::UnimplementedVariant(CommandKind::SetElevation))
    }

    fn add_item(
        &mut self,
        tile_view_id: u64,
        item_id: u64,
        symbol: InitialSymbol,
    ) -> Result<(), DominoError> {
        Err(DominoError::UnimplementedVariant(CommandKind::AddItem))
    }

    fn remove_item(
        &mut self,
        tile_view_id: u64,
        item_id: u64,
    ) -> Result<(), DominoError> {
        Err(DominoError::UnimplementedVariant(CommandKind::RemoveItem))
    }

    fn clear_items(&mut self, tile_view_id: u64) -> Result<(), DominoError> {
        Err(DominoError::UnimplementedVariant(CommandKind::ClearItems))
    }

    fn add_detail(
        &mut self,
        unit_view_id: u64,
        detail_id: u64,
        symbol: InitialSymbol,
    ) -> Result<(), DominoError> {
        Err(DominoError::UnimplementedVariant(CommandKind::AddDetail))
    }

    fn remove_detail(
        &mut self,
        unit_view_id: u64,
        detail_id: u64,
    ) -> Result<(), DominoError> {
        Err(DominoError::UnimplementedVariant(CommandKind::RemoveDetail))
    }

    fn destroy_tile(&mut self, tile_view_id: u64) -> Result<(), DominoError> {
        Err(DominoError::UnimplementedVariant(CommandKind::DestroyTile))
    }

    fn destroy_unit(&mut self, unit_view_id: u64) -> Result<(), DominoError> {
        Err(DominoError::UnimplementedVariant(CommandKind::DestroyUnit))
    }
}

/// Hand a single message to the matching presenter method
pub fn dispatch<P: Presenter + ?Sized>(
    presenter: &mut P,
    message: DominoMessage,
) -> Result<(), DominoError> {
    match message {
        DominoMessage::SetupGame {
            pattern,
            elevation_step_height,
            elevation_step_seconds_ms,
        } => presenter.setup_game(
            pattern,
            elevation_step_height,
            elevation_step_seconds_ms,
        ),
        DominoMessage::CreateTile {
            tile_view_id,
            initial_tile,
        } => presenter.create_tile(tile_view_id, initial_tile),
        DominoMessage::CreateUnit {
            unit_view_id,
            initial_unit,
        } => presenter.create_unit(unit_view_id, initial_unit),
        DominoMessage::MakePanel {
            panel_view_id,
            parent_view_id,
            x,
            y,
            width,
            height,
            background_color,
        } => presenter.make_panel(
            panel_view_id,
            parent_view_id,
            x,
            y,
            width,
            height,
            background_color,
        ),
        DominoMessage::ScheduleClose {
            view_id,
            start_ms_from_now,
        } => presenter.schedule_close(view_id, start_ms_from_now),
        DominoMessage::RemoveView { view_id } => presenter.remove_view(view_id),
        DominoMessage::SetOpacity {
            view_id,
            opacity_percent,
        } => presenter.set_opacity(view_id, opacity_percent),
        DominoMessage::SetFadeIn {
            view_id,
            fade_in_end_ms_from_now,
        } => presenter.set_fade_in(view_id, fade_in_end_ms_from_now),
        DominoMessage::SetFadeOut {
            view_id,
            fade_out_start_ms_from_now,
            fade_out_end_ms_from_now,
        } => presenter.set_fade_out(
            view_id,
            fade_out_start_ms_from_now,
            fade_out_end_ms_from_now,
        ),
        DominoMessage::AddButton {
            new_view_id,
            parent_view_id,
            x,
            y,
            width,
            height,
            color,
            on_clicked_event_id,
        } => presenter.add_button(
            new_view_id,
            parent_view_id,
            x,
            y,
            width,
            height,
            color,
            on_clicked_event_id,
        ),
        DominoMessage::AddRectangle {
            new_view_id,
            parent_view_id,
            x,
            y,
            width,
            height,
            color,
        } => presenter.add_rectangle(
            new_view_id,
            parent_view_id,
            x,
            y,
            width,
            height,
            color,
        ),
        DominoMessage::AddSymbol {
            new_view_id,
            parent_view_id,
            x,
            y,
            width,
            height,
            symbol,
        } => presenter.add_symbol(
            new_view_id,
            parent_view_id,
            x,
            y,
            width,
            height,
            symbol,
        ),
        DominoMessage::SetOverlay {
            tile_view_id,
            overlay,
        } => presenter.set_overlay(tile_view_id, overlay),
        DominoMessage::SetFeature {
            tile_view_id,
            feature,
        } => presenter.set_feature(tile_view_id, feature),
        DominoMessage::SetCliffColor {
            tile_view_id,
            color,
        } => presenter.set_cliff_color(tile_view_id, color),
        DominoMessage::SetSurfaceColor {
            tile_view_id,
            color,
        } => presenter.set_surface_color(tile_view_id, color),
        DominoMessage::SetElevation {
            tile_view_id,
            elevation,
        } => presenter.set_elevation(tile_view_id, elevation),
        DominoMessage::AddItem {
            tile_view_id,
            item_id,
            symbol,
        } => presenter.add_item(tile_view_id, item_id, symbol),
        DominoMessage::RemoveItem {
            tile_view_id,
            item_id,
        } => presenter.remove_item(tile_view_id, item_id),
        DominoMessage::ClearItems { tile_view_id } => {
            presenter.clear_items(tile_view_id)
        }
        DominoMessage::AddDetail {
            unit_view_id,
            detail_id,
            symbol,
        } => presenter.add_detail(unit_view_id, detail_id, symbol),
        DominoMessage::RemoveDetail {
            unit_view_id,
            detail_id,
        } => presenter.remove_detail(unit_view_id, detail_id),
        DominoMessage::DestroyTile { tile_view_id } => {
            presenter.destroy_tile(tile_view_id)
        }
        DominoMessage::DestroyUnit { unit_view_id } => {
            presenter.destroy_unit(unit_view_id)
        }
    }
}

/// Dispatch a batch of messages in order. A failure only fails its own
/// message: it's logged, and the rest of the batch still runs. Returns the
/// index and error of every message that failed.
pub fn dispatch_batch<P: Presenter + ?Sized>(
    presenter: &mut P,
    messages: impl IntoIterator<Item = DominoMessage>,
) -> Vec<(usize, DominoError)> {
    messages
        .into_iter()
        .enumerate()
        .filter_map(|(index, message)| {
            let kind = message.kind();
            match dispatch(presenter, message) {
                Ok(()) => None,
                Err(err) => {
                    warn!(
                        "Failed to apply {} message {}: {}",
                        kind, index, err
                    );
                    Some((index, err))
                }
            }
        })
        .collect()
}
