use crate::{
    animation::{TimeMs, Vec4iAnimation},
    description::{InitialSymbol, InitialTile, InitialUnit},
    pattern::Pattern,
};
use strum::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

/// The kind of a [DominoMessage], without any of its data. The string form of
/// each kind is the `command_type` used on the wire.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumCount,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
pub enum CommandKind {
    SetupGame,
    CreateTile,
    CreateUnit,
    MakePanel,
    ScheduleClose,
    RemoveView,
    SetOpacity,
    SetFadeIn,
    SetFadeOut,
    AddButton,
    AddRectangle,
    AddSymbol,
    SetOverlay,
    SetFeature,
    SetCliffColor,
    SetSurfaceColor,
    SetElevation,
    AddItem,
    RemoveItem,
    ClearItems,
    AddDetail,
    RemoveDetail,
    DestroyTile,
    DestroyUnit,
}

/// A single scene mutation, sent from game logic to the engine. Messages are
/// built once, queued, and never modified.
///
/// Ids are allocated by the game side (see
/// [Connection::next_id](crate::Connection::next_id)). Later messages in a
/// batch may refer to views, tiles, or units created by earlier ones.
#[derive(Clone, Debug, PartialEq)]
pub enum DominoMessage {
    /// Must come before anything else. Sets the tiling pattern and how
    /// elevation steps map to world space.
    SetupGame {
        pattern: Pattern,
        elevation_step_height: i32,
        elevation_step_seconds_ms: i32,
    },
    CreateTile {
        tile_view_id: u64,
        initial_tile: InitialTile,
    },
    CreateUnit {
        unit_view_id: u64,
        initial_unit: InitialUnit,
    },
    /// Create a UI panel, optionally nested in another view
    MakePanel {
        panel_view_id: u64,
        parent_view_id: u64,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        background_color: Vec4iAnimation,
    },
    /// Close a view some time from now
    ScheduleClose {
        view_id: u64,
        start_ms_from_now: TimeMs,
    },
    RemoveView {
        view_id: u64,
    },
    SetOpacity {
        view_id: u64,
        opacity_percent: i32,
    },
    SetFadeIn {
        view_id: u64,
        fade_in_end_ms_from_now: TimeMs,
    },
    SetFadeOut {
        view_id: u64,
        fade_out_start_ms_from_now: TimeMs,
        fade_out_end_ms_from_now: TimeMs,
    },
    /// Add a clickable button. Clicking it triggers the given event on the
    /// game side.
    AddButton {
        new_view_id: u64,
        parent_view_id: u64,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        color: Vec4iAnimation,
        on_clicked_event_id: u64,
    },
    AddRectangle {
        new_view_id: u64,
        parent_view_id: u64,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        color: Vec4iAnimation,
    },
    AddSymbol {
        new_view_id: u64,
        parent_view_id: u64,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        symbol: InitialSymbol,
    },
    /// Set or clear (with `None`) the overlay symbol of a tile
    SetOverlay {
        tile_view_id: u64,
        overlay: Option<InitialSymbol>,
    },
    /// Set or clear (with `None`) the feature symbol of a tile
    SetFeature {
        tile_view_id: u64,
        feature: Option<InitialSymbol>,
    },
    SetCliffColor {
        tile_view_id: u64,
        color: Vec4iAnimation,
    },
    SetSurfaceColor {
        tile_view_id: u64,
        color: Vec4iAnimation,
    },
    SetElevation {
        tile_view_id: u64,
        elevation: i32,
    },
    AddItem {
        tile_view_id: u64,
        item_id: u64,
        symbol: InitialSymbol,
    },
    RemoveItem {
        tile_view_id: u64,
        item_id: u64,
    },
    ClearItems {
        tile_view_id: u64,
    },
    AddDetail {
        unit_view_id: u64,
        detail_id: u64,
        symbol: InitialSymbol,
    },
    RemoveDetail {
        unit_view_id: u64,
        detail_id: u64,
    },
    DestroyTile {
        tile_view_id: u64,
    },
    DestroyUnit {
        unit_view_id: u64,
    },
}

impl DominoMessage {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::SetupGame { .. } => CommandKind::SetupGame,
            Self::CreateTile { .. } => CommandKind::CreateTile,
            Self::CreateUnit { .. } => CommandKind::CreateUnit,
            Self::MakePanel { .. } => CommandKind::MakePanel,
            Self::ScheduleClose { .. } => CommandKind::ScheduleClose,
            Self::RemoveView { .. } => CommandKind::RemoveView,
            Self::SetOpacity { .. } => CommandKind::SetOpacity,
            Self::SetFadeIn { .. } => CommandKind::SetFadeIn,
            Self::SetFadeOut { .. } => CommandKind::SetFadeOut,
            Self::AddButton { .. } => CommandKind::AddButton,
            Self::AddRectangle { .. } => CommandKind::AddRectangle,
            Self::AddSymbol { .. } => CommandKind::AddSymbol,
            Self::SetOverlay { .. } => CommandKind::SetOverlay,
            Self::SetFeature { .. } => CommandKind::SetFeature,
            Self::SetCliffColor { .. } => CommandKind::SetCliffColor,
            Self::SetSurfaceColor { .. } => CommandKind::SetSurfaceColor,
            Self::SetElevation { .. } => CommandKind::SetElevation,
            Self::AddItem { .. } => CommandKind::AddItem,
            Self::RemoveItem { .. } => CommandKind::RemoveItem,
            Self::ClearItems { .. } => CommandKind::ClearItems,
            Self::AddDetail { .. } => CommandKind::AddDetail,
            Self::RemoveDetail { .. } => CommandKind::RemoveDetail,
            Self::DestroyTile { .. } => CommandKind::DestroyTile,
            Self::DestroyUnit { .. } => CommandKind::DestroyUnit,
        }
    }
}
