//! Domino is the engine-independent core of a tile-based game client. A game
//! logic process describes scene mutations as typed messages, and an engine
//! applies them. This crate contains everything both sides need to agree on:
//! the message set and its JSON wire format, the color animation algebra, and
//! the tiling pattern model. Rendering is implemented elsewhere, behind the
//! [Presenter] trait.
//!
//! ```
//! use domino::{
//!     pattern::presets, CommandParser, Connection, ConnectionConfig,
//!     DominoMessage, WireConfig,
//! };
//! use serde_json::json;
//!
//! let pattern = presets::square();
//! let connection = Connection::new(ConnectionConfig::default()).unwrap();
//! connection.enqueue(DominoMessage::SetupGame {
//!     pattern,
//!     elevation_step_height: 100,
//!     elevation_step_seconds_ms: 500,
//! });
//!
//! // On the other side of the boundary, messages come back in as JSON
//! let parser = CommandParser::new(WireConfig::default()).unwrap();
//! let message = parser
//!     .parse_command(&json!({"command_type": "RemoveView", "view_id": 4}))
//!     .unwrap();
//! assert_eq!(message, DominoMessage::RemoveView { view_id: 4 });
//! ```
//!
//! See [DominoConfig] for the knobs that can be tuned.

mod config;
mod connection;
mod description;
mod message;
mod presenter;
mod util;

pub mod animation;
pub mod geometry;
pub mod pattern;
pub mod wire;

pub use crate::{
    config::{ConnectionConfig, DominoConfig, WireConfig},
    connection::{Connection, ConnectionError, EventHandle, EventSender},
    description::{
        InitialSymbol, InitialSymbolGlyph, InitialSymbolOutline,
        InitialSymbolSides, InitialTile, InitialUnit, OutlineMode,
        SymbolDescription, TileDescription, UnitDescription,
    },
    message::{CommandKind, DominoMessage},
    presenter::{dispatch, dispatch_batch, Presenter},
    util::range::NumRange,
    wire::{CommandParser, WireError},
};
use crate::{animation::AnimationError, pattern::PatternError};
use thiserror::Error;

/// Umbrella error for anything that can go wrong while handling a message.
/// Each subsystem has its own error type; this wraps them so a host can
/// decide per category whether to skip or abort.
#[derive(Debug, Error)]
pub enum DominoError {
    #[error("malformed wire message: {0}")]
    MalformedWire(#[from] WireError),
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] PatternError),
    #[error(transparent)]
    Animation(#[from] AnimationError),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    /// The message kind is known, but nothing handles it yet
    #[error("no handler implemented for {0}")]
    UnimplementedVariant(CommandKind),
}
