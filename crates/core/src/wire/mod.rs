//! JSON wire format for [DominoMessage]s.
//!
//! Each message is a JSON object with a `command_type` discriminator and one
//! key per field, named in snake_case. Decoding is strict: missing fields,
//! wrong types and non-integral numbers in integer fields are all errors, and
//! every error names the dotted path of the field that caused it (e.g.
//! `initial_tile.items[2].symbol.glyph.color`).
//!
//! ## Colors and animations
//!
//! A color is `[r, g, b]` (alpha defaults to 255), `[r, g, b, a]`,
//! `{"x", "y", "z", "w"}` or `{"red", "green", "blue", "alpha"}`. In the
//! object forms the alpha key is optional.
//!
//! Anywhere an animation is expected, a bare color is accepted as a constant.
//! The full grammar is:
//!
//! ```text
//! animation := color
//!            | {"type": "constant", "val": color}
//!            | {"type": "add" | "multiply" | "divide",
//!               "left": animation, "right": animation}
//! ```
//!
//! Nesting is bounded by [WireConfig::max_animation_depth].

mod read;
mod write;

pub use self::write::to_wire;
use crate::{
    message::{CommandKind, DominoMessage},
    pattern::PatternError,
    timed,
    util::range::NumRange,
    WireConfig,
};
use log::{debug, warn};
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

/// Valid range for the percentages that describe a fraction of something,
/// e.g. opacity or remaining health
const PERCENT_RANGE: NumRange<i32> = NumRange::new(0, 100);

/// Extend a dotted field path
fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_owned()
    } else {
        format!("{}.{}", path, name)
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum WireError {
    #[error("unknown command type {0:?}")]
    UnknownCommandKind(String),
    #[error("missing required field `{0}`")]
    MissingField(String),
    #[error("field `{field}` should be {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },
    #[error("field `{field}` is {value}, outside the range {range}")]
    OutOfRange {
        field: String,
        value: i32,
        range: NumRange<i32>,
    },
    #[error("animation at `{field}` is nested deeper than {max_depth}")]
    MaxDepthExceeded { field: String, max_depth: usize },
    #[error("id {id} appears more than once in `{field}`")]
    DuplicateId { field: String, id: u64 },
    #[error("message batch should be an array")]
    NotAnArray,
    #[error("message {index} in batch: {source}")]
    InBatch {
        index: usize,
        source: Box<WireError>,
    },
    #[error("animation contains a {0:?} leaf, which has no wire form")]
    UnencodableAnimation(&'static str),
    #[error("pattern at `{field}` couldn't be encoded: {message}")]
    PatternSchema { field: String, message: String },
    #[error("pattern at `{field}` is invalid: {source}")]
    InvalidPattern {
        field: String,
        source: PatternError,
    },
}

/// Decodes messages from their JSON wire form
#[derive(Clone, Debug)]
pub struct CommandParser {
    config: WireConfig,
}

impl CommandParser {
    /// Initialize a new parser with the given options. Returns an error if
    /// the config is invalid.
    pub fn new(config: WireConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &WireConfig {
        &self.config
    }

    /// Parse a single message
    pub fn parse_command(
        &self,
        value: &Value,
    ) -> Result<DominoMessage, WireError> {
        let fields = read::ObjectReader::root(
            value,
            self.config.max_animation_depth,
        )?;
        let command_type = fields.string("command_type")?;
        let kind = CommandKind::from_str(&command_type)
            .map_err(|_| WireError::UnknownCommandKind(command_type))?;
        let message = read::message(kind, &fields)?;
        debug!("Parsed {} message", kind);
        Ok(message)
    }

    /// Encode a message, checking animation depth against this parser's
    /// config. Anything this accepts, [CommandParser::parse_command] parses
    /// back to an equal message.
    pub fn encode_command(
        &self,
        message: &DominoMessage,
    ) -> Result<Value, WireError> {
        write::Encoder::new(self.config.max_animation_depth).message(message)
    }

    /// Parse an array of messages, failing on the first bad one. The error
    /// includes the index of the offending message.
    pub fn parse_batch(
        &self,
        value: &Value,
    ) -> Result<Vec<DominoMessage>, WireError> {
        let values = value.as_array().ok_or(WireError::NotAnArray)?;
        let messages: Result<Vec<DominoMessage>, WireError> =
            timed!("Batch parsing", {
                values
                    .iter()
                    .enumerate()
                    .map(|(index, value)| {
                        self.parse_command(value).map_err(|err| {
                            WireError::InBatch {
                                index,
                                source: Box::new(err),
                            }
                        })
                    })
                    .collect()
            });
        messages
    }

    /// Parse an array of messages, skipping (and logging) any bad ones. Each
    /// message stands alone, so one bad message doesn't poison the rest.
    /// Returns the good messages in order, plus the index and error of each
    /// bad one. If the input isn't an array at all, nothing can be parsed and
    /// the only error is [WireError::NotAnArray], at index 0.
    pub fn parse_batch_lenient(
        &self,
        value: &Value,
    ) -> (Vec<DominoMessage>, Vec<(usize, WireError)>) {
        let values = match value.as_array() {
            Some(values) => values,
            None => return (Vec::new(), vec![(0, WireError::NotAnArray)]),
        };

        timed!("Lenient batch parsing", {
            let mut messages = Vec::with_capacity(values.len());
            let mut errors = Vec::new();
            for (index, value) in values.iter().enumerate() {
                match self.parse_command(value) {
                    Ok(message) => messages.push(message),
                    Err(err) => {
                        warn!("Skipping message {}: {}", index, err);
                        errors.push((index, err));
                    }
                }
            }
            (messages, errors)
        })
    }
}
