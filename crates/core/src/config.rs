use serde::{Deserialize, Serialize};
use validator::Validate;

/// Top-level configuration for a Domino host. Every section has sane
/// defaults, so an empty config file is valid.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DominoConfig {
    /// Config for the JSON wire codec
    #[validate]
    pub wire: WireConfig,

    /// Config for the message queue and event registry
    #[validate]
    pub connection: ConnectionConfig,
}

/// Configuration for parsing messages off the wire
#[derive(Copy, Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct WireConfig {
    /// The deepest animation tree the parser will accept, counting the root.
    /// Animations are parsed recursively, so this bounds how much stack a
    /// single hostile message can eat. A bare color has depth 1.
    #[validate(range(min = 1, max = 1024))]
    pub max_animation_depth: usize,
}

/// Configuration for a [Connection](crate::Connection)
#[derive(Copy, Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Once the pending queue holds more than this many messages, every
    /// enqueue logs a warning. Usually means nobody is draining the queue.
    #[validate(range(min = 1))]
    pub warn_queue_len: usize,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            max_animation_depth: 64,
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            warn_queue_len: 10_000,
        }
    }
}
