//! Global configuration models for `.clipflow/config.toml`.

use serde::Deserialize;
use serde::Serialize;
use ts_rs::TS;

/// Represents global settings from `.clipflow/config.toml`.
///
/// # Example
///
/// ```toml
/// # .clipflow/config.toml
/// database = "clipflow.db"
/// event_capacity = 256
/// stats_window = 10
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct GlobalConfig {
    /// SQLite database file, relative to the project root.
    ///
    /// When absent, processes and history are kept in memory only.
    #[serde(default)]
    pub database: Option<String>,

    /// Buffer size of the lifecycle event channel.
    ///
    /// Slow subscribers that fall further behind than this miss events.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Number of most recent executions considered by process statistics.
    #[serde(default = "default_stats_window")]
    pub stats_window: usize,
}

fn default_event_capacity() -> usize {
    256
}

fn default_stats_window() -> usize {
    10
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            database: None,
            event_capacity: default_event_capacity(),
            stats_window: default_stats_window(),
        }
    }
}
