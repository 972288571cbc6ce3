//! Chat sessions.
//!
//! A `ChatSession` is the explicit per-client state: id, conversation,
//! runtime settings and the optional CSV log. The hosting server creates
//! one per connection and drops it on disconnect.

mod chat;
mod manager;
mod types;

pub use manager::ChatSession;
pub use types::{ChatSettings, SettingsUpdate, TurnKind, TurnOutcome};
