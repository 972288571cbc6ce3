//! Sliding-window conversation history.
//!
//! A `Conversation` keeps the system entry first, appends timestamped
//! user/assistant messages in order, and hands out the most recent N
//! entries as request context.

mod conversation;
mod types;


pub use conversation::Conversation;
pub use types::HistoryState;
