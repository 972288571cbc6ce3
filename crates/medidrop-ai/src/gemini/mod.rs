//! Google generative-language API client.
//!
//! Implements the `CompletionClient` trait against the single-prompt
//! `:generate` endpoint.

mod api;
mod client;
mod config;

pub use client::GeminiClient;
pub use config::GeminiConfig;
