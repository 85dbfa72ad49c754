//! Hosted LLM endpoint clients for minion.
//!
//! All providers implement the `minion_core::Provider` trait.
//! The builder selects the wire dialect based on configuration.

pub mod builder;
pub mod chat_completions;
mod http;
pub mod responses;

#[cfg(test)]
mod test_server;

pub use builder::build_from_config;
pub use chat_completions::ChatCompletionsProvider;
pub use responses::ResponsesProvider;
