//! Server-side tool declarations.
//!
//! Unlike client-side function calling, these tools run inside the hosted
//! provider before it returns text. The caller only declares them; it never
//! sees the intermediate tool steps.

use serde::{Deserialize, Serialize};

/// How much search context the provider should gather.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchContextSize {
    Low,
    #[default]
    Medium,
    High,
}

/// A tool the provider may run on its side of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolSpec {
    /// Live web search.
    #[serde(rename = "web_search_preview")]
    WebSearch {
        #[serde(rename = "search_context_size", default)]
        context_size: SearchContextSize,
    },
}

impl ToolSpec {
    /// Web search with the given context size.
    pub fn web_search(context_size: SearchContextSize) -> Self {
        Self::WebSearch { context_size }
    }

    /// The provider-facing tool type name.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolSpec::WebSearch { .. } => "web_search_preview",
        }
    }
}
