//! Specialized agents: one instruction template per capability.
//!
//! A `SpecializedAgent` binds a fixed system prompt (and optionally
//! server-side tools) to the remote provider. Invoking it records the
//! exchange in a thread, but only once the remote call has succeeded.

use std::sync::Arc;

use minion_core::error::{Error, Result};
use minion_core::message::{Message, Thread};
use minion_core::provider::{CompletionRequest, Provider, Usage};
use minion_core::tool::ToolSpec;
use tracing::debug;

/// What one invocation produced.
#[derive(Debug, Clone)]
pub struct AgentReply {
    pub text: String,
    pub usage: Option<Usage>,
}

/// A named single-purpose agent.
#[derive(Clone)]
pub struct SpecializedAgent {
    name: String,
    instructions: String,
    model: String,
    tools: Vec<ToolSpec>,
    temperature: Option<f32>,
    include_history: bool,
    provider: Arc<dyn Provider>,
}

impl std::fmt::Debug for SpecializedAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecializedAgent")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("provider", &self.provider.name())
            .field("tools", &self.tools)
            .field("include_history", &self.include_history)
            .finish()
    }
}

impl SpecializedAgent {
    /// Create an agent. Name, instructions and model must be non-blank.
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        model: impl Into<String>,
        provider: Arc<dyn Provider>,
    ) -> Result<Self> {
        let name = name.into();
        let instructions = instructions.into();
        let model = model.into();

        if name.trim().is_empty() {
            return Err(Error::config("agent name must not be empty"));
        }
        if instructions.trim().is_empty() {
            return Err(Error::config(format!("agent '{name}' has empty instructions")));
        }
        if model.trim().is_empty() {
            return Err(Error::config(format!("agent '{name}' has no model deployment")));
        }

        Ok(Self {
            name,
            instructions,
            model,
            tools: Vec::new(),
            temperature: None,
            include_history: false,
            provider,
        })
    }

    /// Declare server-side tools sent with every request.
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Send the thread's earlier messages along with each new input.
    pub fn with_history(mut self, include_history: bool) -> Self {
        self.include_history = include_history;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn tools(&self) -> &[ToolSpec] {
        &self.tools
    }

    /// Run the capability on `input`.
    ///
    /// On success exactly two messages are appended to `thread` (the user
    /// input, then the reply). On failure the thread is left untouched.
    pub async fn invoke(&self, input: &str, thread: &mut Thread) -> Result<AgentReply> {
        let user = Message::user(input);

        let mut messages = if self.include_history {
            thread.messages().to_vec()
        } else {
            Vec::new()
        };
        messages.push(user.clone());

        let request = CompletionRequest {
            model: self.model.clone(),
            instructions: self.instructions.clone(),
            input: messages,
            tools: self.tools.clone(),
            temperature: self.temperature,
            max_output_tokens: None,
        };

        debug!(
            agent = %self.name,
            model = %self.model,
            history = self.include_history,
            input_chars = input.len(),
            "Invoking agent"
        );

        let response = self.provider.complete(request).await.map_err(|e| {
            debug!(agent = %self.name, error = %e, "Agent call failed");
            e
        })?;

        if let Some(usage) = &response.usage {
            debug!(
                agent = %self.name,
                input_tokens = usage.input_tokens(),
                output_tokens = usage.output_tokens(),
                total_tokens = usage.total_tokens(),
                "Agent call complete"
            );
        }

        thread.push(user);
        thread.push(Message::assistant(response.output_text.clone()));

        Ok(AgentReply {
            text: response.output_text,
            usage: response.usage,
        })
    }
}
