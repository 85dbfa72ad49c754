//! Agent registry: the capabilities an orchestrator may delegate to.

use std::collections::HashMap;

use minion_core::error::{Error, Result};
use tracing::debug;

use crate::specialist::SpecializedAgent;

/// Name-keyed agents, kept in registration order.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    agents: HashMap<String, SpecializedAgent>,
    order: Vec<String>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent. Names must be unique within the registry.
    pub fn register(&mut self, agent: SpecializedAgent) -> Result<()> {
        let name = agent.name().to_string();
        if self.agents.contains_key(&name) {
            return Err(Error::config(format!("agent '{name}' is already registered")));
        }
        debug!(agent = %name, model = %agent.model(), "Registered agent");
        self.order.push(name.clone());
        self.agents.insert(name, agent);
        Ok(())
    }

    /// Builder-style registration for startup code.
    pub fn with(mut self, agent: SpecializedAgent) -> Result<Self> {
        self.register(agent)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&SpecializedAgent> {
        self.agents.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }

    /// Agent names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
