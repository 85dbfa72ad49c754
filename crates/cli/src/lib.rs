//! Library side of the `minion` binary: the interactive loop and its
//! responders, shared by the commands and the integration tests.

pub mod repl;

pub use repl::{AgentResponder, LoopStyle, OrchestratorResponder, Reply, Responder};
