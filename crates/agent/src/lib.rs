//! Agents for minion: single-purpose specialists and the recipe orchestrator.
//!
//! A turn flows **classify → delegate → compose**:
//!
//! 1. **Classify** the user's text into an [`Intent`]
//! 2. **Delegate** to the specialized agents the route table names, in order
//! 3. **Compose** one reply from their outputs
//!
//! Only the final reply reaches the session thread. The delegated exchanges
//! stay on a per-turn scratch thread.

pub mod catalog;
pub mod intent;
pub mod orchestrator;
pub mod recipe;
pub mod registry;
pub mod session;
pub mod specialist;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use intent::{Intent, IntentClassifier, ModelClassifier, RuleClassifier};
pub use orchestrator::{Orchestrator, Step, TurnReply};
pub use recipe::Recipe;
pub use registry::AgentRegistry;
pub use session::{Session, SessionContext};
pub use specialist::{AgentReply, SpecializedAgent};
