//! Session state for one interactive run.

use minion_core::message::Thread;

use crate::recipe::Recipe;

/// Cross-turn state the recipe capabilities read and update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub last_extracted_recipe: Option<Recipe>,
    pub last_normalized_ingredients: Option<Vec<String>>,
}

/// The user-visible thread plus the context, owned by one loop.
#[derive(Debug, Default)]
pub struct Session {
    pub thread: Thread,
    pub context: SessionContext,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }
}
