//! Intent classification for the recipe orchestrator.
//!
//! Two classifiers sit behind the same trait: deterministic keyword rules,
//! and a model-backed one that asks the remote model for a single label.

use async_trait::async_trait;
use minion_core::error::Result;
use minion_core::message::{Role, Thread};
use minion_core::provider::{CompletionRequest, Provider};
use regex_lite::Regex;
use std::sync::{Arc, LazyLock};
use tracing::debug;

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s<>]+").expect("static regex"));

static SHOPPING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(shopping|grocery|groceries)\b").expect("static regex")
});

static NORMALIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(normali[sz]e|convert|metric|imperial|units?|grams)\b")
        .expect("static regex")
});

static FAREWELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(no|nope|nah|bye|goodbye|thanks|thank you|that's all|that is all|nothing else|all done|done)\b",
    )
    .expect("static regex")
});

/// What the user wants from one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    ExtractRecipe,
    Normalize,
    ShoppingList,
    Unrelated,
    Farewell,
}

impl Intent {
    pub const ALL: [Intent; 5] = [
        Intent::ExtractRecipe,
        Intent::Normalize,
        Intent::ShoppingList,
        Intent::Unrelated,
        Intent::Farewell,
    ];

    /// Wire label used by the model classifier.
    pub fn label(&self) -> &'static str {
        match self {
            Intent::ExtractRecipe => "extract_recipe",
            Intent::Normalize => "normalize",
            Intent::ShoppingList => "shopping_list",
            Intent::Unrelated => "unrelated",
            Intent::Farewell => "farewell",
        }
    }

    /// Parse a label, tolerating case, surrounding punctuation and spaces
    /// in place of underscores.
    pub fn from_label(label: &str) -> Option<Self> {
        let cleaned = label
            .trim()
            .trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .to_ascii_lowercase()
            .replace([' ', '-'], "_");
        Self::ALL.into_iter().find(|i| i.label() == cleaned)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The first http(s) URL in `text`, if any.
pub fn find_url(text: &str) -> Option<&str> {
    URL.find(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ')', ';']))
}

/// Classifies a user turn into an [`Intent`].
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    fn name(&self) -> &str;

    async fn classify(&self, input: &str, thread: &Thread) -> Result<Intent>;
}

/// Deterministic keyword rules. Never calls the network.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleClassifier;

impl RuleClassifier {
    pub fn classify_text(input: &str) -> Intent {
        if find_url(input).is_some() {
            Intent::ExtractRecipe
        } else if SHOPPING.is_match(input) {
            Intent::ShoppingList
        } else if NORMALIZE.is_match(input) {
            Intent::Normalize
        } else if FAREWELL.is_match(input) {
            Intent::Farewell
        } else {
            Intent::Unrelated
        }
    }
}

#[async_trait]
impl IntentClassifier for RuleClassifier {
    fn name(&self) -> &str {
        "rules"
    }

    async fn classify(&self, input: &str, _thread: &Thread) -> Result<Intent> {
        Ok(Self::classify_text(input))
    }
}

const CLASSIFIER_INSTRUCTIONS: &str = "\
You route messages for a recipe assistant. Reply with exactly one label and nothing else.

Labels:
- extract_recipe: the message contains a recipe URL to extract
- normalize: the user wants the ingredients converted to other units or cleaned up
- shopping_list: the user asks for a shopping or grocery list
- farewell: the user says no, thanks, or goodbye
- unrelated: anything else";

/// Asks the remote model for a label; falls back to the rules when the
/// answer is not one of the known labels.
pub struct ModelClassifier {
    provider: Arc<dyn Provider>,
    model: String,
}

impl ModelClassifier {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    fn prompt(input: &str, thread: &Thread) -> String {
        match thread.last_with_role(Role::Assistant) {
            Some(previous) => format!(
                "Previous assistant reply:\n{}\n\nUser message:\n{input}",
                previous.content
            ),
            None => input.to_string(),
        }
    }
}

#[async_trait]
impl IntentClassifier for ModelClassifier {
    fn name(&self) -> &str {
        "model"
    }

    async fn classify(&self, input: &str, thread: &Thread) -> Result<Intent> {
        let request = CompletionRequest::new(
            &self.model,
            CLASSIFIER_INSTRUCTIONS,
            Self::prompt(input, thread),
        )
        .with_temperature(Some(0.0));

        let response = self.provider.complete(request).await?;

        match Intent::from_label(&response.output_text) {
            Some(intent) => Ok(intent),
            None => {
                debug!(label = %response.output_text, "Unrecognized intent label, using rules");
                Ok(RuleClassifier::classify_text(input))
            }
        }
    }
}
