//! Recipe orchestration: route one user turn to specialized agents.
//!
//! # Flow
//!
//! ```text
//! user text ──▶ IntentClassifier ──▶ Intent
//!                                      │  route table
//!                                      ▼
//!                    [Extract] ─▶ [Normalize] ─▶ compose ──▶ reply
//!                    [Normalize] ────────────▶ compose
//!                    [ShoppingList] ─────────▶ compose
//!                    (no steps) ─────────────▶ polite closing
//! ```
//!
//! Sub-agent exchanges happen on a scratch thread owned by the turn. The
//! session thread only ever receives the user's text and the final reply,
//! and only when the turn produced one.

use std::collections::HashMap;

use minion_core::error::{Error, OrchestrationError, Result};
use minion_core::message::{Message, Thread};
use minion_core::provider::Usage;
use tracing::{debug, info};

use crate::catalog;
use crate::intent::{Intent, IntentClassifier};
use crate::recipe::{Recipe, parse_list, render_list, strip_meta};
use crate::registry::AgentRegistry;
use crate::session::{Session, SessionContext};

const FAREWELL_REPLY: &str = "Happy cooking! Come back any time you have another recipe.";
const UNRELATED_REPLY: &str = "I can only help with recipes. Send me a recipe URL, ask me to convert the ingredients, or ask for a shopping list.";

/// One delegated capability in a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Extract,
    Normalize,
    ShoppingList,
}

impl Step {
    /// Name of the registered agent that performs this step.
    pub fn capability(&self) -> &'static str {
        match self {
            Step::Extract => catalog::RECIPE_EXTRACTOR,
            Step::Normalize => catalog::INGREDIENT_NORMALIZER,
            Step::ShoppingList => catalog::SHOPPING_LIST_GENERATOR,
        }
    }

    /// User-facing wording; agent names never reach the reply.
    fn describe(&self) -> &'static str {
        match self {
            Step::Extract => "recipe extraction",
            Step::Normalize => "ingredient normalization",
            Step::ShoppingList => "the shopping list",
        }
    }
}

fn default_routes() -> HashMap<Intent, &'static [Step]> {
    HashMap::from([
        (
            Intent::ExtractRecipe,
            &[Step::Extract, Step::Normalize] as &'static [Step],
        ),
        (Intent::Normalize, &[Step::Normalize] as &'static [Step]),
        (Intent::ShoppingList, &[Step::ShoppingList] as &'static [Step]),
        (Intent::Unrelated, &[] as &'static [Step]),
        (Intent::Farewell, &[] as &'static [Step]),
    ])
}

fn missing(step: Step, reason: impl Into<String>) -> Error {
    OrchestrationError::MissingDependency {
        capability: step.describe().into(),
        reason: reason.into(),
    }
    .into()
}

/// What one orchestrated turn produced.
#[derive(Debug, Clone)]
pub struct TurnReply {
    /// The composed reply shown to the user.
    pub text: String,
    /// How the turn was routed.
    pub intent: Intent,
    /// Agents invoked, in call order.
    pub invoked: Vec<String>,
    /// Summed usage of every delegated call.
    pub usage: Option<Usage>,
}

/// Intermediate state of a turn. Becomes session context only on success.
struct Turn<'a> {
    input: &'a str,
    intent: Intent,
    scratch: Thread,
    recipe: Option<Recipe>,
    normalized: Option<Vec<String>>,
    shopping_list: Option<Vec<String>>,
    invoked: Vec<String>,
    usage: Option<Usage>,
}

impl<'a> Turn<'a> {
    fn new(input: &'a str, intent: Intent) -> Self {
        Self {
            input,
            intent,
            scratch: Thread::new(),
            recipe: None,
            normalized: None,
            shopping_list: None,
            invoked: Vec::new(),
            usage: None,
        }
    }

    fn add_usage(&mut self, usage: Option<Usage>) {
        self.usage = match (self.usage, usage) {
            (Some(total), Some(more)) => Some(total + more),
            (total, more) => total.or(more),
        };
    }

    fn commit(self, context: &mut SessionContext) {
        if let Some(recipe) = self.recipe {
            context.last_extracted_recipe = Some(recipe);
        }
        if let Some(normalized) = self.normalized {
            context.last_normalized_ingredients = Some(normalized);
        }
    }
}

/// Routes user turns to the registered recipe agents and composes one reply.
pub struct Orchestrator {
    registry: AgentRegistry,
    classifier: Box<dyn IntentClassifier>,
    routes: HashMap<Intent, &'static [Step]>,
}

impl Orchestrator {
    /// Create an orchestrator. Every capability a route names must be
    /// registered.
    pub fn new(registry: AgentRegistry, classifier: Box<dyn IntentClassifier>) -> Result<Self> {
        let routes = default_routes();
        for step in routes.values().flat_map(|steps| steps.iter()) {
            if !registry.contains(step.capability()) {
                return Err(Error::config(format!(
                    "recipe orchestrator needs an agent named '{}'",
                    step.capability()
                )));
            }
        }

        Ok(Self {
            registry,
            classifier,
            routes,
        })
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Handle one user turn.
    ///
    /// Remote errors propagate and leave the session untouched. A missing
    /// upstream result becomes an inability reply instead of a fabricated one.
    pub async fn handle(&self, input: &str, session: &mut Session) -> Result<TurnReply> {
        let intent = self.classifier.classify(input, &session.thread).await?;
        let steps = self.routes.get(&intent).copied().unwrap_or_default();

        info!(
            intent = %intent,
            classifier = self.classifier.name(),
            steps = steps.len(),
            "Routing turn"
        );

        let mut turn = Turn::new(input, intent);
        let outcome = self
            .run_steps(steps, &mut turn, &session.context)
            .await
            .and_then(|()| self.compose(&turn));

        let (text, succeeded) = match outcome {
            Ok(text) => (strip_meta(&text, &self.registry.names()), true),
            Err(Error::Orchestration(OrchestrationError::MissingDependency {
                capability,
                reason,
            })) => {
                info!(%capability, %reason, "Cannot proceed with turn");
                (format!("Sorry, I can't complete that request: {reason}."), false)
            }
            Err(e) => return Err(e),
        };

        session.thread.push(Message::user(input));
        session.thread.push(Message::assistant(text.clone()));

        let invoked = turn.invoked.clone();
        let usage = turn.usage;
        if succeeded {
            turn.commit(&mut session.context);
        }

        debug!(
            intent = %intent,
            invoked = ?invoked,
            total_tokens = usage.map(|u| u.total_tokens()),
            "Turn complete"
        );

        Ok(TurnReply {
            text,
            intent,
            invoked,
            usage,
        })
    }

    async fn run_steps(
        &self,
        steps: &[Step],
        turn: &mut Turn<'_>,
        context: &SessionContext,
    ) -> Result<()> {
        for &step in steps {
            match step {
                Step::Extract => {
                    let input = turn.input;
                    let text = self.delegate(step, input, turn).await?;
                    let recipe = Recipe::parse(&text);
                    if recipe.ingredients.is_empty() {
                        return Err(missing(
                            Step::Normalize,
                            "no ingredient list could be extracted from that page",
                        ));
                    }
                    turn.recipe = Some(recipe);
                }
                Step::Normalize => {
                    let recipe = turn
                        .recipe
                        .clone()
                        .or_else(|| context.last_extracted_recipe.clone())
                        .ok_or_else(|| {
                            missing(step, "there is no recipe yet, so send me a recipe URL first")
                        })?;
                    let preference = (turn.intent == Intent::Normalize).then_some(turn.input);
                    let message = normalizer_input(&recipe.ingredients, preference);

                    let text = self.delegate(step, &message, turn).await?;
                    let normalized = parse_list(&text);
                    if normalized.is_empty() {
                        return Err(missing(step, "the ingredients could not be normalized"));
                    }
                    turn.recipe = Some(recipe);
                    turn.normalized = Some(normalized);
                }
                Step::ShoppingList => {
                    let ingredients = turn
                        .normalized
                        .clone()
                        .or_else(|| context.last_normalized_ingredients.clone())
                        .ok_or_else(|| {
                            missing(
                                step,
                                "there are no normalized ingredients yet, so send me a recipe URL first",
                            )
                        })?;

                    let text = self.delegate(step, &render_list(&ingredients), turn).await?;
                    let items = parse_list(&text);
                    if items.is_empty() {
                        return Err(missing(step, "no shopping list could be generated"));
                    }
                    turn.shopping_list = Some(items);
                }
            }
        }
        Ok(())
    }

    /// Invoke the agent behind `step` on the turn's scratch thread.
    async fn delegate(&self, step: Step, message: &str, turn: &mut Turn<'_>) -> Result<String> {
        let name = step.capability();
        let agent = self
            .registry
            .get(name)
            .ok_or_else(|| OrchestrationError::UnknownCapability(name.into()))?;

        turn.invoked.push(name.to_string());
        let reply = agent.invoke(message, &mut turn.scratch).await?;
        turn.add_usage(reply.usage);

        if reply.text.trim().is_empty() {
            return Err(missing(step, format!("{} returned nothing", step.describe())));
        }
        Ok(reply.text)
    }

    fn compose(&self, turn: &Turn<'_>) -> Result<String> {
        match turn.intent {
            Intent::ExtractRecipe | Intent::Normalize => match (&turn.recipe, &turn.normalized) {
                (Some(recipe), Some(normalized)) => {
                    Ok(recipe.with_ingredients(normalized.clone()).render())
                }
                _ => Err(missing(Step::Normalize, "the recipe is incomplete")),
            },
            Intent::ShoppingList => turn
                .shopping_list
                .as_deref()
                .map(render_list)
                .ok_or_else(|| missing(Step::ShoppingList, "no shopping list was produced")),
            Intent::Farewell => Ok(FAREWELL_REPLY.to_string()),
            Intent::Unrelated => Ok(UNRELATED_REPLY.to_string()),
        }
    }
}

fn normalizer_input(ingredients: &[String], preference: Option<&str>) -> String {
    let list = render_list(ingredients);
    match preference {
        Some(preference) => format!("Unit preference: {preference}\n\nIngredients:\n{list}"),
        None => format!("Ingredients:\n{list}"),
    }
}
