//! Built-in agents and their instruction templates.

use std::sync::Arc;

use minion_config::{AppConfig, RoutingMode};
use minion_core::error::Result;
use minion_core::provider::Provider;
use minion_core::tool::{SearchContextSize, ToolSpec};

use crate::intent::{IntentClassifier, ModelClassifier, RuleClassifier};
use crate::orchestrator::Orchestrator;
use crate::registry::AgentRegistry;
use crate::specialist::SpecializedAgent;

pub const RECIPE_EXTRACTOR: &str = "RecipeExtractor";
pub const INGREDIENT_NORMALIZER: &str = "IngredientNormalizer";
pub const SHOPPING_LIST_GENERATOR: &str = "ShoppingListGenerator";
pub const NEWS_AGGREGATOR: &str = "NewsAggregator";
pub const TRAVEL_AGENT: &str = "TravelAgent";

/// Name used for the model-backed intent classifier's model override.
pub const ORCHESTRATOR: &str = "Orchestrator";

pub const RECIPE_EXTRACTOR_INSTRUCTIONS: &str = "\
You are a recipe extraction assistant. Your task is to extract a structured recipe from the content found at a provided URL.

Your output should include:
- A recipe title (if available)
- A clean, plain-text list of ingredients (one per line)
- A clean, plain-text list of instructions or steps (one per line)

Requirements:
- Do not include ads, comments, promotional text, or unrelated content
- Remove vague phrases like \"as needed\"
- Preserve ingredient and instruction order from the source

Format output as:

Title: <Recipe Title>

Ingredients:
- <ingredient 1>
- <ingredient 2>

Instructions:
1. <Step one>
2. <Step two>";

pub const INGREDIENT_NORMALIZER_INSTRUCTIONS: &str = "\
You are an expert ingredient parser. Convert each ingredient line into a clean format using the user's preferred unit system (default is US).

Format: <amount> <unit> <ingredient>

- Use numeric decimals (e.g. 1 1/2 -> 1.5)
- Ignore optional notes like \"chopped\" or \"to taste\"
- Use common US units unless a unit preference is given: cups, tablespoons, ounces, etc.
- Return only the list, one ingredient per line

Example:
- 1 cup all-purpose flour
- 0.5 teaspoon salt";

pub const SHOPPING_LIST_INSTRUCTIONS: &str = "\
Generate a shopping list based on the ingredient list provided.

- Estimate realistic packaging sizes (e.g., 1 lb, 1 dozen)
- Group similar items
- No extra commentary

Format:
- 1 x 5 lb bag all-purpose flour
- 1 dozen eggs";

pub const NEWS_INSTRUCTIONS: &str = "\
You are a News Aggregation Agent designed to retrieve and summarize same-day news for technology products specified by the user.
Your task is to search only for news published today and return a clean, minimal, itemized list for each product requested. Use only reputable sources (e.g., Microsoft, Apple, major tech publications).

User Input:
The user will specify one or more products or technologies they want news about.

For each product requested, return:
- Recent news headlines
- Security issues or vulnerabilities
- New features or updates

Format:
- Use a bullet-point list grouped by product name.
- Each item should include:
  - A brief one-sentence summary
  - A direct link to the source

Requirements:
- Do not include anything older than today.
- Keep the output clean and minimal: just the list, summaries, and links.";

pub const TRAVEL_INSTRUCTIONS: &str =
    "You are a helpful, enthusiastic travel agent with a big personality. Recommend destinations with confidence and flair.";

/// Question asked by `ask` when no prompt is given.
pub const TRAVEL_QUESTION: &str =
    "I'm looking for a travel destination for my vacation. I want lots of snow!";

fn agent(
    provider: &Arc<dyn Provider>,
    config: &AppConfig,
    name: &str,
    instructions: &str,
) -> Result<SpecializedAgent> {
    Ok(
        SpecializedAgent::new(name, instructions, config.model_for(name), provider.clone())?
            .with_temperature(config.temperature),
    )
}

/// The three recipe capabilities.
pub fn recipe_registry(provider: Arc<dyn Provider>, config: &AppConfig) -> Result<AgentRegistry> {
    AgentRegistry::new()
        .with(agent(&provider, config, RECIPE_EXTRACTOR, RECIPE_EXTRACTOR_INSTRUCTIONS)?)?
        .with(agent(
            &provider,
            config,
            INGREDIENT_NORMALIZER,
            INGREDIENT_NORMALIZER_INSTRUCTIONS,
        )?)?
        .with(agent(
            &provider,
            config,
            SHOPPING_LIST_GENERATOR,
            SHOPPING_LIST_INSTRUCTIONS,
        )?)
}

/// The recipe orchestrator with the classifier the configuration selects.
pub fn recipe_orchestrator(provider: Arc<dyn Provider>, config: &AppConfig) -> Result<Orchestrator> {
    let classifier: Box<dyn IntentClassifier> = match config.routing {
        RoutingMode::Rules => Box::new(RuleClassifier),
        RoutingMode::Model => Box::new(ModelClassifier::new(
            provider.clone(),
            config.model_for(ORCHESTRATOR),
        )),
    };
    Orchestrator::new(recipe_registry(provider, config)?, classifier)
}

/// Same-day technology news, answered with server-side web search.
pub fn news_agent(provider: Arc<dyn Provider>, config: &AppConfig) -> Result<SpecializedAgent> {
    Ok(agent(&provider, config, NEWS_AGGREGATOR, NEWS_INSTRUCTIONS)?
        .with_tools(vec![ToolSpec::web_search(SearchContextSize::High)]))
}

/// The travel persona; `instructions` replaces the default persona.
pub fn travel_agent(
    provider: Arc<dyn Provider>,
    config: &AppConfig,
    instructions: Option<&str>,
) -> Result<SpecializedAgent> {
    agent(
        &provider,
        config,
        TRAVEL_AGENT,
        instructions.unwrap_or(TRAVEL_INSTRUCTIONS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::SequentialMockProvider;
    use minion_config::AgentOverride;
    use minion_core::error::Error;

    fn config() -> AppConfig {
        AppConfig {
            api_key: Some("sk-test".into()),
            model_deployment: Some("gpt4_1_nano".into()),
            ..AppConfig::default()
        }
    }

    fn provider() -> Arc<dyn Provider> {
        Arc::new(SequentialMockProvider::new(vec![]))
    }

    #[test]
    fn recipe_registry_has_three_capabilities() {
        let registry = recipe_registry(provider(), &config()).unwrap();
        assert_eq!(
            registry.names(),
            vec![RECIPE_EXTRACTOR, INGREDIENT_NORMALIZER, SHOPPING_LIST_GENERATOR]
        );
        assert!(
            registry
                .get(RECIPE_EXTRACTOR)
                .unwrap()
                .instructions()
                .contains("Title: <Recipe Title>")
        );
    }

    #[test]
    fn per_agent_model_override() {
        let mut cfg = config();
        cfg.agents.insert(
            SHOPPING_LIST_GENERATOR.into(),
            AgentOverride {
                model: Some("gpt-4o".into()),
            },
        );
        let registry = recipe_registry(provider(), &cfg).unwrap();
        assert_eq!(registry.get(SHOPPING_LIST_GENERATOR).unwrap().model(), "gpt-4o");
        assert_eq!(registry.get(RECIPE_EXTRACTOR).unwrap().model(), "gpt4_1_nano");
    }

    #[test]
    fn missing_model_is_a_config_error() {
        let cfg = AppConfig {
            model_deployment: None,
            ..config()
        };
        let err = recipe_registry(provider(), &cfg).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn news_agent_searches_the_web() {
        let agent = news_agent(provider(), &config()).unwrap();
        assert_eq!(
            agent.tools(),
            &[ToolSpec::web_search(SearchContextSize::High)]
        );
        assert!(agent.instructions().contains("same-day news"));
    }

    #[test]
    fn travel_instructions_can_be_replaced() {
        let default = travel_agent(provider(), &config(), None).unwrap();
        let custom = travel_agent(provider(), &config(), Some("Speak like a pirate.")).unwrap();
        assert_eq!(default.instructions(), TRAVEL_INSTRUCTIONS);
        assert_eq!(custom.instructions(), "Speak like a pirate.");
    }

    #[test]
    fn orchestrator_uses_configured_classifier() {
        let rules = recipe_orchestrator(provider(), &config()).unwrap();
        assert_eq!(rules.classifier_name(), "rules");

        let cfg = AppConfig {
            routing: RoutingMode::Model,
            ..config()
        };
        let model = recipe_orchestrator(provider(), &cfg).unwrap();
        assert_eq!(model.classifier_name(), "model");
    }
}
