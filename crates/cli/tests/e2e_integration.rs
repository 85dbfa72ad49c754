//! End-to-end tests for the minion tools.
//!
//! These drive the interactive loop with scripted input and a recording
//! provider, from the user's line to the printed reply.

use std::sync::{Arc, Mutex};

use minion::repl::{self, AgentResponder, LoopStyle, OrchestratorResponder};
use minion_agent::catalog;
use minion_config::AppConfig;
use minion_core::error::{Error, ProviderError};
use minion_core::message::Role;
use minion_core::provider::{CompletionRequest, CompletionResponse, Provider, Usage};

// ── Mock Provider ────────────────────────────────────────────────────────

/// A provider that returns scripted results in sequence and records
/// every request it receives.
struct ScriptedProvider {
    results: Mutex<Vec<Result<CompletionResponse, ProviderError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    fn new(results: Vec<Result<CompletionResponse, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            results: Mutex::new(results),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn texts(texts: &[&str]) -> Arc<Self> {
        Self::new(texts.iter().map(|t| Ok(text_response(t))).collect())
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len()
        };
        let mut results = self.results.lock().unwrap();
        if results.is_empty() {
            panic!("ScriptedProvider exhausted: call #{call}");
        }
        results.remove(0)
    }
}

fn text_response(text: &str) -> CompletionResponse {
    CompletionResponse {
        output_text: text.into(),
        usage: Some(Usage::new(10, 5)),
        model: "mock".into(),
    }
}

fn config() -> AppConfig {
    AppConfig {
        api_key: Some("sk-test".into()),
        model_deployment: Some("gpt4_1_nano".into()),
        ..AppConfig::default()
    }
}

fn recipe_style() -> LoopStyle {
    LoopStyle {
        prompt: "User:> ".into(),
        farewell: "Exiting the Recipe Assistant. Goodbye!".into(),
        show_usage: false,
    }
}

async fn run_recipe(
    provider: Arc<ScriptedProvider>,
    input: &str,
) -> (OrchestratorResponder, Result<(), Error>, String) {
    let orchestrator = catalog::recipe_orchestrator(provider, &config()).unwrap();
    let mut responder = OrchestratorResponder::new(orchestrator);
    let mut out = Vec::new();
    let result = repl::run(&mut responder, &recipe_style(), input.as_bytes(), &mut out).await;
    (responder, result, String::from_utf8(out).unwrap())
}

const EXTRACTED: &str = "\
Title: Classic Banana Bread

Ingredients:
- 3 ripe bananas, mashed
- 1/3 cup melted butter
- 1 1/2 cups all-purpose flour

Instructions:
1. Preheat the oven to 350°F.
2. Mix the butter into the bananas.
3. Stir in the flour and bake for 60 minutes.";

const NORMALIZED: &str = "\
- 3 whole bananas
- 0.33 cup butter
- 1.5 cups all-purpose flour";

const SHOPPING: &str = "\
- 1 bunch bananas
- 1 x 1 lb package butter
- 1 x 5 lb bag all-purpose flour";

// ── Scenario 1: exit ─────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_exit_prints_farewell_without_calls() {
    let provider = ScriptedProvider::texts(&[]);
    let (_, result, out) = run_recipe(provider.clone(), "exit\n").await;

    assert!(result.is_ok());
    assert!(out.contains("Exiting the Recipe Assistant. Goodbye!"));
    assert_eq!(provider.calls(), 0);
}

// ── Scenario 2: recipe URL ───────────────────────────────────────────────

#[tokio::test]
async fn e2e_recipe_url_extracts_then_normalizes() {
    let provider = ScriptedProvider::texts(&[EXTRACTED, NORMALIZED]);
    let (responder, result, out) =
        run_recipe(provider.clone(), "https://example.com/banana-bread\nexit\n").await;

    assert!(result.is_ok());

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].instructions, catalog::RECIPE_EXTRACTOR_INSTRUCTIONS);
    assert_eq!(requests[0].input[0].content, "https://example.com/banana-bread");
    assert_eq!(requests[1].instructions, catalog::INGREDIENT_NORMALIZER_INSTRUCTIONS);
    assert!(requests[1].input[0].content.contains("- 3 ripe bananas, mashed"));

    let title = out.find("Title: Classic Banana Bread").unwrap();
    let ingredients = out.find("Ingredients:").unwrap();
    let instructions = out.find("Instructions:").unwrap();
    assert!(title < ingredients && ingredients < instructions);
    assert!(out.contains("- 1.5 cups all-purpose flour"));
    assert!(out.contains("3. Stir in the flour and bake for 60 minutes."));

    // Only the user line and the composed reply reach the session thread.
    let thread = &responder.session().thread;
    assert_eq!(thread.len(), 2);
    assert_eq!(thread.messages()[0].role, Role::User);
    assert_eq!(thread.messages()[1].role, Role::Assistant);
    assert!(thread.messages()[1].content.starts_with("Title:"));
}

#[tokio::test]
async fn e2e_recipe_then_shopping_list() {
    let provider = ScriptedProvider::texts(&[EXTRACTED, NORMALIZED, SHOPPING]);
    let (responder, result, out) = run_recipe(
        provider.clone(),
        "https://example.com/banana-bread\nCan I get a shopping list?\nexit\n",
    )
    .await;

    assert!(result.is_ok());
    assert_eq!(provider.calls(), 3);
    assert_eq!(
        provider.requests()[2].instructions,
        catalog::SHOPPING_LIST_INSTRUCTIONS
    );
    assert!(out.contains("- 1 x 5 lb bag all-purpose flour"));
    assert_eq!(responder.session().thread.len(), 4);
}

// ── Scenario 3: shopping list without ingredients ────────────────────────

#[tokio::test]
async fn e2e_shopping_list_without_recipe_is_declined() {
    let provider = ScriptedProvider::texts(&[]);
    let (responder, result, out) = run_recipe(provider.clone(), "shopping list\nexit\n").await;

    assert!(result.is_ok());
    assert!(out.contains("Sorry, I can't complete that request"));
    assert_eq!(provider.calls(), 0);
    assert!(responder.session().context.last_normalized_ingredients.is_none());
}

// ── Scenario 4: rate limit on a delegated call ───────────────────────────

#[tokio::test]
async fn e2e_rate_limit_reports_error_without_partial_messages() {
    let provider = ScriptedProvider::new(vec![
        Ok(text_response(EXTRACTED)),
        Err(ProviderError::RateLimited {
            retry_after_secs: Some(20),
        }),
    ]);
    let (responder, result, out) =
        run_recipe(provider.clone(), "https://example.com/banana-bread\nexit\n").await;

    assert!(result.is_ok(), "rate limits do not end the loop");
    assert!(out.contains("[Error]"));
    assert!(out.contains("Rate limited"));
    assert!(!out.contains("Title:"));
    assert_eq!(provider.calls(), 2);

    let session = responder.session();
    assert!(session.thread.is_empty());
    assert!(session.context.last_extracted_recipe.is_none());
}

#[tokio::test]
async fn e2e_authentication_failure_ends_the_session() {
    let provider = ScriptedProvider::new(vec![Err(ProviderError::AuthenticationFailed(
        "Invalid API key or insufficient permissions".into(),
    ))]);
    let (_, result, _) = run_recipe(
        provider.clone(),
        "https://example.com/banana-bread\nshopping list\n",
    )
    .await;

    let err = result.unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(provider.calls(), 1);
}

// ── Routing stability ────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_same_input_routes_the_same_way() {
    let mut transcripts = Vec::new();
    for _ in 0..2 {
        let provider = ScriptedProvider::texts(&[EXTRACTED, NORMALIZED]);
        let (_, _, out) =
            run_recipe(provider.clone(), "https://example.com/banana-bread\nexit\n").await;
        let instructions: Vec<String> = provider
            .requests()
            .into_iter()
            .map(|r| r.instructions)
            .collect();
        transcripts.push((instructions, out));
    }
    assert_eq!(transcripts[0], transcripts[1]);
}

// ── NewsBot ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_news_loop_sends_web_search_and_prints_usage() {
    let provider = ScriptedProvider::texts(&[
        "**Windows 11**\n- Patch Tuesday fixes 3 issues (https://microsoft.com/...)",
    ]);
    let agent = catalog::news_agent(provider.clone(), &config()).unwrap();
    let mut responder = AgentResponder::new(agent);
    let style = LoopStyle {
        prompt: "> ".into(),
        farewell: "Exiting NewsBot. Goodbye!".into(),
        show_usage: true,
    };
    let mut out = Vec::new();

    repl::run(&mut responder, &style, "Windows 11\nq\n".as_bytes(), &mut out)
        .await
        .unwrap();
    let out = String::from_utf8(out).unwrap();

    let request = &provider.requests()[0];
    assert_eq!(request.tools.len(), 1);
    assert_eq!(request.tools[0].kind(), "web_search_preview");
    assert_eq!(request.input[0].content, "Windows 11");

    assert!(out.contains("Assistant:\n**Windows 11**"));
    assert!(out.contains("  Input tokens: 10"));
    assert!(out.contains("  Output tokens: 5"));
    assert!(out.contains("  Total tokens: 15"));
    assert!(out.ends_with("Exiting NewsBot. Goodbye!\n"));
    assert_eq!(responder.thread().len(), 2);
}

#[tokio::test]
async fn e2e_news_failure_appends_nothing() {
    let provider = ScriptedProvider::new(vec![
        Err(ProviderError::Network("connection reset".into())),
        Ok(text_response("- headline")),
    ]);
    let agent = catalog::news_agent(provider.clone(), &config()).unwrap();
    let mut responder = AgentResponder::new(agent);
    let style = LoopStyle {
        prompt: "> ".into(),
        farewell: "bye".into(),
        show_usage: false,
    };
    let mut out = Vec::new();

    repl::run(&mut responder, &style, "Azure\nAzure\n".as_bytes(), &mut out)
        .await
        .unwrap();
    let out = String::from_utf8(out).unwrap();

    assert!(out.contains("[Error] Provider error: Network error: connection reset"));
    assert!(out.contains("- headline"));
    assert_eq!(responder.thread().len(), 2);
}
