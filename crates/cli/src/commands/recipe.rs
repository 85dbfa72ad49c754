//! `minion recipe`: the orchestrated recipe assistant.

use minion::repl::{self, LoopStyle, OrchestratorResponder};
use minion_agent::catalog;
use tokio::io::BufReader;
use tracing::info;

use super::GlobalOpts;

pub async fn run(opts: &GlobalOpts) -> Result<(), Box<dyn std::error::Error>> {
    let config = opts.validated_config()?;
    let provider = minion_providers::build_from_config(&config)?;
    let orchestrator = catalog::recipe_orchestrator(provider, &config)?;

    info!(
        agents = ?orchestrator.registry().names(),
        routing = orchestrator.classifier_name(),
        "Recipe assistant ready"
    );

    println!("Welcome to the Recipe Assistant!");
    println!("Send a recipe URL, ask to convert units, or ask for a shopping list. Type 'exit' to quit.");

    let style = LoopStyle {
        prompt: "\nUser:> ".into(),
        farewell: "Exiting the Recipe Assistant. Goodbye!".into(),
        show_usage: false,
    };

    let mut responder = OrchestratorResponder::new(orchestrator);
    let stdin = BufReader::new(tokio::io::stdin());
    repl::run(&mut responder, &style, stdin, &mut std::io::stdout()).await?;

    Ok(())
}
