//! `minion news`: same-day technology news, searched live by the provider.

use minion::repl::{self, AgentResponder, LoopStyle};
use minion_agent::catalog;
use minion_config::ApiStyle;
use tokio::io::BufReader;

use super::GlobalOpts;

pub async fn run(opts: &GlobalOpts) -> Result<(), Box<dyn std::error::Error>> {
    let config = opts.validated_config()?;
    if config.api_style == ApiStyle::Chat {
        return Err(
            "news needs the web search tool, which only the responses API offers; set MINION_API_STYLE=responses"
                .into(),
        );
    }

    let provider = minion_providers::build_from_config(&config)?;
    let agent = catalog::news_agent(provider, &config)?;

    println!("NewsBot: today's news for any product or technology. Type 'exit', 'quit' or 'q' to leave.");

    let style = LoopStyle {
        prompt: "\nEnter a product or technology to get today's news (or type 'exit' to quit): "
            .into(),
        farewell: "Exiting NewsBot. Goodbye!".into(),
        show_usage: true,
    };

    let mut responder = AgentResponder::new(agent);
    let stdin = BufReader::new(tokio::io::stdin());
    repl::run(&mut responder, &style, stdin, &mut std::io::stdout()).await?;

    Ok(())
}
