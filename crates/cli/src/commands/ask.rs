//! `minion ask`: one question to the travel persona.

use minion::repl::{self, Reply};
use minion_agent::catalog;
use minion_core::message::Thread;
use tracing::info;

use super::GlobalOpts;

pub async fn run(
    opts: &GlobalOpts,
    prompt: Option<String>,
    instructions: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = opts.validated_config()?;
    let provider = minion_providers::build_from_config(&config)?;
    let agent = catalog::travel_agent(provider, &config, instructions.as_deref())?;

    let prompt = prompt.unwrap_or_else(|| catalog::TRAVEL_QUESTION.to_string());
    info!(model = %agent.model(), "Asking travel agent");

    let mut thread = Thread::new();
    let reply = agent.invoke(&prompt, &mut thread).await?;

    repl::write_reply(
        &mut std::io::stdout(),
        &Reply {
            text: reply.text,
            usage: reply.usage,
        },
        true,
    )?;

    Ok(())
}
