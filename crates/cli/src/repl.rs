//! The interactive loop shared by `news` and `recipe`.
//!
//! Reads one line per turn, stops on an exit sentinel or end of input, and
//! prints each reply after a fixed label. Turn errors are reported inline;
//! only fatal ones (configuration, authentication) end the loop.

use std::io::Write;

use async_trait::async_trait;
use minion_agent::{Orchestrator, Session, SpecializedAgent};
use minion_core::error::Result;
use minion_core::message::Thread;
use minion_core::provider::Usage;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

/// Words that end the loop (compared trimmed and lowercased).
pub const EXIT_SENTINELS: [&str; 3] = ["exit", "quit", "q"];

/// Label printed before every reply.
pub const REPLY_LABEL: &str = "Assistant:";

/// One reply to show the user.
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub usage: Option<Usage>,
}

/// Produces a reply for each line the user enters.
#[async_trait]
pub trait Responder: Send {
    async fn respond(&mut self, input: &str) -> Result<Reply>;
}

/// A single agent talking on its own session thread.
pub struct AgentResponder {
    agent: SpecializedAgent,
    thread: Thread,
}

impl AgentResponder {
    pub fn new(agent: SpecializedAgent) -> Self {
        Self {
            agent,
            thread: Thread::new(),
        }
    }

    pub fn thread(&self) -> &Thread {
        &self.thread
    }
}

#[async_trait]
impl Responder for AgentResponder {
    async fn respond(&mut self, input: &str) -> Result<Reply> {
        let reply = self.agent.invoke(input, &mut self.thread).await?;
        Ok(Reply {
            text: reply.text,
            usage: reply.usage,
        })
    }
}

/// The recipe orchestrator together with the session it owns.
pub struct OrchestratorResponder {
    orchestrator: Orchestrator,
    session: Session,
}

impl OrchestratorResponder {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            session: Session::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

#[async_trait]
impl Responder for OrchestratorResponder {
    async fn respond(&mut self, input: &str) -> Result<Reply> {
        let turn = self.orchestrator.handle(input, &mut self.session).await?;
        Ok(Reply {
            text: turn.text,
            usage: turn.usage,
        })
    }
}

/// Text around the loop for one tool.
#[derive(Debug, Clone)]
pub struct LoopStyle {
    pub prompt: String,
    pub farewell: String,
    pub show_usage: bool,
}

/// Whether `line` asks to leave the loop.
pub fn is_exit(line: &str) -> bool {
    let normalized = line.trim().to_lowercase();
    EXIT_SENTINELS.contains(&normalized.as_str())
}

/// Print a reply with its label and, optionally, the token counters.
pub fn write_reply<W: Write>(out: &mut W, reply: &Reply, show_usage: bool) -> std::io::Result<()> {
    writeln!(out, "\n{REPLY_LABEL}\n{}", reply.text)?;
    if let Some(usage) = reply.usage.as_ref().filter(|_| show_usage) {
        write_usage(out, usage)?;
    }
    writeln!(out)
}

pub fn write_usage<W: Write>(out: &mut W, usage: &Usage) -> std::io::Result<()> {
    writeln!(out, "\nToken usage:")?;
    writeln!(out, "  Input tokens: {}", usage.input_tokens())?;
    writeln!(out, "  Output tokens: {}", usage.output_tokens())?;
    writeln!(out, "  Total tokens: {}", usage.total_tokens())
}

/// Run the loop until an exit sentinel, end of input, or a fatal error.
pub async fn run<P, R, W>(responder: &mut P, style: &LoopStyle, input: R, out: &mut W) -> Result<()>
where
    P: Responder + ?Sized,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut turns = 0usize;

    loop {
        write!(out, "{}", style.prompt)?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            debug!(turns, "End of input");
            writeln!(out)?;
            return Ok(());
        };

        if is_exit(&line) {
            debug!(turns, "Exit requested");
            writeln!(out, "{}", style.farewell)?;
            return Ok(());
        }

        turns += 1;
        match responder.respond(&line).await {
            Ok(reply) => write_reply(out, &reply, style.show_usage)?,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => writeln!(out, "\n[Error] {e}\n")?,
        }
    }
}
